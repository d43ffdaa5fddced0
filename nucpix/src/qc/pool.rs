use std::mem;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct ErrorReceiver<E> {
    error: Arc<Mutex<Option<E>>>,
}

impl<E> Clone for ErrorReceiver<E> {
    fn clone(&self) -> Self {
        Self {
            error: self.error.clone(),
        }
    }
}

impl<E> ErrorReceiver<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn handle_result<T>(&self, result: Result<T, E>) {
        if let Err(error) = result {
            self.set_error(error);
        }
    }

    /// Only the first error is kept.
    fn set_error(&self, error: E) {
        let mut guard = self.error.lock().expect("Could not acquire error lock");
        if guard.is_none() {
            *guard = Some(error);
        }
    }

    pub fn status(&self) -> Result<(), E> {
        let mut guard = self.error.lock().expect("Could not acquire error lock");

        match guard.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub type WorkerJobResult<E> = Result<(), E>;

/// A bounded pool of named worker threads.
///
/// With zero threads every job is executed directly in the caller's thread.
#[derive(Debug)]
pub(crate) struct WorkerPool<E> {
    inner: Option<Mutex<threadpool::ThreadPool>>,
    error_receiver: ErrorReceiver<E>,
}

impl<E: Send + 'static> WorkerPool<E> {
    #[must_use]
    pub fn new(thread_num: usize, thread_name: &str) -> Self {
        let inner = if thread_num > 0 {
            let pool = threadpool::Builder::new()
                .num_threads(thread_num)
                .thread_name(thread_name.to_owned())
                .build();
            Some(Mutex::new(pool))
        } else {
            None
        };

        Self {
            inner,
            error_receiver: ErrorReceiver::new(),
        }
    }

    #[must_use]
    pub fn is_foreground(&self) -> bool {
        self.inner.is_none()
    }

    pub fn execute<F>(&self, job: F) -> WorkerJobResult<E>
    where
        F: FnOnce() -> WorkerJobResult<E> + Send + 'static,
    {
        self.error_receiver.status()?;

        if let Some(pool) = &self.inner {
            let inner_guard = pool.lock().expect("Could not acquire worker pool lock");

            let error_receiver = self.error_receiver.clone();
            inner_guard.execute(move || {
                error_receiver.handle_result(job());
            });
        } else {
            self.error_receiver.handle_result(job());
            self.error_receiver.status()?;
        }

        Ok(())
    }

    pub fn join(&self) -> WorkerJobResult<E> {
        self.wait();
        self.error_receiver.status()
    }

    fn wait(&self) {
        if let Some(pool) = &self.inner {
            let inner_guard = pool.lock().expect("Could not acquire worker pool lock");
            inner_guard.join();
        } else {
            // nothing can be running in the background
        }
    }

    /// Runs `job` for every item and returns the results in item order,
    /// regardless of the order in which the jobs finish.
    ///
    /// The first error returned by any job is returned once every started
    /// job has finished.
    pub fn map_indexed<I, T, F>(&self, items: Vec<I>, job: F) -> Result<Vec<T>, E>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(usize, I) -> Result<T, E> + Send + Sync + 'static,
    {
        let item_num = items.len();
        let results: Arc<Mutex<Vec<Option<T>>>> =
            Arc::new(Mutex::new((0..item_num).map(|_| None).collect()));
        let job = Arc::new(job);

        for (index, item) in items.into_iter().enumerate() {
            let results = results.clone();
            let job = job.clone();

            let status = self.execute(move || {
                let value = job(index, item)?;
                let mut guard = results.lock().expect("Could not acquire result lock");
                guard[index] = Some(value);
                Ok(())
            });
            if let Err(error) = status {
                self.wait();
                return Err(error);
            }
        }
        self.join()?;

        let mut guard = results.lock().expect("Could not acquire result lock");
        let results = mem::take(&mut *guard);

        Ok(results
            .into_iter()
            .map(|value| value.expect("Worker job finished without a result"))
            .collect())
    }
}

impl<E> Drop for WorkerPool<E> {
    fn drop(&mut self) {
        if let Some(pool) = &self.inner {
            let inner_guard = pool.lock().expect("Could not acquire worker pool lock");

            if inner_guard.active_count() != 0 || inner_guard.queued_count() != 0 {
                panic!("Cannot drop WorkerPool when any jobs are active");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::fmt::{Display, Formatter};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use crate::qc::pool::WorkerPool;

    #[derive(Debug, PartialEq, Eq)]
    struct TestError {
        message: &'static str,
    }

    impl TestError {
        #[must_use]
        pub fn new(message: &'static str) -> Self {
            Self { message }
        }
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl Error for TestError {}

    #[test]
    fn test_worker_pool_foreground() {
        let pool: WorkerPool<TestError> = WorkerPool::new(0, "test");
        let current_id = thread::current().id();

        let result = Arc::new(Mutex::new(None));
        let result_thread = result.clone();
        pool.execute(move || {
            *result_thread.lock().unwrap() = Some(thread::current().id());
            Ok(())
        })
        .unwrap();
        pool.join().unwrap();

        assert!(pool.is_foreground());
        assert_eq!(*result.lock().unwrap(), Some(current_id));
    }

    #[test]
    fn test_worker_pool_background() {
        let pool: WorkerPool<TestError> = WorkerPool::new(1, "test");
        let current_id = thread::current().id();

        let result = Arc::new(Mutex::new(None));
        let result_thread = result.clone();
        pool.execute(move || {
            *result_thread.lock().unwrap() = Some(thread::current().id());
            Ok(())
        })
        .unwrap();
        pool.join().unwrap();

        assert!(!pool.is_foreground());
        assert_ne!(*result.lock().unwrap(), Some(current_id));
    }

    #[test]
    fn test_worker_pool_error_on_join() {
        let pool: WorkerPool<TestError> = WorkerPool::new(1, "test");

        pool.execute(move || Err(TestError::new("error in execute")))
            .unwrap();
        let result = pool.join();

        assert_eq!(result.unwrap_err(), TestError::new("error in execute"));
    }

    #[test]
    fn test_map_indexed_keeps_order() {
        let pool: WorkerPool<TestError> = WorkerPool::new(4, "test");

        let items: Vec<u64> = (0..16).collect();
        let results = pool
            .map_indexed(items, |index, item| {
                // later items finish first
                thread::sleep(Duration::from_millis(16 - item));
                Ok((index, item * 2))
            })
            .unwrap();

        let expected: Vec<_> = (0..16).map(|i| (i as usize, i * 2)).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn test_map_indexed_foreground() {
        let pool: WorkerPool<TestError> = WorkerPool::new(0, "test");

        let results = pool
            .map_indexed(vec!["a", "bb", "ccc"], |_, item| Ok(item.len()))
            .unwrap();

        assert_eq!(results, vec![1, 2, 3]);
    }

    #[test]
    fn test_map_indexed_error() {
        let pool: WorkerPool<TestError> = WorkerPool::new(2, "test");

        let result = pool.map_indexed((0..8).collect(), |_, item: i32| {
            if item == 5 {
                Err(TestError::new("item 5 failed"))
            } else {
                Ok(item)
            }
        });

        assert_eq!(result.unwrap_err(), TestError::new("item 5 failed"));
    }

    #[test]
    #[should_panic(expected = "Cannot drop WorkerPool when any jobs are active")]
    fn test_worker_pool_drop_when_active() {
        let pool: WorkerPool<TestError> = WorkerPool::new(1, "test");

        pool.execute(move || {
            thread::sleep(Duration::from_millis(100));
            Ok(())
        })
        .unwrap();

        drop(pool);
    }
}
