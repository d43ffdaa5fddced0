use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::bail;

#[derive(Debug, Clone)]
pub struct InputFile {
    path: PathBuf,
}

impl Display for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

pub fn input_file(path: &str) -> Result<InputFile, String> {
    let result = InputFile {
        path: PathBuf::from(path),
    };

    Ok(result)
}

impl InputFile {
    pub fn as_path(&self) -> Result<&Path, anyhow::Error> {
        if !self.path.is_file() {
            bail!(
                "Provided path: {} does not point to a file",
                self.path.display()
            );
        }

        Ok(&self.path)
    }
}

/// Returns the requested number of worker threads, or the number of
/// available CPUs.
#[must_use]
pub fn thread_num(threads: Option<usize>) -> usize {
    threads.unwrap_or_else(|| {
        std::thread::available_parallelism().map_or(0, std::num::NonZeroUsize::get)
    })
}
