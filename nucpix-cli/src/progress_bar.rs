use std::sync::{Arc, Mutex};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use nucpix::progress::ProgressNotifier;

const BAR_TEMPLATE: &str = "{msg:>22} {wide_bar} {pos}/{len} [ETA {eta}]";

/// Item counter of the current encode or QC stage. The stage name is shown
/// next to the bar and is also used to tag log lines.
#[derive(Debug, Clone)]
pub(crate) struct NucProgressBar {
    bar: ProgressBar,
    stage: Arc<Mutex<Option<&'static str>>>,
}

impl NucProgressBar {
    pub fn new() -> NucProgressBar {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .expect("Invalid progress bar template"),
        );

        Self {
            bar,
            stage: Arc::new(Mutex::new(None)),
        }
    }

    pub fn show(&self) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear()
    }

    /// Name of the stage currently running, if any.
    pub fn stage(&self) -> Option<&'static str> {
        *self.stage.lock().unwrap()
    }

    pub fn println<I: AsRef<str>>(&self, msg: I) {
        self.bar.println(msg);
    }
}

impl ProgressNotifier for NucProgressBar {
    fn set_stage(&self, stage: &'static str) {
        *self.stage.lock().unwrap() = Some(stage);
        self.bar.set_message(stage);
    }

    fn set_iter_num(&self, num_iter: u64) {
        self.bar.set_length(num_iter);
        self.bar.set_position(0);
    }

    fn inc_iter(&self) {
        self.bar.inc(1);
    }
}

#[cfg(test)]
mod tests {
    use nucpix::progress::ProgressNotifier;

    use crate::progress_bar::NucProgressBar;

    #[test]
    fn test_stage() {
        let bar = NucProgressBar::new();
        assert_eq!(bar.stage(), None);

        bar.set_stage("still image check");
        bar.set_iter_num(4);
        bar.inc_iter();

        assert_eq!(bar.stage(), Some("still image check"));
        assert_eq!(bar.bar.position(), 1);
        assert!(bar.is_hidden());
    }
}
