use chrono::Local;
use log::{Level, LevelFilter, SetLoggerError};
use log::{Metadata, Record};

use crate::PROGRESS_BAR;

/// Crates whose messages are shown at every verbosity level; the image
/// codecs only get through with warnings.
const OWN_TARGETS: [&str; 2] = ["nucpix", "nucpix_cli"];

struct Logger;

fn format_line(record: &Record, stage: Option<&str>) -> String {
    let time = Local::now().format("%H:%M:%S%.3f");
    match stage {
        Some(stage) => format!("{} {:<5} [{}] {}", time, record.level(), stage, record.args()),
        None => format!("{} {:<5} {}", time, record.level(), record.args()),
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
            || OWN_TARGETS
                .iter()
                .any(|target| metadata.target().starts_with(target))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = format_line(record, PROGRESS_BAR.stage());
        if PROGRESS_BAR.is_hidden() {
            eprintln!("{}", msg);
        } else {
            PROGRESS_BAR.println(msg);
        }
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;

pub fn init_logging(filter: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(filter);

    Ok(())
}

#[cfg(test)]
mod tests {
    use log::{Level, Log, Metadata, Record};

    use crate::logging::{format_line, Logger};

    #[test]
    fn test_format_line_with_stage() {
        let line = format_line(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("3/3 passed"))
                .build(),
            Some("still image check"),
        );

        assert!(line.ends_with(" INFO  [still image check] 3/3 passed"), "{}", line);
    }

    #[test]
    fn test_enabled() {
        let metadata = |level, target| Metadata::builder().level(level).target(target).build();

        assert!(Logger.enabled(&metadata(Level::Trace, "nucpix::qc")));
        assert!(Logger.enabled(&metadata(Level::Warn, "png::decoder")));
        assert!(!Logger.enabled(&metadata(Level::Debug, "png::decoder")));
    }
}
