use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use crate::frame::FrameError;
use crate::sequence::Record;

/// Verification stage of the QC pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    StillImage,
    ContainerFrame,
    RecordSet,
}

impl Stage {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::StillImage => "still image check",
            Stage::ContainerFrame => "container frame check",
            Stage::RecordSet => "record set check",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of verifying a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Passed,
    /// Passed after stripping the trailing newline of the reconstructed file.
    Repaired,
    ChecksumMismatch { expected: String, actual: String },
    Unreadable(FrameError),
    /// No record could be recovered, so there is nothing to compare.
    NoRecords,
}

impl ItemStatus {
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, ItemStatus::Passed | ItemStatus::Repaired)
    }
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Passed => write!(f, "passed"),
            ItemStatus::Repaired => write!(f, "passed after newline repair"),
            ItemStatus::ChecksumMismatch { expected, actual } => {
                write!(f, "checksum mismatch (expected {}, got {})", expected, actual)
            }
            ItemStatus::Unreadable(e) => write!(f, "unreadable frame: {}", e),
            ItemStatus::NoRecords => write!(f, "no record could be recovered"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    /// Position of the item within its stage.
    pub index: usize,
    pub path: PathBuf,
    pub status: ItemStatus,
}

impl ItemReport {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(index: usize, path: P, status: ItemStatus) -> Self {
        Self {
            index,
            path: path.into(),
            status,
        }
    }

    /// Logs the outcome: passed items at info level, failed ones as warnings.
    pub(crate) fn log(&self, stage: Stage) {
        if self.status.is_passed() {
            log::info!("{} #{} ({}): {}", stage, self.index, self.path.display(), self.status);
        } else {
            log::warn!("{} #{} ({}): {}", stage, self.index, self.path.display(), self.status);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    stage: Stage,
    items: Vec<ItemReport>,
}

impl StageReport {
    #[must_use]
    pub fn new(stage: Stage, items: Vec<ItemReport>) -> Self {
        Self { stage, items }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn items(&self) -> &[ItemReport] {
        &self.items
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.items.iter().filter(|item| item.status.is_passed()).count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.items.len() - self.passed_count()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

impl Display for StageReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}/{} passed",
            self.stage,
            self.passed_count(),
            self.items.len()
        )
    }
}

/// Result of a whole QC run.
#[derive(Debug, Clone)]
pub struct QcSummary {
    stages: Vec<StageReport>,
    records: Vec<Record>,
    reconstructed_path: PathBuf,
}

impl QcSummary {
    #[must_use]
    pub fn new(stages: Vec<StageReport>, records: Vec<Record>, reconstructed_path: PathBuf) -> Self {
        Self {
            stages,
            records,
            reconstructed_path,
        }
    }

    #[must_use]
    pub fn stages(&self) -> &[StageReport] {
        &self.stages
    }

    #[must_use]
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage() == stage)
    }

    /// Records recovered from the container, in container order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn reconstructed_path(&self) -> &Path {
        &self.reconstructed_path
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.stages.iter().map(StageReport::failed_count).sum()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

impl Display for QcSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_success() {
            write!(f, "All items passed")
        } else {
            write!(f, "{} items failed, see log", self.failed_count())
        }
    }
}
