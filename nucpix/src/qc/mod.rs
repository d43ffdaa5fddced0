//! Verification of an encode run.
//!
//! The pipeline runs three stages in order:
//! 1. every still is differenced against the baseline and its frame checksum
//!    is compared with the source file checksum,
//! 2. the container is split into examination frames which are decoded the
//!    same way, recovering the records,
//! 3. the recovered records are written back as FASTA and the checksum of
//!    that file is compared with the source checksum.
//!
//! Failed items are reported, never returned as errors. Only I/O and image
//! failures abort a run.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use crate::carrier::image_store::load_rgba;
use crate::carrier::CarrierError;
use crate::encoder::{EncodedSet, OutputLayout};
use crate::fasta::DEFAULT_LINE_WIDTH;
use crate::fasta::writer::FastaWriterError;
use crate::progress::{format_stats, ByteNum, DummyProgressNotifier, ProgressNotifier};
use crate::qc::pool::WorkerPool;
use crate::qc::report::{ItemReport, ItemStatus, QcSummary, Stage, StageReport};
use crate::sequence::Record;

mod container;
pub(crate) mod pool;
mod record_set;
pub mod report;
mod still;

const WORKER_THREAD_NAME: &str = "nucpix-qc";

#[derive(Debug)]
pub enum QcError {
    IoError(std::io::Error),
    CarrierError(CarrierError),
    FastaWriterError(FastaWriterError),
}

impl From<std::io::Error> for QcError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<CarrierError> for QcError {
    fn from(e: CarrierError) -> Self {
        Self::CarrierError(e)
    }
}

impl From<FastaWriterError> for QcError {
    fn from(e: FastaWriterError) -> Self {
        Self::FastaWriterError(e)
    }
}

impl Display for QcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QcError::IoError(e) => write!(f, "IO error: {}", e),
            QcError::CarrierError(e) => write!(f, "Carrier error: {}", e),
            QcError::FastaWriterError(e) => write!(f, "Could not write FASTA: {}", e),
        }
    }
}

impl Error for QcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            QcError::IoError(e) => Some(e),
            QcError::CarrierError(e) => Some(e),
            QcError::FastaWriterError(e) => Some(e),
        }
    }
}

pub type QcResult<T> = Result<T, QcError>;

/// Compares a checksum recovered from a frame or file with the expected one.
pub(crate) fn checksum_status(expected: &str, actual: &str) -> ItemStatus {
    if expected == actual {
        ItemStatus::Passed
    } else {
        ItemStatus::ChecksumMismatch {
            expected: expected.to_owned(),
            actual: actual.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QcParams {
    thread_num: usize,
    line_width: Option<usize>,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl QcParams {
    #[must_use]
    pub fn builder() -> QcParamsBuilder {
        QcParamsBuilder::new()
    }
}

impl Default for QcParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct QcParamsBuilder {
    thread_num: usize,
    line_width: Option<usize>,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl QcParamsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            thread_num: 0,
            line_width: None,
            progress_notifier: Arc::new(DummyProgressNotifier),
        }
    }

    /// Number of worker threads checking stills and container frames. 0 runs
    /// every check in the calling thread.
    pub fn thread_num(&mut self, thread_num: usize) -> &mut Self {
        let mut new = self;
        new.thread_num = thread_num;
        new
    }

    /// Line width of the reconstructed FASTA file. Defaults to the line width
    /// of the source file.
    pub fn line_width(&mut self, line_width: Option<usize>) -> &mut Self {
        let mut new = self;
        new.line_width = line_width;
        new
    }

    pub fn progress_notifier(&mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> &mut Self {
        let mut new = self;
        new.progress_notifier = progress_notifier;
        new
    }

    #[must_use]
    pub fn build(&self) -> QcParams {
        QcParams {
            thread_num: self.thread_num,
            line_width: self.line_width,
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for QcParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct QcPipeline {
    params: QcParams,
}

impl QcPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(QcParams::default())
    }

    #[must_use]
    pub fn with_params(params: QcParams) -> Self {
        Self { params }
    }

    /// Verifies the stills and the container of an encode run and
    /// reconstructs the source FASTA file in the examination directory.
    pub fn run(&self, encoded: &EncodedSet) -> QcResult<QcSummary> {
        let start_time = Instant::now();
        let layout = encoded.layout();
        layout.create_dirs()?;

        let pool = self.make_pool();
        let notifier = self.params.progress_notifier.clone();
        notifier.set_stage(Stage::StillImage.name());
        notifier.set_iter_num(2 * encoded.records().len() as u64);

        let baseline = Arc::new(load_rgba(layout.baseline_path())?);
        let stills = encoded
            .records()
            .iter()
            .map(|record| (record.still_path.clone(), record.window))
            .collect();
        let still_report = still::check_stills(
            &pool,
            baseline,
            stills,
            Arc::from(encoded.checksum()),
            notifier.clone(),
        )?;
        log_stage(&still_report);

        notifier.set_stage(Stage::ContainerFrame.name());
        let frames = container::recover_frames(
            &pool,
            &layout.container_path(),
            &layout.examination_dir(),
            Some(encoded.windows()),
            notifier.clone(),
        )?;
        let (frame_report, recovered) = container::verify_frames(frames, encoded.checksum());
        log_stage(&frame_report);
        let records: Vec<Record> = recovered.into_iter().flatten().collect();

        notifier.set_stage(Stage::RecordSet.name());
        let line_width = self.params.line_width.unwrap_or_else(|| encoded.line_width());
        let reconstructed_path = layout.reconstructed_path(&encoded.fasta_name());
        let record_set_report = Self::check_record_set(
            &records,
            &reconstructed_path,
            Some(encoded.checksum()),
            line_width,
        )?;

        let summary = QcSummary::new(
            vec![still_report, frame_report, record_set_report],
            records,
            reconstructed_path,
        );
        Self::log_summary(&summary, start_time);
        Ok(summary)
    }

    /// Reconstructs a FASTA file from a container alone.
    ///
    /// Frame 0 is used as the baseline and the window of every other frame is
    /// located from its differences. The checksum of the first readable frame
    /// is the reference for the remaining frames and for the reconstructed
    /// file. Results are written under `<output_root>/<container name>/`.
    pub fn decode_container<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        container_path: P,
        output_root: Q,
    ) -> QcResult<QcSummary> {
        let start_time = Instant::now();
        let layout = OutputLayout::for_image(output_root, container_path.as_ref());
        layout.create_dirs()?;

        let pool = self.make_pool();
        let notifier = self.params.progress_notifier.clone();
        notifier.set_stage(Stage::ContainerFrame.name());
        let frames = container::recover_frames(
            &pool,
            container_path.as_ref(),
            &layout.examination_dir(),
            None,
            notifier.clone(),
        )?;

        let reference = frames
            .iter()
            .find_map(|(_, frame)| frame.as_ref().ok())
            .map(|frame| frame.checksum().to_owned());
        match &reference {
            Some(checksum) => info!("Reference checksum: {}", checksum),
            None => warn!("No frame of {} could be decoded", container_path.as_ref().display()),
        }

        let (frame_report, recovered) =
            container::verify_frames(frames, reference.as_deref().unwrap_or_default());
        log_stage(&frame_report);
        let records: Vec<Record> = recovered.into_iter().flatten().collect();

        notifier.set_stage(Stage::RecordSet.name());
        let line_width = self.params.line_width.unwrap_or(DEFAULT_LINE_WIDTH);
        let reconstructed_path =
            layout.reconstructed_path(&format!("{}.fasta", layout.prefix()));
        let record_set_report = Self::check_record_set(
            &records,
            &reconstructed_path,
            reference.as_deref(),
            line_width,
        )?;

        let summary = QcSummary::new(
            vec![frame_report, record_set_report],
            records,
            reconstructed_path,
        );
        Self::log_summary(&summary, start_time);
        Ok(summary)
    }

    fn make_pool(&self) -> WorkerPool<QcError> {
        let pool = WorkerPool::new(self.params.thread_num, WORKER_THREAD_NAME);
        if pool.is_foreground() {
            debug!("Running checks in the calling thread");
        } else {
            debug!("Running checks on {} threads", self.params.thread_num);
        }

        pool
    }

    fn check_record_set(
        records: &[Record],
        path: &Path,
        expected_checksum: Option<&str>,
        line_width: usize,
    ) -> QcResult<StageReport> {
        let status = match expected_checksum {
            Some(expected) if !records.is_empty() => {
                record_set::check_record_set(records, path, expected, line_width)?
            }
            _ => ItemStatus::NoRecords,
        };

        let report = StageReport::new(Stage::RecordSet, vec![ItemReport::new(0, path, status)]);
        log_stage(&report);
        Ok(report)
    }

    fn log_summary(summary: &QcSummary, start_time: Instant) {
        let bytes = std::fs::metadata(summary.reconstructed_path())
            .map_or(ByteNum::ZERO, |metadata| ByteNum::new(metadata.len() as usize));

        if summary.is_success() {
            info!("{}: {}", summary, format_stats(start_time, bytes));
        } else {
            warn!("{}", summary);
        }
    }
}

impl Default for QcPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn log_stage(report: &StageReport) {
    for item in report.items() {
        item.log(report.stage());
    }

    if report.is_success() {
        info!("{}", report);
    } else {
        warn!("{} ({} failed)", report, report.failed_count());
    }
}
