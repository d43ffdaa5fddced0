use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use itertools::Itertools;
use log::{debug, error, info, warn};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::bits::Bits;
use crate::carrier::container::{write_container, write_preview, DEFAULT_FRAME_DELAY_MS};
use crate::carrier::embed::embed_in_window;
use crate::carrier::image_store::{load_rgba, pad_centered, quantize, save_rgba};
use crate::carrier::layout::{CarrierSize, FrameWindow};
use crate::carrier::{CarrierError, CarrierResult};
use crate::checksum::md5_hex_file;
use crate::fasta::reader::{FastaReader, FastaReaderError};
use crate::frame::{encode_record, FrameError};
use crate::progress::{format_stats, ByteNum, DummyProgressNotifier, ProgressNotifier};
use crate::sequence::Record;

const ENCODE_STAGE: &str = "encoding";
const WRITE_STILLS_STAGE: &str = "writing stills";

/// Error occurring when encoding a FASTA file into carrier images.
#[derive(Debug)]
pub enum EncoderError {
    /// I/O error occurred when reading the input or writing the output.
    IoError(std::io::Error),
    /// The FASTA file could not be parsed.
    FastaError(FastaReaderError),
    /// The carrier images could not be created.
    CarrierError(CarrierError),
    /// None of the records could be encoded.
    NoRecords,
}

impl From<std::io::Error> for EncoderError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<FastaReaderError> for EncoderError {
    fn from(e: FastaReaderError) -> Self {
        Self::FastaError(e)
    }
}

impl From<CarrierError> for EncoderError {
    fn from(e: CarrierError) -> Self {
        Self::CarrierError(e)
    }
}

impl Display for EncoderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EncoderError::IoError(e) => write!(f, "IO error: {}", e),
            EncoderError::FastaError(e) => write!(f, "FASTA error: {}", e),
            EncoderError::CarrierError(e) => write!(f, "Carrier error: {}", e),
            EncoderError::NoRecords => write!(f, "No record could be encoded"),
        }
    }
}

impl Error for EncoderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EncoderError::IoError(e) => Some(e),
            EncoderError::FastaError(e) => Some(e),
            EncoderError::CarrierError(e) => Some(e),
            EncoderError::NoRecords => None,
        }
    }
}

/// The result of encoding.
pub type EncoderResult<T> = Result<T, EncoderError>;

/// Paths of every file produced for one carrier image.
///
/// Everything lives in `<root>/<prefix>/`: the resized carrier, the stills
/// and the container in `output/`, the files recovered during verification
/// in `examination/`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OutputLayout {
    base_dir: PathBuf,
    prefix: String,
}

impl OutputLayout {
    const OUTPUT_DIR_NAME: &'static str = "output";
    const EXAMINATION_DIR_NAME: &'static str = "examination";

    #[must_use]
    pub fn new<P: AsRef<Path>, S: Into<String>>(root: P, prefix: S) -> Self {
        let prefix = prefix.into();

        Self {
            base_dir: root.as_ref().join(&prefix),
            prefix,
        }
    }

    /// Creates the layout named after the carrier image file.
    #[must_use]
    pub fn for_image<P: AsRef<Path>, Q: AsRef<Path>>(root: P, image_path: Q) -> Self {
        let prefix = image_path
            .as_ref()
            .file_stem()
            .map_or_else(|| "carrier".to_owned(), |stem| stem.to_string_lossy().into_owned());

        Self::new(root, prefix)
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(Self::OUTPUT_DIR_NAME)
    }

    #[must_use]
    pub fn examination_dir(&self) -> PathBuf {
        self.base_dir.join(Self::EXAMINATION_DIR_NAME)
    }

    /// The resized carrier without any frame embedded.
    #[must_use]
    pub fn baseline_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}.png", self.prefix))
    }

    /// The still holding the `number`-th (1-indexed) encoded record.
    #[must_use]
    pub fn still_path(&self, number: usize) -> PathBuf {
        self.output_dir()
            .join(format!("{}_chrom_{}.png", self.prefix, number))
    }

    #[must_use]
    pub fn container_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}.apng", self.prefix))
    }

    #[must_use]
    pub fn preview_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}.gif", self.prefix))
    }

    /// Where the FASTA file with given name is reconstructed.
    #[must_use]
    pub fn reconstructed_path(&self, file_name: &str) -> PathBuf {
        self.examination_dir().join(file_name)
    }

    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.output_dir())?;
        std::fs::create_dir_all(self.examination_dir())?;

        Ok(())
    }
}

/// A record that was embedded in a still.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EncodedRecord {
    /// Position of the record in the source file.
    pub index: usize,
    pub record: Record,
    pub window: FrameWindow,
    pub still_path: PathBuf,
}

/// A record that could not be encoded.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SkippedRecord {
    pub index: usize,
    pub identifier: String,
    pub error: FrameError,
}

/// Everything produced by a single encode run.
#[derive(Debug, Clone)]
pub struct EncodedSet {
    layout: OutputLayout,
    fasta_path: PathBuf,
    checksum: String,
    line_width: usize,
    carrier_size: CarrierSize,
    records: Vec<EncodedRecord>,
    skipped: Vec<SkippedRecord>,
}

impl EncodedSet {
    #[must_use]
    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    #[must_use]
    pub fn fasta_path(&self) -> &Path {
        &self.fasta_path
    }

    /// File name of the source FASTA file.
    #[must_use]
    pub fn fasta_name(&self) -> String {
        self.fasta_path
            .file_name()
            .map_or_else(|| "records.fasta".to_owned(), |name| name.to_string_lossy().into_owned())
    }

    /// Checksum of the source FASTA file, embedded in every frame.
    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Longest sequence line of the source FASTA file.
    #[must_use]
    pub fn line_width(&self) -> usize {
        self.line_width
    }

    #[must_use]
    pub fn carrier_size(&self) -> CarrierSize {
        self.carrier_size
    }

    #[must_use]
    pub fn records(&self) -> &[EncodedRecord] {
        &self.records
    }

    #[must_use]
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    /// Frame windows, in container frame order (excluding the baseline).
    #[must_use]
    pub fn windows(&self) -> Vec<FrameWindow> {
        self.records.iter().map(|record| record.window).collect()
    }
}

#[derive(Debug, Clone)]
pub struct EncoderParams {
    quantize: bool,
    frame_delay_ms: u16,
    preview: bool,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl EncoderParams {
    #[must_use]
    pub fn builder() -> EncoderParamsBuilder {
        EncoderParamsBuilder::new()
    }
}

impl Default for EncoderParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct EncoderParamsBuilder {
    quantize: bool,
    frame_delay_ms: u16,
    preview: bool,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl EncoderParamsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            quantize: true,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            preview: false,
            progress_notifier: Arc::new(DummyProgressNotifier),
        }
    }

    /// Reduces the carrier image to a 256 colour palette before embedding.
    pub fn quantize(&mut self, quantize: bool) -> &mut Self {
        let mut new = self;
        new.quantize = quantize;
        new
    }

    pub fn frame_delay_ms(&mut self, frame_delay_ms: u16) -> &mut Self {
        let mut new = self;
        new.frame_delay_ms = frame_delay_ms;
        new
    }

    /// Writes an animated GIF preview of the container.
    pub fn preview(&mut self, preview: bool) -> &mut Self {
        let mut new = self;
        new.preview = preview;
        new
    }

    pub fn progress_notifier(&mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> &mut Self {
        let mut new = self;
        new.progress_notifier = progress_notifier;
        new
    }

    #[must_use]
    pub fn build(&self) -> EncoderParams {
        EncoderParams {
            quantize: self.quantize,
            frame_delay_ms: self.frame_delay_ms,
            preview: self.preview,
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for EncoderParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct FastaContents {
    records: Vec<Record>,
    line_width: usize,
    bytes_read: ByteNum,
}

fn read_fasta(path: &Path) -> EncoderResult<FastaContents> {
    let file = BufReader::new(File::open(path)?);
    let mut iter = FastaReader::new(file).into_iter();
    let records = iter.by_ref().collect::<Result<Vec<_>, _>>()?;

    Ok(FastaContents {
        records,
        line_width: iter.line_width(),
        bytes_read: iter.bytes_read(),
    })
}

/// Embeds every record of a FASTA file into its own copy of a carrier image.
#[derive(Debug)]
pub struct NucImgEncoder {
    params: EncoderParams,
}

impl NucImgEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(EncoderParams::default())
    }

    #[must_use]
    pub fn with_params(params: EncoderParams) -> Self {
        Self { params }
    }

    /// Encodes the records of `fasta_path` into the image at `image_path`,
    /// writing the results under `output_root`.
    pub fn encode<P, Q, R>(
        &self,
        fasta_path: P,
        image_path: Q,
        output_root: R,
    ) -> EncoderResult<EncodedSet>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        let start_time = Instant::now();
        let fasta_path = fasta_path.as_ref();
        self.params.progress_notifier.set_stage(ENCODE_STAGE);

        let checksum = md5_hex_file(fasta_path)?;
        let fasta = read_fasta(fasta_path)?;
        info!(
            "Read {} records from {} (MD5 {})",
            fasta.records.len(),
            fasta_path.display(),
            checksum
        );

        let (frames, skipped) = Self::build_frames(&fasta.records, &checksum);
        if !skipped.is_empty() {
            warn!(
                "Skipped {} records: {}",
                skipped.len(),
                skipped.iter().map(|record| &record.identifier).join(", ")
            );
        }
        if frames.is_empty() {
            return Err(EncoderError::NoRecords);
        }

        let layout = OutputLayout::for_image(output_root, image_path.as_ref());
        layout.create_dirs()?;

        let baseline = self.prepare_carrier(image_path.as_ref(), &frames)?;
        save_rgba(&baseline, layout.baseline_path())?;

        let records = Self::place_frames(&fasta.records, &frames, &baseline, &layout)?;
        self.write_stills(&baseline, &frames, &records, &layout)?;

        info!(
            "Encoded {} records ({} skipped): {}",
            records.len(),
            skipped.len(),
            format_stats(start_time, fasta.bytes_read)
        );

        Ok(EncodedSet {
            layout,
            fasta_path: fasta_path.to_owned(),
            checksum,
            line_width: fasta.line_width,
            carrier_size: CarrierSize::new(baseline.width(), baseline.height()),
            records,
            skipped,
        })
    }

    fn build_frames(records: &[Record], checksum: &str) -> (Vec<(usize, Bits)>, Vec<SkippedRecord>) {
        let results: Vec<_> = records
            .par_iter()
            .map(|record| encode_record(record, checksum))
            .collect();

        let mut frames = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        for (index, (record, result)) in records.iter().zip(results).enumerate() {
            match result {
                Ok(bits) => {
                    debug!("Record {}: {} frame bits", record, bits.len());
                    frames.push((index, bits));
                }
                Err(e) => {
                    error!("Skipping record {}: {}", record, e);
                    if let Some(source) = e.source() {
                        error!("Caused by: {}", source);
                    }
                    skipped.push(SkippedRecord {
                        index,
                        identifier: record.identifier().to_owned(),
                        error: e,
                    });
                }
            }
        }

        (frames, skipped)
    }

    fn prepare_carrier(
        &self,
        image_path: &Path,
        frames: &[(usize, Bits)],
    ) -> CarrierResult<image::RgbaImage> {
        let mut image = load_rgba(image_path)?;
        if self.params.quantize {
            image = quantize(&image);
        }

        let size = CarrierSize::for_frames(
            image.width(),
            image.height(),
            frames.iter().map(|(_, bits)| bits.len()),
        );
        info!(
            "Carrier {}: {}x{} -> {}x{}",
            image_path.display(),
            image.width(),
            image.height(),
            size.width,
            size.height
        );

        Ok(pad_centered(&image, size))
    }

    fn place_frames(
        records: &[Record],
        frames: &[(usize, Bits)],
        baseline: &image::RgbaImage,
        layout: &OutputLayout,
    ) -> CarrierResult<Vec<EncodedRecord>> {
        frames
            .iter()
            .enumerate()
            .map(|(position, (index, bits))| {
                let window = FrameWindow::new(bits.len(), baseline.width(), baseline.height())?;
                Ok(EncodedRecord {
                    index: *index,
                    record: records[*index].clone(),
                    window,
                    still_path: layout.still_path(position + 1),
                })
            })
            .collect()
    }

    fn write_stills(
        &self,
        baseline: &image::RgbaImage,
        frames: &[(usize, Bits)],
        records: &[EncodedRecord],
        layout: &OutputLayout,
    ) -> CarrierResult<()> {
        let notifier = &self.params.progress_notifier;
        notifier.set_stage(WRITE_STILLS_STAGE);
        notifier.set_iter_num(records.len() as u64);

        let jobs: Vec<_> = frames.iter().zip(records).collect();
        let stills = jobs
            .par_iter()
            .map(|((_, bits), record)| {
                let still = embed_in_window(baseline, record.window, bits)?;
                save_rgba(&still, &record.still_path)?;
                notifier.inc_iter();
                Ok(still)
            })
            .collect::<CarrierResult<Vec<_>>>()?;

        let mut container_frames = Vec::with_capacity(stills.len() + 1);
        container_frames.push(baseline.clone());
        container_frames.extend(stills);

        write_container(
            layout.container_path(),
            &container_frames,
            self.params.frame_delay_ms,
        )?;
        if self.params.preview {
            write_preview(
                layout.preview_path(),
                &container_frames,
                self.params.frame_delay_ms,
            )?;
        }

        Ok(())
    }
}

impl Default for NucImgEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::tempdir;

    use crate::_internal_test_data::{test_image, MULTI_RECORD_FASTA_STR};
    use crate::carrier::container::read_container;
    use crate::carrier::image_store::{load_rgba, save_rgba};
    use crate::carrier::layout::frame_side;
    use crate::checksum::md5_hex_bytes;
    use crate::encoder::{EncoderError, EncoderParams, NucImgEncoder, OutputLayout};
    use crate::frame::FrameError;
    use crate::symbol::SymbolError;

    fn write_inputs(dir: &Path, fasta: &str, image_size: u32) {
        fs::write(dir.join("genome.fasta"), fasta).unwrap();
        save_rgba(&test_image(image_size, image_size), dir.join("organism.png")).unwrap();
    }

    #[test]
    fn test_output_layout() {
        let layout = OutputLayout::for_image("/data", "/images/organism.png");

        assert_eq!(layout.prefix(), "organism");
        assert_eq!(
            layout.baseline_path(),
            Path::new("/data/organism/output/organism.png")
        );
        assert_eq!(
            layout.still_path(12),
            Path::new("/data/organism/output/organism_chrom_12.png")
        );
        assert_eq!(
            layout.container_path(),
            Path::new("/data/organism/output/organism.apng")
        );
        assert_eq!(
            layout.reconstructed_path("genome.fasta"),
            Path::new("/data/organism/examination/genome.fasta")
        );
    }

    #[test]
    fn test_encode() {
        let dir = tempdir().unwrap();
        write_inputs(dir.path(), MULTI_RECORD_FASTA_STR, 8);

        let params = EncoderParams::builder().quantize(false).build();
        let encoded = NucImgEncoder::with_params(params)
            .encode(
                dir.path().join("genome.fasta"),
                dir.path().join("organism.png"),
                dir.path(),
            )
            .unwrap();

        assert_eq!(encoded.records().len(), 3);
        assert!(encoded.skipped().is_empty());
        assert_eq!(encoded.checksum(), md5_hex_bytes(MULTI_RECORD_FASTA_STR.as_bytes()));
        assert_eq!(encoded.line_width(), 60);

        let size = encoded.carrier_size();
        assert_eq!(size.width, size.height);
        assert!(size.width > 8);
        assert_eq!(encoded.records()[0].window.side(), size.width);

        let baseline = load_rgba(encoded.layout().baseline_path()).unwrap();
        assert_eq!(baseline.dimensions(), size.dimensions());

        let container = read_container(encoded.layout().container_path()).unwrap();
        assert_eq!(container.len(), 4);
        assert_eq!(container[0], baseline);
        for (record, frame) in encoded.records().iter().zip(&container[1..]) {
            assert_eq!(&load_rgba(&record.still_path).unwrap(), frame);
        }
    }

    #[test]
    fn test_encode_skips_invalid_records() {
        let dir = tempdir().unwrap();
        let fasta = ">bad1\nACGTX\n>good\nACGTN\n>bad2\nACGT\n";
        write_inputs(dir.path(), fasta, 32);

        let encoded = NucImgEncoder::new()
            .encode(
                dir.path().join("genome.fasta"),
                dir.path().join("organism.png"),
                dir.path(),
            )
            .unwrap();

        assert_eq!(encoded.records().len(), 1);
        assert_eq!(encoded.records()[0].index, 1);
        assert_eq!(
            encoded.records()[0].still_path,
            encoded.layout().still_path(1)
        );
        assert_eq!(encoded.skipped().len(), 2);
        assert!(matches!(
            encoded.skipped()[0].error,
            FrameError::Symbol(SymbolError::UnknownAlphabet(_))
        ));
        // the carrier is never shrunk
        assert_eq!(encoded.carrier_size().dimensions(), (32, 32));
        assert_eq!(
            encoded.records()[0].window.side(),
            frame_side(encoded.records()[0].window.capacity_bits())
        );
    }

    #[test]
    fn test_encode_no_records() {
        let dir = tempdir().unwrap();
        write_inputs(dir.path(), ">bad\nACGT\n", 8);

        let result = NucImgEncoder::new().encode(
            dir.path().join("genome.fasta"),
            dir.path().join("organism.png"),
            dir.path(),
        );

        assert!(matches!(result, Err(EncoderError::NoRecords)));
    }

    #[test]
    fn test_encode_missing_fasta() {
        let dir = tempdir().unwrap();

        let result = NucImgEncoder::new().encode(
            dir.path().join("missing.fasta"),
            dir.path().join("organism.png"),
            dir.path(),
        );

        assert!(matches!(result, Err(EncoderError::IoError(_))));
    }
}
