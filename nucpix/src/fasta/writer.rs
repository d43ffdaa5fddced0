use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

use crate::fasta::{DEFAULT_LINE_WIDTH, FASTA_TITLE_PREFIX};
use crate::sequence::Record;

#[derive(Debug)]
pub enum FastaWriterError {
    IoError(std::io::Error),
}

impl From<std::io::Error> for FastaWriterError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for FastaWriterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FastaWriterError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl Error for FastaWriterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FastaWriterError::IoError(e) => Some(e),
        }
    }
}

pub type FastaWriteResult<T> = Result<T, FastaWriterError>;

#[derive(Debug, Clone)]
pub struct FastaWriterParams {
    line_width: usize,
}

impl FastaWriterParams {
    #[must_use]
    pub fn builder() -> FastaWriterParamsBuilder {
        FastaWriterParamsBuilder::new()
    }
}

impl Default for FastaWriterParams {
    fn default() -> Self {
        FastaWriterParamsBuilder::default().build()
    }
}

#[derive(Debug, Clone)]
pub struct FastaWriterParamsBuilder {
    line_width: usize,
}

impl FastaWriterParamsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    /// Sets the maximum length of a sequence line. 0 writes every sequence
    /// on a single line.
    pub fn line_width(&mut self, line_width: usize) -> &mut Self {
        let mut new = self;
        new.line_width = line_width;
        new
    }

    #[must_use]
    pub fn build(&self) -> FastaWriterParams {
        FastaWriterParams {
            line_width: self.line_width,
        }
    }
}

impl Default for FastaWriterParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct FastaWriter<W> {
    writer: W,
    params: FastaWriterParams,
}

impl<W: Write> FastaWriter<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self::with_params(writer, FastaWriterParams::default())
    }

    #[must_use]
    pub fn with_params(writer: W, params: FastaWriterParams) -> Self {
        Self { writer, params }
    }

    pub fn write_record(&mut self, record: &Record) -> FastaWriteResult<()> {
        writeln!(&mut self.writer, "{}{}", FASTA_TITLE_PREFIX, record.title())?;

        let sequence = record.sequence().as_bytes();
        if self.params.line_width == 0 {
            if !sequence.is_empty() {
                self.writer.write_all(sequence)?;
                writeln!(&mut self.writer)?;
            }
            return Ok(());
        }

        for line in sequence.chunks(self.params.line_width) {
            self.writer.write_all(line)?;
            writeln!(&mut self.writer)?;
        }

        Ok(())
    }

    pub fn write_records<'a, I>(&mut self, records: I) -> FastaWriteResult<()>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        for record in records {
            self.write_record(record)?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> FastaWriteResult<()> {
        self.writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::io::ErrorKind::NotFound;

    use crate::_internal_test_data::{MULTI_RECORD_FASTA, MULTI_RECORD_FASTA_STR};
    use crate::fasta::writer::{FastaWriter, FastaWriterError, FastaWriterParams};
    use crate::sequence::Record;

    #[test]
    fn test_write_multiple_records() {
        let mut buf = Vec::new();
        FastaWriter::new(&mut buf)
            .write_records(MULTI_RECORD_FASTA.iter())
            .unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), MULTI_RECORD_FASTA_STR);
    }

    #[test]
    fn test_write_line_width() {
        let record = Record::new("seq1", "Some organism", "ACGTACGTAC");
        let params = FastaWriterParams::builder().line_width(4).build();

        let mut buf = Vec::new();
        FastaWriter::with_params(&mut buf, params)
            .write_record(&record)
            .unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            ">seq1 Some organism\nACGT\nACGT\nAC\n"
        );
    }

    #[test]
    fn test_write_single_line() {
        let record = Record::new("seq1", "", "ACGTACGTAC");
        let params = FastaWriterParams::builder().line_width(0).build();

        let mut buf = Vec::new();
        FastaWriter::with_params(&mut buf, params)
            .write_record(&record)
            .unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), ">seq1\nACGTACGTAC\n");
    }

    #[test]
    fn test_write_empty_sequence() {
        let mut buf = Vec::new();
        FastaWriter::new(&mut buf)
            .write_record(&Record::new("empty", "", ""))
            .unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), ">empty\n");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", FastaWriterError::from(std::io::Error::from(NotFound))),
            "IO error: entity not found"
        )
    }

    #[test]
    fn test_error_source() {
        assert!(FastaWriterError::from(std::io::Error::from(NotFound))
            .source()
            .is_some());
    }
}
