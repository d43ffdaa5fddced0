use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::BufRead;

use crate::fasta::FASTA_TITLE_PREFIX;
use crate::progress::ByteNum;
use crate::sequence::Record;

/// Error occurring during parsing a FASTA file.
#[derive(Debug)]
pub enum FastaReaderError {
    /// I/O error occurred when reading the FASTA file.
    IoError(std::io::Error),
    /// End-Of-File reached before the next record.
    EofReached,
    /// Sequence data found before the first header line.
    MissingHeader(usize),
    /// A line is not valid UTF-8.
    InvalidEncoding(usize),
}

impl From<std::io::Error> for FastaReaderError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for FastaReaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FastaReaderError::IoError(e) => write!(f, "IO error: {}", e),
            FastaReaderError::EofReached => write!(f, "Reached the end of file"),
            FastaReaderError::MissingHeader(line) => {
                write!(f, "Sequence data without a header at line {}", line)
            }
            FastaReaderError::InvalidEncoding(line) => {
                write!(f, "Invalid UTF-8 at line {}", line)
            }
        }
    }
}

impl Error for FastaReaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FastaReaderError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

/// The result of a FASTA reading operation.
pub type FastaResult<T> = Result<T, FastaReaderError>;

/// FASTA format reader deserializing the records into [`Record`] objects.
///
/// Sequence lines are concatenated with whitespace removed. The reader keeps
/// track of the longest sequence line, which is the line width the file was
/// written with.
#[derive(Debug)]
pub struct FastaReader<R> {
    reader: R,
    buffer: Vec<u8>,
    pending_title: Option<String>,
    line_num: usize,
    line_width: usize,
    bytes_read: ByteNum,
}

impl<R: BufRead> FastaReader<R> {
    /// Creates new `FastaReader` instance.
    ///
    /// # Examples
    /// ```
    /// use nucpix::fasta::reader::FastaReader;
    ///
    /// let mut reader = FastaReader::new(">seq1 Example\nACGT\nNN\n".as_bytes());
    /// let record = reader.read_record().unwrap();
    /// assert_eq!(record.identifier(), "seq1");
    /// assert_eq!(record.sequence(), "ACGTNN");
    /// assert_eq!(reader.line_width(), 4);
    /// ```
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(4096),
            pending_title: None,
            line_num: 0,
            line_width: 0,
            bytes_read: ByteNum::ZERO,
        }
    }

    /// Returns the length of the longest sequence line read so far.
    #[must_use]
    pub fn line_width(&self) -> usize {
        self.line_width
    }

    /// Returns the number of bytes consumed so far.
    #[must_use]
    pub fn bytes_read(&self) -> ByteNum {
        self.bytes_read
    }

    /// Reads a single record.
    pub fn read_record(&mut self) -> FastaResult<Record> {
        let title = match self.pending_title.take() {
            Some(title) => title,
            None => self.parse_title()?,
        };

        let mut sequence = String::new();
        while let Some(line) = Self::read_line(
            &mut self.reader,
            &mut self.buffer,
            &mut self.line_num,
            &mut self.bytes_read,
        )? {
            if let Some(title) = line.strip_prefix(FASTA_TITLE_PREFIX) {
                self.pending_title = Some(title.trim_end().to_owned());
                break;
            }

            let line: String = line.split_whitespace().collect();
            self.line_width = self.line_width.max(line.len());
            sequence.push_str(&line);
        }

        Ok(Record::from_title(&title, sequence))
    }

    fn parse_title(&mut self) -> FastaResult<String> {
        loop {
            let line = Self::read_line(
                &mut self.reader,
                &mut self.buffer,
                &mut self.line_num,
                &mut self.bytes_read,
            )?
            .ok_or(FastaReaderError::EofReached)?;
            if line.trim().is_empty() {
                continue;
            }

            return match line.strip_prefix(FASTA_TITLE_PREFIX) {
                Some(title) => Ok(title.trim_end().to_owned()),
                None => Err(FastaReaderError::MissingHeader(self.line_num)),
            };
        }
    }

    fn read_line<'a, T: BufRead>(
        mut buf_reader: T,
        buffer: &'a mut Vec<u8>,
        line_num: &mut usize,
        total_bytes_read: &mut ByteNum,
    ) -> FastaResult<Option<&'a str>> {
        buffer.clear();
        let bytes_read = buf_reader.read_until(b'\n', buffer)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        *line_num += 1;
        *total_bytes_read += ByteNum::new(bytes_read);

        let line = std::str::from_utf8(buffer)
            .map_err(|_| FastaReaderError::InvalidEncoding(*line_num))?;
        Ok(Some(line.trim_end_matches(&['\n', '\r'][..])))
    }
}

impl<R: BufRead> IntoIterator for FastaReader<R> {
    type Item = FastaResult<Record>;
    type IntoIter = FastaReaderIterator<R>;

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            reader: self,
            no_errors: true,
        }
    }
}

/// Iterator implementation for [`FastaReader`] which iterates over all
/// records in a file.
#[derive(Debug)]
pub struct FastaReaderIterator<R> {
    reader: FastaReader<R>,
    no_errors: bool,
}

impl<R> FastaReaderIterator<R> {
    /// Returns the length of the longest sequence line read so far.
    #[must_use]
    pub fn line_width(&self) -> usize {
        self.reader.line_width
    }

    #[must_use]
    pub fn bytes_read(&self) -> ByteNum {
        self.reader.bytes_read
    }
}

impl<R: BufRead> Iterator for FastaReaderIterator<R> {
    type Item = FastaResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.no_errors {
            return None;
        }

        let result = self.reader.read_record();
        if result.is_err() {
            self.no_errors = false;
            if matches!(result, Err(FastaReaderError::EofReached)) {
                return None;
            }
        }
        Some(result)
    }
}
