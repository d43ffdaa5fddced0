use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::bits::{read_bits, Bits};
use crate::sequence::{EncodingKey, NucleotideType, Record};
use crate::symbol::{resolve_encoding, restore_uracil, SymbolError, SymbolTable};

/// Character separating the metadata fields of a frame.
pub const FRAME_DELIMITER: char = '<';
const FRAME_DELIMITER_BYTE: u8 = FRAME_DELIMITER as u8;

pub const ASCII_CODE_BITS: usize = 8;
pub const TETRA_CODE_BITS: usize = 4;
/// Length of an all-zero run treated as carrier padding (3 RGBA pixels).
pub const PADDING_GROUP_BITS: usize = 12;

const FRAME_PARTS: usize = 5;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FrameError {
    MalformedBitstring(String),
    InvalidCode { code: u8, position: usize },
    FrameTruncated { parts: usize },
    DelimiterInField(String),
    UnknownNucleotideType(String),
    UnknownEncodingKey(String),
    /// Padding found inside the payload, at given symbol position.
    PaddingInPayload { position: usize },
    /// The frame does not fill the window it was read from.
    WindowMismatch { window_side: u32, frame_side: u32 },
    Symbol(SymbolError),
}

impl Display for FrameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::MalformedBitstring(message) => {
                write!(f, "Malformed bitstring: {}", message)
            }
            FrameError::InvalidCode { code, position } => {
                write!(f, "Invalid code {:04b} at bit {}", code, position)
            }
            FrameError::FrameTruncated { parts } => write!(
                f,
                "Frame truncated: found {} of {} parts",
                parts, FRAME_PARTS
            ),
            FrameError::DelimiterInField(field) => write!(
                f,
                "Field contains the frame delimiter `{}`: `{}`",
                FRAME_DELIMITER, field
            ),
            FrameError::UnknownNucleotideType(name) => {
                write!(f, "Unknown nucleotide type: `{}`", name)
            }
            FrameError::UnknownEncodingKey(name) => write!(f, "Unknown encoding key: `{}`", name),
            FrameError::PaddingInPayload { position } => {
                write!(f, "Padding inside the payload at symbol {}", position)
            }
            FrameError::WindowMismatch {
                window_side,
                frame_side,
            } => write!(
                f,
                "Frame of side {} read from a window of side {}",
                frame_side, window_side
            ),
            FrameError::Symbol(_) => write!(f, "Could not encode the sequence"),
        }
    }
}

impl Error for FrameError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FrameError::Symbol(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SymbolError> for FrameError {
    fn from(e: SymbolError) -> Self {
        Self::Symbol(e)
    }
}

pub type FrameResult<T> = Result<T, FrameError>;

/// Encodes every byte of the text as 8 bits, most significant bit first.
///
/// # Examples
/// ```
/// use nucpix::frame::ascii_encode;
///
/// assert_eq!(ascii_encode("<").to_string(), "00111100");
/// ```
#[must_use]
pub fn ascii_encode(text: &str) -> Bits {
    let mut bits = Bits::with_capacity(text.len() * ASCII_CODE_BITS);
    for byte in text.bytes() {
        bits.push_bits(byte, ASCII_CODE_BITS);
    }

    bits
}

/// Decodes 8-bit groups back into text.
///
/// Fails if the length is not a multiple of 8, if the bytes are not valid
/// UTF-8 or if any byte is a control character other than tab.
pub fn ascii_decode(bits: &[bool]) -> FrameResult<String> {
    if bits.len() % ASCII_CODE_BITS != 0 {
        return Err(FrameError::MalformedBitstring(format!(
            "length {} is not a multiple of {}",
            bits.len(),
            ASCII_CODE_BITS
        )));
    }

    let bytes: Vec<u8> = (0..bits.len())
        .step_by(ASCII_CODE_BITS)
        .map(|start| read_bits(bits, start, ASCII_CODE_BITS))
        .collect();
    if let Some(&byte) = bytes
        .iter()
        .find(|&&byte| (byte < 0x20 && byte != b'\t') || byte == 0x7F)
    {
        return Err(FrameError::MalformedBitstring(format!(
            "unprintable byte {:#04x}",
            byte
        )));
    }

    String::from_utf8(bytes)
        .map_err(|e| FrameError::MalformedBitstring(format!("invalid UTF-8: {}", e)))
}

/// Encodes every symbol of the sequence as its 4-bit code in `table`.
pub fn tetra_encode(sequence: &str, table: &SymbolTable) -> Result<Bits, SymbolError> {
    let mut bits = Bits::with_capacity(sequence.len() * TETRA_CODE_BITS);
    for symbol in sequence.chars() {
        let code = table
            .encode(symbol)
            .ok_or_else(|| SymbolError::invalid_symbol(symbol, sequence))?;
        bits.push_bits(code, TETRA_CODE_BITS);
    }

    Ok(bits)
}

/// Decodes 4-bit groups into the canonical symbols of `table`.
pub fn tetra_decode(bits: &[bool], table: &SymbolTable) -> FrameResult<String> {
    if bits.len() % TETRA_CODE_BITS != 0 {
        return Err(FrameError::MalformedBitstring(format!(
            "length {} is not a multiple of {}",
            bits.len(),
            TETRA_CODE_BITS
        )));
    }

    (0..bits.len())
        .step_by(TETRA_CODE_BITS)
        .map(|position| {
            let code = read_bits(bits, position, TETRA_CODE_BITS);
            table
                .decode(code)
                .ok_or(FrameError::InvalidCode { code, position })
        })
        .collect()
}

/// The decoded content of a single frame.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Frame {
    title: String,
    checksum: String,
    nucleotide_type: NucleotideType,
    encoding_key: EncodingKey,
    sequence: String,
}

impl Frame {
    #[must_use]
    pub fn new<T: Into<String>, U: Into<String>, V: Into<String>>(
        title: T,
        checksum: U,
        nucleotide_type: NucleotideType,
        encoding_key: EncodingKey,
        sequence: V,
    ) -> Self {
        Self {
            title: title.into(),
            checksum: checksum.into(),
            nucleotide_type,
            encoding_key,
            sequence: sequence.into(),
        }
    }

    /// The header line of the record (identifier and description).
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Checksum of the source file the record was read from.
    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    #[must_use]
    pub fn nucleotide_type(&self) -> NucleotideType {
        self.nucleotide_type
    }

    #[must_use]
    pub fn encoding_key(&self) -> EncodingKey {
        self.encoding_key
    }

    /// The decoded sequence. May end with padding spaces when the frame was
    /// recovered from a carrier.
    #[must_use]
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Returns the length of the bitstring this frame was built from, not
    /// counting the padding at the end of the sequence.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let field_bytes = self.title.len()
            + self.checksum.len()
            + self.nucleotide_type.name().len()
            + self.encoding_key.name().len();
        let symbols = self.sequence.trim_end_matches(' ').len();

        (field_bytes + FRAME_PARTS - 1) * ASCII_CODE_BITS + symbols * TETRA_CODE_BITS
    }

    /// Fails if a padding space is followed by a symbol. Sequences are read
    /// with whitespace removed, so this means the bits were read out of
    /// order.
    pub fn check_payload(&self) -> FrameResult<()> {
        match self.sequence.trim_end_matches(' ').find(' ') {
            Some(position) => Err(FrameError::PaddingInPayload { position }),
            None => Ok(()),
        }
    }

    /// Converts the frame into a record, dropping padding spaces from the end
    /// of the sequence.
    #[must_use]
    pub fn into_record(self) -> Record {
        let sequence = self.sequence.trim_end_matches(' ');
        Record::from_title(&self.title, sequence)
    }
}

fn check_field(field: &str) -> FrameResult<()> {
    if field.contains(FRAME_DELIMITER) {
        Err(FrameError::DelimiterInField(field.to_owned()))
    } else {
        Ok(())
    }
}

/// Builds the frame bitstring of a record.
///
/// The layout is `title < checksum < nucleotide type < encoding key <`,
/// ASCII-coded, followed by the tetra-coded sequence.
pub fn build_frame(
    record: &Record,
    checksum: &str,
    nucleotide_type: NucleotideType,
    encoding_key: EncodingKey,
) -> FrameResult<Bits> {
    let title = record.title();
    check_field(&title)?;
    check_field(checksum)?;

    let delimiter = ascii_encode(&FRAME_DELIMITER.to_string());
    let payload = tetra_encode(record.sequence(), SymbolTable::for_key(encoding_key))?;

    let mut bits = Bits::new();
    for field in [
        title.as_str(),
        checksum,
        nucleotide_type.name(),
        encoding_key.name(),
    ] {
        bits.extend_from_bits(&ascii_encode(field));
        bits.extend_from_bits(&delimiter);
    }
    bits.extend_from_bits(&payload);

    Ok(bits)
}

/// Chooses the symbol table for a record and builds its frame.
///
/// # Examples
/// ```
/// use nucpix::frame::{encode_record, parse_frame};
/// use nucpix::sequence::Record;
///
/// let record = Record::new("seq1", "", "uaCGUAcg");
/// let bits = encode_record(&record, "abc123").unwrap();
/// let frame = parse_frame(&bits).unwrap();
/// assert_eq!(frame.into_record(), record);
/// ```
pub fn encode_record(record: &Record, checksum: &str) -> FrameResult<Bits> {
    let (encoding_key, nucleotide_type) = resolve_encoding(record.sequence())?;
    log::trace!(
        "Record {}: {} {}, checksum {}",
        record,
        nucleotide_type,
        encoding_key,
        checksum
    );

    build_frame(record, checksum, nucleotide_type, encoding_key)
}

/// Splits the bitstring at the first four byte-aligned delimiters. The last
/// part is the untouched payload tail.
fn split_frame(bits: &[bool]) -> Vec<&[bool]> {
    let mut parts = Vec::with_capacity(FRAME_PARTS);
    let mut part_start = 0;
    let mut position = 0;

    while parts.len() < FRAME_PARTS - 1 && position + ASCII_CODE_BITS <= bits.len() {
        if read_bits(bits, position, ASCII_CODE_BITS) == FRAME_DELIMITER_BYTE {
            parts.push(&bits[part_start..position]);
            part_start = position + ASCII_CODE_BITS;
        }
        position += ASCII_CODE_BITS;
    }

    parts.push(&bits[part_start..]);
    parts
}

/// Parses a frame bitstring built by [`build_frame`].
///
/// Trailing zero bits after the payload decode as padding spaces.
pub fn parse_frame(bits: &[bool]) -> FrameResult<Frame> {
    let parts = split_frame(bits);
    if parts.len() < FRAME_PARTS {
        return Err(FrameError::FrameTruncated { parts: parts.len() });
    }

    let title = ascii_decode(parts[0])?;
    let checksum = ascii_decode(parts[1])?;
    let nucleotide_type = ascii_decode(parts[2])?;
    let nucleotide_type: NucleotideType = nucleotide_type
        .parse()
        .map_err(|_| FrameError::UnknownNucleotideType(nucleotide_type))?;
    let encoding_key = ascii_decode(parts[3])?;
    let encoding_key: EncodingKey = encoding_key
        .parse()
        .map_err(|_| FrameError::UnknownEncodingKey(encoding_key))?;

    let sequence = tetra_decode(parts[4], SymbolTable::for_key(encoding_key))?;
    let sequence = restore_uracil(sequence, encoding_key, nucleotide_type);

    Ok(Frame {
        title,
        checksum,
        nucleotide_type,
        encoding_key,
        sequence,
    })
}

/// Removes every all-zero 12-bit group, keeping the remaining bits in order.
/// A shorter final group is always kept.
///
/// # Examples
/// ```
/// use nucpix::bits::Bits;
/// use nucpix::frame::strip_zero_groups;
///
/// let bits: Bits = "101000000000000000000001".parse().unwrap();
/// assert_eq!(strip_zero_groups(&bits).to_string(), "101000000000");
/// ```
#[must_use]
pub fn strip_zero_groups(bits: &[bool]) -> Bits {
    bits.chunks(PADDING_GROUP_BITS)
        .filter(|chunk| chunk.len() < PADDING_GROUP_BITS || chunk.iter().any(|&bit| bit))
        .flatten()
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use crate::bits::Bits;
    use crate::frame::{
        ascii_decode, ascii_encode, build_frame, encode_record, parse_frame, split_frame,
        strip_zero_groups, tetra_decode, tetra_encode, Frame, FrameError, PADDING_GROUP_BITS,
    };
    use crate::sequence::{EncodingKey, NucleotideType, Record};
    use crate::symbol::{SymbolError, SymbolTable};

    #[test]
    fn test_ascii_round_trip() {
        let text = "chr1 Example Organism\t(strain K-12)";
        let bits = ascii_encode(text);

        assert_eq!(bits.len(), text.len() * 8);
        assert_eq!(ascii_decode(&bits).unwrap(), text);
    }

    #[test]
    fn test_ascii_decode_utf8() {
        let text = "Saccharomyces cerevisiæ";
        assert_eq!(ascii_decode(&ascii_encode(text)).unwrap(), text);
    }

    #[test]
    fn test_ascii_decode_invalid_length() {
        let bits: Bits = "0011110".parse().unwrap();
        assert!(matches!(
            ascii_decode(&bits),
            Err(FrameError::MalformedBitstring(_))
        ));
    }

    #[test]
    fn test_ascii_decode_control_byte() {
        let bits: Bits = "0100000100000001".parse().unwrap();
        assert!(matches!(
            ascii_decode(&bits),
            Err(FrameError::MalformedBitstring(_))
        ));
    }

    #[test]
    fn test_tetra_round_trip() {
        let table = SymbolTable::for_key(EncodingKey::Degenerate);
        let sequence = "ACGTRYKMSWBDHVN";
        let bits = tetra_encode(sequence, table).unwrap();

        assert_eq!(bits.len(), sequence.len() * 4);
        assert_eq!(tetra_decode(&bits, table).unwrap(), sequence);
    }

    #[test]
    fn test_tetra_encode_invalid_symbol() {
        let table = SymbolTable::for_key(EncodingKey::Confidence);
        assert_eq!(
            tetra_encode("ACGN", table),
            Err(SymbolError::invalid_symbol('N', "ACGN"))
        );
    }

    #[test]
    fn test_tetra_decode_invalid_code() {
        let table = SymbolTable::for_key(EncodingKey::Confidence);
        let bits: Bits = "00010011".parse().unwrap();

        assert_eq!(
            tetra_decode(&bits, table),
            Err(FrameError::InvalidCode {
                code: 0b0011,
                position: 4
            })
        );
    }

    #[test]
    fn test_metadata_fields_split() {
        let metadata = "NC_000001 Example Organism<abc123<DNA<degenerate<";
        let bits = ascii_encode(metadata);

        let fields: Vec<String> = split_frame(&bits)
            .into_iter()
            .map(|part| ascii_decode(part).unwrap())
            .collect();

        assert_eq!(
            fields,
            vec!["NC_000001 Example Organism", "abc123", "DNA", "degenerate", ""]
        );
    }

    #[test]
    fn test_split_frame_max_parts() {
        let bits = ascii_encode("a<b<c<d<e<f<");
        let parts = split_frame(&bits);

        assert_eq!(parts.len(), 5);
        assert_eq!(ascii_decode(parts[4]).unwrap(), "e<f<");
    }

    #[test]
    fn test_parse_frame_fields() {
        let record = Record::new("id>", "Example Organism", "ACGTN");
        let bits = build_frame(
            &record,
            "abc123",
            NucleotideType::Dna,
            EncodingKey::Degenerate,
        )
        .unwrap();
        let frame = parse_frame(&bits).unwrap();

        assert_eq!(
            frame,
            Frame::new(
                "id> Example Organism",
                "abc123",
                NucleotideType::Dna,
                EncodingKey::Degenerate,
                "ACGTN"
            )
        );
    }

    #[test]
    fn test_rna_confidence_round_trip() {
        let record = Record::new("seq1", "", "uaCGUAcg");
        let bits = encode_record(&record, "d41d8cd98f00b204e9800998ecf8427e").unwrap();
        let frame = parse_frame(&bits).unwrap();

        assert_eq!(frame.nucleotide_type(), NucleotideType::Rna);
        assert_eq!(frame.encoding_key(), EncodingKey::Confidence);
        assert_eq!(frame.sequence(), "uaCGUAcg");
        assert_eq!(frame.into_record(), record);
    }

    #[test]
    fn test_rna_degenerate_round_trip() {
        let record = Record::new("seq2", "RNA virus", "UUAGCNNRY");
        let bits = encode_record(&record, "abc").unwrap();
        let frame = parse_frame(&bits).unwrap();

        assert_eq!(frame.encoding_key(), EncodingKey::Degenerate);
        assert_eq!(frame.into_record(), record);
    }

    #[test]
    fn test_description_with_two_letter_prefix() {
        // `ry` followed by `<` starts with a bit pattern that also matches the
        // delimiter at a non-byte offset
        let record = Record::new("ry", "", "ACGTN");
        let bits = encode_record(&record, "abc").unwrap();

        assert_eq!(parse_frame(&bits).unwrap().into_record(), record);
    }

    #[test]
    fn test_build_frame_delimiter_in_field() {
        let record = Record::new("seq<1", "", "ACGTN");
        assert_eq!(
            encode_record(&record, "abc"),
            Err(FrameError::DelimiterInField("seq<1".to_owned()))
        );
    }

    #[test]
    fn test_parse_frame_with_padding() {
        let record = Record::new("seq1", "Example", "ACGTN");
        let mut bits = encode_record(&record, "abc").unwrap();
        bits.extend_from_bits(&Bits::zeros(40));

        let frame = parse_frame(&bits).unwrap();

        assert_eq!(frame.sequence(), "ACGTN          ");
        assert_eq!(frame.into_record(), record);
    }

    #[test]
    fn test_parse_frame_truncated() {
        let bits = ascii_encode("seq1<abc<DNA");
        assert_eq!(
            parse_frame(&bits),
            Err(FrameError::FrameTruncated { parts: 3 })
        );
        assert_eq!(
            parse_frame(&Bits::zeros(64)),
            Err(FrameError::FrameTruncated { parts: 1 })
        );
    }

    #[test]
    fn test_parse_frame_unknown_key() {
        let bits = ascii_encode("seq1<abc<DNA<binary<");
        assert_eq!(
            parse_frame(&bits),
            Err(FrameError::UnknownEncodingKey("binary".to_owned()))
        );
    }

    #[test]
    fn test_strip_zero_groups() {
        let data_a = "101100111000";
        let data_b = "011111111110";
        let data_c = "100000000001";
        let zero = "0".repeat(PADDING_GROUP_BITS);
        let tail = "0110";
        let input = format!(
            "{}{}{}{}{}{}{}",
            data_a, zero, data_b, zero, data_c, zero, tail
        );
        let bits: Bits = input.parse().unwrap();

        let stripped = strip_zero_groups(&bits);

        assert_eq!(
            stripped.to_string(),
            format!("{}{}{}{}", data_a, data_b, data_c, tail)
        );
    }

    #[test]
    fn test_strip_zero_groups_keeps_short_tail() {
        let bits = Bits::zeros(PADDING_GROUP_BITS * 2 + 4);
        assert_eq!(strip_zero_groups(&bits), Bits::zeros(4));
    }

    #[test]
    fn test_parse_frame_after_strip() {
        let record = Record::new("chr2", "Example Organism chromosome 2", "TTAGGGNNNACGTRY");
        let mut bits = encode_record(&record, "0123456789abcdef").unwrap();
        bits.extend_from_bits(&Bits::zeros(400));

        let frame = parse_frame(&strip_zero_groups(&bits)).unwrap();

        assert_eq!(frame.into_record(), record);
    }

    #[test]
    fn test_encoded_len() {
        let record = Record::new("chr1", "Example Organism", "uaCGUAcgUUAGCCGAuuacgGCAU");
        let mut bits = encode_record(&record, "0123456789abcdef").unwrap();
        let len = bits.len();
        bits.extend_from_bits(&Bits::zeros(8));

        let frame = parse_frame(&bits).unwrap();

        assert!(frame.sequence().ends_with("  "));
        assert_eq!(frame.encoded_len(), len);
    }

    #[test]
    fn test_check_payload() {
        let padded = Frame::new("a", "b", NucleotideType::Dna, EncodingKey::Degenerate, "ACGT  ");
        assert_eq!(padded.check_payload(), Ok(()));

        let misread = Frame::new("a", "b", NucleotideType::Dna, EncodingKey::Degenerate, "AC GT ");
        assert_eq!(
            misread.check_payload(),
            Err(FrameError::PaddingInPayload { position: 2 })
        );
    }

    #[test]
    fn test_error_source() {
        let error = FrameError::from(SymbolError::invalid_symbol('X', "ACX"));
        assert!(error.source().is_some());
        assert!(FrameError::FrameTruncated { parts: 2 }.source().is_none());
    }
}
