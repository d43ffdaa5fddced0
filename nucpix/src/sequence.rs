use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A single FASTA record.
///
/// The identifier is the first whitespace-separated token of the header line,
/// the description is everything after it.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Default)]
pub struct Record {
    identifier: String,
    description: String,
    sequence: String,
}

impl Record {
    /// Creates a new instance of `Record`.
    ///
    /// # Examples
    /// ```
    /// use nucpix::sequence::Record;
    ///
    /// let record = Record::new("NC_000913.3", "Escherichia coli", "ACGTN");
    /// assert_eq!(record.identifier(), "NC_000913.3");
    /// assert_eq!(record.title(), "NC_000913.3 Escherichia coli");
    /// ```
    #[must_use]
    pub fn new<T, U, V>(identifier: T, description: U, sequence: V) -> Self
    where
        T: Into<String>,
        U: Into<String>,
        V: Into<String>,
    {
        Self {
            identifier: identifier.into(),
            description: description.into(),
            sequence: sequence.into(),
        }
    }

    /// Splits a header line (without the leading `>`) into identifier and
    /// description at the first space.
    ///
    /// # Examples
    /// ```
    /// use nucpix::sequence::Record;
    ///
    /// let record = Record::from_title("chr1 Example Organism", "ACGTN");
    /// assert_eq!(record.identifier(), "chr1");
    /// assert_eq!(record.description(), "Example Organism");
    ///
    /// let record = Record::from_title("chr2", "ACGTN");
    /// assert_eq!(record.description(), "");
    /// ```
    #[must_use]
    pub fn from_title<V: Into<String>>(title: &str, sequence: V) -> Self {
        let (identifier, description) = match title.split_once(' ') {
            Some((identifier, description)) => (identifier, description),
            None => (title, ""),
        };

        Self::new(identifier, description, sequence)
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Returns the full header line of this record, without the leading `>`.
    #[must_use]
    pub fn title(&self) -> String {
        if self.description.is_empty() {
            self.identifier.clone()
        } else {
            format!("{} {}", self.identifier, self.description)
        }
    }

    /// Returns the length of the sequence, in symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} symbols)", self.identifier, self.sequence.len())
    }
}

/// Error returned when parsing [`NucleotideType`] or [`EncodingKey`] names.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UnknownNameError(pub String);

impl Display for UnknownNameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown name: `{}`", self.0)
    }
}

impl std::error::Error for UnknownNameError {}

/// Kind of nucleic acid a sequence describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NucleotideType {
    Dna,
    Rna,
}

impl NucleotideType {
    pub const VALUES: [NucleotideType; 2] = [NucleotideType::Dna, NucleotideType::Rna];

    /// Returns `Rna` if the sequence contains any uracil (`U` or `u`).
    ///
    /// # Examples
    /// ```
    /// use nucpix::sequence::NucleotideType;
    ///
    /// assert_eq!(NucleotideType::of_sequence("uaCG"), NucleotideType::Rna);
    /// assert_eq!(NucleotideType::of_sequence("TACG"), NucleotideType::Dna);
    /// ```
    #[must_use]
    pub fn of_sequence(sequence: &str) -> Self {
        if sequence.contains(&['U', 'u'][..]) {
            NucleotideType::Rna
        } else {
            NucleotideType::Dna
        }
    }

    /// Name of the type, as stored in a frame.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            NucleotideType::Dna => "DNA",
            NucleotideType::Rna => "RNA",
        }
    }
}

impl Display for NucleotideType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for NucleotideType {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VALUES
            .into_iter()
            .find(|value| value.name() == s)
            .ok_or_else(|| UnknownNameError(s.to_owned()))
    }
}

/// Selects which symbol table a sequence was encoded with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EncodingKey {
    /// Upper-case IUPAC ambiguity codes.
    Degenerate,
    /// Upper-case confident calls, lower-case uncertain calls.
    Confidence,
}

impl EncodingKey {
    pub const VALUES: [EncodingKey; 2] = [EncodingKey::Degenerate, EncodingKey::Confidence];

    /// Name of the key, as stored in a frame.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            EncodingKey::Degenerate => "degenerate",
            EncodingKey::Confidence => "confidence",
        }
    }

    /// Returns the other table.
    #[must_use]
    pub const fn other(&self) -> Self {
        match self {
            EncodingKey::Degenerate => EncodingKey::Confidence,
            EncodingKey::Confidence => EncodingKey::Degenerate,
        }
    }
}

impl Display for EncodingKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EncodingKey {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VALUES
            .into_iter()
            .find(|value| value.name() == s)
            .ok_or_else(|| UnknownNameError(s.to_owned()))
    }
}
