use std::error::Error;
use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;

use crate::sequence::{EncodingKey, NucleotideType};

/// Number of distinct 4-bit codes.
pub const TETRA_CODE_NUM: usize = 16;

/// Error occurring when choosing or applying a symbol table.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SymbolError {
    /// The sequence matches neither table selection rule.
    UnknownAlphabet(String),
    /// The sequence contains a symbol present in neither table.
    InvalidSymbol { symbol: char, sequence: String },
}

impl SymbolError {
    #[must_use]
    pub fn invalid_symbol(symbol: char, sequence: &str) -> Self {
        Self::InvalidSymbol {
            symbol,
            sequence: sequence.to_owned(),
        }
    }
}

fn sequence_preview(sequence: &str) -> String {
    const PREVIEW_LEN: usize = 24;

    if sequence.len() <= PREVIEW_LEN {
        sequence.to_owned()
    } else {
        let preview: String = sequence.chars().take(PREVIEW_LEN).collect();
        format!("{}... ({} symbols)", preview, sequence.len())
    }
}

impl Display for SymbolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolError::UnknownAlphabet(sequence) => write!(
                f,
                "Cannot select a symbol table for sequence: `{}`",
                sequence_preview(sequence)
            ),
            SymbolError::InvalidSymbol { symbol, sequence } => write!(
                f,
                "Invalid symbol `{}` in sequence: `{}`",
                symbol,
                sequence_preview(sequence)
            ),
        }
    }
}

impl Error for SymbolError {}

/// The result of a symbol table operation.
pub type SymbolResult<T> = Result<T, SymbolError>;

const DEGENERATE_SYMBOLS: [(char, u8); 16] = [
    (' ', 0b0000),
    ('T', 0b0001),
    ('A', 0b0010),
    ('W', 0b0011),
    ('C', 0b0100),
    ('Y', 0b0101),
    ('M', 0b0110),
    ('H', 0b0111),
    ('G', 0b1000),
    ('K', 0b1001),
    ('R', 0b1010),
    ('D', 0b1011),
    ('S', 0b1100),
    ('B', 0b1101),
    ('V', 0b1110),
    ('N', 0b1111),
];
const DEGENERATE_ALIASES: [(char, char); 1] = [('U', 'T')];

// Codes 0011, 0101, 0110, 1001, 1010 and 1100 are reserved.
const CONFIDENCE_SYMBOLS: [(char, u8); 9] = [
    (' ', 0b0000),
    ('T', 0b0001),
    ('A', 0b0010),
    ('C', 0b0100),
    ('G', 0b1000),
    ('g', 0b0111),
    ('c', 0b1011),
    ('a', 0b1101),
    ('t', 0b1110),
];
const CONFIDENCE_ALIASES: [(char, char); 2] = [('U', 'T'), ('u', 't')];

const CONFIDENCE_MARKERS: [char; 5] = ['u', 't', 'a', 'c', 'g'];
const DEGENERATE_MARKERS: [char; 11] = ['R', 'Y', 'K', 'M', 'S', 'W', 'B', 'D', 'H', 'V', 'N'];

/// Bidirectional mapping between sequence symbols and 4-bit codes.
///
/// Every canonical symbol owns a distinct code. Aliases (uracil) share the
/// code of their canonical symbol and are restored from the nucleotide type
/// after decoding.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    key: EncodingKey,
    symbol_to_code: [Option<u8>; 128],
    code_to_symbol: [Option<char>; TETRA_CODE_NUM],
}

impl SymbolTable {
    /// Builds a table.
    ///
    /// # Panics
    /// This function panics if two symbols share a code, if a code does not
    /// fit in 4 bits or if an alias points to an unknown symbol.
    #[must_use]
    fn new(key: EncodingKey, symbols: &[(char, u8)], aliases: &[(char, char)]) -> Self {
        let mut symbol_to_code = [None; 128];
        let mut code_to_symbol = [None; TETRA_CODE_NUM];

        for &(symbol, code) in symbols {
            assert!(symbol.is_ascii(), "Symbol `{}` is not ASCII", symbol);
            assert!(
                (code as usize) < TETRA_CODE_NUM,
                "Code {:#06b} does not fit in 4 bits",
                code
            );
            assert!(
                code_to_symbol[code as usize].is_none(),
                "Code {:04b} assigned twice in the {} table",
                code,
                key
            );
            assert!(
                symbol_to_code[symbol as usize].is_none(),
                "Symbol `{}` assigned twice in the {} table",
                symbol,
                key
            );

            code_to_symbol[code as usize] = Some(symbol);
            symbol_to_code[symbol as usize] = Some(code);
        }

        for &(alias, canonical) in aliases {
            let code = symbol_to_code[canonical as usize]
                .unwrap_or_else(|| panic!("Alias target `{}` is not in the table", canonical));
            assert!(symbol_to_code[alias as usize].is_none());
            symbol_to_code[alias as usize] = Some(code);
        }

        Self {
            key,
            symbol_to_code,
            code_to_symbol,
        }
    }

    /// Returns the table for given key.
    #[must_use]
    pub fn for_key(key: EncodingKey) -> &'static SymbolTable {
        match key {
            EncodingKey::Degenerate => &DEGENERATE_TABLE,
            EncodingKey::Confidence => &CONFIDENCE_TABLE,
        }
    }

    #[must_use]
    pub fn key(&self) -> EncodingKey {
        self.key
    }

    /// Returns the 4-bit code of given symbol.
    ///
    /// # Examples
    /// ```
    /// use nucpix::sequence::EncodingKey;
    /// use nucpix::symbol::SymbolTable;
    ///
    /// let table = SymbolTable::for_key(EncodingKey::Confidence);
    /// assert_eq!(table.encode('a'), Some(0b1101));
    /// assert_eq!(table.encode('N'), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn encode(&self, symbol: char) -> Option<u8> {
        if symbol.is_ascii() {
            self.symbol_to_code[symbol as usize]
        } else {
            None
        }
    }

    /// Returns the canonical symbol for given 4-bit code.
    #[inline]
    #[must_use]
    pub fn decode(&self, code: u8) -> Option<char> {
        self.code_to_symbol.get(code as usize).copied().flatten()
    }

    /// Returns `true` if every symbol of the sequence is present in this table.
    #[must_use]
    pub fn can_encode(&self, sequence: &str) -> bool {
        sequence.chars().all(|symbol| self.encode(symbol).is_some())
    }

    /// Returns the canonical symbols of this table along with their codes.
    pub fn symbols(&self) -> impl Iterator<Item = (char, u8)> + '_ {
        self.code_to_symbol
            .iter()
            .enumerate()
            .filter_map(|(code, symbol)| symbol.map(|symbol| (symbol, code as u8)))
    }
}

lazy_static! {
    static ref DEGENERATE_TABLE: SymbolTable = SymbolTable::new(
        EncodingKey::Degenerate,
        &DEGENERATE_SYMBOLS,
        &DEGENERATE_ALIASES
    );
    static ref CONFIDENCE_TABLE: SymbolTable = SymbolTable::new(
        EncodingKey::Confidence,
        &CONFIDENCE_SYMBOLS,
        &CONFIDENCE_ALIASES
    );
}

/// Chooses the symbol table for a sequence and determines its nucleotide type.
///
/// Any lower-case `u`, `t`, `a`, `c` or `g` selects the confidence table;
/// otherwise any IUPAC ambiguity letter selects the degenerate table. A
/// sequence matching neither rule is rejected.
///
/// # Examples
/// ```
/// use nucpix::sequence::{EncodingKey, NucleotideType};
/// use nucpix::symbol::select_table;
///
/// assert_eq!(
///     select_table("uaCGUAcg").unwrap(),
///     (EncodingKey::Confidence, NucleotideType::Rna)
/// );
/// assert_eq!(
///     select_table("TACGBDHV").unwrap(),
///     (EncodingKey::Degenerate, NucleotideType::Dna)
/// );
/// assert!(select_table("ACGT").is_err());
/// ```
pub fn select_table(sequence: &str) -> SymbolResult<(EncodingKey, NucleotideType)> {
    let key = if sequence.contains(&CONFIDENCE_MARKERS[..]) {
        EncodingKey::Confidence
    } else if sequence.contains(&DEGENERATE_MARKERS[..]) {
        EncodingKey::Degenerate
    } else {
        return Err(SymbolError::UnknownAlphabet(sequence.to_owned()));
    };

    Ok((key, NucleotideType::of_sequence(sequence)))
}

/// Selects the table for a sequence and checks that it can encode every
/// symbol, falling back to the other table once.
///
/// The returned key is the table the sequence must be encoded with.
pub fn resolve_encoding(sequence: &str) -> SymbolResult<(EncodingKey, NucleotideType)> {
    let (key, nucleotide_type) = select_table(sequence)?;

    if SymbolTable::for_key(key).can_encode(sequence) {
        return Ok((key, nucleotide_type));
    }

    let fallback = key.other();
    log::debug!("Sequence does not fit the {} table, trying {}", key, fallback);
    if SymbolTable::for_key(fallback).can_encode(sequence) {
        return Ok((fallback, nucleotide_type));
    }

    let table = SymbolTable::for_key(key);
    let symbol = sequence
        .chars()
        .find(|&symbol| table.encode(symbol).is_none())
        .unwrap_or_default();
    Err(SymbolError::invalid_symbol(symbol, sequence))
}

/// Restores uracil after decoding an RNA sequence.
///
/// Both tables store `U` under the code of `T` (and the confidence table `u`
/// under `t`), so decoded RNA carries thymine that has to be mapped back.
#[must_use]
pub fn restore_uracil(sequence: String, key: EncodingKey, nucleotide_type: NucleotideType) -> String {
    if nucleotide_type != NucleotideType::Rna {
        return sequence;
    }

    match key {
        EncodingKey::Degenerate => sequence.replace('T', "U"),
        EncodingKey::Confidence => sequence.replace('t', "u").replace('T', "U"),
    }
}
