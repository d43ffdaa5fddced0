pub mod reader;
pub mod writer;

pub(super) const FASTA_TITLE_PREFIX: char = '>';

/// Line width used when none was observed or configured.
pub const DEFAULT_LINE_WIDTH: usize = 60;
