use image::{Rgba, RgbaImage};
use lazy_static::lazy_static;

use crate::sequence::Record;

pub const MULTI_RECORD_FASTA_STR: &str = ">chr1 Example organism chromosome 1
GATTTGGGGTTCAAAGCAGTATCGATCAAATAGTAAATCCATTTGTTCAACTCACAGTTT
NNNNNNNNNNRYKMSWBDHVACGTACGTTTAGGGTTAGGGTTAGGG
>chr2 Example organism chromosome 2
ACGTNACGTNACGTN
>mito
taCGTAcgGGCCtaacgtACGT
";

lazy_static! {
    pub static ref MULTI_RECORD_FASTA: Vec<Record> = vec![
        Record::new(
            "chr1",
            "Example organism chromosome 1",
            "GATTTGGGGTTCAAAGCAGTATCGATCAAATAGTAAATCCATTTGTTCAACTCACAGTTT\
             NNNNNNNNNNRYKMSWBDHVACGTACGTTTAGGGTTAGGGTTAGGG"
        ),
        Record::new("chr2", "Example organism chromosome 2", "ACGTNACGTNACGTN"),
        Record::new("mito", "", "taCGTAcgGGCCtaacgtACGT"),
    ];
}

pub const RNA_FASTA_STR: &str = ">rna1 Example virus segment 1
uaCGUAcgUUAGCCGAuuacgGCAU
>rna2 Example virus segment 2
UUAGCNNRYUUAGC
";

/// FASTA file whose last line is not terminated with a newline.
pub const NO_TRAILING_NEWLINE_FASTA_STR: &str = ">seq1 Example
ACGTNACGTN
ACGTN";

/// Creates a carrier image with a deterministic, non-uniform pattern.
#[must_use]
pub fn test_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 37 % 256) as u8,
            (y * 91 % 256) as u8,
            ((x + y) * 13 % 256) as u8,
            255,
        ])
    })
}
