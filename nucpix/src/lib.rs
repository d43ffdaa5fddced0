pub mod bits;
pub mod carrier;
pub mod checksum;
pub mod encoder;
pub mod fasta;
pub mod frame;
pub mod progress;
pub mod qc;
pub mod sequence;
pub mod symbol;

#[doc(hidden)]
pub mod _internal_test_data;
