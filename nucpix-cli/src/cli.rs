use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use nucpix::carrier::container::DEFAULT_FRAME_DELAY_MS;

use crate::opts::{input_file, InputFile};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Don't display a progress bar/spinner
    #[clap(long, global = true, value_parser)]
    pub no_progress: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed every record of a FASTA file into a copy of an image and verify
    /// the result
    Encode(EncodeArgs),

    /// Reconstruct a FASTA file from a container
    Decode(DecodeArgs),
}

#[derive(Args)]
pub struct EncodeArgs {
    /// Input FASTA file path
    #[clap(value_parser = input_file)]
    pub fasta: InputFile,

    /// Carrier image path
    #[clap(value_parser = input_file)]
    pub image: InputFile,

    /// Output root directory; results are written to `<OUTPUT>/<image name>/`
    #[clap(short, long, default_value = ".", value_parser)]
    pub output: PathBuf,

    /// Number of threads verifying the images; defaults to the number of
    /// available CPUs
    #[clap(long, value_parser)]
    pub threads: Option<usize>,

    /// Do not reduce the carrier image to a 256 colour palette
    #[clap(long, value_parser)]
    pub no_quantize: bool,

    /// Line width of the reconstructed FASTA file; defaults to the line width
    /// of the input file
    #[clap(long, value_parser)]
    pub line_width: Option<usize>,

    /// Display time of a single container frame, in milliseconds
    #[clap(default_value_t = DEFAULT_FRAME_DELAY_MS, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub frame_delay: u16,

    /// Also write an animated GIF preview of the container
    #[clap(long, value_parser)]
    pub gif: bool,

    /// Do not verify the generated images
    #[clap(long, value_parser)]
    pub skip_qc: bool,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Container (animated PNG) path
    #[clap(value_parser = input_file)]
    pub container: InputFile,

    /// Output root directory; results are written to
    /// `<OUTPUT>/<container name>/examination/`
    #[clap(short, long, default_value = ".", value_parser)]
    pub output: PathBuf,

    /// Line width of the reconstructed FASTA file
    #[clap(default_value_t = nucpix::fasta::DEFAULT_LINE_WIDTH, long, value_parser)]
    pub line_width: usize,

    /// Number of threads decoding the frames; defaults to the number of
    /// available CPUs
    #[clap(long, value_parser)]
    pub threads: Option<usize>,
}
