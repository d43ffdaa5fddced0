#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use cmd::{decode, encode};
use human_panic::setup_panic;
use lazy_static::lazy_static;

use crate::logging::init_logging;
use crate::progress_bar::NucProgressBar;

mod cli;
mod cmd;
mod logging;
mod opts;
mod progress_bar;

lazy_static! {
    pub(crate) static ref PROGRESS_BAR: NucProgressBar = NucProgressBar::new();
}

fn main() -> anyhow::Result<()> {
    setup_panic!();

    let cli: Cli = Cli::parse();

    if !cli.no_progress {
        PROGRESS_BAR.show();
    }

    init_logging(cli.verbose.log_level_filter()).expect("Could not initialize logging");

    let result = match &cli.command {
        Commands::Encode(args) => encode::encode(args, Arc::new(PROGRESS_BAR.clone()))
            .context("Failed to encode given FASTA file"),
        Commands::Decode(args) => decode::decode(args, Arc::new(PROGRESS_BAR.clone()))
            .context("Failed to decode given container"),
    };

    PROGRESS_BAR.finish();
    result
}
