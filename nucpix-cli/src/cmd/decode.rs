use std::sync::Arc;

use anyhow::{bail, Context};
use log::info;
use nucpix::progress::ProgressNotifier;
use nucpix::qc::{QcParams, QcPipeline};

use crate::cli::DecodeArgs;
use crate::opts::thread_num;

pub fn decode(args: &DecodeArgs, progress_notifier: Arc<dyn ProgressNotifier>) -> anyhow::Result<()> {
    let container = args.container.as_path()?;

    let params = QcParams::builder()
        .thread_num(thread_num(args.threads))
        .line_width(Some(args.line_width))
        .progress_notifier(progress_notifier)
        .build();
    let summary = QcPipeline::with_params(params)
        .decode_container(container, &args.output)
        .context("Could not decode the container")?;

    if !summary.is_success() {
        bail!("{}", summary);
    }

    info!(
        "{}; reconstructed file: {}",
        summary,
        summary.reconstructed_path().display()
    );
    Ok(())
}
