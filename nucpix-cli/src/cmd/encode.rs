use std::sync::Arc;

use anyhow::{bail, Context};
use log::info;
use nucpix::encoder::{EncoderParams, NucImgEncoder};
use nucpix::progress::ProgressNotifier;
use nucpix::qc::{QcParams, QcPipeline};

use crate::cli::EncodeArgs;
use crate::opts::thread_num;

pub fn encode(args: &EncodeArgs, progress_notifier: Arc<dyn ProgressNotifier>) -> anyhow::Result<()> {
    let fasta = args.fasta.as_path()?;
    let image = args.image.as_path()?;

    let params = EncoderParams::builder()
        .quantize(!args.no_quantize)
        .frame_delay_ms(args.frame_delay)
        .preview(args.gif)
        .progress_notifier(progress_notifier.clone())
        .build();
    let encoded = NucImgEncoder::with_params(params)
        .encode(fasta, image, &args.output)
        .context("Could not embed the records into the image")?;
    info!(
        "Images written to {}",
        encoded.layout().output_dir().display()
    );

    if args.skip_qc {
        return Ok(());
    }

    let params = QcParams::builder()
        .thread_num(thread_num(args.threads))
        .line_width(args.line_width)
        .progress_notifier(progress_notifier)
        .build();
    let summary = QcPipeline::with_params(params)
        .run(&encoded)
        .context("Could not verify the generated images")?;

    if !encoded.skipped().is_empty() {
        bail!(
            "{} records could not be encoded, see log",
            encoded.skipped().len()
        );
    }
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
