//! Multi-frame containers: animated PNG holding every carrier of a run and
//! an animated GIF preview.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, RgbaImage};

use crate::carrier::image_store::save_rgba;
use crate::carrier::{check_dimensions, CarrierError, CarrierResult};

/// Default display time of a single container frame.
pub const DEFAULT_FRAME_DELAY_MS: u16 = 500;

const PREVIEW_SPEED: i32 = 10;

/// Returns the file name of the `index`-th frame split from a container.
#[must_use]
pub fn split_frame_name(index: usize) -> String {
    format!("chrom_{:03}.png", index)
}

fn check_frames(frames: &[RgbaImage]) -> CarrierResult<&RgbaImage> {
    let first = frames.first().ok_or(CarrierError::EmptyContainer)?;
    for frame in &frames[1..] {
        check_dimensions(first, frame)?;
    }

    Ok(first)
}

/// Writes the frames, in order, as a looping animated PNG.
///
/// Every frame must have the same dimensions.
pub fn write_container<P: AsRef<Path>>(
    path: P,
    frames: &[RgbaImage],
    delay_ms: u16,
) -> CarrierResult<()> {
    let first = check_frames(frames)?;

    let file = BufWriter::new(File::create(path.as_ref())?);
    let mut encoder = png::Encoder::new(file, first.width(), first.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_animated(frames.len() as u32, 0)?;
    encoder.set_frame_delay(delay_ms, 1000)?;

    let mut writer = encoder.write_header()?;
    for frame in frames {
        writer.write_image_data(frame.as_raw())?;
    }
    writer.finish()?;

    log::info!(
        "Wrote container {} ({} frames, {}x{})",
        path.as_ref().display(),
        frames.len(),
        first.width(),
        first.height()
    );
    Ok(())
}

/// Reads every frame of an animated PNG, in order.
///
/// A still PNG reads as a single frame. Frames must cover the whole image
/// and decode to 8-bit RGBA.
pub fn read_container<P: AsRef<Path>>(path: P) -> CarrierResult<Vec<RgbaImage>> {
    let file = BufReader::new(File::open(path.as_ref())?);
    let mut decoder = png::Decoder::new(file);
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder.read_info()?;

    let (width, height) = (reader.info().width, reader.info().height);
    let frame_num = reader
        .info()
        .animation_control
        .map_or(1, |control| control.num_frames);
    let (color_type, bit_depth) = reader.output_color_type();
    if color_type != png::ColorType::Rgba || bit_depth != png::BitDepth::Eight {
        return Err(CarrierError::UnsupportedContainer(format!(
            "frames decode to {:?} {:?}, expected 8-bit RGBA",
            color_type, bit_depth
        )));
    }

    let mut frames = Vec::with_capacity(frame_num as usize);
    let mut buf = vec![0; reader.output_buffer_size()];
    for index in 0..frame_num {
        let info = reader.next_frame(&mut buf)?;
        if (info.width, info.height) != (width, height) {
            return Err(CarrierError::UnsupportedContainer(format!(
                "frame {} is a {}x{} sub-frame of a {}x{} image",
                index, info.width, info.height, width, height
            )));
        }

        let frame = RgbaImage::from_raw(width, height, buf[..info.buffer_size()].to_vec())
            .ok_or_else(|| {
                CarrierError::UnsupportedContainer(format!("frame {} is truncated", index))
            })?;
        frames.push(frame);
    }

    if frames.is_empty() {
        return Err(CarrierError::EmptyContainer);
    }

    log::debug!(
        "Read {} frames from {}",
        frames.len(),
        path.as_ref().display()
    );
    Ok(frames)
}

/// Splits a container into still images named `chrom_000.png`,
/// `chrom_001.png`, … in `directory`, returning their paths in frame order.
pub fn split_container<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    directory: Q,
) -> CarrierResult<Vec<PathBuf>> {
    let frames = read_container(path)?;

    frames
        .iter()
        .enumerate()
        .map(|(index, frame)| {
            let frame_path = directory.as_ref().join(split_frame_name(index));
            save_rgba(frame, &frame_path)?;
            Ok(frame_path)
        })
        .collect()
}

/// Writes the frames as a looping animated GIF.
pub fn write_preview<P: AsRef<Path>>(
    path: P,
    frames: &[RgbaImage],
    delay_ms: u16,
) -> CarrierResult<()> {
    check_frames(frames)?;

    let file = BufWriter::new(File::create(path.as_ref())?);
    let mut encoder = GifEncoder::new_with_speed(file, PREVIEW_SPEED);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(frames.iter().map(|frame| {
        image::Frame::from_parts(
            frame.clone(),
            0,
            0,
            Delay::from_numer_denom_ms(u32::from(delay_ms), 1),
        )
    }))?;

    log::info!("Wrote preview {}", path.as_ref().display());
    Ok(())
}
