use std::path::Path;

use image::imageops::ColorMap;
use image::{ImageFormat, Rgba, RgbaImage};

use crate::carrier::layout::CarrierSize;
use crate::carrier::CarrierResult;

/// Background of the area added around a padded image.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Number of colours in a quantized image.
pub const PALETTE_SIZE: usize = 256;
const QUANTIZER_SAMPLE_FACTOR: i32 = 10;

/// Loads an image of any supported format and converts it to RGBA.
pub fn load_rgba<P: AsRef<Path>>(path: P) -> CarrierResult<RgbaImage> {
    let image = image::open(path.as_ref())?;
    Ok(image.to_rgba8())
}

/// Saves the image as an RGBA PNG file.
pub fn save_rgba<P: AsRef<Path>>(image: &RgbaImage, path: P) -> CarrierResult<()> {
    image.save_with_format(path.as_ref(), ImageFormat::Png)?;
    log::debug!("Saved {}", path.as_ref().display());

    Ok(())
}

/// Reduces the image to an adaptive palette of 256 colours.
#[must_use]
pub fn quantize(image: &RgbaImage) -> RgbaImage {
    let quantizer =
        color_quant::NeuQuant::new(QUANTIZER_SAMPLE_FACTOR, PALETTE_SIZE, image.as_raw());

    let mut quantized = image.clone();
    for pixel in quantized.pixels_mut() {
        quantizer.map_color(pixel);
    }

    quantized
}

/// Places the image in the centre of a white canvas of given size. The image
/// is never scaled or cropped.
///
/// # Panics
/// Panics if the canvas is smaller than the image.
#[must_use]
pub fn pad_centered(image: &RgbaImage, size: CarrierSize) -> RgbaImage {
    assert!(
        size.width >= image.width() && size.height >= image.height(),
        "Canvas {}x{} is smaller than the image {}x{}",
        size.width,
        size.height,
        image.width(),
        image.height()
    );
    if image.dimensions() == size.dimensions() {
        return image.clone();
    }

    let mut canvas = RgbaImage::from_pixel(size.width, size.height, BACKGROUND);
    let x = (size.width - image.width()) / 2;
    let y = (size.height - image.height()) / 2;
    image::imageops::replace(&mut canvas, image, i64::from(x), i64::from(y));

    canvas
}
