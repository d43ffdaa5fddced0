use image::RgbaImage;

use crate::carrier::layout::{FrameWindow, BITS_PER_PIXEL};
use crate::carrier::{CarrierError, CarrierResult};

/// Channel offset applied for every `1` bit.
pub const TOGGLE_OFFSET: u8 = 127;

#[inline]
fn toggle(value: u8) -> u8 {
    if value <= TOGGLE_OFFSET {
        value + TOGGLE_OFFSET
    } else {
        value - TOGGLE_OFFSET
    }
}

/// Embeds the bits into a copy of the carrier, in the frame window centred
/// in the carrier.
///
/// # Examples
/// ```
/// use image::{Rgba, RgbaImage};
/// use nucpix::bits::Bits;
/// use nucpix::carrier::embed::embed;
///
/// let carrier = RgbaImage::from_pixel(1, 1, Rgba([0, 127, 128, 255]));
/// let bits: Bits = "1111".parse().unwrap();
/// let encoded = embed(&carrier, &bits).unwrap();
/// assert_eq!(encoded.get_pixel(0, 0), &Rgba([127, 254, 1, 128]));
/// ```
pub fn embed(carrier: &RgbaImage, bits: &[bool]) -> CarrierResult<RgbaImage> {
    let window = FrameWindow::new(bits.len(), carrier.width(), carrier.height())?;
    embed_in_window(carrier, window, bits)
}

/// Embeds the bits into a copy of the carrier, in given window.
pub fn embed_in_window(
    carrier: &RgbaImage,
    window: FrameWindow,
    bits: &[bool],
) -> CarrierResult<RgbaImage> {
    let fits_carrier = window.left() + window.side() <= carrier.width()
        && window.top() + window.side() <= carrier.height();
    if bits.len() > window.capacity_bits() || !fits_carrier {
        return Err(CarrierError::FrameTooLarge {
            bits: bits.len(),
            width: carrier.width(),
            height: carrier.height(),
        });
    }

    let mut encoded = carrier.clone();
    for (index, group) in bits.chunks(BITS_PER_PIXEL).enumerate() {
        let (x, y) = window.pixel(index);
        let pixel = encoded.get_pixel_mut(x, y);
        for (channel, &bit) in group.iter().enumerate() {
            if bit {
                pixel.0[channel] = toggle(pixel.0[channel]);
            }
        }
    }

    log::trace!(
        "Embedded {} bits in a {}x{} window at ({}, {})",
        bits.len(),
        window.side(),
        window.side(),
        window.left(),
        window.top()
    );
    Ok(encoded)
}
