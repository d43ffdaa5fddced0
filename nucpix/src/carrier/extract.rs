use image::RgbaImage;

use crate::bits::Bits;
use crate::carrier::check_dimensions;
use crate::carrier::layout::{FrameWindow, BITS_PER_PIXEL};
use crate::carrier::CarrierResult;

#[inline]
fn push_pixel_diff(bits: &mut Bits, original: &image::Rgba<u8>, encoded: &image::Rgba<u8>) {
    for channel in 0..BITS_PER_PIXEL {
        bits.push(original.0[channel] != encoded.0[channel]);
    }
}

/// Recovers one bit per channel of every pixel, in row-major pixel order:
/// `1` where the encoded image differs from the original.
///
/// The result is the embedded frame followed by zeros only when the frame
/// window spans the whole carrier. In a larger carrier the window is centred
/// and its rows are interleaved with unchanged pixels; use [`extract_window`]
/// to read a frame back.
pub fn extract(original: &RgbaImage, encoded: &RgbaImage) -> CarrierResult<Bits> {
    check_dimensions(original, encoded)?;

    let mut bits = Bits::with_capacity(original.as_raw().len());
    for (original, encoded) in original.pixels().zip(encoded.pixels()) {
        push_pixel_diff(&mut bits, original, encoded);
    }

    Ok(bits)
}

/// Recovers the bits of a single frame window, in the order they were
/// embedded. The result is the frame followed by zeros up to the window
/// capacity.
pub fn extract_window(
    original: &RgbaImage,
    encoded: &RgbaImage,
    window: FrameWindow,
) -> CarrierResult<Bits> {
    check_dimensions(original, encoded)?;

    let mut bits = Bits::with_capacity(window.capacity_bits());
    for index in 0..window.pixel_count() {
        let (x, y) = window.pixel(index);
        push_pixel_diff(&mut bits, original.get_pixel(x, y), encoded.get_pixel(x, y));
    }

    Ok(bits)
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use crate::bits::Bits;
    use crate::carrier::embed::embed;
    use crate::carrier::extract::{extract, extract_window};
    use crate::carrier::layout::{frame_side, FrameWindow};
    use crate::carrier::CarrierError;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                (x * 37 % 256) as u8,
                (y * 91 % 256) as u8,
                ((x + y) * 13 % 256) as u8,
                255,
            ])
        })
    }

    #[test]
    fn test_extract_inverts_embed() {
        let bits: Bits = "1011001110001111010100000001".parse().unwrap();
        let side = frame_side(bits.len());
        let carrier = gradient(side, side);

        let encoded = embed(&carrier, &bits).unwrap();
        let extracted = extract(&carrier, &encoded).unwrap();

        let mut expected = bits.clone();
        expected.extend_from_bits(&Bits::zeros(extracted.len() - bits.len()));
        assert_eq!(extracted.len(), (side * side * 4) as usize);
        assert_eq!(extracted, expected);
    }

    #[test]
    fn test_extract_window_in_larger_carrier() {
        let bits: Bits = "0110".repeat(30).parse().unwrap();
        let carrier = gradient(31, 17);
        let window = FrameWindow::new(bits.len(), 31, 17).unwrap();

        let encoded = embed(&carrier, &bits).unwrap();
        let extracted = extract_window(&carrier, &encoded, window).unwrap();

        assert_eq!(&extracted[..bits.len()], &bits[..]);
        assert!(extracted[bits.len()..].iter().all(|&bit| !bit));
        assert_eq!(extracted.len(), window.capacity_bits());
    }

    #[test]
    fn test_extract_full_image_in_larger_carrier() {
        let bits: Bits = "0110".repeat(30).parse().unwrap();
        let carrier = gradient(31, 17);

        let encoded = embed(&carrier, &bits).unwrap();
        let extracted = extract(&carrier, &encoded).unwrap();

        // the window starts at (12, 5), so the first row is untouched
        assert!(extracted[..31 * 4].iter().all(|&bit| !bit));
        assert_ne!(&extracted[..bits.len()], &bits[..]);
        assert_eq!(
            extracted.iter().filter(|&&bit| bit).count(),
            bits.iter().filter(|&&bit| bit).count()
        );
    }

    #[test]
    fn test_extract_full_image_length() {
        let carrier = gradient(7, 5);
        let extracted = extract(&carrier, &carrier).unwrap();

        assert_eq!(extracted, Bits::zeros(7 * 5 * 4));
    }

    #[test]
    fn test_extract_dimension_mismatch() {
        let result = extract(&gradient(4, 4), &gradient(4, 5));
        assert!(matches!(
            result,
            Err(CarrierError::DimensionMismatch {
                expected: (4, 4),
                actual: (4, 5)
            })
        ));
    }
}
