use image::RgbaImage;

use crate::carrier::{CarrierError, CarrierResult};

/// Number of frame bits stored in a single pixel, one per channel.
pub const BITS_PER_PIXEL: usize = 4;

/// Returns the side of the smallest square pixel grid holding `bit_len` bits.
///
/// # Examples
/// ```
/// use nucpix::carrier::layout::frame_side;
///
/// assert_eq!(frame_side(0), 0);
/// assert_eq!(frame_side(4), 1);
/// assert_eq!(frame_side(5), 2);
/// assert_eq!(frame_side(64), 4);
/// assert_eq!(frame_side(68), 5);
/// ```
#[must_use]
pub fn frame_side(bit_len: usize) -> u32 {
    let pixels = (bit_len + BITS_PER_PIXEL - 1) / BITS_PER_PIXEL;

    let mut side = (pixels as f64).sqrt() as usize;
    while side * side < pixels {
        side += 1;
    }
    while side > 0 && (side - 1) * (side - 1) >= pixels {
        side -= 1;
    }

    side as u32
}

/// Dimensions of the carrier shared by every frame of one run.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CarrierSize {
    pub width: u32,
    pub height: u32,
}

impl CarrierSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Computes the carrier size for an image of given dimensions that has
    /// to hold every frame: the image is only ever enlarged, to at least the
    /// side of the largest frame in both directions.
    #[must_use]
    pub fn for_frames<I>(image_width: u32, image_height: u32, frame_lengths: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let side = frame_lengths.into_iter().map(frame_side).max().unwrap_or(0);

        Self {
            width: image_width.max(side),
            height: image_height.max(side),
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Square region of the carrier holding one frame, centred in the carrier.
///
/// Bit group `i` of the frame is stored in the pixel at row `i / side`,
/// column `i % side` of the window.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FrameWindow {
    side: u32,
    left: u32,
    top: u32,
}

impl FrameWindow {
    /// Creates the centred window of given side.
    ///
    /// # Panics
    /// Panics if the side exceeds either dimension.
    #[must_use]
    pub fn with_side(side: u32, width: u32, height: u32) -> Self {
        assert!(side <= width && side <= height);

        Self {
            side,
            left: (width - side) / 2,
            top: (height - side) / 2,
        }
    }

    /// Creates the window for a frame of `bit_len` bits in a carrier of given
    /// dimensions.
    pub fn new(bit_len: usize, width: u32, height: u32) -> CarrierResult<Self> {
        let side = frame_side(bit_len);
        if side > width || side > height {
            return Err(CarrierError::FrameTooLarge {
                bits: bit_len,
                width,
                height,
            });
        }

        Ok(Self::with_side(side, width, height))
    }

    #[must_use]
    pub fn side(&self) -> u32 {
        self.side
    }

    #[must_use]
    pub fn left(&self) -> u32 {
        self.left
    }

    #[must_use]
    pub fn top(&self) -> u32 {
        self.top
    }

    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.side as usize * self.side as usize
    }

    #[must_use]
    pub fn capacity_bits(&self) -> usize {
        self.pixel_count() * BITS_PER_PIXEL
    }

    /// Returns the `(x, y)` carrier coordinates of the `index`-th pixel.
    #[inline]
    #[must_use]
    pub fn pixel(&self, index: usize) -> (u32, u32) {
        let side = self.side as usize;
        (
            self.left + (index % side) as u32,
            self.top + (index / side) as u32,
        )
    }

    /// Returns the windows that can have produced the differences between
    /// the original and the encoded image, smallest first.
    ///
    /// The first frame pixel always differs, so the top-left differing pixel
    /// is the window corner. A corner can be shared by two adjacent sides;
    /// both are returned when every difference fits in each of them, and the
    /// caller has to tell them apart from the decoded frame. An empty result
    /// means the images are identical or were not produced by embedding.
    pub fn locate(original: &RgbaImage, encoded: &RgbaImage) -> CarrierResult<Vec<FrameWindow>> {
        super::check_dimensions(original, encoded)?;
        let (width, height) = original.dimensions();

        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in encoded.enumerate_pixels() {
            if original.get_pixel(x, y) == pixel {
                continue;
            }

            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }

        let (min_x, min_y, max_x, max_y) = match bounds {
            Some(bounds) => bounds,
            None => return Ok(Vec::new()),
        };

        let windows = (1..=width.min(height))
            .map(|side| FrameWindow::with_side(side, width, height))
            .filter(|window| {
                window.left == min_x
                    && window.top == min_y
                    && max_x < window.left + window.side
                    && max_y < window.top + window.side
            })
            .collect();
        Ok(windows)
    }
}
