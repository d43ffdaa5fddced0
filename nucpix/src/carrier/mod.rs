//! Carrier images: sizing, embedding, extraction and the image files
//! holding them.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

pub mod container;
pub mod embed;
pub mod extract;
pub mod image_store;
pub mod layout;

#[derive(Debug)]
pub enum CarrierError {
    Io(io::Error),
    Image(image::ImageError),
    PngEncoding(png::EncodingError),
    PngDecoding(png::DecodingError),
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    FrameTooLarge {
        bits: usize,
        width: u32,
        height: u32,
    },
    UnsupportedContainer(String),
    EmptyContainer,
}

impl Display for CarrierError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CarrierError::Io(_) => write!(f, "I/O error"),
            CarrierError::Image(_) => write!(f, "Could not process the image"),
            CarrierError::PngEncoding(_) => write!(f, "Could not encode the PNG container"),
            CarrierError::PngDecoding(_) => write!(f, "Could not decode the PNG container"),
            CarrierError::DimensionMismatch { expected, actual } => write!(
                f,
                "Image dimensions mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            CarrierError::FrameTooLarge {
                bits,
                width,
                height,
            } => write!(
                f,
                "Frame of {} bits does not fit in a {}x{} carrier",
                bits, width, height
            ),
            CarrierError::UnsupportedContainer(message) => {
                write!(f, "Unsupported container: {}", message)
            }
            CarrierError::EmptyContainer => write!(f, "Container has no frames"),
        }
    }
}

impl Error for CarrierError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CarrierError::Io(e) => Some(e),
            CarrierError::Image(e) => Some(e),
            CarrierError::PngEncoding(e) => Some(e),
            CarrierError::PngDecoding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CarrierError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<image::ImageError> for CarrierError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}

impl From<png::EncodingError> for CarrierError {
    fn from(e: png::EncodingError) -> Self {
        Self::PngEncoding(e)
    }
}

impl From<png::DecodingError> for CarrierError {
    fn from(e: png::DecodingError) -> Self {
        Self::PngDecoding(e)
    }
}

pub type CarrierResult<T> = Result<T, CarrierError>;

pub(crate) fn check_dimensions(
    expected: &image::RgbaImage,
    actual: &image::RgbaImage,
) -> CarrierResult<()> {
    if expected.dimensions() == actual.dimensions() {
        Ok(())
    } else {
        Err(CarrierError::DimensionMismatch {
            expected: expected.dimensions(),
            actual: actual.dimensions(),
        })
    }
}
