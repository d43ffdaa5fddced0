use std::fmt::{Display, Formatter};
use std::str::FromStr;

use derive_more::Deref;

/// An ordered sequence of bits, most significant bit of each value first.
///
/// `Display` and `FromStr` use a string of `0` and `1` characters.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Deref)]
pub struct Bits(Vec<bool>);

impl Bits {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Creates a bit sequence of `len` zeros.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self(vec![false; len])
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        self.0.push(bit);
    }

    /// Appends the lowest `width` bits of `value`, most significant first.
    ///
    /// # Examples
    /// ```
    /// use nucpix::bits::Bits;
    ///
    /// let mut bits = Bits::new();
    /// bits.push_bits(0b0110, 4);
    /// assert_eq!(bits.to_string(), "0110");
    /// ```
    #[inline]
    pub fn push_bits(&mut self, value: u8, width: usize) {
        debug_assert!(width <= 8);

        for shift in (0..width).rev() {
            self.0.push((value >> shift) & 1 == 1);
        }
    }

    pub fn extend_from_bits(&mut self, other: &[bool]) {
        self.0.extend_from_slice(other);
    }
}

/// Reads `width` bits starting at `start` as an unsigned value.
///
/// # Panics
/// Panics if the range is out of bounds or `width` exceeds 8.
#[inline]
#[must_use]
pub fn read_bits(bits: &[bool], start: usize, width: usize) -> u8 {
    assert!(width <= 8);

    bits[start..start + width]
        .iter()
        .fold(0, |acc, &bit| (acc << 1) | u8::from(bit))
}

impl From<Vec<bool>> for Bits {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

impl FromIterator<bool> for Bits {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<bool> for Bits {
    fn extend<I: IntoIterator<Item = bool>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl Display for Bits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for &bit in &self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }

        Ok(())
    }
}

/// Error returned when parsing a [`Bits`] string containing characters other
/// than `0` and `1`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct InvalidBitChar(pub char);

impl Display for InvalidBitChar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid bit character: `{}`", self.0)
    }
}

impl std::error::Error for InvalidBitChar {}

impl FromStr for Bits {
    type Err = InvalidBitChar;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(InvalidBitChar(c)),
            })
            .collect()
    }
}
