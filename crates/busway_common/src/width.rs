//! Data-bus widths and the word/strobe carriers sized to the widest bus.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A data word as carried on any modelled bus (up to [`MAX_DATA_WIDTH`] bits).
pub type Word = u128;

/// A byte-strobe / byte-select mask (one bit per data byte).
pub type Strobe = u16;

/// Widest data bus the models carry, in bits.
pub const MAX_DATA_WIDTH: u32 = Word::BITS;

/// Returns `log2(n)` when `n` is a power of two.
pub fn log2_int(n: u64) -> Option<u32> {
    if n.is_power_of_two() {
        Some(n.trailing_zeros())
    } else {
        None
    }
}

/// A data width rejected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid data width {bits}: must be a power of two between 8 and 128 bits")]
pub struct InvalidWidth {
    /// The rejected width in bits.
    pub bits: u32,
}

/// A validated data-bus width.
///
/// Always a power of two between 8 and [`MAX_DATA_WIDTH`] bits, so it maps
/// onto a whole number of byte lanes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DataWidth(u32);

impl DataWidth {
    /// Validates a width given in bits.
    pub fn new(bits: u32) -> Result<Self, InvalidWidth> {
        if (8..=MAX_DATA_WIDTH).contains(&bits) && bits.is_power_of_two() {
            Ok(Self(bits))
        } else {
            Err(InvalidWidth { bits })
        }
    }

    /// Width in bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Width in bytes (number of strobe lanes).
    pub fn bytes(self) -> u32 {
        self.0 / 8
    }

    /// Number of low byte-address bits covered by one word.
    pub fn addr_shift(self) -> u32 {
        self.bytes().trailing_zeros()
    }

    /// Mask covering every data bit.
    pub fn mask(self) -> Word {
        if self.0 == MAX_DATA_WIDTH {
            Word::MAX
        } else {
            (1 << self.0) - 1
        }
    }

    /// Mask covering every strobe lane.
    pub fn strobe_mask(self) -> Strobe {
        if self.bytes() == Strobe::BITS {
            Strobe::MAX
        } else {
            (1 << self.bytes()) - 1
        }
    }
}

impl TryFrom<u32> for DataWidth {
    type Error = InvalidWidth;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<DataWidth> for u32 {
    fn from(w: DataWidth) -> u32 {
        w.0
    }
}

impl fmt::Debug for DataWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataWidth({})", self.0)
    }
}

impl fmt::Display for DataWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.0)
    }
}
