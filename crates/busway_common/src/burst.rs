//! AXI burst types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two-bit AXI `burst` field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum BurstMode {
    /// Every beat targets the same address.
    Fixed = 0b00,
    /// Each beat advances the address by the beat size.
    #[default]
    Incr = 0b01,
    /// Incrementing, wrapping at a window of `(len + 1) << size` bytes.
    Wrap = 0b10,
    /// Reserved encoding, never valid on the wire.
    Reserved = 0b11,
}

impl BurstMode {
    /// Decodes a burst mode from the low two bits of `bits`.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => BurstMode::Fixed,
            0b01 => BurstMode::Incr,
            0b10 => BurstMode::Wrap,
            _ => BurstMode::Reserved,
        }
    }

    /// Returns the two-bit wire encoding.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Returns `true` if beat addresses advance under this mode.
    pub fn advances(self) -> bool {
        matches!(self, BurstMode::Incr | BurstMode::Wrap)
    }
}

impl fmt::Display for BurstMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurstMode::Fixed => write!(f, "FIXED"),
            BurstMode::Incr => write!(f, "INCR"),
            BurstMode::Wrap => write!(f, "WRAP"),
            BurstMode::Reserved => write!(f, "RESERVED"),
        }
    }
}
