//! AXI response codes and sticky error aggregation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A two-bit AXI response code carried on the `b` and `r` channels.
///
/// The discriminants match the wire encoding (`OKAY = 0b00` through
/// `DECERR = 0b11`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Resp {
    /// Normal access success.
    #[default]
    Okay = 0b00,
    /// Exclusive access success.
    ExOkay = 0b01,
    /// The slave was reached but reported an error.
    SlvErr = 0b10,
    /// No slave decoded the address.
    DecErr = 0b11,
}

impl Resp {
    /// Decodes a response from the low two bits of `bits`.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Resp::Okay,
            0b01 => Resp::ExOkay,
            0b10 => Resp::SlvErr,
            _ => Resp::DecErr,
        }
    }

    /// Returns the two-bit wire encoding.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Returns `true` for [`Resp::Okay`].
    pub fn is_okay(self) -> bool {
        self == Resp::Okay
    }

    /// Folds a sub-transaction response into an accumulated one.
    ///
    /// The first non-`OKAY` code wins: once `self` holds an error it is
    /// returned unchanged, otherwise `next` replaces it.
    #[must_use]
    pub fn sticky(self, next: Resp) -> Resp {
        if self.is_okay() {
            next
        } else {
            self
        }
    }
}

impl fmt::Display for Resp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resp::Okay => write!(f, "OKAY"),
            Resp::ExOkay => write!(f, "EXOKAY"),
            Resp::SlvErr => write!(f, "SLVERR"),
            Resp::DecErr => write!(f, "DECERR"),
        }
    }
}
