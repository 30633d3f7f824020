//! Construction-time error types for the bridges.
//!
//! Every precondition a bridge relies on is checked when it is built; a
//! [`BridgeError`] means the bridge refused to exist rather than misbehave at
//! runtime. Protocol-level failures (slave errors, timeouts) are never
//! errors of this kind: they travel as [`Resp`](busway_common::Resp) codes.

use busway_common::InvalidWidth;

/// Errors raised while constructing a bridge or validating a burst descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// A data width is not a power of two between 8 and 128 bits.
    #[error(transparent)]
    InvalidDataWidth(#[from] InvalidWidth),

    /// An address width is zero or wider than 64 bits.
    #[error("invalid address width {bits}: must be between 1 and 64 bits")]
    InvalidAddressWidth {
        /// The rejected width in bits.
        bits: u32,
    },

    /// A transaction-id width is wider than 32 bits.
    #[error("invalid id width {bits}: must be at most 32 bits")]
    InvalidIdWidth {
        /// The rejected width in bits.
        bits: u32,
    },

    /// Two ports that must share a data width do not.
    #[error("data width mismatch: master is {master} bits, slave is {slave} bits")]
    WidthMismatch {
        /// Master-side data width in bits.
        master: u32,
        /// Slave-side data width in bits.
        slave: u32,
    },

    /// Two ports that must cover the same address space do not.
    #[error("address width mismatch: master is {master} bits, slave is {slave} bits")]
    AddressWidthMismatch {
        /// Master-side (byte) address width in bits.
        master: u32,
        /// Slave-side address width in bits, expressed in bytes.
        slave: u32,
    },

    /// Widening data-width conversion is not implemented.
    #[error("up-conversion from {from} to {to} bits is not supported")]
    UnsupportedUpConversion {
        /// Master-side data width in bits.
        from: u32,
        /// Slave-side data width in bits.
        to: u32,
    },

    /// A timeout guard was configured with zero cycles.
    #[error("timeout must be at least one cycle")]
    ZeroTimeout,

    /// A burst segmenter capability set lacks FIXED bursts.
    #[error("burst segmenter must support FIXED bursts")]
    MissingFixedBurst,

    /// A burst descriptor violates the AXI rules for its bus.
    #[error("invalid burst: {reason}")]
    InvalidBurst {
        /// Description of the violated rule.
        reason: String,
    },

    /// A base address is not aligned to the bus word size.
    #[error("base address {base:#x} is not aligned to {align} bytes")]
    MisalignedBase {
        /// The rejected base address.
        base: u64,
        /// Required alignment in bytes.
        align: u32,
    },

    /// A memory was sized to hold no words.
    #[error("memory of {bytes} bytes holds no {word_bytes}-byte words")]
    EmptyMemory {
        /// Requested size in bytes.
        bytes: u64,
        /// Word size in bytes.
        word_bytes: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_width_is_transparent() {
        let e = BridgeError::from(InvalidWidth { bits: 24 });
        assert_eq!(
            e.to_string(),
            "invalid data width 24: must be a power of two between 8 and 128 bits"
        );
    }

    #[test]
    fn width_mismatch_display() {
        let e = BridgeError::WidthMismatch {
            master: 64,
            slave: 32,
        };
        assert_eq!(
            e.to_string(),
            "data width mismatch: master is 64 bits, slave is 32 bits"
        );
    }

    #[test]
    fn up_conversion_display() {
        let e = BridgeError::UnsupportedUpConversion { from: 32, to: 64 };
        assert_eq!(
            e.to_string(),
            "up-conversion from 32 to 64 bits is not supported"
        );
    }

    #[test]
    fn zero_timeout_display() {
        assert_eq!(
            BridgeError::ZeroTimeout.to_string(),
            "timeout must be at least one cycle"
        );
    }

    #[test]
    fn invalid_burst_display() {
        let e = BridgeError::InvalidBurst {
            reason: "WRAP length 3 is not a power of two".into(),
        };
        assert_eq!(
            e.to_string(),
            "invalid burst: WRAP length 3 is not a power of two"
        );
    }

    #[test]
    fn misaligned_base_display() {
        let e = BridgeError::MisalignedBase {
            base: 0x1002,
            align: 4,
        };
        assert_eq!(
            e.to_string(),
            "base address 0x1002 is not aligned to 4 bytes"
        );
    }

    #[test]
    fn empty_memory_display() {
        let e = BridgeError::EmptyMemory {
            bytes: 2,
            word_bytes: 4,
        };
        assert_eq!(e.to_string(), "memory of 2 bytes holds no 4-byte words");
    }
}
