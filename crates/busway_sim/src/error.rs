//! Simulation error types for the cycle-stepped kernel.
//!
//! All errors that can occur while settling or stepping a design are
//! represented as variants of [`SimError`].

use std::io;

/// Errors that can occur during simulation setup or execution.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A combinational evaluation did not reach a fixed point.
    ///
    /// Raised by [`settle`](crate::kernel::settle) itself; the kernel rewraps
    /// it as [`SimError::DeltaCycleLimit`] with the failing cycle attached.
    #[error("combinational logic did not settle within {max_deltas} passes")]
    Unsettled {
        /// The maximum number of evaluation passes allowed.
        max_deltas: u32,
    },

    /// Too many delta passes in one cycle, indicating a combinational loop.
    #[error("delta cycle limit exceeded at cycle {cycle} (max {max_deltas} deltas)")]
    DeltaCycleLimit {
        /// The cycle in which the limit was hit.
        cycle: u64,
        /// The maximum number of delta passes allowed.
        max_deltas: u32,
    },

    /// The design did not report completion within the cycle budget.
    #[error("cycle limit exceeded: {limit} cycles")]
    CycleLimit {
        /// The cycle budget that was exhausted.
        limit: u64,
    },

    /// A waveform change was recorded for a signal that was never registered.
    #[error("unregistered waveform signal {index}")]
    UnregisteredSignal {
        /// Recorder-side signal index.
        index: usize,
    },

    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),
}
