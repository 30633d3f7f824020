//! Clock-cycle counter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A clock-cycle index, counted from zero at reset.
///
/// Every [`CycleKernel::step`](crate::kernel::CycleKernel::step) evaluates
/// cycle `n` and then advances to `n + 1`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Cycle(u64);

impl Cycle {
    /// The reset cycle.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Creates a cycle from its raw index.
    pub fn from_raw(index: u64) -> Self {
        Self(index)
    }

    /// Returns the raw cycle index.
    pub fn index(self) -> u64 {
        self.0
    }

    /// Returns the following cycle.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Number of cycles elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: Cycle) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle {}", self.0)
    }
}
