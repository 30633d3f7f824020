//! Cycle-stepped simulation kernel for the busway bus-bridge models.
//!
//! This crate implements the clocked-circuit execution model the bridges are
//! written against: a [`Design`] exposes combinational evaluation and a
//! clocked commit, and [`CycleKernel`] drives it one cycle at a time with an
//! evaluate-to-fixed-point phase followed by an atomic commit.
//!
//! # Usage
//!
//! ```ignore
//! use busway_sim::{simulate, SimConfig};
//!
//! let config = SimConfig::default();
//! let (result, design) = simulate(my_design, &config)?;
//! println!("finished at {}", result.final_cycle);
//! ```
//!
//! # Modules
//!
//! - `error`: Simulation error types
//! - `cycle`: Clock-cycle counter
//! - `probe`: Named wire enumeration for dumps
//! - `waveform`: Waveform recording (VCD format)
//! - `kernel`: The `Design` trait, `settle`, and the cycle loop

#![warn(missing_docs)]

pub mod cycle;
pub mod error;
pub mod kernel;
pub mod probe;
pub mod waveform;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

pub use cycle::Cycle;
pub use error::SimError;
pub use kernel::{settle, CycleKernel, Design, SimResult, DEFAULT_MAX_DELTAS};
pub use probe::{Probe, ProbeSample, Probes};
pub use waveform::{VcdRecorder, WaveformRecorder};

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Cycle budget; exceeding it is a [`SimError::CycleLimit`].
    pub max_cycles: u64,
    /// Evaluation passes allowed per cycle before declaring a loop.
    pub max_deltas: u32,
    /// Optional path for VCD output.
    pub waveform_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_cycles: 100_000,
            max_deltas: DEFAULT_MAX_DELTAS,
            waveform_path: None,
        }
    }
}

/// High-level entry point: runs `design` until it reports completion.
///
/// Creates a [`CycleKernel`], optionally attaches a VCD recorder, runs to
/// completion within the configured budget, and hands the design back so
/// callers can inspect what their agents observed.
pub fn simulate<D: Design>(design: D, config: &SimConfig) -> Result<(SimResult, D), SimError> {
    let mut kernel = CycleKernel::new(design);
    kernel.set_max_deltas(config.max_deltas);

    if let Some(path) = &config.waveform_path {
        let file = File::create(path)?;
        kernel.set_recorder(Box::new(VcdRecorder::new(BufWriter::new(file))));
    }

    kernel.run_until_done(config.max_cycles)?;
    let result = kernel.finish()?;
    Ok((result, kernel.into_design()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts down to zero, one per cycle.
    #[derive(Debug)]
    struct Countdown(u32);

    #[derive(Clone, Default, PartialEq)]
    struct Level(u32);

    impl Probe for Level {
        fn probe(&self, p: &mut Probes) {
            p.value("level", 32, u128::from(self.0));
        }
    }

    impl Design for Countdown {
        type Wires = Level;

        fn eval(&self, w: &mut Level) -> Result<(), SimError> {
            w.0 = self.0;
            Ok(())
        }

        fn tick(&mut self, _w: &Level) {
            self.0 = self.0.saturating_sub(1);
        }

        fn is_done(&self) -> bool {
            self.0 == 0
        }
    }

    #[test]
    fn sim_config_default() {
        let config = SimConfig::default();
        assert_eq!(config.max_cycles, 100_000);
        assert_eq!(config.max_deltas, DEFAULT_MAX_DELTAS);
        assert!(config.waveform_path.is_none());
    }

    #[test]
    fn simulate_to_completion() {
        let (result, design) = simulate(Countdown(5), &SimConfig::default()).unwrap();
        assert!(result.completed);
        assert_eq!(result.final_cycle.index(), 5);
        assert_eq!(design.0, 0);
    }

    #[test]
    fn simulate_respects_budget() {
        let config = SimConfig {
            max_cycles: 3,
            ..SimConfig::default()
        };
        let err = simulate(Countdown(5), &config).unwrap_err();
        assert!(matches!(err, SimError::CycleLimit { limit: 3 }));
    }

    #[test]
    fn simulate_writes_vcd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countdown.vcd");
        let config = SimConfig {
            waveform_path: Some(path.clone()),
            ..SimConfig::default()
        };
        simulate(Countdown(3), &config).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("$var wire 32 ! level $end"));
        assert!(text.contains("#2\n"));
    }
}
