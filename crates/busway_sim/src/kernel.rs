//! Cycle-stepped simulation kernel with a two-phase evaluate/commit loop.
//!
//! A [`Design`] owns all registered state; its wires live in the kernel.
//! Each [`CycleKernel::step`] performs, in order:
//!
//! 1. **evaluate**: [`Design::eval`] is re-run until the wire bundle reaches a
//!    fixed point ([`settle`]), so combinational paths that cross component
//!    boundaries in either direction are resolved;
//! 2. **sample**: the settled wires are recorded to the waveform, if any;
//! 3. **compute + commit**: [`Design::tick`] derives next state from the
//!    settled (immutable) wires and commits it.
//!
//! Because `tick` only ever sees the settled snapshot, no component can
//! observe another component's post-update state within the same cycle.

use crate::cycle::Cycle;
use crate::error::SimError;
use crate::probe::Probe;
use crate::waveform::WaveformRecorder;

/// Default bound on evaluation passes per cycle.
pub const DEFAULT_MAX_DELTAS: u32 = 64;

/// A synchronous design: combinational outputs plus clocked state.
pub trait Design {
    /// Every wire the design's components drive or observe.
    type Wires: Clone + PartialEq + Default + Probe;

    /// Drives combinational outputs as a function of registered state and the
    /// current wire values. Must be idempotent for fixed inputs.
    fn eval(&self, wires: &mut Self::Wires) -> Result<(), SimError>;

    /// Computes and commits next registered state from settled wires.
    fn tick(&mut self, wires: &Self::Wires);

    /// Returns `true` once the design has nothing left to do.
    ///
    /// Used by [`CycleKernel::run_until_done`]; free-running designs keep the
    /// default.
    fn is_done(&self) -> bool {
        false
    }
}

/// Re-runs `eval` on `wires` until they stop changing.
///
/// Returns the number of evaluation passes performed (at least one), or
/// [`SimError::Unsettled`] if `max_deltas` passes were not enough.
pub fn settle<W, F>(wires: &mut W, max_deltas: u32, mut eval: F) -> Result<u32, SimError>
where
    W: Clone + PartialEq,
    F: FnMut(&mut W) -> Result<(), SimError>,
{
    for pass in 1..=max_deltas {
        let before = wires.clone();
        eval(wires)?;
        if *wires == before {
            return Ok(pass);
        }
    }
    Err(SimError::Unsettled { max_deltas })
}

/// The result of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimResult {
    /// The cycle the kernel stopped at.
    pub final_cycle: Cycle,
    /// Total evaluation passes across all cycles.
    pub total_deltas: u64,
    /// Whether the design reported [`Design::is_done`].
    pub completed: bool,
}

/// The simulation kernel: one design, its wires, and the clock.
pub struct CycleKernel<D: Design> {
    design: D,
    wires: D::Wires,
    cycle: Cycle,
    max_deltas: u32,
    total_deltas: u64,
    recorder: Option<Box<dyn WaveformRecorder>>,
    /// Last recorded value per probed signal; `None` until registration.
    recorded: Option<Vec<u128>>,
}

impl<D: Design> CycleKernel<D> {
    /// Creates a kernel at cycle zero with all wires at their defaults.
    pub fn new(design: D) -> Self {
        Self {
            design,
            wires: D::Wires::default(),
            cycle: Cycle::zero(),
            max_deltas: DEFAULT_MAX_DELTAS,
            total_deltas: 0,
            recorder: None,
            recorded: None,
        }
    }

    /// Sets the maximum number of evaluation passes per cycle.
    pub fn set_max_deltas(&mut self, max: u32) {
        self.max_deltas = max;
    }

    /// Attaches a waveform recorder to the kernel.
    pub fn set_recorder(&mut self, recorder: Box<dyn WaveformRecorder>) {
        self.recorder = Some(recorder);
        self.recorded = None;
    }

    /// Returns the current cycle.
    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    /// Returns the design.
    pub fn design(&self) -> &D {
        &self.design
    }

    /// Returns the design mutably, e.g. to queue more stimulus.
    pub fn design_mut(&mut self) -> &mut D {
        &mut self.design
    }

    /// Returns the wire values as of the last settle.
    pub fn wires(&self) -> &D::Wires {
        &self.wires
    }

    /// Consumes the kernel, returning the design.
    pub fn into_design(self) -> D {
        self.design
    }

    /// Settles combinational logic for the current cycle without advancing.
    ///
    /// Returns the number of evaluation passes taken.
    pub fn settle(&mut self) -> Result<u32, SimError> {
        let design = &self.design;
        settle(&mut self.wires, self.max_deltas, |w| design.eval(w)).map_err(|e| match e {
            SimError::Unsettled { max_deltas } => SimError::DeltaCycleLimit {
                cycle: self.cycle.index(),
                max_deltas,
            },
            other => other,
        })
    }

    /// Advances the simulation by one clock cycle.
    pub fn step(&mut self) -> Result<(), SimError> {
        let passes = self.settle()?;
        self.total_deltas += u64::from(passes);
        tracing::trace!(cycle = self.cycle.index(), passes, "settled");

        self.record()?;
        self.design.tick(&self.wires);
        self.cycle = self.cycle.next();
        Ok(())
    }

    /// Runs exactly `cycles` clock cycles.
    pub fn run(&mut self, cycles: u64) -> Result<SimResult, SimError> {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(self.result())
    }

    /// Steps until [`Design::is_done`] or until `max_cycles` have elapsed.
    ///
    /// Exceeding the budget is an error: a bridge that never completes a
    /// transaction is a hang, not a result.
    pub fn run_until_done(&mut self, max_cycles: u64) -> Result<SimResult, SimError> {
        let start = self.cycle;
        while !self.design.is_done() {
            if self.cycle.since(start) >= max_cycles {
                return Err(SimError::CycleLimit { limit: max_cycles });
            }
            self.step()?;
        }
        tracing::debug!(cycles = self.cycle.since(start), "design completed");
        Ok(self.result())
    }

    /// Flushes the waveform recorder, if any, and returns the run summary.
    pub fn finish(&mut self) -> Result<SimResult, SimError> {
        if let Some(rec) = self.recorder.as_mut() {
            rec.finalize()?;
        }
        Ok(self.result())
    }

    fn result(&self) -> SimResult {
        SimResult {
            final_cycle: self.cycle,
            total_deltas: self.total_deltas,
            completed: self.design.is_done(),
        }
    }

    fn record(&mut self) -> Result<(), SimError> {
        let Some(rec) = self.recorder.as_mut() else {
            return Ok(());
        };
        let samples = self.wires.sample().into_samples();
        let cycle = self.cycle.index();

        match self.recorded.as_mut() {
            None => {
                rec.begin_scope("top")?;
                for (index, s) in samples.iter().enumerate() {
                    rec.register_signal(index, &s.name, s.width)?;
                }
                rec.end_scope()?;
                for (index, s) in samples.iter().enumerate() {
                    rec.record_change(cycle, index, s.value)?;
                }
                self.recorded = Some(samples.iter().map(|s| s.value).collect());
            }
            Some(last) => {
                for (index, s) in samples.iter().enumerate() {
                    if last.get(index) != Some(&s.value) {
                        rec.record_change(cycle, index, s.value)?;
                        if let Some(slot) = last.get_mut(index) {
                            *slot = s.value;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
