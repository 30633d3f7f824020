//! Slave-timeout guard for AXI4-Lite.
//!
//! [`LiteTimeout`] sits between a master and a possibly unresponsive slave.
//! While waiting it forwards every channel unchanged. If a request stays
//! un-accepted for the configured number of cycles, the guard pulses
//! [`LiteTimeout::error`] for one cycle and then completes the request
//! itself: it accepts the pending address and data and answers SLVERR (reads
//! return all-ones data).

use busway_common::Resp;
use busway_sim::SimError;

use crate::component::Bridge;
use crate::error::BridgeError;
use crate::interface::{AxiLiteBus, LiteParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Wait,
    RespondWrite,
    RespondRead,
}

/// AXI4-Lite slave-timeout guard.
#[derive(Debug, Clone)]
pub struct LiteTimeout {
    params: LiteParams,
    cycles: u32,
    remaining: u32,
    state: State,
}

impl LiteTimeout {
    /// Builds a guard that fires after `cycles` cycles of a stalled request.
    pub fn new(params: LiteParams, cycles: u32) -> Result<Self, BridgeError> {
        if cycles == 0 {
            return Err(BridgeError::ZeroTimeout);
        }
        Ok(Self {
            params,
            cycles,
            remaining: cycles,
            state: State::Wait,
        })
    }

    /// The configured timeout in cycles.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// The one-cycle timeout pulse, given the settled master-side bus.
    pub fn error(&self, master: &AxiLiteBus) -> bool {
        self.state == State::Wait
            && self.remaining == 0
            && (master.write_pending() || master.read_pending())
    }
}

impl Bridge for LiteTimeout {
    type Master = AxiLiteBus;
    type Slave = AxiLiteBus;

    fn eval(&self, master: &mut AxiLiteBus, slave: &mut AxiLiteBus) -> Result<(), SimError> {
        match self.state {
            State::Wait => AxiLiteBus::connect(master, slave),
            State::RespondWrite => {
                slave.aw.valid = false;
                slave.w.valid = false;
                slave.ar.valid = false;
                slave.b.ready = false;
                slave.r.ready = false;
                master.aw.ready = master.aw.valid;
                master.w.ready = master.w.valid;
                master.b.valid = !master.aw.valid && !master.w.valid;
                master.b.payload.resp = Resp::SlvErr;
                master.ar.ready = false;
                master.r.valid = false;
            }
            State::RespondRead => {
                slave.aw.valid = false;
                slave.w.valid = false;
                slave.ar.valid = false;
                slave.b.ready = false;
                slave.r.ready = false;
                master.aw.ready = false;
                master.w.ready = false;
                master.b.valid = false;
                master.ar.ready = master.ar.valid;
                master.r.valid = !master.ar.valid;
                master.r.payload.resp = Resp::SlvErr;
                master.r.payload.data = self.params.data_width.mask();
            }
        }
        Ok(())
    }

    fn tick(&mut self, master: &AxiLiteBus, _slave: &AxiLiteBus) {
        match self.state {
            State::Wait => {
                let write = master.write_pending();
                let read = master.read_pending();
                if self.remaining == 0 && (write || read) {
                    tracing::warn!(cycles = self.cycles, write, "slave timeout, synthesizing SLVERR");
                    self.state = if write {
                        State::RespondWrite
                    } else {
                        State::RespondRead
                    };
                }
                if write || read {
                    self.remaining = self.remaining.saturating_sub(1);
                } else {
                    self.remaining = self.cycles;
                }
            }
            State::RespondWrite => {
                self.remaining = self.cycles;
                if master.b.fires() {
                    self.state = State::Wait;
                }
            }
            State::RespondRead => {
                self.remaining = self.cycles;
                if master.r.fires() {
                    self.state = State::Wait;
                }
            }
        }
    }
}
