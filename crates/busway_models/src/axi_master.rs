//! Scripted AXI4 burst master.

use std::collections::VecDeque;

use busway_axi::{Agent, AxPayload, AxiBus, AxiParams, BridgeError, WPayload};
use busway_common::{Resp, Strobe, Word};

use crate::backpressure::Backpressure;
use crate::record::{Completion, OpKind, Transcript};

/// One AXI4 burst.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxiOp {
    /// Write burst with one data word and strobe per beat.
    Write {
        /// Burst descriptor.
        ax: AxPayload,
        /// Write data, one word per beat.
        data: Vec<Word>,
        /// Byte strobes, one per beat.
        strb: Vec<Strobe>,
    },
    /// Read burst.
    Read {
        /// Burst descriptor.
        ax: AxPayload,
    },
}

impl AxiOp {
    fn ax(&self) -> &AxPayload {
        match self {
            AxiOp::Write { ax, .. } | AxiOp::Read { ax } => ax,
        }
    }
}

/// Issues one burst at a time and records what comes back.
///
/// Writes present `aw` and the first `w` beat together; `b` closes the
/// burst. Reads present `ar` and expect `len + 1` beats on `r`.
#[derive(Debug, Clone)]
pub struct AxiMaster {
    params: AxiParams,
    ops: VecDeque<AxiOp>,
    addr_done: bool,
    beat: usize,
    resps: Vec<Resp>,
    data: Vec<Word>,
    started: Option<u64>,
    cycle: u64,
    backpressure: Backpressure,
    completions: Vec<Completion>,
}

impl AxiMaster {
    /// Creates an idle master for a port with `params`.
    pub fn new(params: AxiParams) -> Self {
        Self {
            params,
            ops: VecDeque::new(),
            addr_done: false,
            beat: 0,
            resps: Vec::new(),
            data: Vec::new(),
            started: None,
            cycle: 0,
            backpressure: Backpressure::never(),
            completions: Vec::new(),
        }
    }

    /// Gates the response channels with `backpressure`.
    pub fn with_backpressure(mut self, backpressure: Backpressure) -> Self {
        self.backpressure = backpressure;
        self
    }

    /// Queues a write burst with all strobes set.
    pub fn write(&mut self, ax: AxPayload, data: Vec<Word>) -> Result<(), BridgeError> {
        let strb = vec![self.params.data_width.strobe_mask(); data.len()];
        self.write_with_strobes(ax, data, strb)
    }

    /// Queues a write burst with explicit per-beat strobes.
    pub fn write_with_strobes(
        &mut self,
        ax: AxPayload,
        data: Vec<Word>,
        strb: Vec<Strobe>,
    ) -> Result<(), BridgeError> {
        let ax = self.check(ax)?;
        let beats = ax.beats() as usize;
        if data.len() != beats || strb.len() != beats {
            return Err(BridgeError::InvalidBurst {
                reason: format!(
                    "{beats}-beat burst given {} data words and {} strobes",
                    data.len(),
                    strb.len()
                ),
            });
        }
        let mask = self.params.data_width.mask();
        let lanes = self.params.data_width.strobe_mask();
        self.ops.push_back(AxiOp::Write {
            ax,
            data: data.into_iter().map(|d| d & mask).collect(),
            strb: strb.into_iter().map(|s| s & lanes).collect(),
        });
        Ok(())
    }

    /// Queues a read burst.
    pub fn read(&mut self, ax: AxPayload) -> Result<(), BridgeError> {
        let ax = self.check(ax)?;
        self.ops.push_back(AxiOp::Read { ax });
        Ok(())
    }

    /// Bursts not yet completed.
    pub fn pending(&self) -> usize {
        self.ops.len()
    }

    fn check(&self, ax: AxPayload) -> Result<AxPayload, BridgeError> {
        ax.validate(self.params.data_width)?;
        let id_limit = if self.params.id_width >= 32 {
            u32::MAX
        } else {
            (1 << self.params.id_width) - 1
        };
        if ax.id > id_limit {
            return Err(BridgeError::InvalidBurst {
                reason: format!("id {} does not fit in {} bits", ax.id, self.params.id_width),
            });
        }
        Ok(ax)
    }

    fn complete(&mut self, kind: OpKind, ax: AxPayload) {
        tracing::debug!(
            ?kind,
            addr = ax.addr,
            id = ax.id,
            beats = ax.beats(),
            cycle = self.cycle,
            "burst complete"
        );
        self.completions.push(Completion {
            kind,
            addr: ax.addr,
            id: ax.id,
            resps: std::mem::take(&mut self.resps),
            data: std::mem::take(&mut self.data),
            issued: self.started.unwrap_or(self.cycle),
            completed: self.cycle,
        });
        self.ops.pop_front();
        self.addr_done = false;
        self.beat = 0;
        self.started = None;
    }
}

impl Agent for AxiMaster {
    type Bus = AxiBus;

    fn eval(&self, bus: &mut AxiBus) {
        bus.aw.valid = false;
        bus.w.valid = false;
        bus.ar.valid = false;
        bus.b.ready = !self.backpressure.stalled();
        bus.r.ready = !self.backpressure.stalled();
        match self.ops.front() {
            Some(AxiOp::Write { ax, data, strb }) => {
                bus.aw.valid = !self.addr_done;
                bus.aw.payload = *ax;
                if let (Some(d), Some(s)) = (data.get(self.beat), strb.get(self.beat)) {
                    bus.w.valid = true;
                    bus.w.payload = WPayload {
                        data: *d,
                        strb: *s,
                        id: ax.id,
                        last: self.beat + 1 == data.len(),
                    };
                }
            }
            Some(AxiOp::Read { ax }) => {
                bus.ar.valid = !self.addr_done;
                bus.ar.payload = *ax;
            }
            None => {}
        }
    }

    fn tick(&mut self, bus: &AxiBus) {
        if let Some(op) = self.ops.front() {
            let ax = *op.ax();
            let write = matches!(op, AxiOp::Write { .. });
            self.started.get_or_insert(self.cycle);
            if write {
                self.addr_done |= bus.aw.fires();
                if bus.w.fires() {
                    self.beat += 1;
                }
                if bus.b.fires() {
                    if bus.b.payload.id != ax.id {
                        tracing::warn!(expected = ax.id, got = bus.b.payload.id, "write response id mismatch");
                    }
                    self.resps.push(bus.b.payload.resp);
                    self.complete(OpKind::Write, ax);
                }
            } else {
                self.addr_done |= bus.ar.fires();
                if bus.r.fires() {
                    self.resps.push(bus.r.payload.resp);
                    self.data.push(bus.r.payload.data);
                    self.beat += 1;
                    let last = self.beat == ax.beats() as usize;
                    if bus.r.payload.last != last {
                        tracing::warn!(beat = self.beat, addr = ax.addr, "read last flag out of place");
                    }
                    if last {
                        self.complete(OpKind::Read, ax);
                    }
                }
            }
        }
        self.backpressure.advance();
        self.cycle += 1;
    }

    fn is_done(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Transcript for AxiMaster {
    fn completions(&self) -> &[Completion] {
        &self.completions
    }
}
