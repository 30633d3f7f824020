//! Scripted AXI4-Lite master.

use std::collections::VecDeque;

use busway_axi::{Agent, AxiLiteBus, LiteAx, LiteParams, LiteW};
use busway_common::{Resp, Strobe, Word};

use crate::backpressure::Backpressure;
use crate::record::{Completion, OpKind, Transcript};

/// One AXI4-Lite operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteOp {
    /// Single-word read.
    Read {
        /// Byte address.
        addr: u64,
    },
    /// Single-word write.
    Write {
        /// Byte address.
        addr: u64,
        /// Write data.
        data: Word,
        /// Byte strobes.
        strb: Strobe,
    },
}

impl LiteOp {
    fn addr(&self) -> u64 {
        match *self {
            LiteOp::Read { addr } | LiteOp::Write { addr, .. } => addr,
        }
    }
}

/// Executes queued operations strictly in order, one at a time.
///
/// A write presents `aw` and `w` together and holds each until its own
/// handshake; a read presents `ar`. Response channels are ready unless the
/// backpressure generator stalls them.
#[derive(Debug, Clone)]
pub struct LiteMaster {
    params: LiteParams,
    ops: VecDeque<LiteOp>,
    addr_done: bool,
    data_done: bool,
    started: Option<u64>,
    cycle: u64,
    backpressure: Backpressure,
    completions: Vec<Completion>,
}

impl LiteMaster {
    /// Creates an idle master for a port with `params`.
    pub fn new(params: LiteParams) -> Self {
        Self {
            params,
            ops: VecDeque::new(),
            addr_done: false,
            data_done: false,
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

    /// Queues an operation; data and strobes are truncated to the bus width.
    pub fn push(&mut self, op: LiteOp) {
        let op = match op {
            LiteOp::Write { addr, data, strb } => LiteOp::Write {
                addr,
                data: data & self.params.data_width.mask(),
                strb: strb & self.params.data_width.strobe_mask(),
            },
            read => read,
        };
        self.ops.push_back(op);
    }

    /// Queues a read.
    pub fn read(&mut self, addr: u64) {
        self.push(LiteOp::Read { addr });
    }

    /// Queues a write.
    pub fn write(&mut self, addr: u64, data: Word, strb: Strobe) {
        self.push(LiteOp::Write { addr, data, strb });
    }

    /// Operations not yet completed.
    pub fn pending(&self) -> usize {
        self.ops.len()
    }

    fn complete(&mut self, op: LiteOp, resp: Resp, data: Option<Word>) {
        let (kind, data) = match data {
            Some(d) => (OpKind::Read, vec![d]),
            None => (OpKind::Write, Vec::new()),
        };
        tracing::debug!(?kind, addr = op.addr(), %resp, cycle = self.cycle, "lite transaction complete");
        self.completions.push(Completion {
            kind,
            addr: op.addr(),
            id: 0,
            resps: vec![resp],
            data,
            issued: self.started.unwrap_or(self.cycle),
            completed: self.cycle,
        });
        self.ops.pop_front();
        self.addr_done = false;
        self.data_done = false;
        self.started = None;
    }
}

impl Agent for LiteMaster {
    type Bus = AxiLiteBus;

    fn eval(&self, bus: &mut AxiLiteBus) {
        bus.aw.valid = false;
        bus.w.valid = false;
        bus.ar.valid = false;
        bus.b.ready = !self.backpressure.stalled();
        bus.r.ready = !self.backpressure.stalled();
        match self.ops.front() {
            Some(LiteOp::Write { addr, data, strb }) => {
                bus.aw.valid = !self.addr_done;
                bus.aw.payload = LiteAx { addr: *addr };
                bus.w.valid = !self.data_done;
                bus.w.payload = LiteW {
                    data: *data,
                    strb: *strb,
                };
            }
            Some(LiteOp::Read { addr }) => {
                bus.ar.valid = !self.addr_done;
                bus.ar.payload = LiteAx { addr: *addr };
            }
            None => {}
        }
    }

    fn tick(&mut self, bus: &AxiLiteBus) {
        if let Some(op) = self.ops.front().copied() {
            self.started.get_or_insert(self.cycle);
            match op {
                LiteOp::Write { .. } => {
                    self.addr_done |= bus.aw.fires();
                    self.data_done |= bus.w.fires();
                    if bus.b.fires() {
                        self.complete(op, bus.b.payload.resp, None);
                    }
                }
                LiteOp::Read { .. } => {
                    self.addr_done |= bus.ar.fires();
                    if bus.r.fires() {
                        self.complete(op, bus.r.payload.resp, Some(bus.r.payload.data));
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

impl Transcript for LiteMaster {
    fn completions(&self) -> &[Completion] {
        &self.completions
    }
}
