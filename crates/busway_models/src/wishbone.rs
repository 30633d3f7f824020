//! Wishbone memory slave and scripted Wishbone master.

use std::collections::{HashMap, VecDeque};
use std::ops::Range;

use busway_axi::{Agent, WishboneBus, WishboneParams};
use busway_common::{Resp, Strobe, Word};
use serde::Serialize;

use crate::record::{Completion, OpKind, Transcript};

/// One bus cycle terminated by the memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WishboneAccess {
    /// Write enable.
    pub we: bool,
    /// Word address.
    pub adr: u64,
    /// Write data as presented.
    pub dat_w: Word,
    /// Byte selects.
    pub sel: Strobe,
    /// Terminated with `err` rather than `ack`.
    pub err: bool,
}

/// A word-addressed memory with a registered `ack`.
///
/// A request seen on cycle `n` is terminated on cycle `n + 1 + latency`;
/// `ack` (or `err`) is a one-cycle pulse. Word addresses inside an error
/// window are terminated with `err` and leave the memory untouched.
#[derive(Debug, Clone)]
pub struct WishboneMemory {
    params: WishboneParams,
    words: HashMap<u64, Word>,
    latency: u32,
    waited: u32,
    error_windows: Vec<Range<u64>>,
    log: Vec<WishboneAccess>,
    ack: bool,
    err: bool,
    dat_r: Word,
}

impl WishboneMemory {
    /// Creates an empty memory answering after one cycle.
    pub fn new(params: WishboneParams) -> Self {
        Self {
            params,
            words: HashMap::new(),
            latency: 0,
            waited: 0,
            error_windows: Vec::new(),
            log: Vec::new(),
            ack: false,
            err: false,
            dat_r: 0,
        }
    }

    /// Adds `cycles` wait states before each termination.
    pub fn with_latency(mut self, cycles: u32) -> Self {
        self.latency = cycles;
        self
    }

    /// Terminates accesses to the word addresses in `window` with `err`.
    pub fn add_error_window(&mut self, window: Range<u64>) {
        self.error_windows.push(window);
    }

    /// The word at `adr`; unwritten words read as zero.
    pub fn word(&self, adr: u64) -> Word {
        self.words
            .get(&(adr & self.params.address_mask()))
            .copied()
            .unwrap_or(0)
    }

    /// Overwrites the word at `adr`.
    pub fn set_word(&mut self, adr: u64, value: Word) {
        self.words.insert(
            adr & self.params.address_mask(),
            value & self.params.data_width.mask(),
        );
    }

    /// Every terminated bus cycle, oldest first.
    pub fn log(&self) -> &[WishboneAccess] {
        &self.log
    }

    fn faulty(&self, adr: u64) -> bool {
        self.error_windows.iter().any(|w| w.contains(&adr))
    }
}

impl Agent for WishboneMemory {
    type Bus = WishboneBus;

    fn eval(&self, bus: &mut WishboneBus) {
        bus.ack = self.ack;
        bus.err = self.err;
        bus.dat_r = self.dat_r;
    }

    fn tick(&mut self, bus: &WishboneBus) {
        let terminating = self.ack || self.err;
        self.ack = false;
        self.err = false;
        if !bus.request() || terminating {
            self.waited = 0;
            return;
        }
        if self.waited < self.latency {
            self.waited += 1;
            return;
        }
        self.waited = 0;

        let adr = bus.adr & self.params.address_mask();
        let err = self.faulty(adr);
        self.log.push(WishboneAccess {
            we: bus.we,
            adr,
            dat_w: bus.dat_w,
            sel: bus.sel,
            err,
        });
        if err {
            tracing::debug!(adr, we = bus.we, "wishbone error window hit");
            self.err = true;
            self.dat_r = self.params.data_width.mask();
            return;
        }
        self.ack = true;
        let word = self.words.entry(adr).or_default();
        if bus.we {
            for lane in 0..self.params.data_width.bytes() {
                if bus.sel & (1 << lane) != 0 {
                    let m: Word = 0xFF << (lane * 8);
                    *word = (*word & !m) | (bus.dat_w & m);
                }
            }
        }
        self.dat_r = *word;
    }
}

/// One Wishbone bus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishboneOp {
    /// Read of one word.
    Read {
        /// Word address.
        adr: u64,
    },
    /// Write of one word.
    Write {
        /// Word address.
        adr: u64,
        /// Write data.
        data: Word,
        /// Byte selects.
        sel: Strobe,
    },
}

/// Runs queued Wishbone cycles one at a time, holding `cyc`/`stb` until
/// the slave terminates each with `ack` or `err`.
#[derive(Debug, Clone)]
pub struct WishboneMaster {
    params: WishboneParams,
    ops: VecDeque<WishboneOp>,
    started: Option<u64>,
    cycle: u64,
    completions: Vec<Completion>,
}

impl WishboneMaster {
    /// Creates an idle master.
    pub fn new(params: WishboneParams) -> Self {
        Self {
            params,
            ops: VecDeque::new(),
            started: None,
            cycle: 0,
            completions: Vec::new(),
        }
    }

    /// Queues a cycle; address, data and selects are truncated to the bus.
    pub fn push(&mut self, op: WishboneOp) {
        let adr_mask = self.params.address_mask();
        let op = match op {
            WishboneOp::Read { adr } => WishboneOp::Read {
                adr: adr & adr_mask,
            },
            WishboneOp::Write { adr, data, sel } => WishboneOp::Write {
                adr: adr & adr_mask,
                data: data & self.params.data_width.mask(),
                sel: sel & self.params.data_width.strobe_mask(),
            },
        };
        self.ops.push_back(op);
    }

    /// Queues a read.
    pub fn read(&mut self, adr: u64) {
        self.push(WishboneOp::Read { adr });
    }

    /// Queues a write.
    pub fn write(&mut self, adr: u64, data: Word, sel: Strobe) {
        self.push(WishboneOp::Write { adr, data, sel });
    }
}

impl Agent for WishboneMaster {
    type Bus = WishboneBus;

    fn eval(&self, bus: &mut WishboneBus) {
        let Some(op) = self.ops.front() else {
            bus.cyc = false;
            bus.stb = false;
            bus.we = false;
            return;
        };
        bus.cyc = true;
        bus.stb = true;
        match *op {
            WishboneOp::Read { adr } => {
                bus.adr = adr;
                bus.we = false;
                bus.sel = self.params.data_width.strobe_mask();
            }
            WishboneOp::Write { adr, data, sel } => {
                bus.adr = adr;
                bus.we = true;
                bus.dat_w = data;
                bus.sel = sel;
            }
        }
    }

    fn tick(&mut self, bus: &WishboneBus) {
        if let Some(op) = self.ops.front().copied() {
            self.started.get_or_insert(self.cycle);
            if bus.ack || bus.err {
                let resp = if bus.err { Resp::SlvErr } else { Resp::Okay };
                let (kind, adr, data) = match op {
                    WishboneOp::Read { adr } => (OpKind::Read, adr, vec![bus.dat_r]),
                    WishboneOp::Write { adr, .. } => (OpKind::Write, adr, Vec::new()),
                };
                tracing::debug!(?kind, adr, %resp, cycle = self.cycle, "wishbone cycle complete");
                self.completions.push(Completion {
                    kind,
                    addr: adr,
                    id: 0,
                    resps: vec![resp],
                    data,
                    issued: self.started.unwrap_or(self.cycle),
                    completed: self.cycle,
                });
                self.ops.pop_front();
                self.started = None;
            }
        }
        self.cycle += 1;
    }

    fn is_done(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Transcript for WishboneMaster {
    fn completions(&self) -> &[Completion] {
        &self.completions
    }
}
