//! Scripted AXI4-Lite slave with per-address responses.

use std::collections::{HashMap, HashSet};

use busway_axi::{arbitrate, Agent, AxiLiteBus, Direction, LiteParams};
use busway_common::{Resp, Strobe, Word};
use serde::Serialize;

use crate::backpressure::Backpressure;

/// A write as accepted by the responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiteWrite {
    /// Byte address.
    pub addr: u64,
    /// Write data.
    pub data: Word,
    /// Byte strobes.
    pub strb: Strobe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Response {
    Write(Resp),
    Read(Resp, Word),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Respond { response: Response, delay: u32 },
}

/// An AXI4-Lite slave answering one transaction at a time.
///
/// A write is accepted only when its address and data are both offered. Each
/// response is held back by `latency` cycles and carries the code registered
/// for its word address (OKAY by default). Silent addresses are never
/// accepted, leaving the master to a timeout guard.
#[derive(Debug, Clone)]
pub struct LiteResponder {
    params: LiteParams,
    latency: u32,
    resps: HashMap<u64, Resp>,
    silent: HashSet<u64>,
    words: HashMap<u64, Word>,
    writes: Vec<LiteWrite>,
    reads: Vec<u64>,
    state: State,
    last_was_read: bool,
    backpressure: Backpressure,
}

impl LiteResponder {
    /// Creates a responder backed by a zeroed word memory.
    pub fn new(params: LiteParams) -> Self {
        Self {
            params,
            latency: 0,
            resps: HashMap::new(),
            silent: HashSet::new(),
            words: HashMap::new(),
            writes: Vec::new(),
            reads: Vec::new(),
            state: State::Idle,
            last_was_read: false,
            backpressure: Backpressure::never(),
        }
    }

    /// Delays every response by `cycles`.
    pub fn with_latency(mut self, cycles: u32) -> Self {
        self.latency = cycles;
        self
    }

    /// Holds the address channels not-ready on stalled cycles.
    pub fn with_backpressure(mut self, backpressure: Backpressure) -> Self {
        self.backpressure = backpressure;
        self
    }

    /// Answers transactions to the word containing `addr` with `resp`.
    pub fn set_resp(&mut self, addr: u64, resp: Resp) {
        let key = self.key(addr);
        self.resps.insert(key, resp);
    }

    /// Never accepts transactions to the word containing `addr`.
    pub fn set_silent(&mut self, addr: u64) {
        let key = self.key(addr);
        self.silent.insert(key);
    }

    /// The word containing `addr`.
    pub fn word(&self, addr: u64) -> Word {
        self.words.get(&self.key(addr)).copied().unwrap_or(0)
    }

    /// Overwrites the word containing `addr`.
    pub fn set_word(&mut self, addr: u64, value: Word) {
        let key = self.key(addr);
        self.words.insert(key, value & self.params.data_width.mask());
    }

    /// Accepted writes, oldest first.
    pub fn writes(&self) -> &[LiteWrite] {
        &self.writes
    }

    /// Addresses of accepted reads, oldest first.
    pub fn reads(&self) -> &[u64] {
        &self.reads
    }

    fn key(&self, addr: u64) -> u64 {
        let align = u64::from(self.params.data_width.bytes()) - 1;
        addr & self.params.address_mask() & !align
    }

    fn resp_for(&self, addr: u64) -> Resp {
        self.resps.get(&self.key(addr)).copied().unwrap_or_default()
    }

    fn choose(&self, bus: &AxiLiteBus) -> Option<Direction> {
        if self.backpressure.stalled() {
            return None;
        }
        let read = bus.ar.valid && !self.silent.contains(&self.key(bus.ar.payload.addr));
        let write = bus.aw.valid
            && bus.w.valid
            && !self.silent.contains(&self.key(bus.aw.payload.addr));
        arbitrate(read, write, self.last_was_read)
    }
}

impl Agent for LiteResponder {
    type Bus = AxiLiteBus;

    fn eval(&self, bus: &mut AxiLiteBus) {
        bus.aw.ready = false;
        bus.w.ready = false;
        bus.ar.ready = false;
        bus.b.valid = false;
        bus.r.valid = false;
        match self.state {
            State::Idle => match self.choose(bus) {
                Some(Direction::Write) => {
                    bus.aw.ready = true;
                    bus.w.ready = true;
                }
                Some(Direction::Read) => bus.ar.ready = true,
                None => {}
            },
            State::Respond { response, delay } => {
                let ready = delay == 0;
                match response {
                    Response::Write(resp) => {
                        bus.b.valid = ready;
                        bus.b.payload.resp = resp;
                    }
                    Response::Read(resp, data) => {
                        bus.r.valid = ready;
                        bus.r.payload.resp = resp;
                        bus.r.payload.data = data;
                    }
                }
            }
        }
    }

    fn tick(&mut self, bus: &AxiLiteBus) {
        match self.state {
            State::Idle => {
                if bus.aw.fires() && bus.w.fires() {
                    let addr = bus.aw.payload.addr;
                    let data = bus.w.payload.data;
                    let strb = bus.w.payload.strb;
                    self.writes.push(LiteWrite { addr, data, strb });
                    let resp = self.resp_for(addr);
                    if resp.is_okay() {
                        let key = self.key(addr);
                        let word = self.words.entry(key).or_default();
                        for lane in 0..self.params.data_width.bytes() {
                            if strb & (1 << lane) != 0 {
                                let m: Word = 0xFF << (lane * 8);
                                *word = (*word & !m) | (data & m);
                            }
                        }
                    }
                    tracing::trace!(addr, %resp, "responder write");
                    self.last_was_read = false;
                    self.state = State::Respond {
                        response: Response::Write(resp),
                        delay: self.latency,
                    };
                } else if bus.ar.fires() {
                    let addr = bus.ar.payload.addr;
                    self.reads.push(addr);
                    let resp = self.resp_for(addr);
                    let data = if resp.is_okay() {
                        self.word(addr)
                    } else {
                        self.params.data_width.mask()
                    };
                    tracing::trace!(addr, %resp, "responder read");
                    self.last_was_read = true;
                    self.state = State::Respond {
                        response: Response::Read(resp, data),
                        delay: self.latency,
                    };
                }
            }
            State::Respond { response, delay } => {
                if delay > 0 {
                    self.state = State::Respond {
                        response,
                        delay: delay - 1,
                    };
                } else if bus.b.fires() || bus.r.fires() {
                    self.state = State::Idle;
                }
            }
        }
        self.backpressure.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responder() -> LiteResponder {
        LiteResponder::new(LiteParams::new(32, 16).unwrap())
    }

    /// Offers `bus` to the responder for one cycle with the master always
    /// ready, returning the settled wires.
    fn cycle(r: &mut LiteResponder, mut bus: AxiLiteBus) -> AxiLiteBus {
        bus.b.ready = true;
        bus.r.ready = true;
        r.eval(&mut bus);
        r.tick(&bus);
        bus
    }

    fn write(addr: u64, data: Word) -> AxiLiteBus {
        let mut bus = AxiLiteBus::default();
        bus.aw.valid = true;
        bus.aw.payload.addr = addr;
        bus.w.valid = true;
        bus.w.payload.data = data;
        bus.w.payload.strb = 0xF;
        bus
    }

    fn read(addr: u64) -> AxiLiteBus {
        let mut bus = AxiLiteBus::default();
        bus.ar.valid = true;
        bus.ar.payload.addr = addr;
        bus
    }

    #[test]
    fn write_needs_address_and_data() {
        let mut r = responder();
        let mut bus = write(0x8, 1);
        bus.w.valid = false;
        let bus = cycle(&mut r, bus);
        assert!(!bus.aw.ready);

        let bus = cycle(&mut r, write(0x8, 0x55));
        assert!(bus.aw.ready && bus.w.ready);
        let bus = cycle(&mut r, AxiLiteBus::default());
        assert!(bus.b.valid);
        assert_eq!(bus.b.payload.resp, Resp::Okay);
        assert_eq!(r.word(0x8), 0x55);
        assert_eq!(r.writes()[0].addr, 0x8);
    }

    #[test]
    fn error_address_answers_code_and_keeps_memory() {
        let mut r = responder();
        r.set_resp(0x10, Resp::DecErr);
        cycle(&mut r, write(0x12, 7));
        let bus = cycle(&mut r, AxiLiteBus::default());
        assert_eq!(bus.b.payload.resp, Resp::DecErr);
        assert_eq!(r.word(0x10), 0);

        cycle(&mut r, read(0x10));
        let bus = cycle(&mut r, AxiLiteBus::default());
        assert!(bus.r.valid);
        assert_eq!(bus.r.payload.resp, Resp::DecErr);
        assert_eq!(bus.r.payload.data, 0xFFFF_FFFF);
    }

    #[test]
    fn latency_delays_response() {
        let mut r = responder().with_latency(2);
        r.set_word(0x4, 0x99);
        cycle(&mut r, read(0x4));
        assert!(!cycle(&mut r, AxiLiteBus::default()).r.valid);
        assert!(!cycle(&mut r, AxiLiteBus::default()).r.valid);
        let bus = cycle(&mut r, AxiLiteBus::default());
        assert!(bus.r.valid);
        assert_eq!(bus.r.payload.data, 0x99);
        assert_eq!(r.reads(), [0x4]);
    }

    #[test]
    fn silent_address_is_never_accepted() {
        let mut r = responder();
        r.set_silent(0x20);
        for _ in 0..10 {
            assert!(!cycle(&mut r, read(0x20)).ar.ready);
        }
        assert!(r.reads().is_empty());
    }

    #[test]
    fn alternates_when_both_pending() {
        let mut r = responder();
        let mut both = write(0x0, 1);
        both.ar.valid = true;
        both.ar.payload.addr = 0x4;

        let bus = cycle(&mut r, both);
        assert!(bus.ar.ready && !bus.aw.ready);
        cycle(&mut r, AxiLiteBus::default());
        let bus = cycle(&mut r, both);
        assert!(bus.aw.ready && !bus.ar.ready);
    }
}
