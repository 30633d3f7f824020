//! AXI4 to AXI4-Lite bridge.
//!
//! Each accepted burst is segmented into beats and every beat becomes one
//! Lite transaction. Only one Lite transaction is outstanding at a time, so
//! responses map back to beats in order without any tracking table.
//!
//! Read data is forwarded beat by beat with the Lite response code of that
//! beat. Write responses are merged with sticky-error semantics and reported
//! once, after the last beat's Lite response arrives.

use busway_common::{BurstMode, Resp};
use busway_sim::SimError;

use crate::burst::{Beat, BurstSegmenter};
use crate::channel::Channel;
use crate::component::{arbitrate, Bridge, Direction};
use crate::error::BridgeError;
use crate::interface::{
    AxPayload, AxiBus, AxiLiteBus, AxiParams, BPayload, LiteAx, LiteParams, LiteW, RPayload,
};
use crate::stream::PipeValid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Read,
    Write,
    WriteResponse,
}

/// Wires internal to the bridge, recomputed from the settled buses.
struct Internal {
    sink: Channel<AxPayload>,
    sink_dir: Option<Direction>,
    burst: Channel<AxPayload>,
    beat: Channel<Beat>,
}

/// Full AXI4 slave, AXI4-Lite master.
#[derive(Debug, Clone)]
pub struct Axi2AxiLite {
    params: AxiParams,
    buffer: PipeValid<AxPayload>,
    segmenter: BurstSegmenter,
    state: State,
    last_was_read: bool,
    /// The last beat's address handshake has completed.
    cmd_done: bool,
    /// A Lite address handshake is outstanding.
    addr_sent: bool,
    /// The current beat's write data has been forwarded.
    w_sent: bool,
    resp: Resp,
}

impl Axi2AxiLite {
    /// Builds a bridge supporting FIXED, INCR and WRAP bursts.
    pub fn new(axi: AxiParams, lite: LiteParams) -> Result<Self, BridgeError> {
        Self::with_capabilities(axi, lite, &[BurstMode::Fixed, BurstMode::Incr, BurstMode::Wrap])
    }

    /// Builds a bridge whose segmenter supports only the listed burst modes.
    pub fn with_capabilities(
        axi: AxiParams,
        lite: LiteParams,
        capabilities: &[BurstMode],
    ) -> Result<Self, BridgeError> {
        if axi.data_width != lite.data_width {
            return Err(BridgeError::WidthMismatch {
                master: axi.data_width.bits(),
                slave: lite.data_width.bits(),
            });
        }
        if axi.address_width != lite.address_width {
            return Err(BridgeError::AddressWidthMismatch {
                master: axi.address_width,
                slave: lite.address_width,
            });
        }
        Ok(Self {
            params: axi,
            buffer: PipeValid::default(),
            segmenter: BurstSegmenter::new(capabilities)?,
            state: State::Idle,
            last_was_read: false,
            cmd_done: false,
            addr_sent: false,
            w_sent: false,
            resp: Resp::Okay,
        })
    }

    /// Returns `true` when no burst is in progress.
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle && !self.buffer.is_occupied()
    }

    fn drive(&self, axi: &mut AxiBus, lite: &mut AxiLiteBus) -> Internal {
        axi.aw.ready = false;
        axi.w.ready = false;
        axi.ar.ready = false;
        axi.b.valid = false;
        axi.b.payload = BPayload::default();
        axi.r.valid = false;
        axi.r.payload = RPayload::default();
        lite.aw.valid = false;
        lite.w.valid = false;
        lite.ar.valid = false;
        lite.b.ready = true;
        lite.r.ready = false;

        let mut burst = self.buffer.source();
        let (mut beat, _) = self.segmenter.drive(&burst, false);
        let addr = beat.payload.addr & self.params.lite().address_mask();
        lite.aw.payload = LiteAx { addr };
        lite.ar.payload = LiteAx { addr };
        lite.w.payload = LiteW {
            data: axi.w.payload.data,
            strb: axi.w.payload.strb,
        };

        match self.state {
            State::Idle => {}
            State::Read => {
                let issue = beat.valid && !self.cmd_done && !self.addr_sent;
                lite.ar.valid = issue;
                // The last beat is held until its data has been returned.
                beat.ready = issue && lite.ar.ready && !beat.payload.last;
                axi.r.valid = lite.r.valid;
                axi.r.payload = RPayload {
                    resp: lite.r.payload.resp,
                    data: lite.r.payload.data,
                    id: beat.payload.id,
                    last: self.cmd_done,
                };
                lite.r.ready = axi.r.ready;
                if axi.r.fires() && self.cmd_done {
                    beat.ready = true;
                }
            }
            State::Write => {
                let issue = beat.valid && !self.cmd_done && !self.addr_sent;
                lite.aw.valid = issue;
                beat.ready = issue && lite.aw.ready && !beat.payload.last;
                lite.w.valid = axi.w.valid && !self.w_sent;
                axi.w.ready = lite.w.ready && !self.w_sent;
            }
            State::WriteResponse => {
                axi.b.valid = true;
                axi.b.payload = BPayload {
                    resp: self.resp,
                    id: beat.payload.id,
                };
                beat.ready = axi.b.ready;
            }
        }
        let (_, burst_ready) = self.segmenter.drive(&burst, beat.ready);
        burst.ready = burst_ready;

        let mut sink = Channel::default();
        let mut sink_dir = None;
        if self.state == State::Idle {
            let ready = self.buffer.sink_ready(burst.ready);
            sink_dir = arbitrate(axi.ar.valid, axi.aw.valid, self.last_was_read);
            match sink_dir {
                Some(Direction::Read) => {
                    axi.ar.ready = ready;
                    sink = axi.ar;
                }
                Some(Direction::Write) => {
                    axi.aw.ready = ready;
                    sink = axi.aw;
                }
                None => {}
            }
        }

        Internal {
            sink,
            sink_dir,
            burst,
            beat,
        }
    }
}

impl Bridge for Axi2AxiLite {
    type Master = AxiBus;
    type Slave = AxiLiteBus;

    fn eval(&self, axi: &mut AxiBus, lite: &mut AxiLiteBus) -> Result<(), SimError> {
        self.drive(axi, lite);
        Ok(())
    }

    fn tick(&mut self, axi: &AxiBus, lite: &AxiLiteBus) {
        let (mut axi, mut lite) = (*axi, *lite);
        let wires = self.drive(&mut axi, &mut lite);
        let beat = wires.beat.payload;

        match self.state {
            State::Idle => {
                self.cmd_done = false;
                self.addr_sent = false;
                self.w_sent = false;
                self.resp = Resp::Okay;
                if wires.sink.fires() {
                    let ax = wires.sink.payload;
                    match wires.sink_dir {
                        Some(Direction::Read) => {
                            tracing::debug!(addr = ax.addr, len = ax.len, burst = %ax.burst, "axi read burst accepted");
                            self.last_was_read = true;
                            self.state = State::Read;
                        }
                        Some(Direction::Write) => {
                            tracing::debug!(addr = ax.addr, len = ax.len, burst = %ax.burst, "axi write burst accepted");
                            self.last_was_read = false;
                            self.state = State::Write;
                        }
                        None => {}
                    }
                }
            }
            State::Read => {
                if lite.ar.fires() {
                    self.addr_sent = true;
                    if beat.last {
                        self.cmd_done = true;
                    }
                }
                if lite.r.fires() {
                    self.addr_sent = false;
                }
                if axi.r.fires() && self.cmd_done {
                    self.state = State::Idle;
                }
            }
            State::Write => {
                let final_cmd = self.cmd_done || (lite.aw.fires() && beat.last);
                if lite.aw.fires() {
                    self.addr_sent = true;
                    self.cmd_done = final_cmd;
                }
                if lite.w.fires() {
                    self.w_sent = true;
                }
                if lite.b.fires() {
                    self.resp = self.resp.sticky(lite.b.payload.resp);
                    self.addr_sent = false;
                    self.w_sent = false;
                    if final_cmd {
                        self.state = State::WriteResponse;
                    }
                }
            }
            State::WriteResponse => {
                if axi.b.fires() {
                    self.state = State::Idle;
                }
            }
        }

        self.segmenter.tick(&wires.burst, wires.beat.valid && wires.beat.ready);
        self.buffer.tick(&wires.sink, wires.burst.ready);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sram::LiteSram;
    use crate::testbench::{step, AxiScript};

    fn params() -> (AxiParams, LiteParams) {
        let axi = AxiParams::new(32, 32, 4).unwrap();
        (axi, axi.lite())
    }

    fn incr(addr: u64, len: u8, id: u32) -> AxPayload {
        AxPayload {
            addr,
            burst: BurstMode::Incr,
            len,
            size: 2,
            id,
            ..AxPayload::default()
        }
    }

    fn bench() -> (Axi2AxiLite, LiteSram) {
        let (axi, lite) = params();
        (
            Axi2AxiLite::new(axi, lite).unwrap(),
            LiteSram::new(lite, 0x10000, false).unwrap(),
        )
    }

    #[test]
    fn rejects_mismatched_ports() {
        let axi = AxiParams::new(64, 32, 4).unwrap();
        let lite = LiteParams::new(32, 32).unwrap();
        assert!(matches!(
            Axi2AxiLite::new(axi, lite),
            Err(BridgeError::WidthMismatch {
                master: 64,
                slave: 32
            })
        ));
        let lite = LiteParams::new(64, 16).unwrap();
        assert!(matches!(
            Axi2AxiLite::new(axi, lite),
            Err(BridgeError::AddressWidthMismatch { .. })
        ));
        assert!(matches!(
            Axi2AxiLite::with_capabilities(axi, axi.lite(), &[BurstMode::Incr]),
            Err(BridgeError::MissingFixedBurst)
        ));
    }

    #[test]
    fn write_then_read_burst() {
        let (mut bridge, mut sram) = bench();
        let mut master = AxiScript::default();
        master.write(incr(0x100, 3, 5), &[1, 2, 3, 4]);
        let mut lite_writes = 0;
        for _ in 0..64 {
            let (_, lite) = step(&mut master, &mut bridge, &mut sram);
            lite_writes += usize::from(lite.aw.fires());
        }
        assert_eq!(lite_writes, 4);
        assert_eq!(master.b.len(), 1);
        assert_eq!(master.b[0].resp, Resp::Okay);
        assert_eq!(master.b[0].id, 5);

        master.read(incr(0x100, 3, 6));
        for _ in 0..64 {
            step(&mut master, &mut bridge, &mut sram);
        }
        let data: Vec<_> = master.r.iter().map(|r| r.data).collect();
        assert_eq!(data, [1, 2, 3, 4]);
        let last: Vec<_> = master.r.iter().map(|r| r.last).collect();
        assert_eq!(last, [false, false, false, true]);
        assert!(master.r.iter().all(|r| r.id == 6));
        assert!(bridge.is_idle());
    }

    #[test]
    fn one_lite_transaction_outstanding() {
        let (mut bridge, mut sram) = bench();
        let mut master = AxiScript::default();
        master.read(incr(0x0, 7, 0));
        let mut outstanding = 0i32;
        for _ in 0..80 {
            let (_, lite) = step(&mut master, &mut bridge, &mut sram);
            if lite.ar.fires() {
                outstanding += 1;
            }
            assert!(outstanding <= 1);
            if lite.r.fires() {
                outstanding -= 1;
            }
        }
        assert_eq!(master.r.len(), 8);
    }

    #[test]
    fn read_and_write_alternate() {
        let (mut bridge, mut sram) = bench();
        let mut master = AxiScript::default();
        master.write(incr(0x0, 0, 1), &[0xA]);
        master.read(incr(0x0, 0, 2));
        master.write(incr(0x4, 0, 3), &[0xB]);
        master.read(incr(0x4, 0, 4));
        let mut order = Vec::new();
        for _ in 0..64 {
            let (axi, _) = step(&mut master, &mut bridge, &mut sram);
            if axi.ar.fires() {
                order.push('r');
            }
            if axi.aw.fires() {
                order.push('w');
            }
        }
        assert_eq!(order, ['r', 'w', 'r', 'w']);
        assert_eq!(master.r.len(), 2);
        assert_eq!(master.b.len(), 2);
    }
}
