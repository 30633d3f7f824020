//! AXI4-Lite to simple memory-port adapter.
//!
//! The adapter serves one Lite transaction at a time against a port with a
//! single address, a write-enable and a read-data input that the port owner
//! registers one cycle after the address. There is no acknowledge on the
//! port: a write completes in the cycle it is issued, a read's data is taken
//! from `dat_r` in the following cycle. Every response is OKAY.
//!
//! CSR banks and block RAMs are thin wrappers over [`LiteToSimple`]; see
//! [`Lite2Csr`](crate::csr::Lite2Csr) and [`LiteSram`](crate::sram::LiteSram).

use busway_common::{Resp, Strobe};
use busway_sim::SimError;

use crate::component::{arbitrate, Bridge, Direction};
use crate::interface::{AxiLiteBus, LiteParams, SimplePort};

/// Granularity of the port's write-enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteEnable {
    /// One enable bit, set when any strobe lane is set.
    Word,
    /// One enable bit per byte lane, copied from the strobes.
    Byte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    SendReadResponse,
    SendWriteResponse,
}

/// The Lite-to-simple state machine.
#[derive(Debug, Clone)]
pub struct LiteToSimple {
    params: LiteParams,
    granularity: WriteEnable,
    state: State,
    last_was_read: bool,
    read_adr: u64,
}

impl LiteToSimple {
    /// Builds an adapter for a Lite port with the given write-enable shape.
    pub fn new(params: LiteParams, granularity: WriteEnable) -> Self {
        Self {
            params,
            granularity,
            state: State::Start,
            last_was_read: false,
            read_adr: 0,
        }
    }

    /// The Lite port parameters.
    pub fn params(&self) -> &LiteParams {
        &self.params
    }

    fn word_address(&self, addr: u64) -> u64 {
        (addr & self.params.address_mask()) >> self.params.data_width.addr_shift()
    }

    fn write_enable(&self, strb: Strobe) -> Strobe {
        let strb = strb & self.params.data_width.strobe_mask();
        match self.granularity {
            WriteEnable::Word => Strobe::from(strb != 0),
            WriteEnable::Byte => strb,
        }
    }

    fn choose(&self, lite: &AxiLiteBus) -> Option<Direction> {
        arbitrate(lite.ar.valid, lite.aw.valid, self.last_was_read)
    }

    /// Drives the Lite handshakes and the port from registered state.
    ///
    /// Never fails; owners embedding the adapter in an agent call this
    /// directly instead of [`Bridge::eval`].
    pub fn drive(&self, lite: &mut AxiLiteBus, port: &mut SimplePort) {
        lite.aw.ready = false;
        lite.w.ready = false;
        lite.ar.ready = false;
        lite.b.valid = false;
        lite.b.payload.resp = Resp::Okay;
        lite.r.valid = false;
        lite.r.payload.resp = Resp::Okay;
        lite.r.payload.data = port.dat_r & self.params.data_width.mask();
        port.we = 0;
        port.dat_w = lite.w.payload.data & self.params.data_width.mask();
        port.adr = self.read_adr;

        match self.state {
            State::Start => match self.choose(lite) {
                Some(Direction::Write) => {
                    port.adr = self.word_address(lite.aw.payload.addr);
                    if lite.w.valid {
                        lite.aw.ready = true;
                        lite.w.ready = true;
                        port.we = self.write_enable(lite.w.payload.strb);
                    }
                }
                Some(Direction::Read) => {
                    port.adr = self.word_address(lite.ar.payload.addr);
                    lite.ar.ready = true;
                }
                None => {}
            },
            State::SendReadResponse => lite.r.valid = true,
            State::SendWriteResponse => lite.b.valid = true,
        }
    }
}

impl Bridge for LiteToSimple {
    type Master = AxiLiteBus;
    type Slave = SimplePort;

    fn eval(&self, lite: &mut AxiLiteBus, port: &mut SimplePort) -> Result<(), SimError> {
        self.drive(lite, port);
        Ok(())
    }

    fn tick(&mut self, lite: &AxiLiteBus, _port: &SimplePort) {
        match self.state {
            State::Start => {
                if lite.aw.fires() && lite.w.fires() {
                    self.last_was_read = false;
                    self.state = State::SendWriteResponse;
                } else if lite.ar.fires() {
                    self.last_was_read = true;
                    self.read_adr = self.word_address(lite.ar.payload.addr);
                    self.state = State::SendReadResponse;
                }
            }
            State::SendReadResponse => {
                if lite.r.fires() {
                    self.state = State::Start;
                }
            }
            State::SendWriteResponse => {
                if lite.b.fires() {
                    self.state = State::Start;
                }
            }
        }
    }
}
