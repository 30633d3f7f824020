//! Bridges between AXI4-Lite and classic-cycle Wishbone.
//!
//! [`Lite2Wishbone`] turns each Lite transaction into one Wishbone cycle.
//! [`Wishbone2Lite`] does the reverse for a Wishbone master driving a Lite
//! slave. Both serve one transaction at a time.

use busway_common::{Resp, Word};
use busway_sim::SimError;

use crate::component::{arbitrate, Bridge, Direction};
use crate::error::BridgeError;
use crate::interface::{AxiLiteBus, LiteParams, WishboneBus, WishboneParams};

fn check_ports(lite: &LiteParams, wb: &WishboneParams, base_address: u64) -> Result<(), BridgeError> {
    if lite.data_width != wb.data_width {
        return Err(BridgeError::WidthMismatch {
            master: lite.data_width.bits(),
            slave: wb.data_width.bits(),
        });
    }
    let shift = lite.data_width.addr_shift();
    if lite.address_width != wb.address_width + shift {
        return Err(BridgeError::AddressWidthMismatch {
            master: lite.address_width,
            slave: wb.address_width + shift,
        });
    }
    let align = lite.data_width.bytes();
    if base_address % u64::from(align) != 0 {
        return Err(BridgeError::MisalignedBase {
            base: base_address,
            align,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteState {
    Idle,
    DoRead,
    SendReadResponse,
    DoWrite,
    SendWriteResponse,
}

/// AXI4-Lite slave, Wishbone master.
///
/// A Wishbone `err` is reported as SLVERR on the Lite response; the request
/// is still retired exactly once.
#[derive(Debug, Clone)]
pub struct Lite2Wishbone {
    lite: LiteParams,
    wb: WishboneParams,
    base_address: u64,
    state: LiteState,
    last_was_read: bool,
    data: Word,
    resp: Resp,
}

impl Lite2Wishbone {
    /// Builds the bridge.
    ///
    /// `base_address` is subtracted from every Lite address before it is
    /// converted to a word address.
    pub fn new(lite: LiteParams, wb: WishboneParams, base_address: u64) -> Result<Self, BridgeError> {
        check_ports(&lite, &wb, base_address)?;
        Ok(Self {
            lite,
            wb,
            base_address,
            state: LiteState::Idle,
            last_was_read: false,
            data: 0,
            resp: Resp::Okay,
        })
    }

    fn word_address(&self, addr: u64) -> u64 {
        let offset = (addr & self.lite.address_mask()).wrapping_sub(self.base_address);
        (offset >> self.lite.data_width.addr_shift()) & self.wb.address_mask()
    }

    /// Returns `true` when no transaction is in flight.
    pub fn is_idle(&self) -> bool {
        self.state == LiteState::Idle
    }
}

impl Bridge for Lite2Wishbone {
    type Master = AxiLiteBus;
    type Slave = WishboneBus;

    fn eval(&self, lite: &mut AxiLiteBus, wb: &mut WishboneBus) -> Result<(), SimError> {
        lite.aw.ready = false;
        lite.w.ready = false;
        lite.ar.ready = false;
        lite.b.valid = false;
        lite.b.payload.resp = self.resp;
        lite.r.valid = false;
        lite.r.payload.resp = self.resp;
        lite.r.payload.data = self.data;
        wb.cyc = false;
        wb.stb = false;
        wb.we = false;
        wb.adr = 0;
        wb.sel = 0;
        wb.dat_w = 0;

        let done = wb.ack || wb.err;
        match self.state {
            LiteState::Idle | LiteState::SendReadResponse | LiteState::SendWriteResponse => {}
            LiteState::DoRead => {
                wb.cyc = true;
                wb.stb = true;
                wb.adr = self.word_address(lite.ar.payload.addr);
                wb.sel = self.lite.data_width.strobe_mask();
                lite.ar.ready = done;
            }
            LiteState::DoWrite => {
                wb.cyc = lite.w.valid;
                wb.stb = lite.w.valid;
                wb.we = true;
                wb.adr = self.word_address(lite.aw.payload.addr);
                wb.sel = lite.w.payload.strb & self.lite.data_width.strobe_mask();
                wb.dat_w = lite.w.payload.data & self.lite.data_width.mask();
                lite.aw.ready = done && wb.stb;
                lite.w.ready = done && wb.stb;
            }
        }
        match self.state {
            LiteState::SendReadResponse => lite.r.valid = true,
            LiteState::SendWriteResponse => lite.b.valid = true,
            _ => {}
        }
        Ok(())
    }

    fn tick(&mut self, lite: &AxiLiteBus, wb: &WishboneBus) {
        let outcome = if wb.err { Resp::SlvErr } else { Resp::Okay };
        match self.state {
            LiteState::Idle => {
                match arbitrate(lite.ar.valid, lite.aw.valid, self.last_was_read) {
                    Some(Direction::Read) => {
                        self.last_was_read = true;
                        self.state = LiteState::DoRead;
                    }
                    Some(Direction::Write) => {
                        self.last_was_read = false;
                        self.state = LiteState::DoWrite;
                    }
                    None => {}
                }
            }
            LiteState::DoRead => {
                if wb.ack || wb.err {
                    self.data = if wb.err {
                        self.lite.data_width.mask()
                    } else {
                        wb.dat_r & self.lite.data_width.mask()
                    };
                    self.resp = outcome;
                    if wb.err {
                        tracing::debug!(adr = wb.adr, "wishbone read error");
                    }
                    self.state = LiteState::SendReadResponse;
                }
            }
            LiteState::DoWrite => {
                if wb.stb && (wb.ack || wb.err) {
                    self.resp = outcome;
                    if wb.err {
                        tracing::debug!(adr = wb.adr, "wishbone write error");
                    }
                    self.state = LiteState::SendWriteResponse;
                }
            }
            LiteState::SendReadResponse => {
                if lite.r.fires() {
                    self.state = LiteState::Idle;
                }
            }
            LiteState::SendWriteResponse => {
                if lite.b.fires() {
                    self.state = LiteState::Idle;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WbState {
    Idle,
    Write,
    Read,
    Error,
}

/// Wishbone slave, AXI4-Lite master.
///
/// A non-OKAY Lite response is reported with a one-cycle `err` (together
/// with `ack`) instead of a plain acknowledge.
#[derive(Debug, Clone)]
pub struct Wishbone2Lite {
    lite: LiteParams,
    wb: WishboneParams,
    base_address: u64,
    state: WbState,
    cmd_done: bool,
    data_done: bool,
}

impl Wishbone2Lite {
    /// Builds the bridge.
    ///
    /// `base_address` (a byte address) is subtracted, in words, from every
    /// Wishbone address before it is presented on the Lite side.
    pub fn new(wb: WishboneParams, lite: LiteParams, base_address: u64) -> Result<Self, BridgeError> {
        check_ports(&lite, &wb, base_address)?;
        Ok(Self {
            lite,
            wb,
            base_address,
            state: WbState::Idle,
            cmd_done: false,
            data_done: false,
        })
    }

    fn byte_address(&self, adr: u64) -> u64 {
        let shift = self.lite.data_width.addr_shift();
        let word = (adr & self.wb.address_mask()).wrapping_sub(self.base_address >> shift);
        (word << shift) & self.lite.address_mask()
    }
}

impl Bridge for Wishbone2Lite {
    type Master = WishboneBus;
    type Slave = AxiLiteBus;

    fn eval(&self, wb: &mut WishboneBus, lite: &mut AxiLiteBus) -> Result<(), SimError> {
        let addr = self.byte_address(wb.adr);
        wb.ack = false;
        wb.err = false;
        wb.dat_r = 0;
        lite.aw.valid = false;
        lite.aw.payload.addr = addr;
        lite.w.valid = false;
        lite.w.payload.data = wb.dat_w & self.lite.data_width.mask();
        lite.w.payload.strb = wb.sel & self.lite.data_width.strobe_mask();
        lite.b.ready = false;
        lite.ar.valid = false;
        lite.ar.payload.addr = addr;
        lite.r.ready = false;

        match self.state {
            WbState::Idle => {}
            WbState::Write => {
                lite.aw.valid = !self.cmd_done;
                lite.w.valid = !self.data_done;
                lite.b.ready = self.cmd_done && self.data_done;
                wb.ack = lite.b.fires() && lite.b.payload.resp.is_okay();
            }
            WbState::Read => {
                lite.ar.valid = !self.cmd_done;
                lite.r.ready = self.cmd_done;
                if lite.r.fires() && lite.r.payload.resp.is_okay() {
                    wb.ack = true;
                    wb.dat_r = lite.r.payload.data;
                }
            }
            WbState::Error => {
                wb.ack = true;
                wb.err = true;
            }
        }
        Ok(())
    }

    fn tick(&mut self, wb: &WishboneBus, lite: &AxiLiteBus) {
        match self.state {
            WbState::Idle => {
                self.cmd_done = false;
                self.data_done = false;
                if wb.request() {
                    self.state = if wb.we { WbState::Write } else { WbState::Read };
                }
            }
            WbState::Write => {
                if lite.aw.fires() {
                    self.cmd_done = true;
                }
                if lite.w.fires() {
                    self.data_done = true;
                }
                if lite.b.fires() {
                    self.state = if lite.b.payload.resp.is_okay() {
                        WbState::Idle
                    } else {
                        WbState::Error
                    };
                }
            }
            WbState::Read => {
                if lite.ar.fires() {
                    self.cmd_done = true;
                }
                if lite.r.fires() {
                    self.state = if lite.r.payload.resp.is_okay() {
                        WbState::Idle
                    } else {
                        WbState::Error
                    };
                }
            }
            WbState::Error => self.state = WbState::Idle,
        }
    }
}
