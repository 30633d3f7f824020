//! AXI4-Lite data-width conversion.
//!
//! [`LiteDownConverter`] splits every wide master-side transaction into
//! `ratio = master_width / slave_width` narrow slave-side transactions,
//! issued one at a time in ascending address order. Narrow responses are
//! merged with sticky-error semantics; narrow read data is reassembled into
//! one wide word, lowest address in the least significant bits.
//!
//! [`LiteConverter`] is the front-end that picks passthrough or
//! down-conversion from the two port widths.

use busway_common::{Resp, Strobe, Word};
use busway_sim::SimError;

use crate::component::{arbitrate, Bridge, Direction};
use crate::error::BridgeError;
use crate::interface::{AxiLiteBus, LiteParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Write,
    WriteResponseSlave,
    WriteResponseMaster,
    Read,
    ReadResponseSlave,
    ReadResponseMaster,
}

/// Splits wide AXI4-Lite transactions into narrow ones.
#[derive(Debug, Clone)]
pub struct LiteDownConverter {
    master: LiteParams,
    slave: LiteParams,
    ratio: u32,
    state: State,
    counter: u32,
    last_was_read: bool,
    aw_ready: bool,
    w_ready: bool,
    resp: Resp,
    r_data: Word,
}

impl LiteDownConverter {
    /// Builds a down-converter from a wide master port to a narrow slave port.
    pub fn new(master: LiteParams, slave: LiteParams) -> Result<Self, BridgeError> {
        let (from, to) = (master.data_width.bits(), slave.data_width.bits());
        if from < to {
            return Err(BridgeError::UnsupportedUpConversion { from, to });
        }
        if master.address_width != slave.address_width {
            return Err(BridgeError::AddressWidthMismatch {
                master: master.address_width,
                slave: slave.address_width,
            });
        }
        Ok(Self {
            master,
            slave,
            ratio: from / to,
            state: State::Idle,
            counter: 0,
            last_was_read: false,
            aw_ready: false,
            w_ready: false,
            resp: Resp::Okay,
            r_data: 0,
        })
    }

    /// Narrow transactions per wide transaction.
    pub fn ratio(&self) -> u32 {
        self.ratio
    }

    fn is_last(&self) -> bool {
        self.counter == self.ratio - 1
    }

    fn slave_address(&self, addr: u64) -> u64 {
        let master_align = self.master.data_width.addr_shift();
        let slave_align = self.slave.data_width.addr_shift();
        ((addr >> master_align << master_align) | (u64::from(self.counter) << slave_align))
            & self.slave.address_mask()
    }

    /// Current strobe slice is empty and there are more slices after it.
    fn skip(&self, master: &AxiLiteBus) -> bool {
        self.strobe_slice(master.w.payload.strb) == 0 && !self.is_last()
    }

    fn strobe_slice(&self, strb: Strobe) -> Strobe {
        (strb >> (self.counter * self.slave.data_width.bytes())) & self.slave.data_width.strobe_mask()
    }

    /// Wide read word: previous slices shifted down, current slice on top.
    fn read_word(&self, slave_data: Word) -> Word {
        let (from, to) = (self.master.data_width.bits(), self.slave.data_width.bits());
        let incoming = (slave_data & self.slave.data_width.mask()) << (from - to);
        (self.r_data.checked_shr(to).unwrap_or(0) | incoming) & self.master.data_width.mask()
    }

    fn at_rest(&self, master: &AxiLiteBus) -> bool {
        !master.aw.valid
            && !master.ar.valid
            && !matches!(self.state, State::WriteResponseMaster | State::ReadResponseMaster)
    }
}

impl Bridge for LiteDownConverter {
    type Master = AxiLiteBus;
    type Slave = AxiLiteBus;

    fn eval(&self, master: &mut AxiLiteBus, slave: &mut AxiLiteBus) -> Result<(), SimError> {
        let to = self.slave.data_width.bits();
        slave.aw.payload.addr = self.slave_address(master.aw.payload.addr);
        slave.ar.payload.addr = self.slave_address(master.ar.payload.addr);
        slave.w.payload.data =
            (master.w.payload.data >> (self.counter * to)) & self.slave.data_width.mask();
        slave.w.payload.strb = self.strobe_slice(master.w.payload.strb);
        master.b.payload.resp = self.resp;
        master.r.payload.resp = self.resp;
        master.r.payload.data = self.read_word(slave.r.payload.data);

        master.aw.ready = false;
        master.w.ready = false;
        master.ar.ready = false;
        master.b.valid = false;
        master.r.valid = false;
        slave.aw.valid = false;
        slave.w.valid = false;
        slave.ar.valid = false;
        slave.b.ready = false;
        slave.r.ready = false;

        match self.state {
            State::Idle => {}
            State::Write => {
                let issue = !self.skip(master);
                slave.aw.valid = issue && !self.aw_ready;
                slave.w.valid = issue && !self.w_ready;
            }
            State::WriteResponseSlave => {
                if slave.b.valid {
                    slave.b.ready = true;
                    if self.is_last() {
                        master.aw.ready = true;
                        master.w.ready = true;
                    }
                }
            }
            State::WriteResponseMaster => master.b.valid = true,
            State::Read => slave.ar.valid = true,
            State::ReadResponseSlave => {
                if slave.r.valid {
                    if self.is_last() {
                        master.ar.ready = true;
                    } else {
                        slave.r.ready = true;
                    }
                }
            }
            State::ReadResponseMaster => {
                master.r.valid = true;
                slave.r.ready = master.r.ready;
            }
        }
        Ok(())
    }

    fn tick(&mut self, master: &AxiLiteBus, slave: &AxiLiteBus) {
        if self.at_rest(master) {
            self.state = State::Idle;
            self.counter = 0;
            self.resp = Resp::Okay;
            self.aw_ready = false;
            self.w_ready = false;
            self.r_data = 0;
            return;
        }

        if slave.r.ready {
            self.r_data = master.r.payload.data;
        }

        match self.state {
            State::Idle => {
                self.counter = 0;
                self.resp = Resp::Okay;
                match arbitrate(master.ar.valid, master.aw.valid, self.last_was_read) {
                    Some(Direction::Write) if master.w.valid => {
                        self.last_was_read = false;
                        self.state = State::Write;
                    }
                    Some(Direction::Read) => {
                        self.last_was_read = true;
                        self.state = State::Read;
                    }
                    _ => {}
                }
            }
            State::Write => {
                if self.skip(master) {
                    self.counter += 1;
                } else {
                    let aw_done = self.aw_ready || slave.aw.fires();
                    let w_done = self.w_ready || slave.w.fires();
                    if aw_done && w_done {
                        self.state = State::WriteResponseSlave;
                    } else {
                        self.aw_ready = aw_done;
                        self.w_ready = w_done;
                    }
                }
            }
            State::WriteResponseSlave => {
                self.aw_ready = false;
                self.w_ready = false;
                if slave.b.fires() {
                    self.resp = self.resp.sticky(slave.b.payload.resp);
                    if self.is_last() {
                        self.state = State::WriteResponseMaster;
                    } else {
                        self.counter += 1;
                        self.state = State::Write;
                    }
                }
            }
            State::WriteResponseMaster => {
                if master.b.fires() {
                    self.state = State::Idle;
                }
            }
            State::Read => {
                if slave.ar.fires() {
                    self.state = State::ReadResponseSlave;
                }
            }
            State::ReadResponseSlave => {
                if slave.r.valid {
                    self.resp = self.resp.sticky(slave.r.payload.resp);
                    if self.is_last() {
                        self.state = State::ReadResponseMaster;
                    } else {
                        self.counter += 1;
                        self.state = State::Read;
                    }
                }
            }
            State::ReadResponseMaster => {
                if master.r.fires() {
                    self.state = State::Idle;
                }
            }
        }
    }
}

/// Width-conversion front-end.
#[derive(Debug, Clone)]
pub enum LiteConverter {
    /// Equal widths: every channel is forwarded unchanged.
    Passthrough,
    /// Wide master, narrow slave.
    Down(LiteDownConverter),
}

impl LiteConverter {
    /// Picks the converter for the given port widths.
    pub fn new(master: LiteParams, slave: LiteParams) -> Result<Self, BridgeError> {
        let (from, to) = (master.data_width.bits(), slave.data_width.bits());
        if from < to {
            return Err(BridgeError::UnsupportedUpConversion { from, to });
        }
        if from == to {
            if master.address_width != slave.address_width {
                return Err(BridgeError::AddressWidthMismatch {
                    master: master.address_width,
                    slave: slave.address_width,
                });
            }
            return Ok(LiteConverter::Passthrough);
        }
        Ok(LiteConverter::Down(LiteDownConverter::new(master, slave)?))
    }
}

impl Bridge for LiteConverter {
    type Master = AxiLiteBus;
    type Slave = AxiLiteBus;

    fn eval(&self, master: &mut AxiLiteBus, slave: &mut AxiLiteBus) -> Result<(), SimError> {
        match self {
            LiteConverter::Passthrough => {
                AxiLiteBus::connect(master, slave);
                Ok(())
            }
            LiteConverter::Down(down) => down.eval(master, slave),
        }
    }

    fn tick(&mut self, master: &AxiLiteBus, slave: &AxiLiteBus) {
        if let LiteConverter::Down(down) = self {
            down.tick(master, slave);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sram::LiteSram;
    use crate::testbench::{step, LiteScript};

    fn wide() -> LiteParams {
        LiteParams::new(64, 32).unwrap()
    }

    fn narrow() -> LiteParams {
        LiteParams::new(32, 32).unwrap()
    }

    #[test]
    fn front_end_selection() {
        assert!(matches!(
            LiteConverter::new(wide(), wide()),
            Ok(LiteConverter::Passthrough)
        ));
        assert!(matches!(
            LiteConverter::new(wide(), narrow()),
            Ok(LiteConverter::Down(ref d)) if d.ratio() == 2
        ));
        assert!(matches!(
            LiteConverter::new(narrow(), wide()),
            Err(BridgeError::UnsupportedUpConversion { from: 32, to: 64 })
        ));
    }

    #[test]
    fn passthrough_forwards() {
        let mut conv = LiteConverter::new(narrow(), narrow()).unwrap();
        let mut sram = LiteSram::new(narrow(), 64, false).unwrap();
        let mut m = LiteScript::default();
        m.write(0x8, 0x1234, 0xF);
        for _ in 0..4 {
            step(&mut m, &mut conv, &mut sram);
        }
        assert_eq!(sram.word(2), 0x1234);
    }

    #[test]
    fn wide_write_splits_into_narrow() {
        let mut conv = LiteDownConverter::new(wide(), narrow()).unwrap();
        let mut sram = LiteSram::new(narrow(), 64, false).unwrap();
        let mut m = LiteScript::default();
        m.write(0x10, 0x8877_6655_4433_2211, 0xFF);
        let mut narrow_writes = Vec::new();
        for _ in 0..16 {
            let (_, s) = step(&mut m, &mut conv, &mut sram);
            if s.aw.fires() {
                narrow_writes.push(s.aw.payload.addr);
            }
        }
        assert_eq!(narrow_writes, [0x10, 0x14]);
        assert_eq!(sram.word(4), 0x4433_2211);
        assert_eq!(sram.word(5), 0x8877_6655);
        assert_eq!(m.b, [Resp::Okay]);
    }

    #[test]
    fn empty_slices_skipped_except_last() {
        let mut conv = LiteDownConverter::new(wide(), narrow()).unwrap();
        let mut sram = LiteSram::new(narrow(), 64, false).unwrap();
        let mut m = LiteScript::default();
        m.write(0x0, 0xAABB_CCDD_1122_3344, 0b1111_0000);
        m.write(0x8, 0x5555_5555_6666_6666, 0b0000_1111);
        let mut narrow = Vec::new();
        for _ in 0..24 {
            let (_, s) = step(&mut m, &mut conv, &mut sram);
            if s.aw.fires() {
                narrow.push((s.aw.payload.addr, s.w.payload.strb));
            }
        }
        assert_eq!(narrow, [(0x4, 0xF), (0x8, 0xF), (0xC, 0x0)]);
        assert_eq!(sram.word(1), 0xAABB_CCDD);
        assert_eq!(sram.word(0), 0);
        assert_eq!(m.b, [Resp::Okay, Resp::Okay]);
    }

    #[test]
    fn wide_read_reassembles() {
        let mut conv = LiteDownConverter::new(wide(), narrow()).unwrap();
        let contents = vec![0, 0, 0xCAFE_BABE, 0xDEAD_BEEF];
        let mut sram = LiteSram::with_contents(narrow(), contents, false).unwrap();
        let mut m = LiteScript::default();
        m.read(0x8);
        for _ in 0..16 {
            step(&mut m, &mut conv, &mut sram);
        }
        assert_eq!(m.r, [(Resp::Okay, 0xDEAD_BEEF_CAFE_BABE)]);
    }

    #[test]
    fn quarter_width_read() {
        let master = LiteParams::new(128, 32).unwrap();
        let slave = LiteParams::new(32, 32).unwrap();
        let mut conv = LiteDownConverter::new(master, slave).unwrap();
        assert_eq!(conv.ratio(), 4);
        let mut sram = LiteSram::with_contents(slave, vec![1, 2, 3, 4], false).unwrap();
        let mut m = LiteScript::default();
        m.read(0x0);
        for _ in 0..24 {
            step(&mut m, &mut conv, &mut sram);
        }
        let expected: Word = 1 | (2 << 32) | (3 << 64) | (4 << 96);
        assert_eq!(m.r, [(Resp::Okay, expected)]);
    }
}
