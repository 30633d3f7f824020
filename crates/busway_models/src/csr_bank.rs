//! Register file on a CSR bus.

use busway_axi::{Agent, CsrBus, CsrParams};
use busway_common::Word;

/// A word-addressed register file with registered read data.
///
/// Addresses wrap at the bank depth. Every write is logged as
/// `(address, data)`.
#[derive(Debug, Clone)]
pub struct CsrBank {
    params: CsrParams,
    regs: Vec<Word>,
    dat_r: Word,
    writes: Vec<(u64, Word)>,
}

impl CsrBank {
    /// Creates `depth` zeroed registers; a zero depth is raised to one.
    pub fn new(params: CsrParams, depth: usize) -> Self {
        Self {
            params,
            regs: vec![0; depth.max(1)],
            dat_r: 0,
            writes: Vec::new(),
        }
    }

    /// Number of registers.
    pub fn depth(&self) -> usize {
        self.regs.len()
    }

    /// Register `index`, wrapping at the depth.
    pub fn reg(&self, index: u64) -> Word {
        self.regs[self.slot(index)]
    }

    /// Overwrites register `index`.
    pub fn set_reg(&mut self, index: u64, value: Word) {
        let slot = self.slot(index);
        self.regs[slot] = value & self.params.data_width.mask();
    }

    /// Writes seen on the bus, oldest first.
    pub fn writes(&self) -> &[(u64, Word)] {
        &self.writes
    }

    fn slot(&self, index: u64) -> usize {
        (index % self.regs.len() as u64) as usize
    }
}

impl Agent for CsrBank {
    type Bus = CsrBus;

    fn eval(&self, bus: &mut CsrBus) {
        bus.dat_r = self.dat_r;
    }

    fn tick(&mut self, bus: &CsrBus) {
        let slot = self.slot(bus.adr);
        if bus.we {
            self.regs[slot] = bus.dat_w & self.params.data_width.mask();
            self.writes.push((bus.adr, bus.dat_w));
        }
        self.dat_r = self.regs[slot];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_data_is_registered() {
        let mut bank = CsrBank::new(CsrParams::new(16, 8).unwrap(), 4);
        bank.set_reg(2, 0x1_BEEF);
        assert_eq!(bank.reg(2), 0xBEEF);

        let mut bus = CsrBus {
            adr: 6,
            ..CsrBus::default()
        };
        bank.eval(&mut bus);
        assert_eq!(bus.dat_r, 0);
        bank.tick(&bus);
        bank.eval(&mut bus);
        assert_eq!(bus.dat_r, 0xBEEF);
    }

    #[test]
    fn writes_are_logged() {
        let mut bank = CsrBank::new(CsrParams::new(32, 8).unwrap(), 0);
        assert_eq!(bank.depth(), 1);
        let bus = CsrBus {
            adr: 3,
            we: true,
            dat_w: 42,
            dat_r: 0,
        };
        bank.tick(&bus);
        assert_eq!(bank.writes(), [(3, 42)]);
        assert_eq!(bank.reg(0), 42);
    }
}
