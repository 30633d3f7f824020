//! Block RAM behind an AXI4-Lite port.

use busway_common::Word;

use crate::component::{Agent, Bridge};
use crate::error::BridgeError;
use crate::interface::{AxiLiteBus, LiteParams, SimplePort};
use crate::lite2simple::{LiteToSimple, WriteEnable};

/// A word-organized memory with byte write enables and a registered read
/// port, served over AXI4-Lite.
///
/// Writes are write-first: a read of the same word in a later cycle returns
/// the new data. Addresses beyond the memory wrap around its depth. A
/// read-only memory accepts writes and answers OKAY but leaves its contents
/// unchanged.
#[derive(Debug, Clone)]
pub struct LiteSram {
    adapter: LiteToSimple,
    words: Vec<Word>,
    read_only: bool,
    dat_r: Word,
}

impl LiteSram {
    /// Builds a zero-initialised memory of `size_bytes`.
    pub fn new(params: LiteParams, size_bytes: u64, read_only: bool) -> Result<Self, BridgeError> {
        let word_bytes = params.data_width.bytes();
        let depth = size_bytes / u64::from(word_bytes);
        if depth == 0 {
            return Err(BridgeError::EmptyMemory {
                bytes: size_bytes,
                word_bytes,
            });
        }
        let depth = usize::try_from(depth).map_err(|_| BridgeError::EmptyMemory {
            bytes: size_bytes,
            word_bytes,
        })?;
        Ok(Self {
            adapter: LiteToSimple::new(params, WriteEnable::Byte),
            words: vec![0; depth],
            read_only,
            dat_r: 0,
        })
    }

    /// Builds a memory preloaded with `init`, one entry per word.
    pub fn with_contents(
        params: LiteParams,
        init: Vec<Word>,
        read_only: bool,
    ) -> Result<Self, BridgeError> {
        if init.is_empty() {
            return Err(BridgeError::EmptyMemory {
                bytes: 0,
                word_bytes: params.data_width.bytes(),
            });
        }
        let mask = params.data_width.mask();
        Ok(Self {
            adapter: LiteToSimple::new(params, WriteEnable::Byte),
            words: init.into_iter().map(|w| w & mask).collect(),
            read_only,
            dat_r: 0,
        })
    }

    /// Number of words.
    pub fn depth(&self) -> usize {
        self.words.len()
    }

    /// Reads a word by word index (wrapping at the depth).
    pub fn word(&self, index: u64) -> Word {
        self.words[self.slot(index)]
    }

    /// Overwrites a word by word index (wrapping at the depth).
    pub fn set_word(&mut self, index: u64, value: Word) {
        let slot = self.slot(index);
        let mask = self.adapter.params().data_width.mask();
        self.words[slot] = value & mask;
    }

    fn slot(&self, index: u64) -> usize {
        (index % self.words.len() as u64) as usize
    }

    fn port(&self, lite: &mut AxiLiteBus) -> SimplePort {
        let mut port = SimplePort {
            dat_r: self.dat_r,
            ..SimplePort::default()
        };
        self.adapter.drive(lite, &mut port);
        port
    }
}

impl Agent for LiteSram {
    type Bus = AxiLiteBus;

    fn eval(&self, lite: &mut AxiLiteBus) {
        self.port(lite);
    }

    fn tick(&mut self, lite: &AxiLiteBus) {
        let mut settled = *lite;
        let port = self.port(&mut settled);
        self.adapter.tick(lite, &port);

        let slot = self.slot(port.adr);
        if port.we != 0 && !self.read_only {
            let lanes = self.adapter.params().data_width.bytes();
            let word = &mut self.words[slot];
            for lane in 0..lanes {
                if port.we & (1 << lane) != 0 {
                    let m: Word = 0xFF << (lane * 8);
                    *word = (*word & !m) | (port.dat_w & m);
                }
            }
            tracing::trace!(adr = port.adr, data = %port.dat_w, "sram write");
        }
        self.dat_r = self.words[slot];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use busway_common::Resp;

    use crate::testbench::LiteScript;

    fn params() -> LiteParams {
        LiteParams::new(32, 16).unwrap()
    }

    fn run(sram: &mut LiteSram, master: &mut LiteScript, cycles: usize) {
        for _ in 0..cycles {
            let mut bus = AxiLiteBus::default();
            busway_sim::settle(&mut bus, 16, |b| {
                master.eval(b);
                sram.eval(b);
                Ok(())
            })
            .unwrap();
            master.tick(&bus);
            sram.tick(&bus);
        }
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            LiteSram::new(params(), 3, false),
            Err(BridgeError::EmptyMemory { bytes: 3, .. })
        ));
        assert!(LiteSram::with_contents(params(), Vec::new(), true).is_err());
    }

    #[test]
    fn byte_lane_writes() {
        let mut sram = LiteSram::new(params(), 64, false).unwrap();
        sram.set_word(1, 0x1122_3344);
        let mut m = LiteScript::default();
        m.write(0x4, 0xAABB_CCDD, 0b0101);
        run(&mut sram, &mut m, 4);
        m.read(0x4);
        run(&mut sram, &mut m, 4);
        assert_eq!(m.b, [Resp::Okay]);
        assert_eq!(m.r, [(Resp::Okay, 0x11BB_33DD)]);
    }

    #[test]
    fn read_only_ignores_writes() {
        let mut sram = LiteSram::with_contents(params(), vec![7, 8, 9, 10], true).unwrap();
        let mut m = LiteScript::default();
        m.write(0x8, 0xFFFF, 0xF);
        m.read(0x8);
        run(&mut sram, &mut m, 10);
        assert_eq!(m.b, [Resp::Okay]);
        assert_eq!(m.r, [(Resp::Okay, 9)]);
        assert_eq!(sram.word(2), 9);
    }

    #[test]
    fn addresses_wrap_at_depth() {
        let mut sram = LiteSram::new(params(), 16, false).unwrap();
        assert_eq!(sram.depth(), 4);
        sram.set_word(1, 0x42);
        let mut m = LiteScript::default();
        m.read(0x14);
        run(&mut sram, &mut m, 4);
        assert_eq!(m.r, [(Resp::Okay, 0x42)]);
    }

    #[test]
    fn repeated_reads_are_stable() {
        let mut sram = LiteSram::with_contents(params(), vec![0x10, 0x20], false).unwrap();
        let mut m = LiteScript::default();
        m.stall_responses = true;
        m.read(0x4);
        run(&mut sram, &mut m, 6);
        m.stall_responses = false;
        run(&mut sram, &mut m, 2);
        assert_eq!(m.r, [(Resp::Okay, 0x20)]);
    }
}
