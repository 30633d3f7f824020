//! AXI4-Lite to CSR bus bridge.

use busway_sim::SimError;

use crate::component::Bridge;
use crate::error::BridgeError;
use crate::interface::{address_mask, AxiLiteBus, CsrBus, CsrParams, LiteParams, SimplePort};
use crate::lite2simple::{LiteToSimple, WriteEnable};

/// Bridges an AXI4-Lite slave port onto a CSR bus.
///
/// CSR writes are all-or-nothing: any set strobe lane writes the whole word.
#[derive(Debug, Clone)]
pub struct Lite2Csr {
    adapter: LiteToSimple,
    csr: CsrParams,
}

impl Lite2Csr {
    /// Builds the bridge. Both ports must share a data width.
    pub fn new(lite: LiteParams, csr: CsrParams) -> Result<Self, BridgeError> {
        if lite.data_width != csr.data_width {
            return Err(BridgeError::WidthMismatch {
                master: lite.data_width.bits(),
                slave: csr.data_width.bits(),
            });
        }
        Ok(Self {
            adapter: LiteToSimple::new(lite, WriteEnable::Word),
            csr,
        })
    }
}

impl Bridge for Lite2Csr {
    type Master = AxiLiteBus;
    type Slave = CsrBus;

    fn eval(&self, lite: &mut AxiLiteBus, csr: &mut CsrBus) -> Result<(), SimError> {
        let mut port = SimplePort {
            dat_r: csr.dat_r,
            ..SimplePort::default()
        };
        self.adapter.drive(lite, &mut port);
        csr.adr = port.adr & address_mask(self.csr.address_width);
        csr.we = port.we != 0;
        csr.dat_w = port.dat_w;
        Ok(())
    }

    fn tick(&mut self, lite: &AxiLiteBus, csr: &CsrBus) {
        let port = SimplePort {
            adr: csr.adr,
            we: u16::from(csr.we),
            dat_w: csr.dat_w,
            dat_r: csr.dat_r,
        };
        self.adapter.tick(lite, &port);
    }
}
