//! Composite AXI4 to Wishbone bridge.

use busway_sim::SimError;

use crate::axi2lite::Axi2AxiLite;
use crate::component::{Bridge, Chain};
use crate::error::BridgeError;
use crate::interface::{AxiBus, AxiParams, WishboneBus, WishboneParams};
use crate::wishbone::Lite2Wishbone;

/// Full AXI4 slave, Wishbone master: [`Axi2AxiLite`] followed by
/// [`Lite2Wishbone`] through an internal AXI4-Lite bus.
#[derive(Debug, Clone)]
pub struct Axi2Wishbone {
    chain: Chain<Axi2AxiLite, Lite2Wishbone>,
}

impl Axi2Wishbone {
    /// Builds the bridge; `base_address` is subtracted on the Wishbone side.
    pub fn new(axi: AxiParams, wb: WishboneParams, base_address: u64) -> Result<Self, BridgeError> {
        let lite = axi.lite();
        Ok(Self {
            chain: Chain::new(
                Axi2AxiLite::new(axi, lite)?,
                Lite2Wishbone::new(lite, wb, base_address)?,
            ),
        })
    }

    /// Sets the settle bound for the internal bus.
    pub fn set_max_deltas(&mut self, max: u32) {
        self.chain.set_max_deltas(max);
    }

    /// Returns `true` when neither half has work in flight.
    pub fn is_idle(&self) -> bool {
        self.chain.first.is_idle() && self.chain.second.is_idle()
    }
}

impl Bridge for Axi2Wishbone {
    type Master = AxiBus;
    type Slave = WishboneBus;

    fn eval(&self, axi: &mut AxiBus, wb: &mut WishboneBus) -> Result<(), SimError> {
        self.chain.eval(axi, wb)
    }

    fn tick(&mut self, axi: &AxiBus, wb: &WishboneBus) {
        self.chain.tick(axi, wb);
    }
}
