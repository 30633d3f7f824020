//! AXI4, AXI4-Lite and Wishbone protocol bridges.
//!
//! Every bridge is a synchronous state machine written against the
//! two-phase contract of [`busway_sim`]: [`Bridge::eval`] drives outputs from
//! registered state and the current wires, [`Bridge::tick`] commits the next
//! state from the settled wires. Bridges never hold more than one transaction
//! in flight on their slave side.
//!
//! # Modules
//!
//! - `channel`: valid/ready handshake channel
//! - `interface`: parameter sets, payloads and bus bundles
//! - `component`: `Bridge`/`Agent` seams, chaining, read/write arbitration
//! - `stream`: single-entry pipeline buffer
//! - `burst`: AXI burst-to-beat segmentation
//! - `axi2lite`: AXI4 to AXI4-Lite
//! - `lite2simple`: AXI4-Lite to simple memory port
//! - `csr` / `sram`: CSR bus bridge and block RAM built on `lite2simple`
//! - `wishbone`: AXI4-Lite to Wishbone and back
//! - `converter`: AXI4-Lite data-width down-conversion
//! - `timeout`: slave-timeout guard
//! - `compose`: AXI4 to Wishbone via AXI4-Lite

#![warn(missing_docs)]

pub mod axi2lite;
pub mod burst;
pub mod channel;
pub mod component;
pub mod compose;
pub mod converter;
pub mod csr;
pub mod error;
pub mod interface;
pub mod lite2simple;
pub mod sram;
pub mod stream;
pub mod timeout;
pub mod wishbone;

#[cfg(test)]
mod testbench;

pub use axi2lite::Axi2AxiLite;
pub use burst::{Beat, BurstSegmenter};
pub use channel::Channel;
pub use component::{arbitrate, Agent, Bridge, Chain, Direction};
pub use compose::Axi2Wishbone;
pub use converter::{LiteConverter, LiteDownConverter};
pub use csr::Lite2Csr;
pub use error::BridgeError;
pub use interface::{
    AxPayload, AxiBus, AxiLiteBus, AxiParams, BPayload, CsrBus, CsrParams, LiteAx, LiteB,
    LiteParams, LiteR, LiteW, RPayload, SimplePort, WPayload, WishboneBus, WishboneParams,
};
pub use lite2simple::{LiteToSimple, WriteEnable};
pub use sram::LiteSram;
pub use stream::PipeValid;
pub use timeout::LiteTimeout;
pub use wishbone::{Lite2Wishbone, Wishbone2Lite};
