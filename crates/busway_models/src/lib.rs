//! Behavioural bus agents and ready-made testbenches for the busway bridges.
//!
//! Masters ([`AxiMaster`], [`LiteMaster`], [`WishboneMaster`]) issue scripted
//! transactions one at a time and record each [`Completion`]. Slaves
//! ([`WishboneMemory`], [`LiteResponder`], [`CsrBank`]) answer them with
//! configurable latency and error behaviour. [`Testbench`] wires a master, a
//! bridge and a slave into a [`busway_sim::Design`].

#![warn(missing_docs)]

pub mod axi_master;
pub mod backpressure;
pub mod bench;
pub mod csr_bank;
pub mod lite_master;
pub mod lite_responder;
pub mod record;
pub mod wishbone;

pub use axi_master::{AxiMaster, AxiOp};
pub use backpressure::Backpressure;
pub use bench::{Guarded, Nets, Passthrough, Testbench};
pub use csr_bank::CsrBank;
pub use lite_master::{LiteMaster, LiteOp};
pub use lite_responder::{LiteResponder, LiteWrite};
pub use record::{Completion, OpKind, Transcript};
pub use wishbone::{WishboneAccess, WishboneMaster, WishboneMemory, WishboneOp};
