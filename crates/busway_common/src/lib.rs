//! Shared foundational types used across the busway crates.
//!
//! This crate provides the small value types every bus layer agrees on:
//! AXI response codes with sticky merging, burst modes, validated data
//! widths, and the word/strobe carriers used for payloads.

#![warn(missing_docs)]

pub mod burst;
pub mod resp;
pub mod width;

pub use burst::BurstMode;
pub use resp::Resp;
pub use width::{log2_int, DataWidth, InvalidWidth, Strobe, Word, MAX_DATA_WIDTH};
