//! Completed-transaction records kept by the master agents.

use busway_common::{Resp, Word};
use serde::Serialize;

/// Read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// A read.
    Read,
    /// A write.
    Write,
}

/// One transaction as observed by the master that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Read or write.
    pub kind: OpKind,
    /// Start address as issued (byte address, or word address on Wishbone).
    pub addr: u64,
    /// Transaction id (zero where the bus has none).
    pub id: u32,
    /// Response per returned beat; a write has exactly one.
    pub resps: Vec<Resp>,
    /// Read data per beat; empty for writes.
    pub data: Vec<Word>,
    /// Cycle the request was first presented.
    pub issued: u64,
    /// Cycle the final response was accepted.
    pub completed: u64,
}

impl Completion {
    /// The merged response: the first non-OKAY code, or OKAY.
    pub fn resp(&self) -> Resp {
        self.resps
            .iter()
            .fold(Resp::Okay, |acc, r| acc.sticky(*r))
    }

    /// Cycles from first presentation to final response.
    pub fn latency(&self) -> u64 {
        self.completed.saturating_sub(self.issued)
    }
}

/// An agent that issues transactions and records their completions.
pub trait Transcript {
    /// Completions, in the order they finished.
    fn completions(&self) -> &[Completion];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_resp_is_first_error() {
        let c = Completion {
            kind: OpKind::Read,
            addr: 0,
            id: 0,
            resps: vec![Resp::Okay, Resp::DecErr, Resp::SlvErr],
            data: vec![0, 0, 0],
            issued: 3,
            completed: 10,
        };
        assert_eq!(c.resp(), Resp::DecErr);
        assert_eq!(c.latency(), 7);
    }

    #[test]
    fn serializes_kind_lowercase() {
        let json = serde_json::to_string(&OpKind::Write).unwrap();
        assert_eq!(json, "\"write\"");
    }
}
