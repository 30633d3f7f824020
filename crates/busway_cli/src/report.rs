//! Transaction report for `busway run`.

use std::fmt::Write as _;

use busway_common::Word;
use busway_config::{OpSpec, Topology, WordValue};
use busway_models::{Completion, OpKind};
use serde::Serialize;

use crate::scenario::Outcome;

/// A read whose data differed from the scenario's expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Position of the op in the scenario.
    pub op: usize,
    /// Address the op was issued to.
    pub addr: u64,
    /// Words the scenario expected.
    pub expected: Vec<WordValue>,
    /// Words the master received.
    pub actual: Vec<WordValue>,
}

/// The result of one scenario run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// The topology that was simulated.
    pub topology: Topology,
    /// Cycles simulated.
    pub cycles: u64,
    /// Evaluation passes across all cycles.
    pub deltas: u64,
    /// Cycles the timeout guard answered for the slave.
    pub timeouts: u64,
    /// Transactions that ended in an error response.
    pub errors: usize,
    /// Completed transactions, in completion order.
    pub transactions: Vec<Completion>,
    /// Reads that returned unexpected data.
    pub mismatches: Vec<Mismatch>,
}

/// Expected read data per op, or `None` where nothing is checked.
pub fn expectations(ops: &[OpSpec]) -> Vec<Option<Vec<Word>>> {
    ops.iter()
        .map(|op| match op {
            OpSpec::Read {
                expect: Some(word), ..
            } => Some(vec![word.0]),
            OpSpec::BurstRead { expect, .. } if !expect.is_empty() => {
                Some(expect.iter().map(|w| w.0).collect())
            }
            _ => None,
        })
        .collect()
}

fn words(data: &[Word]) -> Vec<WordValue> {
    data.iter().copied().map(WordValue).collect()
}

impl RunReport {
    /// Builds the report, comparing each completion against the op it
    /// answers.
    ///
    /// Every master in this crate completes its ops in issue order, so the
    /// n-th completion answers the n-th op.
    pub fn new(topology: Topology, outcome: &Outcome, expected: &[Option<Vec<Word>>]) -> Self {
        let mismatches = outcome
            .completions
            .iter()
            .zip(expected)
            .enumerate()
            .filter_map(|(op, (done, expect))| {
                let expect = expect.as_ref()?;
                (done.data != *expect).then(|| Mismatch {
                    op,
                    addr: done.addr,
                    expected: words(expect),
                    actual: words(&done.data),
                })
            })
            .collect();
        Self {
            topology,
            cycles: outcome.result.final_cycle.index(),
            deltas: outcome.result.total_deltas,
            timeouts: outcome.timeouts,
            errors: outcome.errors(),
            transactions: outcome.completions.clone(),
            mismatches,
        }
    }

    /// Renders the report as aligned text.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} transactions on {}", self.transactions.len(), self.topology);
        for (index, done) in self.transactions.iter().enumerate() {
            let kind = match done.kind {
                OpKind::Read => "read",
                OpKind::Write => "write",
            };
            let _ = write!(
                out,
                "  [{index:>3}] {kind:<5} {:#010x} id {:<3} {:<6} {:>5} cycles",
                done.addr,
                done.id,
                done.resp().to_string(),
                done.latency()
            );
            if !done.data.is_empty() {
                let data: Vec<String> = done.data.iter().map(|w| format!("{w:#x}")).collect();
                let _ = write!(out, "  {}", data.join(" "));
            }
            out.push('\n');
        }
        for m in &self.mismatches {
            let expected: Vec<String> = m.expected.iter().map(|w| format!("{:#x}", w.0)).collect();
            let actual: Vec<String> = m.actual.iter().map(|w| format!("{:#x}", w.0)).collect();
            let _ = writeln!(
                out,
                "mismatch: op {} at {:#x}: expected [{}], got [{}]",
                m.op,
                m.addr,
                expected.join(" "),
                actual.join(" ")
            );
        }
        let _ = writeln!(
            out,
            "{} cycles, {} errors, {} mismatches, {} timeouts",
            self.cycles,
            self.errors,
            self.mismatches.len(),
            self.timeouts
        );
        out
    }
}
