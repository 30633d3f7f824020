//! The valid/ready handshake channel.

use busway_sim::{Probe, Probes};

/// One unidirectional handshake channel.
///
/// The sender owns `valid` and `payload`, the receiver owns `ready`. A
/// transfer happens exactly on a cycle where both are asserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Channel<T> {
    /// Sender has a payload on offer.
    pub valid: bool,
    /// Receiver can take a payload this cycle.
    pub ready: bool,
    /// The offered payload; meaningful only while `valid`.
    pub payload: T,
}

impl<T> Channel<T> {
    /// Returns `true` on a transfer cycle.
    pub fn fires(&self) -> bool {
        self.valid && self.ready
    }

    /// Returns `true` when the sender is blocked by backpressure.
    pub fn stalled(&self) -> bool {
        self.valid && !self.ready
    }
}

impl<T: Copy> Channel<T> {
    /// Forwards `src` to `dst`: sender-owned fields flow downstream, `ready`
    /// flows back upstream.
    pub fn connect(src: &mut Channel<T>, dst: &mut Channel<T>) {
        dst.valid = src.valid;
        dst.payload = src.payload;
        src.ready = dst.ready;
    }
}

impl<T: Probe> Probe for Channel<T> {
    fn probe(&self, p: &mut Probes) {
        p.bit("valid", self.valid);
        p.bit("ready", self.ready);
        self.payload.probe(p);
    }
}
