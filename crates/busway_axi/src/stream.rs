//! Single-entry pipeline buffer on a valid/ready stream.

use crate::channel::Channel;

/// A one-entry register slice that registers `valid` and the payload.
///
/// The sink accepts a new entry whenever the slot is empty or the held entry
/// leaves in the same cycle, so a continuously ready consumer sees one
/// transfer per cycle with a single cycle of latency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipeValid<T> {
    valid: bool,
    payload: T,
}

impl<T: Copy> PipeValid<T> {
    /// The source side of the buffer, with `ready` left low.
    pub fn source(&self) -> Channel<T> {
        Channel {
            valid: self.valid,
            ready: false,
            payload: self.payload,
        }
    }

    /// Sink-side ready given the consumer's ready.
    pub fn sink_ready(&self, source_ready: bool) -> bool {
        !self.valid || source_ready
    }

    /// Returns `true` while an entry is held.
    pub fn is_occupied(&self) -> bool {
        self.valid
    }

    /// Commits the next state from the settled sink and source handshakes.
    pub fn tick(&mut self, sink: &Channel<T>, source_ready: bool) {
        if self.sink_ready(source_ready) {
            self.valid = sink.valid;
            self.payload = sink.payload;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(v: u8) -> Channel<u8> {
        Channel {
            valid: true,
            ready: true,
            payload: v,
        }
    }

    #[test]
    fn one_cycle_latency() {
        let mut buf = PipeValid::<u8>::default();
        assert!(!buf.source().valid);
        assert!(buf.sink_ready(false));
        buf.tick(&offer(3), false);
        assert!(buf.source().valid);
        assert_eq!(buf.source().payload, 3);
    }

    #[test]
    fn holds_under_backpressure() {
        let mut buf = PipeValid::<u8>::default();
        buf.tick(&offer(1), false);
        assert!(!buf.sink_ready(false));
        buf.tick(&offer(2), false);
        assert_eq!(buf.source().payload, 1);
    }

    #[test]
    fn full_throughput_when_drained() {
        let mut buf = PipeValid::<u8>::default();
        buf.tick(&offer(1), true);
        assert!(buf.sink_ready(true));
        buf.tick(&offer(2), true);
        assert_eq!(buf.source().payload, 2);
        buf.tick(&Channel::default(), true);
        assert!(!buf.is_occupied());
    }
}
