//! Seams shared by every bridge and endpoint.
//!
//! A [`Bridge`] sits between a master-side bus and a slave-side bus; an
//! [`Agent`] terminates a single bus. Both follow the kernel's two-phase
//! contract: `eval` drives outputs from registered state and current wires
//! and may run any number of times per cycle, `tick` commits the next state
//! from the settled wires exactly once per cycle.
//!
//! Bridges compose by chaining: [`Chain`] joins two bridges through a private
//! intermediate bus and is itself a bridge.

use busway_sim::{settle, SimError, DEFAULT_MAX_DELTAS};

/// A protocol bridge between two buses.
pub trait Bridge {
    /// The bus this bridge is a slave on.
    type Master;
    /// The bus this bridge is a master on.
    type Slave;

    /// Drives the bridge's outputs on both buses.
    fn eval(&self, master: &mut Self::Master, slave: &mut Self::Slave) -> Result<(), SimError>;

    /// Commits next state from settled wires.
    fn tick(&mut self, master: &Self::Master, slave: &Self::Slave);
}

/// A component terminating one bus: a memory, a traffic generator, a monitor.
pub trait Agent {
    /// The bus this agent is attached to.
    type Bus;

    /// Drives the agent's outputs.
    fn eval(&self, bus: &mut Self::Bus);

    /// Commits next state from settled wires.
    fn tick(&mut self, bus: &Self::Bus);

    /// Returns `true` once the agent has nothing left to do.
    fn is_done(&self) -> bool {
        true
    }
}

/// Two bridges joined through a private intermediate bus.
///
/// The intermediate bus is not registered: each evaluation resolves it from
/// scratch by settling both halves against the outer wires.
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    /// Master-facing half.
    pub first: A,
    /// Slave-facing half.
    pub second: B,
    max_deltas: u32,
}

impl<A, B, X> Chain<A, B>
where
    A: Bridge<Slave = X>,
    B: Bridge<Master = X>,
    X: Copy + Default + PartialEq,
    A::Master: Copy + PartialEq,
    B::Slave: Copy + PartialEq,
{
    /// Joins `first` and `second`.
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            max_deltas: DEFAULT_MAX_DELTAS,
        }
    }

    /// Sets the settle bound for the intermediate bus.
    pub fn set_max_deltas(&mut self, max: u32) {
        self.max_deltas = max;
    }

    /// Settles both halves and returns the intermediate bus.
    pub fn resolve(
        &self,
        master: &mut A::Master,
        slave: &mut B::Slave,
    ) -> Result<X, SimError> {
        let mut nets = (*master, X::default(), *slave);
        settle(&mut nets, self.max_deltas, |(m, x, s)| {
            self.first.eval(m, x)?;
            self.second.eval(x, s)
        })?;
        *master = nets.0;
        *slave = nets.2;
        Ok(nets.1)
    }
}

impl<A, B, X> Bridge for Chain<A, B>
where
    A: Bridge<Slave = X>,
    B: Bridge<Master = X>,
    X: Copy + Default + PartialEq,
    A::Master: Copy + PartialEq,
    B::Slave: Copy + PartialEq,
{
    type Master = A::Master;
    type Slave = B::Slave;

    fn eval(&self, master: &mut A::Master, slave: &mut B::Slave) -> Result<(), SimError> {
        self.resolve(master, slave).map(|_| ())
    }

    fn tick(&mut self, master: &A::Master, slave: &B::Slave) {
        let (mut m, mut s) = (*master, *slave);
        match self.resolve(&mut m, &mut s) {
            Ok(inner) => {
                self.first.tick(&m, &inner);
                self.second.tick(&inner, &s);
            }
            // Unreachable once the same wires settled during eval.
            Err(e) => tracing::error!("chained bridge failed to settle at commit: {e}"),
        }
    }
}

/// Direction of a Lite transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// A read.
    Read,
    /// A write.
    Write,
}

/// Picks the next transaction direction.
///
/// A lone pending request wins. When both are pending the direction not
/// taken last time goes first, so neither can starve the other.
pub fn arbitrate(read: bool, write: bool, last_was_read: bool) -> Option<Direction> {
    match (read, write) {
        (true, true) if last_was_read => Some(Direction::Write),
        (true, _) => Some(Direction::Read),
        (false, true) => Some(Direction::Write),
        (false, false) => None,
    }
}
