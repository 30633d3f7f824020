//! Ready-made simulation designs: a master agent, a bridge and a slave agent.

use busway_axi::{Agent, AxiLiteBus, Bridge, Chain, LiteTimeout};
use busway_sim::{Design, Probe, Probes, SimError};

/// The two buses of a testbench.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Nets<M, S> {
    /// Master-side bus.
    pub master: M,
    /// Slave-side bus.
    pub slave: S,
}

impl<M: Probe, S: Probe> Probe for Nets<M, S> {
    fn probe(&self, p: &mut Probes) {
        p.scope("master", |p| self.master.probe(p));
        p.scope("slave", |p| self.slave.probe(p));
    }
}

/// A master agent driving a bridge that drives a slave agent.
///
/// The testbench is done once the master has nothing left to issue.
#[derive(Debug, Clone)]
pub struct Testbench<M, B, S> {
    /// Traffic source.
    pub master: M,
    /// Device under test.
    pub bridge: B,
    /// Terminating slave.
    pub slave: S,
}

impl<M, B, S> Testbench<M, B, S> {
    /// Wires `master`, `bridge` and `slave` together.
    pub fn new(master: M, bridge: B, slave: S) -> Self {
        Self {
            master,
            bridge,
            slave,
        }
    }
}

impl<M, B, S> Design for Testbench<M, B, S>
where
    B: Bridge,
    B::Master: Clone + PartialEq + Default + Probe,
    B::Slave: Clone + PartialEq + Default + Probe,
    M: Agent<Bus = B::Master>,
    S: Agent<Bus = B::Slave>,
{
    type Wires = Nets<B::Master, B::Slave>;

    fn eval(&self, w: &mut Self::Wires) -> Result<(), SimError> {
        self.master.eval(&mut w.master);
        self.bridge.eval(&mut w.master, &mut w.slave)?;
        self.slave.eval(&mut w.slave);
        Ok(())
    }

    fn tick(&mut self, w: &Self::Wires) {
        self.master.tick(&w.master);
        self.bridge.tick(&w.master, &w.slave);
        self.slave.tick(&w.slave);
    }

    fn is_done(&self) -> bool {
        self.master.is_done()
    }
}

/// A bridge that connects two AXI4-Lite buses wire for wire.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Bridge for Passthrough {
    type Master = AxiLiteBus;
    type Slave = AxiLiteBus;

    fn eval(&self, master: &mut AxiLiteBus, slave: &mut AxiLiteBus) -> Result<(), SimError> {
        AxiLiteBus::connect(master, slave);
        Ok(())
    }

    fn tick(&mut self, _master: &AxiLiteBus, _slave: &AxiLiteBus) {}
}

#[derive(Debug, Clone)]
enum Stage<B> {
    Direct(B),
    Timed(Chain<LiteTimeout, B>),
}

/// An AXI4-Lite-mastered bridge with an optional slave-timeout guard in
/// front of it.
#[derive(Debug, Clone)]
pub struct Guarded<B> {
    stage: Stage<B>,
    timeouts: u64,
}

impl<B> Guarded<B>
where
    B: Bridge<Master = AxiLiteBus>,
    B::Slave: Copy + PartialEq,
{
    /// Wraps `bridge` without a guard.
    pub fn new(bridge: B) -> Self {
        Self {
            stage: Stage::Direct(bridge),
            timeouts: 0,
        }
    }

    /// Puts `guard` in front of `bridge`.
    pub fn with_timeout(bridge: B, guard: LiteTimeout) -> Self {
        Self {
            stage: Stage::Timed(Chain::new(guard, bridge)),
            timeouts: 0,
        }
    }

    /// Sets the settle bound of the internal bus, if there is one.
    pub fn set_max_deltas(&mut self, max: u32) {
        if let Stage::Timed(chain) = &mut self.stage {
            chain.set_max_deltas(max);
        }
    }

    /// Number of cycles the guard's error output was asserted.
    pub fn timeouts(&self) -> u64 {
        self.timeouts
    }

    /// The wrapped bridge.
    pub fn inner(&self) -> &B {
        match &self.stage {
            Stage::Direct(b) => b,
            Stage::Timed(chain) => &chain.second,
        }
    }
}

impl<B> Bridge for Guarded<B>
where
    B: Bridge<Master = AxiLiteBus>,
    B::Slave: Copy + PartialEq,
{
    type Master = AxiLiteBus;
    type Slave = B::Slave;

    fn eval(&self, master: &mut AxiLiteBus, slave: &mut B::Slave) -> Result<(), SimError> {
        match &self.stage {
            Stage::Direct(b) => b.eval(master, slave),
            Stage::Timed(chain) => chain.eval(master, slave),
        }
    }

    fn tick(&mut self, master: &AxiLiteBus, slave: &B::Slave) {
        match &mut self.stage {
            Stage::Direct(b) => b.tick(master, slave),
            Stage::Timed(chain) => {
                if chain.first.error(master) {
                    self.timeouts += 1;
                }
                chain.tick(master, slave);
            }
        }
    }
}
