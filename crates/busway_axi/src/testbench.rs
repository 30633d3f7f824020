//! Minimal scripted agents for the unit tests of this crate.
//!
//! Unlike the agents in `busway_models`, the scripts present reads and
//! writes at the same time, which the arbitration tests rely on. Bridge
//! scenarios against real slaves live in `busway_conformance`.

use std::collections::VecDeque;

use busway_common::{Resp, Strobe, Word};
use busway_sim::settle;

use crate::component::{Agent, Bridge};
use crate::interface::{
    AxPayload, AxiBus, AxiLiteBus, BPayload, LiteAx, LiteW, RPayload, WPayload,
};

/// Settles master, bridge and slave together, then commits all three.
pub fn step<B, M, S>(master: &mut M, bridge: &mut B, slave: &mut S) -> (B::Master, B::Slave)
where
    B: Bridge,
    B::Master: Copy + Default + PartialEq,
    B::Slave: Copy + Default + PartialEq,
    M: Agent<Bus = B::Master>,
    S: Agent<Bus = B::Slave>,
{
    let mut nets = (B::Master::default(), B::Slave::default());
    settle(&mut nets, 64, |(m, s)| {
        master.eval(m);
        bridge.eval(m, s)?;
        slave.eval(s);
        Ok(())
    })
    .unwrap();
    master.tick(&nets.0);
    bridge.tick(&nets.0, &nets.1);
    slave.tick(&nets.1);
    nets
}

/// Presents queued AXI4 requests and records responses; always ready.
#[derive(Default)]
pub struct AxiScript {
    aw: VecDeque<AxPayload>,
    w: VecDeque<WPayload>,
    ar: VecDeque<AxPayload>,
    pub b: Vec<BPayload>,
    pub r: Vec<RPayload>,
}

impl AxiScript {
    pub fn write(&mut self, ax: AxPayload, data: &[Word]) {
        self.aw.push_back(ax);
        for (i, d) in data.iter().enumerate() {
            self.w.push_back(WPayload {
                data: *d,
                strb: Strobe::MAX,
                id: ax.id,
                last: i + 1 == data.len(),
            });
        }
    }

    pub fn read(&mut self, ax: AxPayload) {
        self.ar.push_back(ax);
    }
}

impl Agent for AxiScript {
    type Bus = AxiBus;

    fn eval(&self, bus: &mut AxiBus) {
        bus.aw.valid = !self.aw.is_empty();
        bus.aw.payload = self.aw.front().copied().unwrap_or_default();
        bus.w.valid = !self.w.is_empty();
        bus.w.payload = self.w.front().copied().unwrap_or_default();
        bus.ar.valid = !self.ar.is_empty();
        bus.ar.payload = self.ar.front().copied().unwrap_or_default();
        bus.b.ready = true;
        bus.r.ready = true;
    }

    fn tick(&mut self, bus: &AxiBus) {
        if bus.aw.fires() {
            self.aw.pop_front();
        }
        if bus.w.fires() {
            self.w.pop_front();
        }
        if bus.ar.fires() {
            self.ar.pop_front();
        }
        if bus.b.fires() {
            self.b.push(bus.b.payload);
        }
        if bus.r.fires() {
            self.r.push(bus.r.payload);
        }
    }
}

/// Presents queued AXI4-Lite requests and records responses.
///
/// Each write keeps its address and data phases independent, as a Lite
/// master may.
#[derive(Default)]
pub struct LiteScript {
    aw: VecDeque<LiteAx>,
    w: VecDeque<LiteW>,
    ar: VecDeque<LiteAx>,
    pub b: Vec<Resp>,
    pub r: Vec<(Resp, Word)>,
    /// When set, the response channels are held not-ready.
    pub stall_responses: bool,
}

impl LiteScript {
    pub fn write(&mut self, addr: u64, data: Word, strb: Strobe) {
        self.aw.push_back(LiteAx { addr });
        self.w.push_back(LiteW { data, strb });
    }

    pub fn read(&mut self, addr: u64) {
        self.ar.push_back(LiteAx { addr });
    }
}

impl Agent for LiteScript {
    type Bus = AxiLiteBus;

    fn eval(&self, bus: &mut AxiLiteBus) {
        bus.aw.valid = !self.aw.is_empty();
        bus.aw.payload = self.aw.front().copied().unwrap_or_default();
        bus.w.valid = !self.w.is_empty();
        bus.w.payload = self.w.front().copied().unwrap_or_default();
        bus.ar.valid = !self.ar.is_empty();
        bus.ar.payload = self.ar.front().copied().unwrap_or_default();
        bus.b.ready = !self.stall_responses;
        bus.r.ready = !self.stall_responses;
    }

    fn tick(&mut self, bus: &AxiLiteBus) {
        if bus.aw.fires() {
            self.aw.pop_front();
        }
        if bus.w.fires() {
            self.w.pop_front();
        }
        if bus.ar.fires() {
            self.ar.pop_front();
        }
        if bus.b.fires() {
            self.b.push(bus.b.payload.resp);
        }
        if bus.r.fires() {
            self.r.push((bus.r.payload.resp, bus.r.payload.data));
        }
    }
}

/// A Lite slave that never answers.
#[derive(Default)]
pub struct SilentSlave;

impl Agent for SilentSlave {
    type Bus = AxiLiteBus;

    fn eval(&self, _bus: &mut AxiLiteBus) {}

    fn tick(&mut self, _bus: &AxiLiteBus) {}
}
