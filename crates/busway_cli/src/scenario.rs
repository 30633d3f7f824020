//! Scenario execution: builds a topology's testbench from a validated
//! [`ScenarioConfig`] and simulates it to completion.

use std::error::Error;

use busway_axi::{
    AxPayload, Axi2AxiLite, Axi2Wishbone, AxiLiteBus, AxiParams, Bridge, BridgeError, Lite2Csr,
    Lite2Wishbone, LiteConverter, LiteParams, LiteSram, LiteTimeout, Wishbone2Lite,
    WishboneParams,
};
use busway_common::{BurstMode, Resp, Word};
use busway_config::{resolve_bridge, OpSpec, ResolvedBridge, ScenarioConfig, Topology};
use busway_models::{
    AxiMaster, Backpressure, Completion, CsrBank, Guarded, LiteMaster, LiteOp, LiteResponder,
    Passthrough, Testbench, Transcript, WishboneMaster, WishboneMemory, WishboneOp,
};
use busway_sim::{simulate, SimConfig, SimResult};
use tracing::{debug, info};

/// What a finished scenario produced.
#[derive(Debug)]
pub struct Outcome {
    /// Kernel statistics.
    pub result: SimResult,
    /// Transactions in the order the master saw them finish.
    pub completions: Vec<Completion>,
    /// Cycles the slave-timeout guard spent answering in place of the slave.
    pub timeouts: u64,
}

/// Builds and runs the testbench described by `config`.
pub fn execute(config: &ScenarioConfig, sim: &SimConfig) -> Result<Outcome, Box<dyn Error>> {
    let resolved = resolve_bridge(&config.bridge)?;
    let max_deltas = config.sim.max_deltas;
    info!(topology = %resolved.topology, ops = config.ops.len(), "building testbench");

    let outcome = match resolved.topology {
        Topology::AxiToWishbone => {
            let axi = axi_port(&resolved)?;
            let wb = wishbone_port(&resolved)?;
            let mut bridge = Axi2Wishbone::new(axi, wb, resolved.base_address)?;
            bridge.set_max_deltas(max_deltas);
            let bench = Testbench::new(axi_master(axi, config)?, bridge, wishbone_memory(wb, config));
            let (result, bench) = simulate(bench, sim)?;
            Outcome::new(result, &bench.master, 0)
        }
        Topology::AxiToAxiLite => {
            let axi = axi_port(&resolved)?;
            let bridge = Axi2AxiLite::new(axi, resolved.lite)?;
            let bench = Testbench::new(
                axi_master(axi, config)?,
                bridge,
                responder(resolved.lite, config),
            );
            let (result, bench) = simulate(bench, sim)?;
            Outcome::new(result, &bench.master, 0)
        }
        Topology::AxiLiteToWishbone => {
            let wb = wishbone_port(&resolved)?;
            let inner = Lite2Wishbone::new(resolved.lite, wb, resolved.base_address)?;
            let bridge = guarded(inner, &resolved, max_deltas)?;
            let bench = Testbench::new(lite_master(&resolved, config)?, bridge, wishbone_memory(wb, config));
            let (result, bench) = simulate(bench, sim)?;
            let timeouts = bench.bridge.timeouts();
            Outcome::new(result, &bench.master, timeouts)
        }
        Topology::AxiLiteToSram => {
            let bytes = config
                .bridge
                .memory_words
                .saturating_mul(u64::from(resolved.lite.data_width.bytes()));
            let sram = LiteSram::new(resolved.lite, bytes, config.bridge.read_only)?;
            let bridge = guarded(Passthrough, &resolved, max_deltas)?;
            let bench = Testbench::new(lite_master(&resolved, config)?, bridge, sram);
            let (result, bench) = simulate(bench, sim)?;
            let timeouts = bench.bridge.timeouts();
            Outcome::new(result, &bench.master, timeouts)
        }
        Topology::AxiLiteToCsr => {
            let csr = resolved
                .csr
                .ok_or_else(|| missing_port(resolved.topology, "CSR"))?;
            let inner = Lite2Csr::new(resolved.lite, csr)?;
            let bridge = guarded(inner, &resolved, max_deltas)?;
            let depth = usize::try_from(config.bridge.memory_words)?;
            let bench = Testbench::new(lite_master(&resolved, config)?, bridge, CsrBank::new(csr, depth));
            let (result, bench) = simulate(bench, sim)?;
            let timeouts = bench.bridge.timeouts();
            Outcome::new(result, &bench.master, timeouts)
        }
        Topology::AxiLiteDownConverter => {
            let narrow = resolved
                .slave_lite
                .ok_or_else(|| missing_port(resolved.topology, "narrow AXI4-Lite"))?;
            let inner = LiteConverter::new(resolved.lite, narrow)?;
            let bridge = guarded(inner, &resolved, max_deltas)?;
            let bench = Testbench::new(lite_master(&resolved, config)?, bridge, responder(narrow, config));
            let (result, bench) = simulate(bench, sim)?;
            let timeouts = bench.bridge.timeouts();
            Outcome::new(result, &bench.master, timeouts)
        }
        Topology::AxiLiteToResponder => {
            let bridge = guarded(Passthrough, &resolved, max_deltas)?;
            let bench = Testbench::new(
                lite_master(&resolved, config)?,
                bridge,
                responder(resolved.lite, config),
            );
            let (result, bench) = simulate(bench, sim)?;
            let timeouts = bench.bridge.timeouts();
            Outcome::new(result, &bench.master, timeouts)
        }
        Topology::WishboneToAxiLite => {
            let wb = wishbone_port(&resolved)?;
            let bridge = Wishbone2Lite::new(wb, resolved.lite, resolved.base_address)?;
            let bench = Testbench::new(
                wishbone_master(wb, config)?,
                bridge,
                responder(resolved.lite, config),
            );
            let (result, bench) = simulate(bench, sim)?;
            Outcome::new(result, &bench.master, 0)
        }
    };

    debug!(
        cycles = outcome.result.final_cycle.index(),
        deltas = outcome.result.total_deltas,
        completions = outcome.completions.len(),
        "scenario finished"
    );
    Ok(outcome)
}

impl Outcome {
    fn new<T: Transcript>(result: SimResult, master: &T, timeouts: u64) -> Self {
        Self {
            result,
            completions: master.completions().to_vec(),
            timeouts,
        }
    }

    /// Number of transactions whose merged response is not OKAY.
    pub fn errors(&self) -> usize {
        self.completions
            .iter()
            .filter(|c| c.resp() != Resp::Okay)
            .count()
    }
}

fn missing_port(topology: Topology, port: &str) -> Box<dyn Error> {
    format!("{topology} resolved without its {port} port").into()
}

fn axi_port(resolved: &ResolvedBridge) -> Result<AxiParams, Box<dyn Error>> {
    resolved
        .axi
        .ok_or_else(|| missing_port(resolved.topology, "AXI4"))
}

fn wishbone_port(resolved: &ResolvedBridge) -> Result<WishboneParams, Box<dyn Error>> {
    resolved
        .wishbone
        .ok_or_else(|| missing_port(resolved.topology, "Wishbone"))
}

/// Wraps a Lite-mastered bridge in the timeout guard, when one is configured.
fn guarded<B>(bridge: B, resolved: &ResolvedBridge, max_deltas: u32) -> Result<Guarded<B>, BridgeError>
where
    B: Bridge<Master = AxiLiteBus>,
    B::Slave: Copy + PartialEq,
{
    let mut guarded = match resolved.timeout_cycles {
        Some(cycles) => Guarded::with_timeout(bridge, LiteTimeout::new(resolved.lite, cycles)?),
        None => Guarded::new(bridge),
    };
    guarded.set_max_deltas(max_deltas);
    Ok(guarded)
}

fn master_backpressure(config: &ScenarioConfig) -> Backpressure {
    Backpressure::new(config.sim.seed, config.sim.stall_probability)
}

fn lite_master(resolved: &ResolvedBridge, config: &ScenarioConfig) -> Result<LiteMaster, Box<dyn Error>> {
    let all_lanes = resolved.lite.data_width.strobe_mask();
    let mut master = LiteMaster::new(resolved.lite).with_backpressure(master_backpressure(config));
    for op in &config.ops {
        match op {
            OpSpec::Read { addr, .. } => master.push(LiteOp::Read { addr: *addr }),
            OpSpec::Write { addr, data, strb } => master.push(LiteOp::Write {
                addr: *addr,
                data: data.0,
                strb: strb.unwrap_or(all_lanes),
            }),
            other => return Err(format!("{} cannot be issued by an AXI4-Lite master", other.kind()).into()),
        }
    }
    Ok(master)
}

fn wishbone_master(wb: WishboneParams, config: &ScenarioConfig) -> Result<WishboneMaster, Box<dyn Error>> {
    let all_lanes = wb.data_width.strobe_mask();
    let mut master = WishboneMaster::new(wb);
    for op in &config.ops {
        match op {
            OpSpec::Read { addr, .. } => master.push(WishboneOp::Read { adr: *addr }),
            OpSpec::Write { addr, data, strb } => master.push(WishboneOp::Write {
                adr: *addr,
                data: data.0,
                sel: strb.unwrap_or(all_lanes),
            }),
            other => return Err(format!("{} cannot be issued by a Wishbone master", other.kind()).into()),
        }
    }
    Ok(master)
}

/// Single ops become one-beat INCR bursts at the full bus width.
fn axi_master(axi: AxiParams, config: &ScenarioConfig) -> Result<AxiMaster, Box<dyn Error>> {
    let full_size = u8::try_from(axi.data_width.addr_shift())?;
    let all_lanes = axi.data_width.strobe_mask();
    let descriptor = |addr: u64, burst: BurstMode, len: u8, size: Option<u8>, id: u32| AxPayload {
        addr,
        burst,
        len,
        size: size.unwrap_or(full_size),
        id,
        ..AxPayload::default()
    };

    let mut master = AxiMaster::new(axi).with_backpressure(master_backpressure(config));
    for op in &config.ops {
        match op {
            OpSpec::Read { addr, .. } => {
                master.read(descriptor(*addr, BurstMode::Incr, 0, None, 0))?;
            }
            OpSpec::Write { addr, data, strb } => {
                master.write_with_strobes(
                    descriptor(*addr, BurstMode::Incr, 0, None, 0),
                    vec![data.0],
                    vec![strb.unwrap_or(all_lanes)],
                )?;
            }
            OpSpec::BurstRead {
                addr,
                burst,
                len,
                size,
                id,
                ..
            } => {
                master.read(descriptor(*addr, *burst, *len, *size, *id))?;
            }
            OpSpec::BurstWrite {
                addr,
                burst,
                size,
                id,
                data,
                strb,
            } => {
                let len = u8::try_from(data.len().saturating_sub(1))?;
                let words: Vec<Word> = data.iter().map(|w| w.0).collect();
                let strobes = match strb {
                    Some(strb) => strb.clone(),
                    None => vec![all_lanes; words.len()],
                };
                master.write_with_strobes(descriptor(*addr, *burst, len, *size, *id), words, strobes)?;
            }
        }
    }
    Ok(master)
}

fn wishbone_memory(wb: WishboneParams, config: &ScenarioConfig) -> WishboneMemory {
    let mut memory = WishboneMemory::new(wb).with_latency(config.bridge.latency);
    for &adr in &config.bridge.error_addresses {
        memory.add_error_window(adr..adr.saturating_add(1));
    }
    memory
}

/// The responder stalls on its own stream, one seed after the master's.
fn responder(params: LiteParams, config: &ScenarioConfig) -> LiteResponder {
    let backpressure = Backpressure::new(config.sim.seed.wrapping_add(1), config.sim.stall_probability);
    let mut responder = LiteResponder::new(params)
        .with_latency(config.bridge.latency)
        .with_backpressure(backpressure);
    for &addr in &config.bridge.error_addresses {
        responder.set_resp(addr, Resp::SlvErr);
    }
    for &addr in &config.bridge.silent_addresses {
        responder.set_silent(addr);
    }
    responder
}
