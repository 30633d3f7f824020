//! Conformance test helpers for the busway bridges.
//!
//! Provides descriptor builders, a beat-address walk over the burst
//! segmenter, a one-call simulation wrapper, and a seeded random traffic
//! generator with a reference memory model, for assertion in the
//! integration tests under `tests/`.

#![warn(missing_docs)]

use std::collections::HashMap;

use busway_axi::{AxPayload, BurstSegmenter, Channel, LiteParams};
use busway_common::{BurstMode, Strobe, Word};
use busway_models::LiteOp;
use busway_sim::{simulate, Design, SimConfig, SimResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Cycle budget used by [`run`].
pub const MAX_CYCLES: u64 = 50_000;

/// AXI4-Lite parameters, panicking on an illegal combination.
pub fn lite(data_width: u32, address_width: u32) -> LiteParams {
    LiteParams::new(data_width, address_width).unwrap()
}

/// A burst descriptor with id zero.
pub fn burst(burst: BurstMode, addr: u64, len: u8, size: u8) -> AxPayload {
    AxPayload {
        addr,
        burst,
        len,
        size,
        ..AxPayload::default()
    }
}

/// Byte address of every beat of `ax`, in issue order.
pub fn beat_addresses(ax: &AxPayload) -> Vec<u64> {
    let mut segmenter = BurstSegmenter::full();
    let held = Channel {
        valid: true,
        ready: false,
        payload: *ax,
    };
    (0..ax.beats())
        .map(|_| {
            let (beat, _) = segmenter.drive(&held, true);
            segmenter.tick(&held, true);
            beat.payload.addr
        })
        .collect()
}

/// Simulates `design` until it reports completion.
///
/// Panics if the kernel fails or the design hangs past [`MAX_CYCLES`].
pub fn run<D: Design>(design: D) -> (SimResult, D) {
    let config = SimConfig {
        max_cycles: MAX_CYCLES,
        ..SimConfig::default()
    };
    simulate(design, &config).unwrap()
}

/// Random single-word Lite traffic over a small address window, together
/// with the data each read must return.
pub struct Traffic {
    /// The ops, in issue order.
    pub ops: Vec<LiteOp>,
    /// Per op: the word a read must return, `None` for writes.
    pub expected: Vec<Option<Word>>,
}

/// Generates `count` reads and writes over `words` word addresses of a bus
/// of `params`, reproducibly for `seed`.
///
/// Memory is assumed to start zeroed. Strobes are random, so the reference
/// model merges bytes lane by lane.
pub fn random_traffic(seed: u64, count: usize, words: u64, params: LiteParams) -> Traffic {
    let mut rng = StdRng::seed_from_u64(seed);
    let bytes = params.data_width.bytes();
    let mut model: HashMap<u64, Word> = HashMap::new();
    let mut ops = Vec::with_capacity(count);
    let mut expected = Vec::with_capacity(count);

    for _ in 0..count {
        let addr = rng.gen_range(0..words) * u64::from(bytes);
        if rng.gen_bool(0.5) {
            let data: Word = rng.gen::<u128>() & params.data_width.mask();
            let strb: Strobe = rng.gen::<Strobe>() & params.data_width.strobe_mask();
            let word = model.entry(addr).or_default();
            for lane in 0..bytes {
                if strb & (1 << lane) != 0 {
                    let m: Word = 0xFF << (lane * 8);
                    *word = (*word & !m) | (data & m);
                }
            }
            ops.push(LiteOp::Write { addr, data, strb });
            expected.push(None);
        } else {
            ops.push(LiteOp::Read { addr });
            expected.push(Some(model.get(&addr).copied().unwrap_or(0)));
        }
    }
    Traffic { ops, expected }
}
