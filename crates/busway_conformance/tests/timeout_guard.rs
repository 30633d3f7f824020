//! Slave-timeout guard timing, stepped cycle by cycle through the kernel.

use busway_axi::LiteTimeout;
use busway_common::Resp;
use busway_conformance::{lite, run};
use busway_models::{Guarded, LiteMaster, LiteResponder, Passthrough, Testbench, Transcript};
use busway_sim::CycleKernel;

type Bench = Testbench<LiteMaster, Guarded<Passthrough>, LiteResponder>;

fn guarded_bench(cycles: u32, silent: &[u64]) -> Bench {
    let mut responder = LiteResponder::new(lite(32, 16));
    for &addr in silent {
        responder.set_silent(addr);
    }
    let guard = LiteTimeout::new(lite(32, 16), cycles).unwrap();
    Testbench::new(
        LiteMaster::new(lite(32, 16)),
        Guarded::with_timeout(Passthrough, guard),
        responder,
    )
}

/// Cycle indices on which the guard's error output was asserted.
fn error_cycles(bench: Bench, cycles: u64) -> (Vec<u64>, Bench) {
    let mut kernel = CycleKernel::new(bench);
    let mut seen = Vec::new();
    let mut count = 0;
    for cycle in 0..cycles {
        kernel.step().unwrap();
        let now = kernel.design().bridge.timeouts();
        if now != count {
            seen.push(cycle);
            count = now;
        }
    }
    (seen, kernel.into_design())
}

#[test]
fn unanswered_write_errors_on_fifth_cycle() {
    let mut tb = guarded_bench(4, &[0x0]);
    tb.master.write(0x0, 1, 0xF);
    let (seen, tb) = error_cycles(tb, 12);
    // Cycles 0..=3 wait; the pulse is on cycle 4, the fifth.
    assert_eq!(seen, [4]);
    assert_eq!(tb.master.completions()[0].resps, [Resp::SlvErr]);
}

#[test]
fn guard_length_sets_pulse_cycle() {
    for n in [1u32, 2, 8, 16] {
        let mut tb = guarded_bench(n, &[0x4]);
        tb.master.read(0x4);
        let (seen, tb) = error_cycles(tb, u64::from(n) + 8);
        assert_eq!(seen, [u64::from(n)], "guard of {n} cycles");
        let done = &tb.master.completions()[0];
        assert_eq!(done.resps, [Resp::SlvErr]);
        assert_eq!(done.data, [0xFFFF_FFFF]);
    }
}

#[test]
fn responsive_slave_is_never_preempted() {
    let mut tb = guarded_bench(1, &[]);
    for i in 0..8 {
        tb.master.write(i * 4, u128::from(i), 0xF);
        tb.master.read(i * 4);
    }
    let (_, tb) = run(tb);
    assert_eq!(tb.bridge.timeouts(), 0);
    assert!(tb
        .master
        .completions()
        .iter()
        .all(|c| c.resp() == Resp::Okay));
}

#[test]
fn guard_recovers_for_next_transaction() {
    let mut tb = guarded_bench(3, &[0x8]);
    tb.master.read(0x8);
    tb.master.write(0xC, 0x77, 0xF);
    tb.master.read(0xC);
    tb.master.read(0x8);
    let (_, tb) = run(tb);

    let resps: Vec<Resp> = tb.master.completions().iter().map(|c| c.resp()).collect();
    assert_eq!(resps, [Resp::SlvErr, Resp::Okay, Resp::Okay, Resp::SlvErr]);
    assert_eq!(tb.master.completions()[2].data, [0x77]);
    assert_eq!(tb.bridge.timeouts(), 2);
}
