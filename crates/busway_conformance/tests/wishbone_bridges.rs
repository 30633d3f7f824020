//! AXI4-Lite to Wishbone and back: address arithmetic against the base,
//! error mapping in both directions, and one bus cycle per transaction.

use busway_axi::{Lite2Wishbone, Wishbone2Lite, WishboneParams};
use busway_common::Resp;
use busway_conformance::{lite, run};
use busway_models::{
    Backpressure, LiteMaster, LiteResponder, Testbench, Transcript, WishboneMaster,
    WishboneMemory,
};
use busway_sim::CycleKernel;

fn wb() -> WishboneParams {
    WishboneParams::new(32, 30).unwrap()
}

fn forward(
    base: u64,
    master: LiteMaster,
    memory: WishboneMemory,
) -> Testbench<LiteMaster, Lite2Wishbone, WishboneMemory> {
    let bridge = Lite2Wishbone::new(lite(32, 32), wb(), base).unwrap();
    Testbench::new(master, bridge, memory)
}

fn reverse(base: u64, responder: LiteResponder) -> Testbench<WishboneMaster, Wishbone2Lite, LiteResponder> {
    let bridge = Wishbone2Lite::new(wb(), lite(32, 32), base).unwrap();
    Testbench::new(WishboneMaster::new(wb()), bridge, responder)
}

#[test]
fn lite_write_read_through_wishbone() {
    let mut master = LiteMaster::new(lite(32, 32));
    master.write(0x1008, 0x1234_5678, 0xF);
    master.read(0x1008);
    let (result, tb) = run(forward(0, master, WishboneMemory::new(wb())));

    assert!(result.completed);
    let done = tb.master.completions();
    assert_eq!(done[0].resps, [Resp::Okay]);
    assert_eq!(done[1].resps, [Resp::Okay]);
    assert_eq!(done[1].data, [0x1234_5678]);
    assert_eq!(tb.slave.word(0x402), 0x1234_5678);
    assert!(tb.bridge.is_idle());
}

#[test]
fn lite_base_address_is_subtracted() {
    let mut master = LiteMaster::new(lite(32, 32));
    master.write(0x4000_0010, 1, 0xF);
    let (_, tb) = run(forward(0x4000_0000, master, WishboneMemory::new(wb())));
    let adrs: Vec<u64> = tb.slave.log().iter().map(|c| c.adr).collect();
    assert_eq!(adrs, [0x4]);
}

#[test]
fn wishbone_err_becomes_slverr() {
    let mut memory = WishboneMemory::new(wb());
    memory.add_error_window(0x10..0x11);
    let mut master = LiteMaster::new(lite(32, 32));
    master.write(0x40, 7, 0xF);
    master.read(0x40);
    master.read(0x44);
    let (_, tb) = run(forward(0, master, memory));

    let resps: Vec<Resp> = tb.master.completions().iter().map(|c| c.resp()).collect();
    assert_eq!(resps, [Resp::SlvErr, Resp::SlvErr, Resp::Okay]);
    assert_eq!(tb.master.completions()[2].data, [0]);
    assert_eq!(tb.slave.word(0x10), 0);
}

#[test]
fn one_wishbone_cycle_per_lite_transaction_under_backpressure() {
    let mut memory = WishboneMemory::new(wb()).with_latency(1);
    for adr in 0..4u64 {
        memory.set_word(adr, 0xA0 + u128::from(adr));
    }
    let mut master = LiteMaster::new(lite(32, 32)).with_backpressure(Backpressure::new(3, 0.6));
    for adr in 0..4u64 {
        master.read(adr * 4);
    }
    let (_, tb) = run(forward(0, master, memory));

    let data: Vec<u128> = tb.master.completions().iter().map(|c| c.data[0]).collect();
    assert_eq!(data, [0xA0, 0xA1, 0xA2, 0xA3]);
    assert_eq!(tb.slave.log().len(), 4);
}

#[test]
fn wishbone_master_reaches_lite_slave() {
    let mut tb = reverse(0, LiteResponder::new(lite(32, 32)));
    tb.master.write(5, 0xFEED, 0xF);
    tb.master.read(5);
    let (result, tb) = run(tb);

    assert!(result.completed);
    let done = tb.master.completions();
    assert_eq!(done[0].resps, [Resp::Okay]);
    assert_eq!(done[1].data, [0xFEED]);
    assert_eq!(tb.slave.word(0x14), 0xFEED);
}

#[test]
fn wishbone_base_address_is_subtracted() {
    let mut tb = reverse(0x40, LiteResponder::new(lite(32, 32)));
    tb.master.write(0x11, 0x77, 0xF);
    tb.master.read(0x11);
    let (_, tb) = run(tb);

    // 0x40 bytes is 0x10 words; word 0x11 lands on word 1, byte 0x4.
    assert_eq!(tb.slave.writes()[0].addr, 0x4);
    assert_eq!(tb.slave.reads(), [0x4]);
    assert_eq!(tb.slave.word(0x4), 0x77);
    assert_eq!(tb.master.completions()[1].data, [0x77]);
}

#[test]
fn lite_error_pulses_err_for_one_cycle() {
    let mut responder = LiteResponder::new(lite(32, 32));
    responder.set_resp(0x8, Resp::SlvErr);
    let mut tb = reverse(0, responder);
    tb.master.read(2);
    tb.master.read(3);

    let mut kernel = CycleKernel::new(tb);
    let mut err_cycles = Vec::new();
    for cycle in 0..24u64 {
        kernel.step().unwrap();
        let bus = kernel.wires().master;
        if bus.err {
            assert!(bus.ack);
            err_cycles.push(cycle);
        }
    }
    let tb = kernel.into_design();

    assert_eq!(err_cycles.len(), 1);
    let resps: Vec<Resp> = tb.master.completions().iter().map(|c| c.resp()).collect();
    assert_eq!(resps, [Resp::SlvErr, Resp::Okay]);
    assert_eq!(tb.slave.reads(), [0x8, 0xC]);
}

#[test]
fn lite_write_error_reaches_wishbone_master() {
    let mut responder = LiteResponder::new(lite(32, 32));
    responder.set_resp(0x8, Resp::DecErr);
    let mut tb = reverse(0, responder);
    tb.master.write(2, 1, 0xF);
    tb.master.write(3, 2, 0xF);
    let (_, tb) = run(tb);

    let resps: Vec<Resp> = tb.master.completions().iter().map(|c| c.resp()).collect();
    assert_eq!(resps, [Resp::SlvErr, Resp::Okay]);
    assert_eq!(tb.slave.writes().len(), 2);
}
