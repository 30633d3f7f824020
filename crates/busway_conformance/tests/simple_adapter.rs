//! Lite-to-simple adapter behaviour seen through the block RAM and the CSR
//! bridge.

use busway_axi::{CsrParams, Lite2Csr, LiteSram};
use busway_common::Resp;
use busway_conformance::{lite, run};
use busway_models::{CsrBank, Guarded, LiteMaster, Passthrough, Testbench, Transcript};

fn sram_bench(contents: Vec<u128>) -> Testbench<LiteMaster, Guarded<Passthrough>, LiteSram> {
    let sram = LiteSram::with_contents(lite(32, 16), contents, false).unwrap();
    Testbench::new(LiteMaster::new(lite(32, 16)), Guarded::new(Passthrough), sram)
}

#[test]
fn repeated_read_is_idempotent() {
    let mut tb = sram_bench(vec![0, 0xDEAD_BEEF, 0]);
    tb.master.read(0x4);
    tb.master.read(0x4);
    let (_, tb) = run(tb);

    let done = tb.master.completions();
    assert_eq!(done.len(), 2);
    assert_eq!(done[0].data, done[1].data);
    assert_eq!(done[0].resps, done[1].resps);
    assert_eq!(done[0].latency(), done[1].latency());
    assert_eq!(done[0].data, [0xDEAD_BEEF]);
    assert_eq!(tb.slave.word(1), 0xDEAD_BEEF);
}

#[test]
fn read_after_other_address_sees_no_stale_data() {
    let mut tb = sram_bench(vec![0x11, 0x22, 0x33]);
    tb.master.read(0x8);
    tb.master.read(0x0);
    tb.master.read(0x8);
    let (_, tb) = run(tb);
    let data: Vec<u128> = tb.master.completions().iter().map(|c| c.data[0]).collect();
    assert_eq!(data, [0x33, 0x11, 0x33]);
}

#[test]
fn byte_strobes_merge_into_sram_words() {
    let mut tb = sram_bench(vec![0xAABB_CCDD]);
    tb.master.write(0x0, 0x1122_3344, 0b0101);
    tb.master.read(0x0);
    let (_, tb) = run(tb);
    assert_eq!(tb.master.completions()[1].data, [0xAA22_CC44]);
    assert!(tb.master.completions().iter().all(|c| c.resp() == Resp::Okay));
}

#[test]
fn read_only_sram_answers_okay_and_keeps_contents() {
    let sram = LiteSram::with_contents(lite(32, 16), vec![5], true).unwrap();
    let mut tb = Testbench::new(LiteMaster::new(lite(32, 16)), Guarded::new(Passthrough), sram);
    tb.master.write(0x0, 9, 0xF);
    tb.master.read(0x0);
    let (_, tb) = run(tb);
    let done = tb.master.completions();
    assert_eq!(done[0].resps, [Resp::Okay]);
    assert_eq!(done[1].data, [5]);
}

#[test]
fn csr_writes_are_word_granular() {
    let csr = CsrParams::new(32, 14).unwrap();
    let bridge = Guarded::new(Lite2Csr::new(lite(32, 16), csr).unwrap());
    let mut tb = Testbench::new(LiteMaster::new(lite(32, 16)), bridge, CsrBank::new(csr, 16));
    tb.master.write(0x10, 0xCAFE, 0x1);
    tb.master.read(0x10);
    tb.master.read(0x10);
    let (_, tb) = run(tb);

    // Any strobe lane enables the whole register.
    assert_eq!(tb.slave.reg(4), 0xCAFE);
    assert_eq!(tb.slave.writes(), [(4, 0xCAFE)]);
    let done = tb.master.completions();
    assert_eq!(done[1].data, done[2].data);
}
