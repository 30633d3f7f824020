//! AXI4 to AXI4-Lite: one Lite transaction per beat, sticky write response,
//! per-beat read responses.

use busway_axi::{Axi2AxiLite, AxiParams};
use busway_common::{BurstMode, Resp};
use busway_conformance::{burst, lite, run};
use busway_models::{AxiMaster, LiteResponder, Testbench, Transcript};

fn axi() -> AxiParams {
    AxiParams::new(32, 32, 4).unwrap()
}

fn bench(responder: LiteResponder) -> Testbench<AxiMaster, Axi2AxiLite, LiteResponder> {
    let bridge = Axi2AxiLite::new(axi(), lite(32, 32)).unwrap();
    Testbench::new(AxiMaster::new(axi()), bridge, responder)
}

#[test]
fn lite_transactions_equal_beats() {
    for len in [0u8, 1, 3, 7, 15] {
        let mut tb = bench(LiteResponder::new(lite(32, 32)));
        let data: Vec<u128> = (0..=u128::from(len)).collect();
        tb.master
            .write(burst(BurstMode::Incr, 0x200, len, 2), data.clone())
            .unwrap();
        tb.master.read(burst(BurstMode::Incr, 0x200, len, 2)).unwrap();
        let (result, tb) = run(tb);

        assert!(result.completed);
        assert_eq!(tb.slave.writes().len(), usize::from(len) + 1);
        assert_eq!(tb.slave.reads().len(), usize::from(len) + 1);
        let done = tb.master.completions();
        assert_eq!(done[0].resps, [Resp::Okay]);
        assert_eq!(done[1].data, data);
    }
}

#[test]
fn single_beat_write_response_is_the_lite_response() {
    let mut responder = LiteResponder::new(lite(32, 32));
    responder.set_resp(0x10, Resp::DecErr);
    let mut tb = bench(responder);
    tb.master.write(burst(BurstMode::Incr, 0x10, 0, 2), vec![7]).unwrap();
    let (_, tb) = run(tb);
    assert_eq!(tb.master.completions()[0].resps, [Resp::DecErr]);
}

#[test]
fn write_error_is_sticky_at_any_beat() {
    for bad in 0..4u64 {
        let mut responder = LiteResponder::new(lite(32, 32));
        responder.set_resp(0x100 + bad * 4, Resp::SlvErr);
        let mut tb = bench(responder);
        tb.master
            .write(burst(BurstMode::Incr, 0x100, 3, 2), vec![1, 2, 3, 4])
            .unwrap();
        let (_, tb) = run(tb);

        let done = &tb.master.completions()[0];
        assert_eq!(done.resps, [Resp::SlvErr], "error on beat {bad}");
        // Every beat is still issued.
        assert_eq!(tb.slave.writes().len(), 4);
    }
}

#[test]
fn first_write_error_wins() {
    let mut responder = LiteResponder::new(lite(32, 32));
    responder.set_resp(0x104, Resp::DecErr);
    responder.set_resp(0x108, Resp::SlvErr);
    let mut tb = bench(responder);
    tb.master
        .write(burst(BurstMode::Incr, 0x100, 3, 2), vec![1, 2, 3, 4])
        .unwrap();
    let (_, tb) = run(tb);
    assert_eq!(tb.master.completions()[0].resp(), Resp::DecErr);
}

#[test]
fn read_responses_are_forwarded_per_beat() {
    let mut responder = LiteResponder::new(lite(32, 32));
    for (i, word) in [0x11u128, 0x22, 0x33, 0x44].into_iter().enumerate() {
        responder.set_word(0x300 + 4 * i as u64, word);
    }
    responder.set_resp(0x304, Resp::SlvErr);
    let mut tb = bench(responder);
    tb.master.read(burst(BurstMode::Incr, 0x300, 3, 2)).unwrap();
    let (_, tb) = run(tb);

    let done = &tb.master.completions()[0];
    assert_eq!(
        done.resps,
        [Resp::Okay, Resp::SlvErr, Resp::Okay, Resp::Okay]
    );
    assert_eq!(done.data, [0x11, 0xFFFF_FFFF, 0x33, 0x44]);
    assert_eq!(done.resp(), Resp::SlvErr);
}

#[test]
fn wrap_write_lands_on_wrapped_addresses() {
    let mut tb = bench(LiteResponder::new(lite(32, 32)));
    tb.master
        .write(burst(BurstMode::Wrap, 0x48, 3, 2), vec![1, 2, 3, 4])
        .unwrap();
    let (_, tb) = run(tb);
    let addrs: Vec<u64> = tb.slave.writes().iter().map(|w| w.addr).collect();
    assert_eq!(addrs, [0x48, 0x4C, 0x40, 0x44]);
    assert_eq!(tb.slave.word(0x40), 3);
}

#[test]
fn ids_are_returned_with_responses() {
    let mut tb = bench(LiteResponder::new(lite(32, 32)));
    let mut ax = burst(BurstMode::Incr, 0x0, 1, 2);
    ax.id = 9;
    tb.master.write(ax, vec![5, 6]).unwrap();
    tb.master.read(ax).unwrap();
    let (_, tb) = run(tb);
    let done = tb.master.completions();
    assert!(done.iter().all(|c| c.id == 9));
    assert_eq!(done[1].data, [5, 6]);
}
