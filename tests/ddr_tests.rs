//! Integration tests for the reference DDR target and its controllers.

use axi_fabric::axi::{ArChannel, AwChannel, BurstType, Channel, Resp, WChannel};
use axi_fabric::common::SimError;
use axi_fabric::config::{ControllerKind, MemoryConfig, ReadOrder};
use axi_fabric::sim::Component;
use axi_fabric::target::{DramController, MemoryController, SimDdr, SimpleController};

fn create_ddr(config: MemoryConfig) -> SimDdr {
    let mut ddr = SimDdr::new(&config, 4).unwrap();
    ddr.init();
    ddr
}

fn fast_config() -> MemoryConfig {
    MemoryConfig {
        read_latency: 1,
        write_latency: 1,
        ..MemoryConfig::default()
    }
}

fn ar(id: u8, addr: u32, len: u8) -> ArChannel {
    ArChannel {
        arvalid: true,
        arready: false,
        araddr: addr,
        arid: id,
        arlen: len,
        arsize: 2,
        arburst: BurstType::Incr,
    }
}

fn step(ddr: &mut SimDdr) -> Result<(), SimError> {
    ddr.comb_outputs()?;
    ddr.comb_inputs()?;
    ddr.seq()
}

/// Collects `(rid, rdata, rlast, rresp)` of every R beat until `count` beats arrive.
fn collect_beats(ddr: &mut SimDdr, count: usize) -> Vec<(u8, u64, bool, Resp)> {
    let mut beats = Vec::new();
    ddr.io.r.rready = true;
    for _ in 0..200 {
        ddr.comb_outputs().unwrap();
        let r = ddr.io.r;
        if r.rvalid {
            beats.push((r.rid, r.rdata, r.rlast, r.rresp));
        }
        ddr.comb_inputs().unwrap();
        ddr.seq().unwrap();
        if beats.len() == count {
            break;
        }
    }
    beats
}

/// Tests backdoor loading and reading, and that untouched memory reads zero.
#[test]
fn test_ddr_backdoor_access() {
    let mut ddr = create_ddr(MemoryConfig::default());
    ddr.load(0x0FFE, &[1, 2, 3, 4]);
    assert_eq!(ddr.read_bytes(0x0FFD, 6), vec![0, 1, 2, 3, 4, 0]);
    assert_eq!(ddr.read_byte(0x8000_0000), 0);
}

/// Tests that read data appears after the controller latency with correct `rlast`.
#[test]
fn test_ddr_read_latency_and_data() {
    let mut ddr = create_ddr(MemoryConfig {
        read_latency: 3,
        ..MemoryConfig::default()
    });
    ddr.load(0x100, &(0u8..16).collect::<Vec<_>>());

    ddr.io.ar = ar(1, 0x100, 3);
    ddr.comb_outputs().unwrap();
    assert!(ddr.io.ar.arready);
    ddr.comb_inputs().unwrap();
    ddr.seq().unwrap();
    ddr.io.ar.arvalid = false;

    let mut first = None;
    ddr.io.r.rready = true;
    for cycle in 1..20 {
        ddr.comb_outputs().unwrap();
        if ddr.io.r.rvalid {
            first = Some(cycle);
            break;
        }
        ddr.comb_inputs().unwrap();
        ddr.seq().unwrap();
    }
    assert_eq!(first, Some(4));

    let beats = collect_beats(&mut ddr, 4);
    assert_eq!(beats.len(), 4);
    assert_eq!(beats[0], (1, 0x0302_0100, false, Resp::Okay));
    assert_eq!(beats[3], (1, 0x0F0E_0D0C, true, Resp::Okay));
    assert!(ddr.is_idle());
}

/// Tests that R holds its beat while `rready` is low.
#[test]
fn test_ddr_read_backpressure() {
    let mut ddr = create_ddr(fast_config());
    ddr.load(0x200, &[9, 8, 7, 6]);
    ddr.io.ar = ar(4, 0x200, 0);
    step(&mut ddr).unwrap();
    ddr.io.ar.arvalid = false;

    ddr.io.r.rready = false;
    for _ in 0..10 {
        step(&mut ddr).unwrap();
    }
    ddr.comb_outputs().unwrap();
    assert!(ddr.io.r.rvalid);
    assert_eq!(ddr.io.r.rdata, 0x0607_0809);

    let beats = collect_beats(&mut ddr, 1);
    assert_eq!(beats, vec![(4, 0x0607_0809, true, Resp::Okay)]);
}

/// Tests SLVERR for accesses at or beyond the memory size.
#[test]
fn test_ddr_out_of_range_read() {
    let mut ddr = create_ddr(MemoryConfig {
        size: 0x0FFC,
        ..fast_config()
    });
    ddr.io.ar = ar(2, 0x0FF8, 1);
    step(&mut ddr).unwrap();
    ddr.io.ar.arvalid = false;

    let beats = collect_beats(&mut ddr, 2);
    assert_eq!(beats[0].3, Resp::Okay);
    assert_eq!(beats[1].3, Resp::SlvErr);
    assert!(beats[1].2);
}

/// Tests youngest-first service among bursts whose data is ready.
#[test]
fn test_ddr_lifo_read_order() {
    let mut ddr = create_ddr(MemoryConfig {
        read_order: ReadOrder::Lifo,
        ..fast_config()
    });

    ddr.io.r.rready = false;
    for id in 1..=3 {
        ddr.io.ar = ar(id, 0x1000 * id as u32, 0);
        step(&mut ddr).unwrap();
    }
    ddr.io.ar.arvalid = false;
    for _ in 0..5 {
        step(&mut ddr).unwrap();
    }

    let order: Vec<u8> = collect_beats(&mut ddr, 3).iter().map(|b| b.0).collect();
    assert_eq!(order, vec![1, 3, 2]);
}

/// Tests oldest-first service.
#[test]
fn test_ddr_fifo_read_order() {
    let mut ddr = create_ddr(fast_config());
    ddr.io.r.rready = false;
    for id in 1..=3 {
        ddr.io.ar = ar(id, 0x1000 * id as u32, 0);
        step(&mut ddr).unwrap();
    }
    ddr.io.ar.arvalid = false;

    let order: Vec<u8> = collect_beats(&mut ddr, 3).iter().map(|b| b.0).collect();
    assert_eq!(order, vec![1, 2, 3]);
}

/// Tests that the AR queue applies backpressure once full.
#[test]
fn test_ddr_ar_queue_depth() {
    let mut ddr = create_ddr(MemoryConfig {
        queue_depth: 2,
        read_latency: 50,
        ..MemoryConfig::default()
    });
    for id in 0..2 {
        ddr.io.ar = ar(id, 0x100, 0);
        step(&mut ddr).unwrap();
    }
    ddr.comb_outputs().unwrap();
    assert!(!ddr.io.ar.arready);
}

/// Tests a write burst with strobes, followed by B after the write latency.
#[test]
fn test_ddr_write_and_response() {
    let mut ddr = create_ddr(MemoryConfig {
        write_latency: 2,
        ..MemoryConfig::default()
    });

    ddr.io.aw = AwChannel {
        awvalid: true,
        awready: false,
        awaddr: 0x300,
        awid: 7,
        awlen: 1,
        awsize: 2,
        awburst: BurstType::Incr,
    };
    step(&mut ddr).unwrap();
    ddr.io.aw.awvalid = false;

    ddr.io.w = WChannel {
        wvalid: true,
        wready: false,
        wid: 7,
        wdata: 0x4433_2211,
        wstrb: 0b1111,
        wlast: false,
    };
    ddr.comb_outputs().unwrap();
    assert!(ddr.io.w.wready);
    ddr.comb_inputs().unwrap();
    ddr.seq().unwrap();

    ddr.io.w = WChannel {
        wvalid: true,
        wready: false,
        wid: 7,
        wdata: 0x0000_6655,
        wstrb: 0b0011,
        wlast: true,
    };
    step(&mut ddr).unwrap();
    ddr.io.w.wvalid = false;
    assert_eq!(
        ddr.read_bytes(0x300, 8),
        vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0, 0]
    );

    ddr.io.b.bready = true;
    let mut seen = None;
    for n in 0..10 {
        ddr.comb_outputs().unwrap();
        if ddr.io.b.bvalid {
            seen = Some((n, ddr.io.b.bid, ddr.io.b.bresp));
            break;
        }
        ddr.comb_inputs().unwrap();
        ddr.seq().unwrap();
    }
    assert_eq!(seen, Some((2, 7, Resp::Okay)));
}

/// Tests that W data with the wrong id is a protocol violation.
#[test]
fn test_ddr_wid_mismatch() {
    let mut ddr = create_ddr(MemoryConfig::default());
    ddr.io.aw = AwChannel {
        awvalid: true,
        awaddr: 0x300,
        awid: 1,
        awsize: 2,
        ..AwChannel::default()
    };
    step(&mut ddr).unwrap();
    ddr.io.aw.awvalid = false;

    ddr.io.w = WChannel {
        wvalid: true,
        wid: 2,
        wlast: true,
        wstrb: 0xF,
        ..WChannel::default()
    };
    ddr.comb_outputs().unwrap();
    assert!(matches!(
        ddr.comb_inputs(),
        Err(SimError::TargetProtocol {
            channel: Channel::W,
            ..
        })
    ));
}

/// Tests that an address phase crossing 4 KiB is a protocol violation.
#[test]
fn test_ddr_rejects_page_crossing_burst() {
    let mut ddr = create_ddr(MemoryConfig::default());
    ddr.io.ar = ar(1, 0x0FF8, 3);
    ddr.comb_outputs().unwrap();
    assert!(matches!(
        ddr.comb_inputs(),
        Err(SimError::TargetProtocol {
            channel: Channel::Ar,
            ..
        })
    ));
}

/// Tests wrapping burst reads.
#[test]
fn test_ddr_wrap_burst() {
    let mut ddr = create_ddr(fast_config());
    ddr.load(0x20, &(0u8..16).collect::<Vec<_>>());
    ddr.io.ar = ArChannel {
        arburst: BurstType::Wrap,
        ..ar(3, 0x28, 3)
    };
    step(&mut ddr).unwrap();
    ddr.io.ar.arvalid = false;

    let data: Vec<u64> = collect_beats(&mut ddr, 4).iter().map(|b| b.1).collect();
    assert_eq!(
        data,
        vec![0x0B0A_0908, 0x0F0E_0D0C, 0x0302_0100, 0x0706_0504]
    );
}

/// Tests the fixed-latency controller.
#[test]
fn test_simple_controller() {
    let mut c = SimpleController::new(7);
    assert_eq!(c.access_latency(0), 7);
    assert_eq!(c.access_latency(0xFFFF_0000), 7);
}

/// Tests DRAM row buffer timing.
#[test]
fn test_dram_controller_row_buffer() {
    let mut c = DramController::new(2, 5, 3);
    assert_eq!(c.open_row(), None);
    assert_eq!(c.access_latency(0x1000), 7, "closed bank");
    assert_eq!(c.access_latency(0x1010), 2, "row hit");
    assert_eq!(c.access_latency(0x9000), 10, "row conflict");
    assert_eq!(c.open_row(), Some(0x9000 / 2048));
}

/// Tests the DRAM controller through the target.
#[test]
fn test_ddr_with_dram_controller() {
    let mut ddr = create_ddr(MemoryConfig {
        controller: ControllerKind::Dram,
        t_cas: 1,
        t_ras: 1,
        t_pre: 1,
        ..MemoryConfig::default()
    });
    ddr.load(0x40, &[0xAA; 4]);
    ddr.io.ar = ar(0, 0x40, 0);
    step(&mut ddr).unwrap();
    ddr.io.ar.arvalid = false;
    assert_eq!(collect_beats(&mut ddr, 1), vec![(0, 0xAAAA_AAAA, true, Resp::Okay)]);
}
