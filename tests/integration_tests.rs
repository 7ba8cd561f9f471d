//! End-to-end tests of the fabric wired to the reference DDR target.

use axi_fabric::axi::Resp;
use axi_fabric::common::SimError;
use axi_fabric::config::{Config, ControllerKind, ReadOrder};
use axi_fabric::sim::{ReadMaster, System};

fn pattern(base: u32, len: usize) -> Vec<u8> {
    (0..len).map(|i| (base as usize * 3 + i * 13) as u8).collect()
}

fn create_system(config: &Config) -> System {
    System::new(config).unwrap()
}

/// Tests the smoke scenario: 31 bytes at 0x2000 with id 2.
#[test]
fn test_smoke_read() {
    let mut system = create_system(&Config::default());
    let data = pattern(0x2000, 31);
    system.ddr.load(0x2000, &data);
    system.readers[0].push(0x2000, 31, 2);

    system.run().unwrap();

    let done = system.readers[0].completed();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, 2);
    assert_eq!(done[0].addr, 0x2000);
    assert_eq!(done[0].data, data);
    assert_eq!(done[0].resp, Resp::Okay);
    assert_eq!(system.stats.ar_grants[0], 1);
    assert_eq!(system.stats.reads_completed[0], 1);
    assert_eq!(system.stats.r_beats, 8);
    assert!(system.fabric.is_idle());
}

/// Tests a read across a 4 KiB boundary: two AR handshakes, one completion.
#[test]
fn test_page_crossing_read() {
    let mut system = create_system(&Config::default());
    let data = pattern(0x1FF0, 64);
    system.ddr.load(0x1FF0, &data);
    system.readers[1].push(0x1FF0, 64, 1);

    system.run().unwrap();

    assert_eq!(system.stats.ar_grants[1], 2);
    let done = system.readers[1].completed();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].data, data);
}

/// Tests two initiators with distinct ids: each sees only its own data.
#[test]
fn test_two_initiators_no_crosstalk() {
    let mut system = create_system(&Config::default());
    let a = pattern(0x1000, 40);
    let b = pattern(0x8003, 40);
    system.ddr.load(0x1000, &a);
    system.ddr.load(0x8003, &b);
    system.readers[0].push(0x1000, 40, 1);
    system.readers[1].push(0x8003, 40, 2);

    system.run().unwrap();

    assert_eq!(system.readers[0].completed()[0].data, a);
    assert_eq!(system.readers[1].completed()[0].data, b);
    assert_eq!(system.readers[0].foreign_beats(), 0);
    assert_eq!(system.readers[1].foreign_beats(), 0);
    assert_eq!(system.stats.read_beats, vec![10, 11, 0]);
}

/// Tests two initiators using the same id: both complete, one waits.
#[test]
fn test_shared_id_serializes() {
    let mut system = create_system(&Config::default());
    let a = pattern(0x1000, 16);
    let b = pattern(0x2000, 16);
    system.ddr.load(0x1000, &a);
    system.ddr.load(0x2000, &b);
    system.readers[0].push(0x1000, 16, 4);
    system.readers[2].push(0x2000, 16, 4);

    system.run().unwrap();

    assert_eq!(system.readers[0].completed()[0].data, a);
    assert_eq!(system.readers[2].completed()[0].data, b);
    assert!(system.stats.id_stalls > 0);
}

/// Tests out-of-order returns from a youngest-first target.
#[test]
fn test_out_of_order_responses() {
    let mut config = Config::default();
    config.memory.read_order = ReadOrder::Lifo;
    let mut system = create_system(&config);

    let mut expected = Vec::new();
    for port in 0..3 {
        let addr = 0x4000 + 0x100 * port as u32;
        let data = pattern(addr, 24);
        system.ddr.load(addr, &data);
        system.readers[port].push(addr, 24, port as u8 + 1);
        expected.push(data);
    }

    system.run().unwrap();

    for (port, data) in expected.iter().enumerate() {
        assert_eq!(&system.readers[port].completed()[0].data, data);
        assert_eq!(system.readers[port].foreign_beats(), 0);
    }
}

/// Tests writes from both write initiators landing in memory.
#[test]
fn test_writes_land_in_memory() {
    let mut system = create_system(&Config::default());
    let a = pattern(0x3001, 37);
    let b = pattern(0x5000, 64);
    system.writers[0].push(0x3001, a.clone(), 1);
    system.writers[1].push(0x5000, b.clone(), 2);

    system.run().unwrap();

    assert_eq!(system.ddr.read_bytes(0x3001, 37), a);
    assert_eq!(system.ddr.read_bytes(0x5000, 64), b);
    assert_eq!(system.ddr.read_byte(0x3000), 0, "byte before the write untouched");
    assert_eq!(system.ddr.read_byte(0x3026), 0, "byte after the write untouched");
    for writer in &system.writers {
        assert_eq!(writer.completed().len(), 1);
        assert_eq!(writer.completed()[0].resp, Resp::Okay);
    }
    assert_eq!(system.stats.writes_completed, vec![1, 1]);
}

/// Tests write then read back through the fabric.
#[test]
fn test_write_then_read_back() {
    let mut system = create_system(&Config::default());
    let data = pattern(0x0FFA, 20);
    system.writers[0].push(0x0FFA, data.clone(), 3);
    system.run().unwrap();

    system.readers[2].push(0x0FFA, 20, 3);
    system.run().unwrap();
    assert_eq!(system.readers[2].completed()[0].data, data);
}

/// Tests that an error on one burst is reported for the whole request.
#[test]
fn test_error_response_merged() {
    let mut config = Config::default();
    config.memory.size = 0x1_0000;
    let mut system = create_system(&config);

    system.writers[0].push(0xFFF0, vec![0x5A; 32], 1);
    system.readers[0].push(0xFFF0, 32, 1);
    system.run().unwrap();

    assert_eq!(system.writers[0].completed()[0].resp, Resp::SlvErr);
    assert_eq!(system.readers[0].completed()[0].resp, Resp::SlvErr);
    assert!(system.stats.error_responses > 0);
}

/// Tests initiators that only accept every third response.
#[test]
fn test_initiator_backpressure() {
    let mut system = create_system(&Config::default());
    system.readers[0] = ReadMaster::new().with_ready_period(3);
    let data = pattern(0x6000, 100);
    system.ddr.load(0x6000, &data);
    system.readers[0].push(0x6000, 100, 5);

    system.run().unwrap();
    assert_eq!(system.readers[0].completed()[0].data, data);
}

/// Tests several requests queued on one port complete in order.
#[test]
fn test_back_to_back_requests() {
    let mut system = create_system(&Config::default());
    for n in 0..4u32 {
        let addr = 0x7000 + n * 0x11;
        system.ddr.load(addr, &pattern(addr, 9));
        system.readers[1].push(addr, 9, n as u8);
    }
    system.run().unwrap();

    let done = system.readers[1].completed();
    assert_eq!(done.len(), 4);
    for (n, c) in done.iter().enumerate() {
        assert_eq!(c.id, n as u8);
        assert_eq!(c.data, pattern(c.addr, 9));
    }
    assert!(done.windows(2).all(|w| w[0].cycle < w[1].cycle));
}

/// Tests byte-wide and doubleword buses with the DRAM timing model.
#[test]
fn test_bus_widths() {
    for width in [1, 2, 8] {
        let mut config = Config::default();
        config.fabric.data_bytes = width;
        config.memory.controller = ControllerKind::Dram;
        let mut system = create_system(&config);

        let data = pattern(0x0FF5, 50);
        system.ddr.load(0x0FF5, &data);
        system.readers[0].push(0x0FF5, 50, 1);
        let written = pattern(0x2003, 21);
        system.writers[0].push(0x2003, written.clone(), 1);

        system.run().unwrap();
        assert_eq!(system.readers[0].completed()[0].data, data, "width {}", width);
        assert_eq!(system.ddr.read_bytes(0x2003, 21), written, "width {}", width);
    }
}

/// Tests that a run exceeding its cycle budget reports a timeout.
#[test]
fn test_timeout() {
    let mut config = Config::default();
    config.sim.max_cycles = 5;
    let mut system = create_system(&config);
    system.readers[0].push(0x0, 256, 1);

    assert_eq!(system.run(), Err(SimError::Timeout(5)));
}

/// Tests that the outstanding limit is never exceeded.
#[test]
fn test_outstanding_limit_respected() {
    let mut config = Config::default();
    config.fabric.max_outstanding = 1;
    let mut system = create_system(&config);
    for port in 0..3 {
        system.readers[port].push(0x100 * port as u32, 64, port as u8);
    }

    while !system.is_idle() {
        system.tick().unwrap();
        assert!(system.fabric.outstanding_reads() <= 1);
        assert!(system.cycle() < 1000);
    }
    assert_eq!(system.stats.reads_completed, vec![1, 1, 1]);
}
