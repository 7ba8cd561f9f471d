//! Integration tests for the burst translator.

use axi_fabric::axi::{BurstDescriptor, BurstTranslator, BurstType};
use axi_fabric::common::constants::page_end;
use axi_fabric::common::{TranslateError, MAX_BURST_BEATS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Translates a request and checks every law a burst list must satisfy.
fn translate_checked(t: &BurstTranslator, addr: u32, size: u32) -> Vec<BurstDescriptor> {
    let bursts = t.translate(addr, size, 3).unwrap();
    assert!(!bursts.is_empty());

    let mut cursor = addr as u64;
    for (i, burst) in bursts.iter().enumerate() {
        assert_eq!(burst.addr as u64, cursor, "bursts must be contiguous");
        assert_eq!(burst.id, 3);
        assert_eq!(burst.burst, BurstType::Incr);
        assert_eq!(burst.last, i == bursts.len() - 1);
        assert!(burst.bytes > 0);
        assert!(burst.beats() <= MAX_BURST_BEATS);
        assert!(burst.addr as u64 + burst.span() <= page_end(burst.addr));
        assert!(burst.span() - (burst.bytes as u64) < burst.beat_bytes() as u64);
        burst.check(t.data_bytes()).unwrap();
        cursor += burst.bytes as u64;
    }
    assert_eq!(cursor, addr as u64 + size as u64, "bursts must cover the request");
    bursts
}

/// Tests the smoke request: 31 bytes at 0x2000 in one burst with a partial last beat.
#[test]
fn test_translate_smoke_request() {
    let t = BurstTranslator::new(4).unwrap();
    let bursts = t.translate(0x2000, 31, 2).unwrap();

    assert_eq!(bursts.len(), 1);
    let b = bursts[0];
    assert_eq!(b.id, 2);
    assert_eq!(b.addr, 0x2000);
    assert_eq!(b.len, 7);
    assert_eq!(b.size, 2);
    assert_eq!(b.bytes, 31);
    assert!(b.last);
    assert_eq!(b.covered(), 0x2000..0x201F);
    assert_eq!(b.beat_strb(7, 4), 0b0111);
    assert_eq!(b.beat_strb(0, 4), 0b1111);
}

/// Tests that a request crossing a 4 KiB boundary splits exactly at the boundary.
#[test]
fn test_translate_page_split() {
    let t = BurstTranslator::new(4).unwrap();
    let bursts = translate_checked(&t, 0x1FF0, 64);

    assert_eq!(bursts.len(), 2);
    assert_eq!(bursts[0].addr, 0x1FF0);
    assert_eq!(bursts[0].covered().end - 1, 0x1FFF);
    assert!(!bursts[0].last);
    assert_eq!(bursts[1].addr, 0x2000);
    assert_eq!(bursts[1].bytes, 48);
    assert!(bursts[1].last);
}

/// Tests narrow leading beats for an odd start address, widening once aligned.
#[test]
fn test_translate_unaligned_start() {
    let t = BurstTranslator::new(4).unwrap();
    let bursts = translate_checked(&t, 0x1001, 16);

    assert_eq!(bursts.len(), 2);
    assert_eq!((bursts[0].addr, bursts[0].len, bursts[0].size), (0x1001, 2, 0));
    assert_eq!(bursts[0].bytes, 3);
    assert_eq!((bursts[1].addr, bursts[1].len, bursts[1].size), (0x1004, 3, 2));
    assert_eq!(bursts[1].bytes, 13);
}

/// Tests a halfword-aligned start on an 8-byte bus.
#[test]
fn test_translate_halfword_start() {
    let t = BurstTranslator::new(8).unwrap();
    let bursts = translate_checked(&t, 0x102, 14);

    assert_eq!((bursts[0].addr, bursts[0].len, bursts[0].size), (0x102, 2, 1));
    assert_eq!((bursts[1].addr, bursts[1].len, bursts[1].size), (0x108, 0, 3));
}

/// Tests a request exactly filling a page: minimum number of full-width bursts.
#[test]
fn test_translate_full_page() {
    for (width, expected) in [(1u32, 256usize), (2, 128), (4, 64), (8, 32)] {
        let t = BurstTranslator::new(width).unwrap();
        let bursts = translate_checked(&t, 0x3000, 4096);
        assert_eq!(bursts.len(), expected, "width {}", width);
        assert!(bursts.iter().all(|b| b.len == 15 && b.beat_bytes() == width));
    }
}

/// Tests that a request at the very top of the address space is accepted.
#[test]
fn test_translate_top_of_address_space() {
    let t = BurstTranslator::new(4).unwrap();
    let bursts = translate_checked(&t, 0xFFFF_FFF0, 16);
    assert_eq!(bursts.len(), 1);
    assert_eq!(bursts[0].len, 3);
}

/// Tests rejection of requests with no AXI3 encoding.
#[test]
fn test_translate_rejects_illegal_requests() {
    let t = BurstTranslator::new(4).unwrap();
    assert_eq!(t.translate(0x100, 0, 1), Err(TranslateError::ZeroLength));
    assert_eq!(
        t.translate(0xFFFF_FFF0, 0x20, 1),
        Err(TranslateError::AddressOverflow {
            addr: 0xFFFF_FFF0,
            size: 0x20
        })
    );
}

/// Tests that only power-of-two bus widths up to 8 bytes are supported.
#[test]
fn test_translator_width_validation() {
    for width in [1, 2, 4, 8] {
        assert!(BurstTranslator::new(width).is_ok());
    }
    for width in [0, 3, 6, 16] {
        assert_eq!(
            BurstTranslator::new(width),
            Err(TranslateError::UnsupportedWidth(width))
        );
    }
}

/// Tests the coverage law for every size from 1 to 4096 at an awkward start.
#[test]
fn test_translate_coverage_all_sizes() {
    let t = BurstTranslator::new(4).unwrap();
    for size in 1..=4096 {
        translate_checked(&t, 0x0FF3, size);
    }
}

/// Tests the coverage law on random requests for every bus width.
#[test]
fn test_translate_coverage_random() {
    let mut rng = StdRng::seed_from_u64(0xA3F1);
    for _ in 0..4000 {
        let width = [1u32, 2, 4, 8][rng.gen_range(0..4)];
        let t = BurstTranslator::new(width).unwrap();
        let size = rng.gen_range(1..=4096u32);
        let addr = rng.gen_range(0..=u32::MAX - size);
        translate_checked(&t, addr, size);
    }
}

/// Tests that the lazy iterator and the collected list agree.
#[test]
fn test_bursts_iterator_matches_translate() {
    let t = BurstTranslator::new(2).unwrap();
    let lazy: Vec<_> = t.bursts(0x7FF, 300, 9).unwrap().collect();
    assert_eq!(lazy, t.translate(0x7FF, 300, 9).unwrap());
}
