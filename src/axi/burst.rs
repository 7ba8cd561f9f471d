//! AXI3 Burst Descriptors.
//!
//! A [`BurstDescriptor`] is everything the fabric puts on an address channel
//! for one transaction, plus the bookkeeping the fabric needs to know which
//! bytes of the burst belong to the originating request. Address generation
//! for the three AXI3 burst types lives here so the fabric and the reference
//! target agree on it.

use crate::common::constants::{page_end, MAX_BURST_BEATS};
use std::ops::Range;
use thiserror::Error;

/// AXI3 burst addressing mode (`arburst` / `awburst`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BurstType {
    /// Every beat uses the same address.
    Fixed = 0,
    /// Each beat advances by the beat size.
    #[default]
    Incr = 1,
    /// Like `Incr`, but wraps at a boundary of `beats * beat_bytes`.
    Wrap = 2,
}

impl BurstType {
    /// Decodes the 2-bit wire encoding. The reserved value `0b11` yields `None`.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0b11 {
            0 => Some(BurstType::Fixed),
            1 => Some(BurstType::Incr),
            2 => Some(BurstType::Wrap),
            _ => None,
        }
    }

    /// Returns the 2-bit wire encoding.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Computes the address of beat `n` of a burst.
    ///
    /// # Arguments
    ///
    /// * `start` - Address presented in the address phase.
    /// * `size` - Log2 of the bytes per beat.
    /// * `len` - Number of beats minus one.
    /// * `n` - Zero-based beat index.
    ///
    /// # Returns
    ///
    /// The start address of beat `n`. For `Incr` bursts with an unaligned start
    /// address, only the first beat is unaligned.
    pub fn beat_addr(self, start: u32, size: u8, len: u8, n: u32) -> u32 {
        let bytes = 1u32 << size;
        match self {
            BurstType::Fixed => start,
            BurstType::Incr => {
                if n == 0 {
                    start
                } else {
                    (start & !(bytes - 1)).wrapping_add(n * bytes)
                }
            }
            BurstType::Wrap => {
                let container = bytes * (len as u32 + 1);
                let lower = start & !(container - 1);
                lower + ((start - lower + n * bytes) % container)
            }
        }
    }
}

/// Reason a burst descriptor is not a legal AXI3 transaction for a given bus.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstViolation {
    #[error("address {addr:#010x} is not aligned to {beat_bytes}-byte beats")]
    Misaligned { addr: u32, beat_bytes: u32 },

    #[error("{beat_bytes}-byte beats exceed the {data_bytes}-byte data bus")]
    TooWide { beat_bytes: u32, data_bytes: u32 },

    #[error("burst {addr:#010x}+{span} crosses a 4 KiB boundary")]
    CrossesPage { addr: u32, span: u64 },

    #[error("wrapping burst of {beats} beats (must be 2, 4, 8 or 16)")]
    WrapLength { beats: u32 },

    #[error("burst of {beats} beats exceeds the AXI3 limit of 16")]
    TooLong { beats: u32 },

    #[error("burst covers {bytes} bytes but only spans {span}")]
    Coverage { bytes: u32, span: u64 },
}

/// One AXI3 transaction as issued on an address channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BurstDescriptor {
    /// Transaction id (`arid` / `awid`).
    pub id: u8,
    /// Start address of the first beat.
    pub addr: u32,
    /// Number of beats minus one (`0..=15`).
    pub len: u8,
    /// Log2 of the bytes per beat.
    pub size: u8,
    /// Addressing mode.
    pub burst: BurstType,
    /// Bytes of the originating request carried by this burst, starting at `addr`.
    /// Smaller than [`span`](Self::span) when the last beat is partial.
    pub bytes: u32,
    /// Set on the last descriptor of a logical request.
    pub last: bool,
}

impl BurstDescriptor {
    /// Bytes transferred per beat.
    #[inline]
    pub fn beat_bytes(&self) -> u32 {
        1 << self.size
    }

    /// Number of beats in the burst.
    #[inline]
    pub fn beats(&self) -> u32 {
        self.len as u32 + 1
    }

    /// Nominal address span of the burst, counting partial beats in full.
    #[inline]
    pub fn span(&self) -> u64 {
        self.beats() as u64 * self.beat_bytes() as u64
    }

    /// Byte range of the originating request this burst carries.
    pub fn covered(&self) -> Range<u64> {
        self.addr as u64..self.addr as u64 + self.bytes as u64
    }

    /// Address of beat `n`.
    pub fn beat_addr(&self, n: u32) -> u32 {
        self.burst.beat_addr(self.addr, self.size, self.len, n)
    }

    /// Byte addresses of beat `n` that belong to the request.
    ///
    /// Empty for padding beats past the covered range.
    pub fn beat_range(&self, n: u32) -> Range<u64> {
        let start = self.beat_addr(n) as u64;
        let aligned_end = (start & !(self.beat_bytes() as u64 - 1)) + self.beat_bytes() as u64;
        let covered = self.covered();
        let lo = start.max(covered.start);
        let hi = aligned_end.min(covered.end);
        lo..hi.max(lo)
    }

    /// Byte-lane strobe of the request bytes in beat `n` on a bus of
    /// `data_bytes` lanes.
    pub fn beat_strb(&self, n: u32, data_bytes: u32) -> u8 {
        self.beat_range(n)
            .fold(0u8, |strb, byte| strb | 1 << (byte % data_bytes as u64))
    }

    /// Checks the descriptor against the AXI3 rules the fabric guarantees.
    ///
    /// # Arguments
    ///
    /// * `data_bytes` - Width of the data bus in bytes.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the burst is legal, otherwise the first rule it breaks.
    pub fn check(&self, data_bytes: u32) -> Result<(), BurstViolation> {
        let beat_bytes = self.beat_bytes();
        if beat_bytes > data_bytes {
            return Err(BurstViolation::TooWide {
                beat_bytes,
                data_bytes,
            });
        }
        if self.addr % beat_bytes != 0 {
            return Err(BurstViolation::Misaligned {
                addr: self.addr,
                beat_bytes,
            });
        }
        if self.burst == BurstType::Wrap && !matches!(self.beats(), 2 | 4 | 8 | 16) {
            return Err(BurstViolation::WrapLength {
                beats: self.beats(),
            });
        }
        let span = self.span();
        if self.burst == BurstType::Incr && self.addr as u64 + span > page_end(self.addr) {
            return Err(BurstViolation::CrossesPage {
                addr: self.addr,
                span,
            });
        }
        if self.beats() > MAX_BURST_BEATS {
            return Err(BurstViolation::TooLong {
                beats: self.beats(),
            });
        }
        if self.bytes as u64 > span {
            return Err(BurstViolation::Coverage {
                bytes: self.bytes,
                span,
            });
        }
        Ok(())
    }
}
