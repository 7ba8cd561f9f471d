//! Burst Translator.
//!
//! Turns a generic byte-range request into a sequence of AXI3 bursts that are
//! each legal on their own: naturally aligned beats no wider than the data bus,
//! at most 16 beats, and never crossing a 4 KiB boundary.
//!
//! The split follows the usual unaligned-burst recipe. While the cursor is not
//! aligned to the bus width, beats are as wide as the cursor's natural
//! alignment allows (byte beats for odd addresses) and the burst stops at the
//! next bus-width boundary. From there on, full-width bursts are emitted, each
//! cut at whichever comes first: the end of the request, the 4 KiB boundary,
//! or 16 beats.

use crate::axi::burst::{BurstDescriptor, BurstType};
use crate::common::constants::{page_end, MAX_BURST_BEATS, MAX_DATA_BYTES};
use crate::common::error::TranslateError;

/// Splits byte-range requests into legal bursts for one data bus width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BurstTranslator {
    data_bytes: u32,
}

impl BurstTranslator {
    /// Creates a translator for a data bus `data_bytes` wide.
    ///
    /// # Arguments
    ///
    /// * `data_bytes` - Data bus width in bytes; a power of two no wider than 8.
    ///
    /// # Returns
    ///
    /// The translator, or [`TranslateError::UnsupportedWidth`].
    pub fn new(data_bytes: u32) -> Result<Self, TranslateError> {
        if !data_bytes.is_power_of_two() || data_bytes > MAX_DATA_BYTES {
            return Err(TranslateError::UnsupportedWidth(data_bytes));
        }
        Ok(Self { data_bytes })
    }

    /// Data bus width in bytes.
    pub fn data_bytes(&self) -> u32 {
        self.data_bytes
    }

    /// Returns a lazy iterator over the bursts of a request.
    ///
    /// # Arguments
    ///
    /// * `addr` - First byte of the request.
    /// * `total_size` - Number of bytes requested.
    /// * `id` - Transaction id stamped on every burst.
    ///
    /// # Returns
    ///
    /// An iterator yielding bursts in ascending address order, the last one
    /// flagged with `last`, or the reason the request cannot be expressed.
    pub fn bursts(&self, addr: u32, total_size: u32, id: u8) -> Result<Bursts, TranslateError> {
        if total_size == 0 {
            return Err(TranslateError::ZeroLength);
        }
        let end = addr as u64 + total_size as u64;
        if end > 1u64 << 32 {
            return Err(TranslateError::AddressOverflow {
                addr,
                size: total_size,
            });
        }
        Ok(Bursts {
            cursor: addr as u64,
            end,
            id,
            data_bytes: self.data_bytes as u64,
        })
    }

    /// Translates a request into its full list of bursts.
    pub fn translate(
        &self,
        addr: u32,
        total_size: u32,
        id: u8,
    ) -> Result<Vec<BurstDescriptor>, TranslateError> {
        Ok(self.bursts(addr, total_size, id)?.collect())
    }
}

/// Iterator over the bursts of one request. See [`BurstTranslator::bursts`].
#[derive(Clone, Debug)]
pub struct Bursts {
    cursor: u64,
    end: u64,
    id: u8,
    data_bytes: u64,
}

impl Iterator for Bursts {
    type Item = BurstDescriptor;

    fn next(&mut self) -> Option<BurstDescriptor> {
        if self.cursor >= self.end {
            return None;
        }

        let natural = if self.cursor == 0 {
            self.data_bytes
        } else {
            1u64 << self.cursor.trailing_zeros().min(63)
        };

        let (beat_bytes, limit) = if natural < self.data_bytes {
            let next_aligned = (self.cursor + self.data_bytes) & !(self.data_bytes - 1);
            (natural, next_aligned)
        } else {
            let page = page_end(self.cursor as u32);
            let max_burst = self.cursor + MAX_BURST_BEATS as u64 * self.data_bytes;
            (self.data_bytes, page.min(max_burst))
        };

        let bytes = self.end.min(limit) - self.cursor;
        let beats = bytes.div_ceil(beat_bytes);

        let burst = BurstDescriptor {
            id: self.id,
            addr: self.cursor as u32,
            len: (beats - 1) as u8,
            size: beat_bytes.trailing_zeros() as u8,
            burst: BurstType::Incr,
            bytes: bytes as u32,
            last: self.cursor + bytes == self.end,
        };
        self.cursor += bytes;
        Some(burst)
    }
}
