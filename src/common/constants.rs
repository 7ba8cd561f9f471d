//! AXI3 protocol constants.

/// Size of the address window a single burst may not cross (4 KiB).
pub const PAGE_SIZE: u32 = 4096;

/// Maximum number of beats in one AXI3 burst (`len` is 4 bits wide).
pub const MAX_BURST_BEATS: u32 = 16;

/// Widest beat the model supports, in bytes. Data lanes are carried in a `u64`.
pub const MAX_DATA_BYTES: u32 = 8;

/// Widest AXI id the model supports, in bits.
pub const MAX_ID_BITS: u32 = 8;

/// Returns the first 4 KiB boundary strictly above `addr`, as a `u64` so that
/// the last page of the 32-bit address space does not overflow.
#[inline]
pub fn page_end(addr: u32) -> u64 {
    (addr as u64 & !(PAGE_SIZE as u64 - 1)) + PAGE_SIZE as u64
}
