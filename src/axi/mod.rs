//! AXI3 protocol building blocks.
//!
//! Channel signal bundles, burst descriptors and address generation, and the
//! translator that turns byte-range requests into legal bursts.

/// AXI3 channel signal bundles and response codes.
pub mod channels;

/// Burst descriptors, burst types and legality checks.
pub mod burst;

/// Byte-range request to burst translation.
pub mod translator;

pub use burst::{BurstDescriptor, BurstType, BurstViolation};
pub use channels::{ArChannel, AwChannel, AxiIo, BChannel, Channel, RChannel, Resp, WChannel};
pub use translator::BurstTranslator;
