//! Interconnect Fabric.
//!
//! This module contains the fabric itself and the pieces it is built from:
//! 1. **Ports:** The simplified request/response interface each initiator sees.
//! 2. **Arbiter:** Round-robin selection for the shared address channels.
//! 3. **Tracker:** The id-indexed table of bursts in flight.
//! 4. **Interconnect:** The two-phase component tying them together.

/// Round-robin arbiter.
pub mod arbiter;

/// The AXI3 interconnect component.
pub mod interconnect;

/// Initiator-facing request and response ports.
pub mod ports;

/// Outstanding-transaction table.
pub mod tracker;

pub use arbiter::RoundRobinArbiter;
pub use interconnect::Interconnect;
pub use ports::{ReadPort, ReadReq, ReadResp, WritePort, WriteReq, WriteResp};
pub use tracker::{OutstandingRecord, OutstandingTracker};
