//! Downstream AXI3 targets.
//!
//! Only the reference memory lives here: a DDR model with a pluggable timing
//! controller that the harness wires to the fabric's master interface.

/// Memory timing controllers.
pub mod controller;

/// Simulated DDR memory target.
pub mod ddr;

pub use controller::{DramController, MemoryController, SimpleController};
pub use ddr::SimDdr;
