//! Simulation infrastructure.
//!
//! The two-phase component lifecycle, the harness that wires the fabric to
//! its target, and the traffic drivers that stand in for bus initiators.

/// Two-phase evaluation interface.
pub mod component;

/// Lock-step harness around one fabric and one target.
pub mod harness;

/// Initiator traffic drivers.
pub mod traffic;

pub use component::Component;
pub use harness::System;
pub use traffic::{ReadCompletion, ReadMaster, WriteCompletion, WriteMaster};
