//! Common utilities and types used throughout the interconnect model.
//!
//! This module provides the fundamental types shared by the fabric, the
//! reference target and the harness: transfer directions, protocol
//! constants, and the error taxonomy.

/// AXI3 protocol constants.
pub mod constants;

/// Transfer direction definitions.
pub mod data;

/// Error types for fatal simulation errors and refused operations.
pub mod error;

pub use data::Direction;
pub use error::{ConfigError, SimError, TrackerError, TranslateError};

pub use constants::{MAX_BURST_BEATS, PAGE_SIZE};
