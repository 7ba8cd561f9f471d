//! AXI3 Interconnect Model Library.
//!
//! This crate implements a cycle-accurate model of an AXI3 on-chip
//! interconnect. Several bus initiators (instruction cache, data cache, DMA)
//! share one downstream AXI3 target through the fabric, which splits their
//! byte-range requests into legal bursts, arbitrates the address channels and
//! steers out-of-order responses back by id.
//!
//! # Architecture
//!
//! * **Fabric**: Port acceptance, burst translation, round-robin arbitration,
//!   outstanding-transaction tracking and response routing.
//! * **Target**: A reference DDR model with pluggable timing controllers.
//! * **Harness**: Two-phase lock-step evaluation of fabric and target.
//!
//! # Modules
//!
//! * `axi`: Channel bundles, burst descriptors and the burst translator.
//! * `common`: Shared types, constants, and error handling.
//! * `config`: Configuration loading and parsing.
//! * `fabric`: The interconnect and its building blocks.
//! * `sim`: Component lifecycle, harness and traffic drivers.
//! * `stats`: Performance statistics collection.
//! * `target`: Downstream target models.

/// AXI3 protocol types and the burst translator.
///
/// Defines the five channel bundles, response codes, burst descriptors with
/// their address generation, and the splitter that turns arbitrary byte
/// ranges into legal bursts.
pub mod axi;

/// Shared types, constants, and error handling.
pub mod common;

/// Configuration system for the fabric, the memory target and the harness.
///
/// Loads and parses TOML configuration files.
pub mod config;

/// The interconnect fabric.
///
/// Implements the initiator ports, the arbiter, the outstanding-transaction
/// tracker and the two-phase interconnect component built from them.
pub mod fabric;

/// Simulation harness, component lifecycle and traffic drivers.
pub mod sim;

/// Performance statistics collection and reporting.
pub mod stats;

/// Downstream AXI3 target models.
pub mod target;
