//! Memory Timing Controller.
//!
//! This module defines the `MemoryController` trait the reference target uses
//! to decide how long each burst takes before its data is available. It ships
//! a fixed-latency model and a DRAM model that accounts for row buffer
//! locality.

use crate::config::{ControllerKind, MemoryConfig};

/// DRAM row size assumed by [`DramController`].
const ROW_BYTES: u32 = 2048;

/// Trait for memory controller implementations.
pub trait MemoryController {
    /// Calculates the latency for a burst starting at `addr`.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address of the first beat.
    ///
    /// # Returns
    ///
    /// The latency in cycles.
    fn access_latency(&mut self, addr: u32) -> u64;
}

/// Builds the controller selected by `config.controller`.
pub fn build(config: &MemoryConfig) -> Box<dyn MemoryController> {
    match config.controller {
        ControllerKind::Simple => Box::new(SimpleController::new(config.read_latency)),
        ControllerKind::Dram => {
            Box::new(DramController::new(config.t_cas, config.t_ras, config.t_pre))
        }
    }
}

/// A fixed-latency controller.
///
/// Every burst takes the same time regardless of where it lands.
pub struct SimpleController {
    latency: u64,
}

impl SimpleController {
    pub fn new(latency: u64) -> Self {
        Self { latency }
    }
}

impl MemoryController for SimpleController {
    fn access_latency(&mut self, _addr: u32) -> u64 {
        self.latency
    }
}

/// A row-buffer aware controller.
///
/// Tracks the open row: a hit costs `t_cas`, a miss with a closed bank costs
/// `t_ras + t_cas`, and a conflict with another open row additionally pays
/// `t_pre`.
pub struct DramController {
    open_row: Option<u32>,
    t_cas: u64,
    t_ras: u64,
    t_pre: u64,
}

impl DramController {
    /// Creates a controller with no open row.
    ///
    /// # Arguments
    ///
    /// * `t_cas` - Column access latency.
    /// * `t_ras` - Row activate latency.
    /// * `t_pre` - Precharge latency.
    pub fn new(t_cas: u64, t_ras: u64, t_pre: u64) -> Self {
        Self {
            open_row: None,
            t_cas,
            t_ras,
            t_pre,
        }
    }

    /// Row currently held in the row buffer.
    pub fn open_row(&self) -> Option<u32> {
        self.open_row
    }
}

impl MemoryController for DramController {
    fn access_latency(&mut self, addr: u32) -> u64 {
        let row = addr / ROW_BYTES;
        let latency = match self.open_row {
            Some(open) if open == row => self.t_cas,
            Some(_) => self.t_pre + self.t_ras + self.t_cas,
            None => self.t_ras + self.t_cas,
        };
        self.open_row = Some(row);
        latency
    }
}
