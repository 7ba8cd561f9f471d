//! Configuration system for the interconnect model.
//!
//! This module defines all configuration structures used to parameterize the
//! fabric, the reference memory target and the harness. It provides:
//! 1. **Defaults:** Baseline constants for every field.
//! 2. **Structures:** `[fabric]`, `[memory]` and `[sim]` sections.
//! 3. **Enums:** Memory controller timing model and read service order.
//!
//! Configuration is read from TOML; every field is optional.

use crate::common::constants::{MAX_DATA_BYTES, MAX_ID_BITS};
use crate::common::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;

/// Default configuration constants.
mod defaults {
    /// Data bus width in bytes (32-bit bus).
    pub const DATA_BYTES: u32 = 4;

    /// AXI id width in bits.
    pub const ID_BITS: u32 = 4;

    /// Bursts in flight per direction.
    pub const MAX_OUTSTANDING: usize = 16;

    /// Largest request an initiator may present, in bytes.
    pub const MAX_REQUEST_BYTES: u32 = 4096;

    /// Addressable length of the target memory (1 GiB).
    pub const PHYSICAL_MEMORY_LENGTH: u64 = 1024 * 1024 * 1024;

    /// Read latency of the fixed-latency controller, in cycles.
    pub const READ_LATENCY: u64 = 8;

    /// Cycles between the last W beat and the B response.
    pub const WRITE_LATENCY: u64 = 4;

    /// Column access latency.
    pub const T_CAS: u64 = 14;

    /// Row activate latency.
    pub const T_RAS: u64 = 14;

    /// Precharge latency.
    pub const T_PRE: u64 = 14;

    /// Address transactions the target buffers per direction.
    pub const QUEUE_DEPTH: usize = 4;

    /// Cycle budget of one harness run.
    pub const MAX_CYCLES: u64 = 4000;
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub fabric: FabricConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

impl Config {
    /// Loads and validates a TOML configuration file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the TOML file.
    ///
    /// # Returns
    ///
    /// The configuration, or the reason it could not be used.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section for values the model cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fabric.validate()?;
        self.memory.validate()
    }
}

/// `[fabric]` section: shape of the interconnect.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FabricConfig {
    /// One name per read initiator; the index is the port number.
    #[serde(default = "default_read_initiators")]
    pub read_initiators: Vec<String>,

    /// One name per write initiator; the index is the port number.
    #[serde(default = "default_write_initiators")]
    pub write_initiators: Vec<String>,

    /// Data bus width in bytes.
    #[serde(default = "default_data_bytes")]
    pub data_bytes: u32,

    /// Width of `arid`/`awid` in bits.
    #[serde(default = "default_id_bits")]
    pub id_bits: u32,

    /// Bursts in flight per direction.
    #[serde(default = "default_max_outstanding")]
    pub max_outstanding: usize,

    /// Largest request accepted on a port, in bytes.
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: u32,
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            read_initiators: default_read_initiators(),
            write_initiators: default_write_initiators(),
            data_bytes: defaults::DATA_BYTES,
            id_bits: defaults::ID_BITS,
            max_outstanding: defaults::MAX_OUTSTANDING,
            max_request_bytes: defaults::MAX_REQUEST_BYTES,
        }
    }
}

impl FabricConfig {
    /// Number of distinct AXI ids.
    pub fn id_space(&self) -> usize {
        1 << self.id_bits
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.data_bytes.is_power_of_two() || self.data_bytes > MAX_DATA_BYTES {
            return Err(ConfigError::Invalid(format!(
                "fabric.data_bytes must be a power of two up to {}, got {}",
                MAX_DATA_BYTES, self.data_bytes
            )));
        }
        if self.id_bits == 0 || self.id_bits > MAX_ID_BITS {
            return Err(ConfigError::Invalid(format!(
                "fabric.id_bits must be in 1..={}, got {}",
                MAX_ID_BITS, self.id_bits
            )));
        }
        if self.max_outstanding == 0 || self.max_outstanding > self.id_space() {
            return Err(ConfigError::Invalid(format!(
                "fabric.max_outstanding must be in 1..={}, got {}",
                self.id_space(),
                self.max_outstanding
            )));
        }
        if self.read_initiators.is_empty() && self.write_initiators.is_empty() {
            return Err(ConfigError::Invalid(
                "fabric needs at least one initiator".to_string(),
            ));
        }
        if self.max_request_bytes == 0 {
            return Err(ConfigError::Invalid(
                "fabric.max_request_bytes must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Timing model used by the reference target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ControllerKind {
    /// Every access takes `read_latency` cycles.
    #[default]
    Simple,
    /// Row-buffer aware DRAM timing from `t_cas`, `t_ras`, `t_pre`.
    Dram,
}

/// Order in which the target serves read bursts whose data is ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ReadOrder {
    /// Oldest accepted burst first.
    #[default]
    Fifo,
    /// Youngest accepted burst first; returns different ids out of order.
    Lifo,
}

/// `[memory]` section: the reference DDR target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemoryConfig {
    /// Addressable bytes; accesses at or beyond it answer SLVERR.
    #[serde(default = "default_memory_size")]
    pub size: u64,

    #[serde(default)]
    pub controller: ControllerKind,

    #[serde(default = "default_read_latency")]
    pub read_latency: u64,

    #[serde(default = "default_write_latency")]
    pub write_latency: u64,

    #[serde(default = "default_t_cas")]
    pub t_cas: u64,

    #[serde(default = "default_t_ras")]
    pub t_ras: u64,

    #[serde(default = "default_t_pre")]
    pub t_pre: u64,

    /// Address transactions buffered per direction.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,

    #[serde(default)]
    pub read_order: ReadOrder,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size: defaults::PHYSICAL_MEMORY_LENGTH,
            controller: ControllerKind::default(),
            read_latency: defaults::READ_LATENCY,
            write_latency: defaults::WRITE_LATENCY,
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
            queue_depth: defaults::QUEUE_DEPTH,
            read_order: ReadOrder::default(),
        }
    }
}

impl MemoryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 || self.size > 1u64 << 32 {
            return Err(ConfigError::Invalid(format!(
                "memory.size must be in 1..=4 GiB, got {}",
                self.size
            )));
        }
        if self.queue_depth == 0 {
            return Err(ConfigError::Invalid(
                "memory.queue_depth must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// `[sim]` section: harness limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimConfig {
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

fn default_read_initiators() -> Vec<String> {
    vec!["icache".to_string(), "dcache".to_string(), "dma".to_string()]
}

fn default_write_initiators() -> Vec<String> {
    vec!["dcache".to_string(), "dma".to_string()]
}

fn default_data_bytes() -> u32 {
    defaults::DATA_BYTES
}

fn default_id_bits() -> u32 {
    defaults::ID_BITS
}

fn default_max_outstanding() -> usize {
    defaults::MAX_OUTSTANDING
}

fn default_max_request_bytes() -> u32 {
    defaults::MAX_REQUEST_BYTES
}

fn default_memory_size() -> u64 {
    defaults::PHYSICAL_MEMORY_LENGTH
}

fn default_read_latency() -> u64 {
    defaults::READ_LATENCY
}

fn default_write_latency() -> u64 {
    defaults::WRITE_LATENCY
}

fn default_t_cas() -> u64 {
    defaults::T_CAS
}

fn default_t_ras() -> u64 {
    defaults::T_RAS
}

fn default_t_pre() -> u64 {
    defaults::T_PRE
}

fn default_queue_depth() -> usize {
    defaults::QUEUE_DEPTH
}

fn default_max_cycles() -> u64 {
    defaults::MAX_CYCLES
}
