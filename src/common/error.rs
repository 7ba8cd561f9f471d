//! Error types.
//!
//! Fatal simulation errors abort a run; everything else in here describes an
//! operation the model refuses without corrupting any state (an illegal
//! request that is never accepted, a grant that has to stall).

use crate::axi::channels::Channel;
use thiserror::Error;

/// Fatal error raised by a component during one of its lifecycle hooks.
///
/// These describe integration bugs (usually in a target model) that make the
/// rest of the run meaningless, so the harness stops at the first one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A response arrived carrying an id the fabric never issued (or already retired).
    #[error("unknown response id {id} on {channel} channel")]
    UnknownResponseId {
        /// Channel the response was observed on.
        channel: Channel,
        /// Offending id.
        id: u8,
    },

    /// `rlast` disagrees with the number of beats the burst was issued with.
    #[error("id {id}: rlast={rlast} on beat {beat} of a {beats}-beat burst")]
    LastMismatch {
        /// Burst id.
        id: u8,
        /// Zero-based beat index the mismatch was seen on.
        beat: u32,
        /// Number of beats the burst was issued with.
        beats: u32,
        /// Value of `rlast` the target drove.
        rlast: bool,
    },

    /// A write response arrived before every W beat of the burst was sent.
    #[error("write response for id {id} with {beats_remaining} W beats still unsent")]
    PrematureWriteResponse {
        /// Burst id.
        id: u8,
        /// W beats not yet transferred.
        beats_remaining: u32,
    },

    /// The target observed a protocol violation on one of its channels.
    #[error("target protocol violation on {channel} channel: {reason}")]
    TargetProtocol {
        /// Channel the violation was observed on.
        channel: Channel,
        /// Human readable description.
        reason: String,
    },

    /// The outstanding table refused a burst the arbiter had already granted.
    #[error("outstanding table refused a granted burst: {0}")]
    Tracker(#[from] TrackerError),

    /// A request passed the port checks but could not be translated.
    #[error("accepted request could not be translated: {0}")]
    Translate(#[from] TranslateError),

    /// The harness ran out of cycles before a scenario finished.
    #[error("simulation did not finish within {0} cycles")]
    Timeout(u64),
}

/// A request the burst translator cannot express as legal AXI3 bursts.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateError {
    /// Zero-byte transfers have no AXI3 encoding.
    #[error("zero-length request")]
    ZeroLength,

    /// The byte range runs past the end of the 32-bit address space.
    #[error("request {addr:#010x}+{size} overflows the address space")]
    AddressOverflow {
        /// Start address.
        addr: u32,
        /// Requested byte count.
        size: u32,
    },

    /// The data bus width is not a power of two in `1..=8` bytes.
    #[error("unsupported data bus width of {0} bytes")]
    UnsupportedWidth(u32),
}

/// Reason the outstanding transaction table refused an insertion.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerError {
    /// Every slot permitted by the outstanding limit is in use.
    #[error("outstanding transaction table is full")]
    Full,

    /// A live entry already uses this id.
    #[error("id {0} is already outstanding")]
    IdInUse(u8),

    /// The id does not fit in the configured id width.
    #[error("id {0} is outside the id space")]
    IdOutOfRange(u8),
}

/// Configuration loading or validation failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside the range the model supports.
    #[error("invalid config: {0}")]
    Invalid(String),
}
