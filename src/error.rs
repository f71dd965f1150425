//! # Error Types
//!
//! Custom error types for Nordic TX using `thiserror`.

use thiserror::Error;

/// Main error type for Nordic TX
#[derive(Debug, Error)]
pub enum NordicTxError {
    /// Inbound blob shorter than its declared header, address and payload
    #[error("Malformed transmit request: {0}")]
    MalformedRequest(String),

    /// Received CRC does not match the recomputed one
    ///
    /// Frequent on noisy captures, so it carries no heap data.
    #[error("CRC mismatch: computed 0x{computed:04X}, received 0x{received:04X}")]
    CrcMismatch { computed: u16, received: u16 },

    /// Captured buffer cannot hold the frame the parser expects
    #[error("Frame too short: need {needed} bytes, have {available}")]
    FrameTooShort { needed: usize, available: usize },

    /// Address, payload or CRC length outside the supported range
    #[error("Unsupported length: {0}")]
    UnsupportedLength(String),

    /// Request targets a channel the transmitter does not have
    #[error("Channel {channel} out of range (channel count {channel_count})")]
    InvalidChannel { channel: u8, channel_count: u8 },

    /// Output buffers handed to the render step do not match the transmitter
    #[error("Output buffer error: {0}")]
    OutputBuffer(String),

    /// The consuming side of the transmit queue is gone
    #[error("Transmit queue closed")]
    QueueClosed,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Nordic TX
pub type Result<T> = std::result::Result<T, NordicTxError>;
