//! # Transmitter Module
//!
//! Multi-channel transmit scheduling for Enhanced ShockBurst packets.
//!
//! This module handles:
//! - Decoding inbound transmit blobs into requests
//! - Queueing requests between producers and the render step
//! - Rendering one packet per tick onto the selected output channel

pub mod request;
pub mod queue;
pub mod render;

pub use queue::{tx_queue, TxQueue, TxQueueHandle};
pub use render::NordicTx;
pub use request::TransmitRequest;
