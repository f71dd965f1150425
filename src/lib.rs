//! # Nordic TX Library
//!
//! Enhanced ShockBurst packet codec and multi-channel transmit scheduler.
//!
//! This library assembles nRF24-family link-layer frames (preamble, address,
//! payload, CRC-16/CCITT) from queued transmit requests and multiplexes them
//! across several output channel byte streams, one packet per render tick.

pub mod config;
pub mod error;
pub mod shockburst;
pub mod transmitter;
