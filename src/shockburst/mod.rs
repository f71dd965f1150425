//! # Enhanced ShockBurst Module
//!
//! Implementation of the nRF24-family Enhanced ShockBurst link-layer framing.
//!
//! This module handles:
//! - Packet assembly (preamble + address + payload + CRC)
//! - Best-effort packet reconstruction from captured bytes
//! - CRC-16/CCITT checksum calculation, byte or bit granular

pub mod protocol;
pub mod encoder;
pub mod decoder;
pub mod crc;
