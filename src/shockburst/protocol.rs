//! # Enhanced ShockBurst Protocol Constants and Types
//!
//! Core framing definitions for nRF24-family link-layer packets.

use std::fmt;

/// Preamble used when the address MSB is set
pub const PREAMBLE_MSB_SET: u8 = 0xAA;

/// Preamble used when the address MSB is clear
pub const PREAMBLE_MSB_CLEAR: u8 = 0x55;

/// Preamble size in bytes
pub const PREAMBLE_LENGTH: usize = 1;

/// CRC bytes written on the wire, regardless of the requested CRC length
pub const CRC_FIELD_LENGTH: usize = 2;

/// Address width range (nRF24 supports 2 to 5 byte addresses)
pub const ADDRESS_LENGTH_MIN: u8 = 2;
pub const ADDRESS_LENGTH_MAX: u8 = 5;

/// Maximum Enhanced ShockBurst payload size
pub const MAX_PAYLOAD_LENGTH: u8 = 32;

/// CRC length range in bytes
pub const CRC_LENGTH_MIN: u8 = 1;
pub const CRC_LENGTH_MAX: u8 = 2;

/// Payload length assumed by the parse path
///
/// Captured frames carry no decoded packet control field, so the parser
/// cannot learn the real length. Frames of any other length fail CRC.
pub const PARSE_PAYLOAD_LENGTH: u8 = 11;

/// Largest assembled packet: preamble + address + payload + CRC
pub const MAX_PACKET_LENGTH: usize = PREAMBLE_LENGTH
    + ADDRESS_LENGTH_MAX as usize
    + MAX_PAYLOAD_LENGTH as usize
    + CRC_FIELD_LENGTH;

/// Select the preamble for an address
///
/// The preamble always differs from the first address bit so the receiver
/// sees a bit transition.
pub fn preamble_for(address_first_byte: u8) -> u8 {
    if address_first_byte & 0x80 == 0x80 {
        PREAMBLE_MSB_SET
    } else {
        PREAMBLE_MSB_CLEAR
    }
}

/// Assembled byte length for the given address and payload lengths
pub fn packet_length(address_length: u8, payload_length: u8) -> usize {
    PREAMBLE_LENGTH + address_length as usize + payload_length as usize + CRC_FIELD_LENGTH
}

/// One assembled (or parsed) Enhanced ShockBurst frame
///
/// Wire layout: `[preamble(1)] [address] [payload] [crc(2)]`.
/// Address, payload and CRC are owned copies, independent of the request
/// they were built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShockburstPacket {
    pub(crate) address_length: u8,
    pub(crate) payload_length: u8,
    pub(crate) crc_length: u8,
    pub(crate) address: Vec<u8>,
    pub(crate) payload: Vec<u8>,
    pub(crate) crc: Vec<u8>,
    pub(crate) bytes: Vec<u8>,
}

impl ShockburstPacket {
    pub fn address_length(&self) -> u8 {
        self.address_length
    }

    pub fn payload_length(&self) -> u8 {
        self.payload_length
    }

    pub fn crc_length(&self) -> u8 {
        self.crc_length
    }

    pub fn address(&self) -> &[u8] {
        &self.address
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Checksum bytes, `crc_length` long, low bytes of the CRC in network order
    pub fn crc(&self) -> &[u8] {
        &self.crc
    }

    /// Fully assembled frame bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn preamble(&self) -> u8 {
        self.bytes[0]
    }

    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    /// Frame length in bits (informational; framing is byte based)
    pub fn bit_length(&self) -> usize {
        self.bytes.len() * 8
    }
}

fn write_hex_line(f: &mut fmt::Formatter<'_>, label: &str, data: &[u8]) -> fmt::Result {
    write!(f, "{:<9}", label)?;
    for byte in data {
        write!(f, "{:02X} ", byte)?;
    }
    writeln!(f)
}

impl fmt::Display for ShockburstPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex_line(f, "Address:", &self.address)?;
        write_hex_line(f, "Payload:", &self.payload)?;
        write_hex_line(f, "CRC:", &self.crc)?;
        write_hex_line(f, "Bytes:", &self.bytes)
    }
}

/// Captured bytes handed to the parse path
///
/// `aligned` starts at the preamble. `shifted` is the same capture offset by
/// one bit, kept for demodulator refinement; the parser does not read it.
#[derive(Debug, Clone, Copy)]
pub struct CaptureWindow<'a> {
    pub aligned: &'a [u8],
    pub shifted: &'a [u8],
}

impl<'a> CaptureWindow<'a> {
    pub fn new(aligned: &'a [u8], shifted: &'a [u8]) -> Self {
        Self { aligned, shifted }
    }

    /// Window with no bit-shifted view
    pub fn from_aligned(aligned: &'a [u8]) -> Self {
        Self { aligned, shifted: &[] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_constants() {
        assert_eq!(PREAMBLE_MSB_SET, 0xAA);
        assert_eq!(PREAMBLE_MSB_CLEAR, 0x55);
    }

    #[test]
    fn test_preamble_follows_address_msb() {
        for byte in 0..=u8::MAX {
            let expected = if byte & 0x80 != 0 { 0xAA } else { 0x55 };
            assert_eq!(preamble_for(byte), expected, "address byte 0x{:02X}", byte);
        }
    }

    #[test]
    fn test_packet_length() {
        assert_eq!(packet_length(5, 0), 8);
        assert_eq!(packet_length(5, 11), 19);
        assert_eq!(packet_length(3, 32), 38);
        assert_eq!(MAX_PACKET_LENGTH, 40);
    }

    #[test]
    fn test_display_lists_fields() {
        let packet = ShockburstPacket {
            address_length: 2,
            payload_length: 1,
            crc_length: 2,
            address: vec![0xE7, 0x01],
            payload: vec![0x42],
            crc: vec![0xBE, 0xEF],
            bytes: vec![0xAA, 0xE7, 0x01, 0x42, 0xBE, 0xEF],
        };

        let text = packet.to_string();
        assert!(text.contains("Address: E7 01"));
        assert!(text.contains("Payload: 42"));
        assert!(text.contains("CRC:     BE EF"));
        assert!(text.contains("Bytes:   AA E7 01 42 BE EF"));
    }

    #[test]
    fn test_capture_window_aligned_has_empty_shift() {
        let bytes = [0x55, 0x01];
        let window = CaptureWindow::from_aligned(&bytes);
        assert_eq!(window.aligned, &bytes);
        assert!(window.shifted.is_empty());
    }
}
