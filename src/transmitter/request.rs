//! # Transmit Requests
//!
//! Field-by-field decoding of inbound transmit blobs.
//!
//! Blob layout (fixed width, no padding):
//! ```text
//! Offset  Field            Size
//! 0       channel index    1
//! 1       address_length   1
//! 2       payload_length   1
//! 3       sequence_number  1
//! 4       no_ack           1
//! 5       crc_length       1
//! 6       address          address_length
//! 6+A     payload          payload_length
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{NordicTxError, Result};
use crate::shockburst::encoder::{encode_packet, validate_lengths};
use crate::shockburst::protocol::ShockburstPacket;

pub const OFFSET_CHANNEL: usize = 0;
pub const OFFSET_ADDRESS_LENGTH: usize = 1;
pub const OFFSET_PAYLOAD_LENGTH: usize = 2;
pub const OFFSET_SEQUENCE_NUMBER: usize = 3;
pub const OFFSET_NO_ACK: usize = 4;
pub const OFFSET_CRC_LENGTH: usize = 5;

/// Size of the header following the channel byte
pub const HEADER_SIZE: usize = 5;

/// Channel byte + header
pub const BLOB_PREFIX_SIZE: usize = 1 + HEADER_SIZE;

/// One pending encode job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitRequest {
    /// Output channel index
    pub channel: u8,

    /// Packet sequence number (carried, not used for framing)
    pub sequence_number: u8,

    /// No-ACK flag (carried, not used for framing)
    pub no_ack: u8,

    /// Requested CRC length in bytes
    pub crc_length: u8,

    /// Destination address
    pub address: Vec<u8>,

    /// Payload bytes
    pub payload: Vec<u8>,
}

impl TransmitRequest {
    /// Create a request, checking lengths against the supported ranges
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedLength` if the address, payload or CRC length is
    /// not supported by the encoder.
    pub fn new(channel: u8, address: Vec<u8>, payload: Vec<u8>, crc_length: u8) -> Result<Self> {
        validate_lengths(address.len(), payload.len(), crc_length)?;

        Ok(Self {
            channel,
            sequence_number: 0,
            no_ack: 0,
            crc_length,
            address,
            payload,
        })
    }

    /// Decode a request from an inbound blob
    ///
    /// Bytes past the declared payload are ignored.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRequest` if the blob is shorter than its header, or
    /// shorter than the address and payload lengths the header declares.
    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        if blob.len() < BLOB_PREFIX_SIZE {
            return Err(NordicTxError::MalformedRequest(
                format!("blob of {} bytes is shorter than the {}-byte header", blob.len(), BLOB_PREFIX_SIZE)
            ));
        }

        let address_length = blob[OFFSET_ADDRESS_LENGTH] as usize;
        let payload_length = blob[OFFSET_PAYLOAD_LENGTH] as usize;
        let address_start = BLOB_PREFIX_SIZE;
        let payload_start = address_start + address_length;
        let end = payload_start + payload_length;

        if blob.len() < end {
            return Err(NordicTxError::MalformedRequest(
                format!(
                    "blob declares {} address + {} payload bytes ({} total) but holds {}",
                    address_length, payload_length, end, blob.len()
                )
            ));
        }

        Ok(Self {
            channel: blob[OFFSET_CHANNEL],
            sequence_number: blob[OFFSET_SEQUENCE_NUMBER],
            no_ack: blob[OFFSET_NO_ACK],
            crc_length: blob[OFFSET_CRC_LENGTH],
            address: blob[address_start..payload_start].to_vec(),
            payload: blob[payload_start..end].to_vec(),
        })
    }

    /// Serialize into the inbound blob layout
    pub fn to_blob(&self) -> Bytes {
        let mut blob = BytesMut::with_capacity(BLOB_PREFIX_SIZE + self.address.len() + self.payload.len());
        blob.put_u8(self.channel);
        blob.put_u8(self.address.len() as u8);
        blob.put_u8(self.payload.len() as u8);
        blob.put_u8(self.sequence_number);
        blob.put_u8(self.no_ack);
        blob.put_u8(self.crc_length);
        blob.put_slice(&self.address);
        blob.put_slice(&self.payload);
        blob.freeze()
    }

    pub fn address_length(&self) -> u8 {
        self.address.len() as u8
    }

    pub fn payload_length(&self) -> u8 {
        self.payload.len() as u8
    }

    /// Assemble the Enhanced ShockBurst frame for this request
    pub fn encode(&self) -> Result<ShockburstPacket> {
        encode_packet(&self.address, &self.payload, self.crc_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn sample_blob() -> Vec<u8> {
        vec![
            2,    // channel
            5,    // address_length
            3,    // payload_length
            7,    // sequence_number
            1,    // no_ack
            2,    // crc_length
            0xE7, 0xE7, 0xE7, 0xE7, 0xE7, // address
            0x01, 0x02, 0x03, // payload
        ]
    }

    #[test]
    fn test_from_blob() {
        let request = assert_ok!(TransmitRequest::from_blob(&sample_blob()));

        assert_eq!(request.channel, 2);
        assert_eq!(request.address_length(), 5);
        assert_eq!(request.payload_length(), 3);
        assert_eq!(request.sequence_number, 7);
        assert_eq!(request.no_ack, 1);
        assert_eq!(request.crc_length, 2);
        assert_eq!(request.address, vec![0xE7; 5]);
        assert_eq!(request.payload, vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_from_blob_ignores_trailing_bytes() {
        let mut blob = sample_blob();
        blob.extend_from_slice(&[0xFF, 0xFF]);

        let request = assert_ok!(TransmitRequest::from_blob(&blob));
        assert_eq!(request.payload, vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_from_blob_header_too_short() {
        let result = TransmitRequest::from_blob(&[0, 5, 3]);
        assert!(matches!(result, Err(NordicTxError::MalformedRequest(_))));

        assert_err!(TransmitRequest::from_blob(&[]));
    }

    #[test]
    fn test_from_blob_declared_lengths_exceed_blob() {
        // address_length = 5, payload_length = 200, only 10 bytes follow the header
        let mut blob = vec![0, 5, 200, 0, 0, 2];
        blob.extend_from_slice(&[0xAB; 10]);

        let result = TransmitRequest::from_blob(&blob);
        assert!(matches!(result, Err(NordicTxError::MalformedRequest(_))));
    }

    #[test]
    fn test_from_blob_missing_last_payload_byte() {
        let mut blob = sample_blob();
        blob.pop();
        assert!(matches!(
            TransmitRequest::from_blob(&blob),
            Err(NordicTxError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_to_blob_matches_layout() {
        let request = TransmitRequest::from_blob(&sample_blob()).unwrap();
        assert_eq!(request.to_blob().as_ref(), sample_blob().as_slice());
    }

    #[test]
    fn test_new_validates_lengths() {
        assert_ok!(TransmitRequest::new(0, vec![0xE7; 5], vec![0; 32], 2));
        assert_err!(TransmitRequest::new(0, vec![0xE7; 5], vec![0; 33], 2));
        assert_err!(TransmitRequest::new(0, vec![0xE7; 5], vec![], 0));
        assert_err!(TransmitRequest::new(0, vec![], vec![], 2));
    }

    #[test]
    fn test_encode_unsupported_lengths_from_blob() {
        // A well-formed blob may still declare lengths the encoder rejects
        let mut blob = vec![0, 5, 40, 0, 0, 2];
        blob.extend_from_slice(&[0x11; 45]);

        let request = assert_ok!(TransmitRequest::from_blob(&blob));
        assert!(matches!(request.encode(), Err(NordicTxError::UnsupportedLength(_))));
    }

    #[test]
    fn test_encode() {
        let request = TransmitRequest::from_blob(&sample_blob()).unwrap();
        let packet = request.encode().unwrap();

        assert_eq!(packet.byte_length(), 1 + 5 + 3 + 2);
        assert_eq!(packet.address(), request.address.as_slice());
        assert_eq!(packet.payload(), request.payload.as_slice());
    }
}
