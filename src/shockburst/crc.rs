//! # CRC-16/CCITT Implementation
//!
//! CRC-16/CCITT checksum calculation for Enhanced ShockBurst frames.
//!
//! **Polynomial**: 0x1021 (x^16 + x^12 + x^5 + 1)
//! **Initial Value**: 0xFFFF
//! **Bit order**: MSB first

/// CRC-16/CCITT polynomial
pub const CRC16_POLY: u16 = 0x1021;

/// CRC-16/CCITT initial value
pub const CRC16_INIT: u16 = 0xFFFF;

/// Precomputed CRC16 lookup table for whole-byte updates
const CRC16_TABLE: [u16; 256] = generate_crc16_table();

/// Generate CRC16 lookup table at compile time
const fn generate_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x8000) != 0 {
                crc = (crc << 1) ^ CRC16_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Fold `bits` bits of `data` (MSB first) into a running CRC
///
/// The data byte is XORed into the high byte of the CRC, then the register
/// is shifted `bits` times. `bits = 8` is an ordinary byte update; smaller
/// widths cover frames whose CRC window ends mid-byte.
///
/// # Arguments
///
/// * `crc` - Running CRC value
/// * `data` - Byte to fold in (only the top `bits` bits are significant)
/// * `bits` - Number of bits to process
///
/// # Examples
///
/// ```
/// use nordic_tx::shockburst::crc::{crc_update, CRC16_INIT};
///
/// let crc = crc_update(CRC16_INIT, 0xE7, 8);
/// let crc = crc_update(crc, 0x80, 1);
/// # let _ = crc;
/// ```
pub fn crc_update(crc: u16, data: u8, bits: u8) -> u16 {
    let mut crc = crc ^ ((data as u16) << 8);

    for _ in 0..bits {
        if (crc & 0x8000) != 0 {
            crc = (crc << 1) ^ CRC16_POLY;
        } else {
            crc <<= 1;
        }
    }

    crc
}

/// Calculate CRC-16/CCITT over a byte slice using the lookup table
///
/// Starts from [`CRC16_INIT`]. Equivalent to chaining [`crc_update`] with
/// `bits = 8` over every byte.
///
/// # Examples
///
/// ```
/// use nordic_tx::shockburst::crc::crc16_ccitt;
///
/// assert_eq!(crc16_ccitt(b"123456789"), 0x29B1);
/// ```
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    crc16_ccitt_continue(CRC16_INIT, data)
}

/// Continue a CRC-16/CCITT calculation from an existing register value
pub fn crc16_ccitt_continue(crc: u16, data: &[u8]) -> u16 {
    data.iter().fold(crc, |crc, &byte| {
        (crc << 8) ^ CRC16_TABLE[((crc >> 8) as u8 ^ byte) as usize]
    })
}
