//! CRC-16/MODBUS checksum
//!
//! Reflected CRC-16 with polynomial 0xA001 (0x8005 reflected), initial value
//! 0xFFFF and no final XOR. The checksum travels low byte first.

use crc::{Crc, CRC_16_MODBUS};
use tracing::warn;

use crate::constants::CRC_LEN;
use crate::error::{ModbusError, ModbusResult};

/// CRC calculator for RTU
const CRC_MODBUS: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Compute the CRC-16/MODBUS of `data`.
#[inline]
pub fn compute_crc(data: &[u8]) -> u16 {
    CRC_MODBUS.checksum(data)
}

/// Write the CRC of `buffer[..payload_len]` after the payload.
///
/// Stores the low byte at `buffer[payload_len]` and the high byte at
/// `buffer[payload_len + 1]`, returning the total frame length
/// `payload_len + 2`. The buffer is not touched if it cannot hold both bytes.
pub fn append_crc(buffer: &mut [u8], payload_len: usize) -> ModbusResult<usize> {
    let total = match payload_len.checked_add(CRC_LEN) {
        Some(total) if total <= buffer.len() => total,
        required => {
            return Err(ModbusError::BufferTooSmall {
                required: required.unwrap_or(usize::MAX),
                available: buffer.len(),
            })
        }
    };

    let crc = compute_crc(&buffer[..payload_len]);
    buffer[payload_len..total].copy_from_slice(&crc.to_le_bytes());
    Ok(total)
}

/// Check the trailing CRC of a complete frame.
///
/// `adu` must be exactly the frame: the last two bytes are taken as the
/// received checksum.
pub fn verify_crc(adu: &[u8]) -> ModbusResult<()> {
    // At least one byte of payload before the checksum
    if adu.len() <= CRC_LEN {
        return Err(ModbusError::FrameTooShort {
            required: CRC_LEN + 1,
            available: adu.len(),
        });
    }

    let data_len = adu.len() - CRC_LEN;
    let expected = compute_crc(&adu[..data_len]);
    let received = u16::from_le_bytes([adu[data_len], adu[data_len + 1]]);

    if expected != received {
        warn!(
            "Invalid CRC. Expect 0x{:04X}, got 0x{:04X}",
            expected, received
        );
        return Err(ModbusError::BadCrc { expected, received });
    }
    Ok(())
}
