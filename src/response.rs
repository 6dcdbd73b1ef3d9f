//! # Response Decoder
//!
//! Parses a fully received RTU response in one pass:
//!
//! 1. read unit ID and function code
//! 2. derive the ADU length (5 for exceptions, `5 + byte_count` for reads,
//!    8 for writes)
//! 3. verify the CRC over everything but the last two bytes
//! 4. surface exception responses as [`ModbusError::Exception`]
//! 5. expose the payload as bits, registers or a write echo
//!
//! Decoding borrows the caller's buffer; extraction writes into caller slices
//! or iterates without allocating.
//!
//! ```rust
//! use voltage_rtu::response::decode_response;
//!
//! let frame = [0x02, 0x03, 0x06, 0x02, 0x2B, 0x00, 0x00, 0x00, 0x64, 0x11, 0x8A];
//! let response = decode_response(&frame).unwrap();
//!
//! let mut registers = [0u16; 3];
//! let count = response.read_registers_into(&mut registers).unwrap();
//! assert_eq!(count, 3);
//! assert_eq!(registers, [0x022B, 0x0000, 0x0064]);
//! ```

use tracing::{debug, warn};

use crate::constants::{
    CRC_LEN, EXCEPTION_ADU_LEN, EXCEPTION_FLAG, READ_RESPONSE_OVERHEAD, WRITE_RESPONSE_ADU_LEN,
};
use crate::crc::verify_crc;
use crate::error::{ModbusError, ModbusResult};
use crate::logging::HexFrame;
use crate::protocol::{ExceptionCode, ModbusFunction, SlaveId};

/// Total length of the response ADU starting at `adu[0]`.
///
/// Needs the first two bytes, and the byte count (third byte) for read
/// responses. A transport can call this on a partial frame to learn how many
/// bytes to wait for.
pub fn response_adu_len(adu: &[u8]) -> ModbusResult<usize> {
    let Some(&fn_code) = adu.get(1) else {
        return Err(ModbusError::FrameTooShort {
            required: 2,
            available: adu.len(),
        });
    };

    if fn_code & EXCEPTION_FLAG != 0 {
        return Ok(EXCEPTION_ADU_LEN);
    }

    let function = ModbusFunction::from_u8(fn_code).inspect_err(|_| {
        warn!("Unknown function code: 0x{:02X}", fn_code);
    })?;

    if function.is_read() {
        match adu.get(2) {
            Some(&byte_count) => Ok(READ_RESPONSE_OVERHEAD + byte_count as usize),
            None => Err(ModbusError::FrameTooShort {
                required: 3,
                available: adu.len(),
            }),
        }
    } else {
        Ok(WRITE_RESPONSE_ADU_LEN)
    }
}

/// Decode a response ADU.
///
/// Returns `Ok` for a CRC-valid normal response, `Err(BadCrc)` for a damaged
/// frame and `Err(Exception)` for a CRC-valid exception response. Bytes past
/// the derived ADU length are ignored.
pub fn decode_response(adu: &[u8]) -> ModbusResult<ModbusResponse<'_>> {
    let adu_len = response_adu_len(adu)?;
    if adu.len() < adu_len {
        return Err(ModbusError::FrameTooShort {
            required: adu_len,
            available: adu.len(),
        });
    }

    let frame = &adu[..adu_len];
    verify_crc(frame)?;

    let unit = frame[0];
    let fn_code = frame[1];

    if fn_code & EXCEPTION_FLAG != 0 {
        let function = fn_code & !EXCEPTION_FLAG;
        let code = ExceptionCode::from_u8(frame[2]);
        debug!(
            "Exception response from unit {}: code {}, function code 0x{:02X}",
            unit, code, function
        );
        return Err(ModbusError::Exception {
            unit,
            function,
            code,
        });
    }

    let function = ModbusFunction::from_u8(fn_code)?;
    let data = &frame[2..adu_len - CRC_LEN];

    if function.is_read() && !function.is_bit_access() && data[0] % 2 != 0 {
        return Err(ModbusError::InvalidByteCount {
            function,
            byte_count: data[0],
        });
    }

    debug!(
        "ADU parsed: unit={} FC={:02X} ({}), total_len={} [{}]",
        unit,
        fn_code,
        function.name(),
        adu_len,
        HexFrame(frame)
    );

    Ok(ModbusResponse {
        unit,
        function,
        adu_len,
        data,
    })
}

/// A CRC-valid, non-exception response borrowed from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModbusResponse<'a> {
    unit: SlaveId,
    function: ModbusFunction,
    adu_len: usize,
    /// Everything between the function code and the CRC
    data: &'a [u8],
}

impl<'a> ModbusResponse<'a> {
    #[inline]
    pub fn unit(&self) -> SlaveId {
        self.unit
    }

    #[inline]
    pub fn function(&self) -> ModbusFunction {
        self.function
    }

    /// Length of the decoded ADU, CRC included
    #[inline]
    pub fn adu_len(&self) -> usize {
        self.adu_len
    }

    /// Raw payload between function code and CRC
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Byte count field of a read response
    pub fn byte_count(&self) -> Option<u8> {
        if self.function.is_read() {
            self.data.first().copied()
        } else {
            None
        }
    }

    /// Typed view of the payload
    pub fn payload(&self) -> ResponsePayload<'a> {
        match self.function {
            ModbusFunction::ReadCoils | ModbusFunction::ReadDiscreteInputs => {
                ResponsePayload::Bits(Bits {
                    data: &self.data[1..],
                })
            }
            ModbusFunction::ReadHoldingRegisters | ModbusFunction::ReadInputRegisters => {
                ResponsePayload::Registers(Registers {
                    data: &self.data[1..],
                })
            }
            _ => ResponsePayload::WriteEcho(WriteEcho {
                address: u16::from_be_bytes([self.data[0], self.data[1]]),
                value: u16::from_be_bytes([self.data[2], self.data[3]]),
            }),
        }
    }

    /// Packed bits of a FC01/FC02 response
    pub fn bits(&self) -> ModbusResult<Bits<'a>> {
        match self.payload() {
            ResponsePayload::Bits(bits) => Ok(bits),
            _ => Err(ModbusError::UnexpectedPayload {
                function: self.function,
            }),
        }
    }

    /// Registers of a FC03/FC04 response
    pub fn registers(&self) -> ModbusResult<Registers<'a>> {
        match self.payload() {
            ResponsePayload::Registers(registers) => Ok(registers),
            _ => Err(ModbusError::UnexpectedPayload {
                function: self.function,
            }),
        }
    }

    /// Echoed address and quantity/value of a write response
    pub fn write_echo(&self) -> Option<WriteEcho> {
        match self.payload() {
            ResponsePayload::WriteEcho(echo) => Some(echo),
            _ => None,
        }
    }

    /// Unpack bits into `dest`, least significant bit of each byte first.
    ///
    /// The response carries `byte_count * 8` bits; the last byte is padded, so
    /// `dest` may be shorter than that but must reach into the last data byte.
    /// Returns the number of bits written: `min(dest.len(), byte_count * 8)`.
    pub fn read_bits_into(&self, dest: &mut [bool]) -> ModbusResult<usize> {
        let bits = self.bits()?;
        let available = bits.len();
        if available == 0 {
            return Ok(0);
        }

        let required = available - 7;
        if dest.len() < required {
            return Err(ModbusError::BufferTooSmall {
                required,
                available: dest.len(),
            });
        }

        let count = dest.len().min(available);
        for (slot, bit) in dest[..count].iter_mut().zip(bits.iter()) {
            *slot = bit;
        }
        Ok(count)
    }

    /// Unpack big-endian registers into `dest`; returns `byte_count / 2`.
    pub fn read_registers_into(&self, dest: &mut [u16]) -> ModbusResult<usize> {
        let registers = self.registers()?;
        let count = registers.len();
        if dest.len() < count {
            return Err(ModbusError::BufferTooSmall {
                required: count,
                available: dest.len(),
            });
        }

        for (slot, value) in dest.iter_mut().zip(registers.iter()) {
            *slot = value;
        }
        Ok(count)
    }

    /// Check the response comes from `unit` and answers `function`.
    pub fn check_origin(&self, unit: SlaveId, function: ModbusFunction) -> ModbusResult<()> {
        if self.unit != unit {
            return Err(ModbusError::UnitMismatch {
                expected: unit,
                received: self.unit,
            });
        }
        if self.function != function {
            return Err(ModbusError::FunctionMismatch {
                expected: function,
                received: self.function,
            });
        }
        Ok(())
    }
}

/// Decoded response data, by payload shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsePayload<'a> {
    /// FC01/FC02
    Bits(Bits<'a>),
    /// FC03/FC04
    Registers(Registers<'a>),
    /// FC05/FC06/FC15/FC16
    WriteEcho(WriteEcho),
}

/// Packed bit values, LSB of the first byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bits<'a> {
    data: &'a [u8],
}

impl<'a> Bits<'a> {
    /// Number of bits carried, padding of the last byte included
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() * 8
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.data
            .get(index / 8)
            .map(|byte| (byte >> (index % 8)) & 0x01 != 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + 'a {
        let data = self.data;
        (0..data.len() * 8).map(move |i| (data[i / 8] >> (i % 8)) & 0x01 != 0)
    }

    /// The packed bytes as received
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }
}

/// Big-endian 16-bit register values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers<'a> {
    data: &'a [u8],
}

impl<'a> Registers<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u16> {
        let offset = index.checked_mul(2)?;
        let pair = self.data.get(offset..offset.checked_add(2)?)?;
        Some(u16::from_be_bytes([pair[0], pair[1]]))
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + 'a {
        self.data
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
    }
}

/// Address and quantity (FC15/FC16) or value (FC05/FC06) echoed by a write response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteEcho {
    pub address: u16,
    pub value: u16,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const READ_HOLDING_RESP: &[u8] = &[
        0x02, 0x03, 0x06, 0x02, 0x2B, 0x00, 0x00, 0x00, 0x64, 0x11, 0x8A,
    ];
    const READ_COILS_RESP: &[u8] = &[0x12, 0x01, 0x03, 0xCD, 0x68, 0x05, 0x40, 0xD1];
    const WRITE_REGISTER_RESP: &[u8] = &[0x01, 0x06, 0x12, 0x34, 0xFF, 0xE3, 0xCD, 0x05];
    const EXCEPTION_RESP: &[u8] = &[0x01, 0x81, 0x01, 0x81, 0x90];

    #[test]
    fn test_response_adu_len() {
        assert_eq!(response_adu_len(READ_HOLDING_RESP).unwrap(), 11);
        assert_eq!(response_adu_len(READ_COILS_RESP).unwrap(), 8);
        assert_eq!(response_adu_len(WRITE_REGISTER_RESP).unwrap(), 8);
        assert_eq!(response_adu_len(EXCEPTION_RESP).unwrap(), 5);

        // Partial frames are enough to know the length
        assert_eq!(response_adu_len(&[0x02, 0x03, 0x06]).unwrap(), 11);
        assert_eq!(response_adu_len(&[0x01, 0x10]).unwrap(), 8);
        assert!(matches!(
            response_adu_len(&[0x02, 0x03]),
            Err(ModbusError::FrameTooShort { required: 3, .. })
        ));
        assert!(matches!(
            response_adu_len(&[0x02]),
            Err(ModbusError::FrameTooShort { required: 2, .. })
        ));
    }

    #[test]
    fn test_decode_read_holding_registers() {
        let response = decode_response(READ_HOLDING_RESP).unwrap();
        assert_eq!(response.unit(), 0x02);
        assert_eq!(response.function(), ModbusFunction::ReadHoldingRegisters);
        assert_eq!(response.adu_len(), 11);
        assert_eq!(response.byte_count(), Some(6));

        let registers = response.registers().unwrap();
        assert_eq!(registers.len(), 3);
        assert_eq!(registers.get(0), Some(0x022B));
        assert_eq!(registers.get(2), Some(0x0064));
        assert_eq!(registers.get(3), None);

        let mut dest = [0u16; 10];
        assert_eq!(response.read_registers_into(&mut dest).unwrap(), 3);
        assert_eq!(&dest[..3], &[0x022B, 0x0000, 0x0064]);
    }

    #[test]
    fn test_decode_read_coils() {
        let response = decode_response(READ_COILS_RESP).unwrap();
        assert_eq!(response.unit(), 0x12);
        assert_eq!(response.function(), ModbusFunction::ReadCoils);

        let bits = response.bits().unwrap();
        assert_eq!(bits.len(), 24);
        assert_eq!(bits.as_bytes(), &[0xCD, 0x68, 0x05]);

        // 0xCD = 1100_1101, LSB first
        let mut dest = [false; 24];
        assert_eq!(response.read_bits_into(&mut dest).unwrap(), 24);
        assert_eq!(
            &dest[..8],
            &[true, false, true, true, false, false, true, true]
        );
        assert_eq!(bits.get(16), Some(true));
        assert_eq!(bits.get(17), Some(false));
        assert_eq!(bits.get(18), Some(true));
        assert_eq!(bits.get(24), None);
    }

    #[test]
    fn test_read_bits_into_truncates_padding() {
        let response = decode_response(READ_COILS_RESP).unwrap();

        // 19 coils requested: the last byte holds 3 data bits and 5 padding bits
        let mut dest = [false; 19];
        assert_eq!(response.read_bits_into(&mut dest).unwrap(), 19);

        // Too short to reach the last data byte
        let mut dest = [false; 16];
        assert_eq!(
            response.read_bits_into(&mut dest),
            Err(ModbusError::BufferTooSmall {
                required: 17,
                available: 16
            })
        );
    }

    #[test]
    fn test_read_registers_into_too_small() {
        let response = decode_response(READ_HOLDING_RESP).unwrap();
        let mut dest = [0xFFFFu16; 2];
        assert_eq!(
            response.read_registers_into(&mut dest),
            Err(ModbusError::BufferTooSmall {
                required: 3,
                available: 2
            })
        );
        assert_eq!(dest, [0xFFFF; 2]);
    }

    #[test]
    fn test_wrong_payload_shape() {
        let response = decode_response(READ_HOLDING_RESP).unwrap();
        let mut bits = [false; 48];
        assert_eq!(
            response.read_bits_into(&mut bits),
            Err(ModbusError::UnexpectedPayload {
                function: ModbusFunction::ReadHoldingRegisters
            })
        );
        assert_eq!(response.write_echo(), None);
    }

    #[test]
    fn test_decode_write_response() {
        let response = decode_response(WRITE_REGISTER_RESP).unwrap();
        assert_eq!(response.unit(), 0x01);
        assert_eq!(response.function(), ModbusFunction::WriteSingleRegister);
        assert_eq!(response.adu_len(), 8);
        assert_eq!(response.byte_count(), None);
        assert_eq!(
            response.write_echo(),
            Some(WriteEcho {
                address: 0x1234,
                value: 0xFFE3
            })
        );
        assert!(response.registers().is_err());
    }

    #[test]
    fn test_decode_exception() {
        let err = decode_response(EXCEPTION_RESP).unwrap_err();
        assert_eq!(
            err,
            ModbusError::Exception {
                unit: 0x01,
                function: 0x01,
                code: ExceptionCode::IllegalFunction,
            }
        );
        assert_eq!(
            err.exception_code().map(ExceptionCode::description),
            Some("Illegal function")
        );
    }

    #[test]
    fn test_decode_bad_crc() {
        let mut frame = READ_HOLDING_RESP.to_vec();
        frame[4] ^= 0x10;
        assert!(matches!(
            decode_response(&frame),
            Err(ModbusError::BadCrc {
                expected: _,
                received: 0x8A11
            })
        ));
    }

    #[test]
    fn test_damaged_exception_is_bad_crc() {
        // Exception code byte corrupted: 0x01 -> 0x02
        let err = decode_response(&[0x01, 0x81, 0x02, 0x81, 0x90]).unwrap_err();
        assert!(matches!(err, ModbusError::BadCrc { .. }));
        assert!(!err.is_exception());
        assert_eq!(err.exception_code(), None);
    }

    #[test]
    fn test_decode_unknown_function() {
        assert_eq!(
            decode_response(&[0x01, 0x2B, 0x0E, 0x01, 0x00, 0x00, 0x00, 0x00]),
            Err(ModbusError::UnknownFunctionCode { code: 0x2B })
        );
    }

    #[test]
    fn test_decode_truncated_frame() {
        assert_eq!(
            decode_response(&READ_HOLDING_RESP[..9]),
            Err(ModbusError::FrameTooShort {
                required: 11,
                available: 9
            })
        );
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut buf = [0u8; 32];
        buf[..8].copy_from_slice(WRITE_REGISTER_RESP);
        let response = decode_response(&buf).unwrap();
        assert_eq!(response.adu_len(), 8);
    }

    #[test]
    fn test_odd_register_byte_count() {
        let mut frame = [0x01, 0x03, 0x03, 0x00, 0x01, 0x02, 0x00, 0x00];
        let crc = crate::crc::compute_crc(&frame[..6]).to_le_bytes();
        frame[6..].copy_from_slice(&crc);
        assert_eq!(
            decode_response(&frame),
            Err(ModbusError::InvalidByteCount {
                function: ModbusFunction::ReadHoldingRegisters,
                byte_count: 3
            })
        );
    }

    #[test]
    fn test_check_origin() {
        let response = decode_response(READ_HOLDING_RESP).unwrap();
        assert!(response
            .check_origin(0x02, ModbusFunction::ReadHoldingRegisters)
            .is_ok());
        assert_eq!(
            response.check_origin(0x03, ModbusFunction::ReadHoldingRegisters),
            Err(ModbusError::UnitMismatch {
                expected: 0x03,
                received: 0x02
            })
        );
        assert_eq!(
            response.check_origin(0x02, ModbusFunction::ReadInputRegisters),
            Err(ModbusError::FunctionMismatch {
                expected: ModbusFunction::ReadInputRegisters,
                received: ModbusFunction::ReadHoldingRegisters
            })
        );
    }
}
