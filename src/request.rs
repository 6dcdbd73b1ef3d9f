//! # Request Encoder
//!
//! Serializes complete RTU request ADUs into caller-owned buffers:
//!
//! ```text
//! [unit][function][addr_hi][addr_lo][param_hi][param_lo] ... [crc_lo][crc_hi]
//! ```
//!
//! `param` is the quantity for reads and multiple writes, and the value itself
//! for single writes. Every check (quantity ceiling, empty request, buffer
//! capacity) runs before the first byte is written, so a failed call leaves the
//! destination untouched.
//!
//! ```rust
//! use voltage_rtu::request::encode_write_single_register;
//!
//! let mut adu = [0u8; 8];
//! let len = encode_write_single_register(0x76, 0x5678, 0x2233, &mut adu).unwrap();
//! assert_eq!(&adu[..len], &[0x76, 0x06, 0x56, 0x78, 0x22, 0x33, 0x4A, 0x69]);
//! ```

use tracing::debug;

use crate::adu::{AduWriter, ModbusAdu};
use crate::constants::{
    COIL_OFF, COIL_ON, CRC_LEN, FC_WRITE_MULTIPLE_COILS, FC_WRITE_MULTIPLE_REGISTERS,
    RTU_FIXED_REQUEST_LEN, RTU_HEADER_LEN,
};
use crate::crc::verify_crc;
use crate::device_limits::DeviceLimits;
use crate::error::{ModbusError, ModbusResult};
use crate::protocol::{ModbusFunction, SlaveId};

/// Header + byte count + CRC around the data of a multiple write
const MULTIPLE_WRITE_OVERHEAD: usize = RTU_HEADER_LEN + 1 + CRC_LEN;

/// Encoder enforcing a set of [`DeviceLimits`].
///
/// The free `encode_*` functions use the protocol ceilings; build an encoder
/// when a device accepts less.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestEncoder {
    limits: DeviceLimits,
}

impl RequestEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: DeviceLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    /// Encode any request.
    pub fn encode(
        &self,
        unit: SlaveId,
        request: &ModbusRequest<'_>,
        adu: &mut [u8],
    ) -> ModbusResult<usize> {
        match *request {
            ModbusRequest::ReadCoils { address, quantity } => {
                self.read_coils(unit, address, quantity, adu)
            }
            ModbusRequest::ReadDiscreteInputs { address, quantity } => {
                self.read_discrete_inputs(unit, address, quantity, adu)
            }
            ModbusRequest::ReadHoldingRegisters { address, quantity } => {
                self.read_holding_registers(unit, address, quantity, adu)
            }
            ModbusRequest::ReadInputRegisters { address, quantity } => {
                self.read_input_registers(unit, address, quantity, adu)
            }
            ModbusRequest::WriteSingleCoil { address, value } => {
                self.write_single_coil(unit, address, value, adu)
            }
            ModbusRequest::WriteSingleRegister { address, value } => {
                self.write_single_register(unit, address, value, adu)
            }
            ModbusRequest::WriteMultipleCoils { address, values } => {
                self.write_multiple_coils(unit, address, values, adu)
            }
            ModbusRequest::WriteMultipleRegisters { address, values } => {
                self.write_multiple_registers(unit, address, values, adu)
            }
        }
    }

    /// Read Coils (FC01)
    pub fn read_coils(
        &self,
        unit: SlaveId,
        address: u16,
        quantity: u16,
        adu: &mut [u8],
    ) -> ModbusResult<usize> {
        self.encode_read(ModbusFunction::ReadCoils, unit, address, quantity, adu)
    }

    /// Read Discrete Inputs (FC02)
    pub fn read_discrete_inputs(
        &self,
        unit: SlaveId,
        address: u16,
        quantity: u16,
        adu: &mut [u8],
    ) -> ModbusResult<usize> {
        self.encode_read(ModbusFunction::ReadDiscreteInputs, unit, address, quantity, adu)
    }

    /// Read Holding Registers (FC03)
    pub fn read_holding_registers(
        &self,
        unit: SlaveId,
        address: u16,
        quantity: u16,
        adu: &mut [u8],
    ) -> ModbusResult<usize> {
        self.encode_read(ModbusFunction::ReadHoldingRegisters, unit, address, quantity, adu)
    }

    /// Read Input Registers (FC04)
    pub fn read_input_registers(
        &self,
        unit: SlaveId,
        address: u16,
        quantity: u16,
        adu: &mut [u8],
    ) -> ModbusResult<usize> {
        self.encode_read(ModbusFunction::ReadInputRegisters, unit, address, quantity, adu)
    }

    /// Write Single Coil (FC05): `true` is sent as 0xFF00, `false` as 0x0000.
    pub fn write_single_coil(
        &self,
        unit: SlaveId,
        address: u16,
        value: bool,
        adu: &mut [u8],
    ) -> ModbusResult<usize> {
        let coil_value = if value { COIL_ON } else { COIL_OFF };
        encode_fixed(ModbusFunction::WriteSingleCoil, unit, address, coil_value, adu)
    }

    /// Write Single Register (FC06)
    pub fn write_single_register(
        &self,
        unit: SlaveId,
        address: u16,
        value: u16,
        adu: &mut [u8],
    ) -> ModbusResult<usize> {
        encode_fixed(ModbusFunction::WriteSingleRegister, unit, address, value, adu)
    }

    /// Write Multiple Coils (FC15)
    ///
    /// Bits are packed least-significant first: `values[0]` is bit 0 of the
    /// first data byte, `values[8]` bit 0 of the second. Unused high bits of
    /// the last byte are zero.
    pub fn write_multiple_coils(
        &self,
        unit: SlaveId,
        address: u16,
        values: &[bool],
        adu: &mut [u8],
    ) -> ModbusResult<usize> {
        let function = ModbusFunction::WriteMultipleCoils;
        self.check(function, values.len())?;

        let byte_count = values.len().div_ceil(8);
        let mut writer = AduWriter::new(adu, MULTIPLE_WRITE_OVERHEAD + byte_count)?;
        writer.header(unit, function, address, values.len() as u16)?;
        writer.push(byte_count as u8)?;

        for chunk in values.chunks(8) {
            let packed = chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (bit, &on)| if on { acc | (1 << bit) } else { acc });
            writer.push(packed)?;
        }

        writer.finish()
    }

    /// Write Multiple Registers (FC16): each value big-endian, in input order.
    pub fn write_multiple_registers(
        &self,
        unit: SlaveId,
        address: u16,
        values: &[u16],
        adu: &mut [u8],
    ) -> ModbusResult<usize> {
        let function = ModbusFunction::WriteMultipleRegisters;
        self.check(function, values.len())?;

        let byte_count = values.len() * 2;
        let mut writer = AduWriter::new(adu, MULTIPLE_WRITE_OVERHEAD + byte_count)?;
        writer.header(unit, function, address, values.len() as u16)?;
        writer.push(byte_count as u8)?;

        for &value in values {
            writer.push_u16(value)?;
        }

        writer.finish()
    }

    fn encode_read(
        &self,
        function: ModbusFunction,
        unit: SlaveId,
        address: u16,
        quantity: u16,
        adu: &mut [u8],
    ) -> ModbusResult<usize> {
        self.check(function, quantity as usize)?;
        encode_fixed(function, unit, address, quantity, adu)
    }

    fn check(&self, function: ModbusFunction, quantity: usize) -> ModbusResult<()> {
        self.limits
            .check_quantity(function, quantity)
            .inspect_err(|e| debug!("Rejecting {} request: {}", function.name(), e))
    }
}

/// Header + CRC: every read and single write is exactly 8 bytes.
fn encode_fixed(
    function: ModbusFunction,
    unit: SlaveId,
    address: u16,
    param: u16,
    adu: &mut [u8],
) -> ModbusResult<usize> {
    let mut writer = AduWriter::new(adu, RTU_FIXED_REQUEST_LEN)?;
    writer.header(unit, function, address, param)?;
    writer.finish()
}

// ============================================================================
// Free functions (protocol ceilings)
// ============================================================================

/// Encode a Read Coils (FC01) request; returns the ADU length (8).
pub fn encode_read_coils(
    unit: SlaveId,
    address: u16,
    quantity: u16,
    adu: &mut [u8],
) -> ModbusResult<usize> {
    RequestEncoder::new().read_coils(unit, address, quantity, adu)
}

/// Encode a Read Discrete Inputs (FC02) request; returns the ADU length (8).
pub fn encode_read_discrete_inputs(
    unit: SlaveId,
    address: u16,
    quantity: u16,
    adu: &mut [u8],
) -> ModbusResult<usize> {
    RequestEncoder::new().read_discrete_inputs(unit, address, quantity, adu)
}

/// Encode a Read Holding Registers (FC03) request; returns the ADU length (8).
pub fn encode_read_holding_registers(
    unit: SlaveId,
    address: u16,
    quantity: u16,
    adu: &mut [u8],
) -> ModbusResult<usize> {
    RequestEncoder::new().read_holding_registers(unit, address, quantity, adu)
}

/// Encode a Read Input Registers (FC04) request; returns the ADU length (8).
pub fn encode_read_input_registers(
    unit: SlaveId,
    address: u16,
    quantity: u16,
    adu: &mut [u8],
) -> ModbusResult<usize> {
    RequestEncoder::new().read_input_registers(unit, address, quantity, adu)
}

/// Encode a Write Single Coil (FC05) request; returns the ADU length (8).
pub fn encode_write_single_coil(
    unit: SlaveId,
    address: u16,
    value: bool,
    adu: &mut [u8],
) -> ModbusResult<usize> {
    RequestEncoder::new().write_single_coil(unit, address, value, adu)
}

/// Encode a Write Single Register (FC06) request; returns the ADU length (8).
pub fn encode_write_single_register(
    unit: SlaveId,
    address: u16,
    value: u16,
    adu: &mut [u8],
) -> ModbusResult<usize> {
    RequestEncoder::new().write_single_register(unit, address, value, adu)
}

/// Encode a Write Multiple Coils (FC15) request; returns `9 + ceil(n / 8)`.
pub fn encode_write_multiple_coils(
    unit: SlaveId,
    address: u16,
    values: &[bool],
    adu: &mut [u8],
) -> ModbusResult<usize> {
    RequestEncoder::new().write_multiple_coils(unit, address, values, adu)
}

/// Encode a Write Multiple Registers (FC16) request; returns `9 + 2n`.
pub fn encode_write_multiple_registers(
    unit: SlaveId,
    address: u16,
    values: &[u16],
    adu: &mut [u8],
) -> ModbusResult<usize> {
    RequestEncoder::new().write_multiple_registers(unit, address, values, adu)
}

// ============================================================================
// Typed requests
// ============================================================================

/// A request for one of the eight supported functions.
///
/// Multiple writes borrow their values from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModbusRequest<'a> {
    ReadCoils { address: u16, quantity: u16 },
    ReadDiscreteInputs { address: u16, quantity: u16 },
    ReadHoldingRegisters { address: u16, quantity: u16 },
    ReadInputRegisters { address: u16, quantity: u16 },
    WriteSingleCoil { address: u16, value: bool },
    WriteSingleRegister { address: u16, value: u16 },
    WriteMultipleCoils { address: u16, values: &'a [bool] },
    WriteMultipleRegisters { address: u16, values: &'a [u16] },
}

impl ModbusRequest<'_> {
    pub fn function(&self) -> ModbusFunction {
        match self {
            Self::ReadCoils { .. } => ModbusFunction::ReadCoils,
            Self::ReadDiscreteInputs { .. } => ModbusFunction::ReadDiscreteInputs,
            Self::ReadHoldingRegisters { .. } => ModbusFunction::ReadHoldingRegisters,
            Self::ReadInputRegisters { .. } => ModbusFunction::ReadInputRegisters,
            Self::WriteSingleCoil { .. } => ModbusFunction::WriteSingleCoil,
            Self::WriteSingleRegister { .. } => ModbusFunction::WriteSingleRegister,
            Self::WriteMultipleCoils { .. } => ModbusFunction::WriteMultipleCoils,
            Self::WriteMultipleRegisters { .. } => ModbusFunction::WriteMultipleRegisters,
        }
    }

    pub fn address(&self) -> u16 {
        match *self {
            Self::ReadCoils { address, .. }
            | Self::ReadDiscreteInputs { address, .. }
            | Self::ReadHoldingRegisters { address, .. }
            | Self::ReadInputRegisters { address, .. }
            | Self::WriteSingleCoil { address, .. }
            | Self::WriteSingleRegister { address, .. }
            | Self::WriteMultipleCoils { address, .. }
            | Self::WriteMultipleRegisters { address, .. } => address,
        }
    }

    /// Number of bits or registers addressed (1 for single writes)
    pub fn quantity(&self) -> usize {
        match *self {
            Self::ReadCoils { quantity, .. }
            | Self::ReadDiscreteInputs { quantity, .. }
            | Self::ReadHoldingRegisters { quantity, .. }
            | Self::ReadInputRegisters { quantity, .. } => quantity as usize,
            Self::WriteSingleCoil { .. } | Self::WriteSingleRegister { .. } => 1,
            Self::WriteMultipleCoils { values, .. } => values.len(),
            Self::WriteMultipleRegisters { values, .. } => values.len(),
        }
    }

    /// Length of the encoded ADU, CRC included
    pub fn encoded_len(&self) -> usize {
        match *self {
            Self::WriteMultipleCoils { values, .. } => {
                MULTIPLE_WRITE_OVERHEAD + values.len().div_ceil(8)
            }
            Self::WriteMultipleRegisters { values, .. } => {
                MULTIPLE_WRITE_OVERHEAD + values.len() * 2
            }
            _ => RTU_FIXED_REQUEST_LEN,
        }
    }

    /// Encode with the protocol ceilings.
    pub fn encode(&self, unit: SlaveId, adu: &mut [u8]) -> ModbusResult<usize> {
        RequestEncoder::new().encode(unit, self, adu)
    }

    /// Encode into a stack-allocated frame.
    pub fn to_adu(&self, unit: SlaveId) -> ModbusResult<ModbusAdu> {
        ModbusAdu::encode_with(|buf| self.encode(unit, buf))
    }
}

// ============================================================================
// Request header parsing
// ============================================================================

/// Fixed fields of an encoded request ADU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub unit: SlaveId,
    pub function: ModbusFunction,
    pub address: u16,
    /// Quantity, or the written value for FC05/FC06
    pub value: u16,
    /// Total ADU length, CRC included
    pub adu_len: usize,
}

impl RequestHeader {
    /// Parse and CRC-check the header of a request ADU.
    ///
    /// For multiple writes the byte count must match the quantity.
    pub fn parse(adu: &[u8]) -> ModbusResult<Self> {
        let adu_len = request_adu_len(adu)?;
        if adu.len() < adu_len {
            return Err(ModbusError::FrameTooShort {
                required: adu_len,
                available: adu.len(),
            });
        }
        let frame = &adu[..adu_len];
        verify_crc(frame)?;

        let function = ModbusFunction::from_u8(frame[1])?;
        let address = u16::from_be_bytes([frame[2], frame[3]]);
        let value = u16::from_be_bytes([frame[4], frame[5]]);

        let expected_bytes = match function {
            ModbusFunction::WriteMultipleCoils => Some((value as usize).div_ceil(8)),
            ModbusFunction::WriteMultipleRegisters => Some(value as usize * 2),
            _ => None,
        };
        if let Some(expected) = expected_bytes {
            let byte_count = frame[RTU_HEADER_LEN];
            if byte_count as usize != expected {
                return Err(ModbusError::InvalidByteCount {
                    function,
                    byte_count,
                });
            }
        }

        Ok(Self {
            unit: frame[0],
            function,
            address,
            value,
            adu_len,
        })
    }
}

/// Total length of a request ADU, derived from its function code and,
/// for multiple writes, its byte count.
pub fn request_adu_len(adu: &[u8]) -> ModbusResult<usize> {
    if adu.len() < 2 {
        return Err(ModbusError::FrameTooShort {
            required: 2,
            available: adu.len(),
        });
    }

    match adu[1] {
        FC_WRITE_MULTIPLE_COILS | FC_WRITE_MULTIPLE_REGISTERS => match adu.get(RTU_HEADER_LEN) {
            Some(&byte_count) => Ok(MULTIPLE_WRITE_OVERHEAD + byte_count as usize),
            None => Err(ModbusError::FrameTooShort {
                required: RTU_HEADER_LEN + 1,
                available: adu.len(),
            }),
        },
        code => ModbusFunction::from_u8(code).map(|_| RTU_FIXED_REQUEST_LEN),
    }
}

// ============================================================================
// Tests
// ============================================================================
