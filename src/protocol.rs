//! Modbus protocol vocabulary: function codes and exception codes
//!
//! | Code | Function | Family |
//! |------|----------|--------|
//! | 0x01 | Read Coils | read bits |
//! | 0x02 | Read Discrete Inputs | read bits |
//! | 0x03 | Read Holding Registers | read registers |
//! | 0x04 | Read Input Registers | read registers |
//! | 0x05 | Write Single Coil | write |
//! | 0x06 | Write Single Register | write |
//! | 0x0F | Write Multiple Coils | write bits |
//! | 0x10 | Write Multiple Registers | write registers |

use core::fmt;

use crate::constants::*;
use crate::error::{ModbusError, ModbusResult};

/// Modbus slave/unit identifier
pub type SlaveId = u8;

/// The eight supported Modbus function codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModbusFunction {
    ReadCoils,
    ReadDiscreteInputs,
    ReadHoldingRegisters,
    ReadInputRegisters,
    WriteSingleCoil,
    WriteSingleRegister,
    WriteMultipleCoils,
    WriteMultipleRegisters,
}

impl ModbusFunction {
    /// Every supported function, in function code order.
    pub const ALL: [ModbusFunction; 8] = [
        ModbusFunction::ReadCoils,
        ModbusFunction::ReadDiscreteInputs,
        ModbusFunction::ReadHoldingRegisters,
        ModbusFunction::ReadInputRegisters,
        ModbusFunction::WriteSingleCoil,
        ModbusFunction::WriteSingleRegister,
        ModbusFunction::WriteMultipleCoils,
        ModbusFunction::WriteMultipleRegisters,
    ];

    /// Parse a wire function code.
    ///
    /// The exception flag must already be stripped; `0x83` is not a function.
    pub fn from_u8(code: u8) -> ModbusResult<Self> {
        match code {
            FC_READ_COILS => Ok(Self::ReadCoils),
            FC_READ_DISCRETE_INPUTS => Ok(Self::ReadDiscreteInputs),
            FC_READ_HOLDING_REGISTERS => Ok(Self::ReadHoldingRegisters),
            FC_READ_INPUT_REGISTERS => Ok(Self::ReadInputRegisters),
            FC_WRITE_SINGLE_COIL => Ok(Self::WriteSingleCoil),
            FC_WRITE_SINGLE_REGISTER => Ok(Self::WriteSingleRegister),
            FC_WRITE_MULTIPLE_COILS => Ok(Self::WriteMultipleCoils),
            FC_WRITE_MULTIPLE_REGISTERS => Ok(Self::WriteMultipleRegisters),
            _ => Err(ModbusError::UnknownFunctionCode { code }),
        }
    }

    #[inline]
    pub fn to_u8(self) -> u8 {
        match self {
            Self::ReadCoils => FC_READ_COILS,
            Self::ReadDiscreteInputs => FC_READ_DISCRETE_INPUTS,
            Self::ReadHoldingRegisters => FC_READ_HOLDING_REGISTERS,
            Self::ReadInputRegisters => FC_READ_INPUT_REGISTERS,
            Self::WriteSingleCoil => FC_WRITE_SINGLE_COIL,
            Self::WriteSingleRegister => FC_WRITE_SINGLE_REGISTER,
            Self::WriteMultipleCoils => FC_WRITE_MULTIPLE_COILS,
            Self::WriteMultipleRegisters => FC_WRITE_MULTIPLE_REGISTERS,
        }
    }

    /// Get human-readable function name
    pub fn name(self) -> &'static str {
        match self {
            Self::ReadCoils => "Read Coils",
            Self::ReadDiscreteInputs => "Read Discrete Inputs",
            Self::ReadHoldingRegisters => "Read Holding Registers",
            Self::ReadInputRegisters => "Read Input Registers",
            Self::WriteSingleCoil => "Write Single Coil",
            Self::WriteSingleRegister => "Write Single Register",
            Self::WriteMultipleCoils => "Write Multiple Coils",
            Self::WriteMultipleRegisters => "Write Multiple Registers",
        }
    }

    /// FC01-04: the response carries a byte count followed by data
    #[inline]
    pub fn is_read(self) -> bool {
        matches!(
            self,
            Self::ReadCoils
                | Self::ReadDiscreteInputs
                | Self::ReadHoldingRegisters
                | Self::ReadInputRegisters
        )
    }

    /// FC05/06/15/16: the response echoes address and quantity/value
    #[inline]
    pub fn is_write(self) -> bool {
        !self.is_read()
    }

    /// Functions whose data is packed bits rather than 16-bit registers
    #[inline]
    pub fn is_bit_access(self) -> bool {
        matches!(
            self,
            Self::ReadCoils
                | Self::ReadDiscreteInputs
                | Self::WriteSingleCoil
                | Self::WriteMultipleCoils
        )
    }

    /// Protocol ceiling on the quantity field, `None` for single writes
    /// where that field carries the value itself.
    pub fn max_quantity(self) -> Option<u16> {
        match self {
            Self::ReadCoils | Self::ReadDiscreteInputs => Some(MAX_READ_BITS),
            Self::ReadHoldingRegisters | Self::ReadInputRegisters => Some(MAX_READ_REGISTERS),
            Self::WriteMultipleCoils => Some(MAX_WRITE_BITS),
            Self::WriteMultipleRegisters => Some(MAX_WRITE_REGISTERS),
            Self::WriteSingleCoil | Self::WriteSingleRegister => None,
        }
    }
}

impl fmt::Display for ModbusFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.to_u8())
    }
}

impl TryFrom<u8> for ModbusFunction {
    type Error = ModbusError;

    fn try_from(code: u8) -> ModbusResult<Self> {
        Self::from_u8(code)
    }
}

impl From<ModbusFunction> for u8 {
    fn from(function: ModbusFunction) -> u8 {
        function.to_u8()
    }
}

/// Exception code carried by a Modbus exception response.
///
/// Codes outside the standard table are preserved in [`ExceptionCode::Unknown`]
/// rather than rejected, so the caller still sees what the device sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExceptionCode {
    IllegalFunction,
    IllegalDataAddress,
    IllegalDataValue,
    ServerDeviceFailure,
    Acknowledge,
    ServerDeviceBusy,
    NegativeAcknowledge,
    MemoryParityError,
    GatewayPathUnavailable,
    GatewayTargetFailed,
    Unknown(u8),
}

impl ExceptionCode {
    pub fn from_u8(code: u8) -> Self {
        match code {
            EXCEPTION_ILLEGAL_FUNCTION => Self::IllegalFunction,
            EXCEPTION_ILLEGAL_DATA_ADDRESS => Self::IllegalDataAddress,
            EXCEPTION_ILLEGAL_DATA_VALUE => Self::IllegalDataValue,
            EXCEPTION_SERVER_DEVICE_FAILURE => Self::ServerDeviceFailure,
            EXCEPTION_ACKNOWLEDGE => Self::Acknowledge,
            EXCEPTION_SERVER_DEVICE_BUSY => Self::ServerDeviceBusy,
            EXCEPTION_NEGATIVE_ACKNOWLEDGE => Self::NegativeAcknowledge,
            EXCEPTION_MEMORY_PARITY_ERROR => Self::MemoryParityError,
            EXCEPTION_GATEWAY_PATH_UNAVAILABLE => Self::GatewayPathUnavailable,
            EXCEPTION_GATEWAY_TARGET_FAILED => Self::GatewayTargetFailed,
            other => Self::Unknown(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::IllegalFunction => EXCEPTION_ILLEGAL_FUNCTION,
            Self::IllegalDataAddress => EXCEPTION_ILLEGAL_DATA_ADDRESS,
            Self::IllegalDataValue => EXCEPTION_ILLEGAL_DATA_VALUE,
            Self::ServerDeviceFailure => EXCEPTION_SERVER_DEVICE_FAILURE,
            Self::Acknowledge => EXCEPTION_ACKNOWLEDGE,
            Self::ServerDeviceBusy => EXCEPTION_SERVER_DEVICE_BUSY,
            Self::NegativeAcknowledge => EXCEPTION_NEGATIVE_ACKNOWLEDGE,
            Self::MemoryParityError => EXCEPTION_MEMORY_PARITY_ERROR,
            Self::GatewayPathUnavailable => EXCEPTION_GATEWAY_PATH_UNAVAILABLE,
            Self::GatewayTargetFailed => EXCEPTION_GATEWAY_TARGET_FAILED,
            Self::Unknown(code) => code,
        }
    }

    /// Human-readable description of the exception
    pub fn description(self) -> &'static str {
        match self {
            Self::IllegalFunction => "Illegal function",
            Self::IllegalDataAddress => "Illegal data address",
            Self::IllegalDataValue => "Illegal data value",
            Self::ServerDeviceFailure => "Slave device or server failure",
            Self::Acknowledge => "Acknowledge",
            Self::ServerDeviceBusy => "Slave device or server is busy",
            Self::NegativeAcknowledge => "Negative acknowledge",
            Self::MemoryParityError => "Memory parity error",
            Self::GatewayPathUnavailable => "Gateway path unavailable",
            Self::GatewayTargetFailed => "Target device failed to respond",
            Self::Unknown(_) => "Invalid exception code",
        }
    }

    #[inline]
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X} ({})", self.to_u8(), self.description())
    }
}

impl From<u8> for ExceptionCode {
    fn from(code: u8) -> Self {
        Self::from_u8(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_code_roundtrip() {
        for function in ModbusFunction::ALL {
            assert_eq!(ModbusFunction::from_u8(function.to_u8()).unwrap(), function);
        }
    }

    #[test]
    fn test_unknown_function_code() {
        for code in [0x00, 0x07, 0x11, 0x17, 0x2B, 0x83] {
            assert!(matches!(
                ModbusFunction::from_u8(code),
                Err(ModbusError::UnknownFunctionCode { code: c }) if c == code
            ));
        }
    }

    #[test]
    fn test_function_families() {
        assert!(ModbusFunction::ReadCoils.is_read());
        assert!(ModbusFunction::ReadCoils.is_bit_access());
        assert!(!ModbusFunction::ReadInputRegisters.is_bit_access());
        assert!(ModbusFunction::WriteMultipleCoils.is_write());
        assert!(ModbusFunction::WriteMultipleCoils.is_bit_access());
        assert_eq!(ModbusFunction::WriteSingleRegister.max_quantity(), None);
        assert_eq!(ModbusFunction::ReadHoldingRegisters.max_quantity(), Some(125));
        assert_eq!(ModbusFunction::WriteMultipleCoils.max_quantity(), Some(1968));
    }

    #[test]
    fn test_function_display() {
        assert_eq!(
            ModbusFunction::WriteMultipleRegisters.to_string(),
            "Write Multiple Registers (0x10)"
        );
    }

    #[test]
    fn test_exception_codes() {
        assert_eq!(ExceptionCode::from_u8(1), ExceptionCode::IllegalFunction);
        assert_eq!(ExceptionCode::from_u8(7), ExceptionCode::NegativeAcknowledge);
        assert_eq!(ExceptionCode::from_u8(0x0B), ExceptionCode::GatewayTargetFailed);
        assert_eq!(ExceptionCode::from_u8(9), ExceptionCode::Unknown(9));

        for code in 0..=u8::MAX {
            assert_eq!(ExceptionCode::from_u8(code).to_u8(), code);
        }
    }

    #[test]
    fn test_exception_description() {
        assert_eq!(ExceptionCode::IllegalFunction.description(), "Illegal function");
        assert_eq!(
            ExceptionCode::Unknown(0x42).description(),
            "Invalid exception code"
        );
        assert_eq!(
            ExceptionCode::IllegalDataAddress.to_string(),
            "0x02 (Illegal data address)"
        );
    }
}
