//! Error types for RTU frame encoding and decoding
//!
//! Every failure is returned to the immediate caller as a [`ModbusError`];
//! nothing is retried or recovered inside the codec.

use thiserror::Error;

use crate::protocol::{ExceptionCode, ModbusFunction, SlaveId};

/// Result type for codec operations
pub type ModbusResult<T> = Result<T, ModbusError>;

/// Modbus RTU codec errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModbusError {
    /// Requested or written quantity exceeds the protocol (or device) ceiling
    #[error("Too many items for {function}: {requested} > {max}")]
    TooManyItems {
        function: ModbusFunction,
        requested: usize,
        max: u16,
    },

    /// A read or multiple write with a quantity of zero
    #[error("Empty request for {function}: quantity must be at least 1")]
    EmptyRequest { function: ModbusFunction },

    /// Caller-supplied buffer cannot hold the output
    #[error("Buffer too small: need {required} bytes/items, have {available}")]
    BufferTooSmall { required: usize, available: usize },

    /// Received frame is shorter than its header says it should be
    #[error("Frame too short: need {required} bytes, have {available}")]
    FrameTooShort { required: usize, available: usize },

    /// Received frame checksum does not match its contents
    #[error("Invalid CRC: expected 0x{expected:04X}, received 0x{received:04X}")]
    BadCrc { expected: u16, received: u16 },

    /// Device answered with a Modbus exception response
    #[error("Modbus exception {code} for function 0x{function:02X} from unit {unit}")]
    Exception {
        unit: SlaveId,
        function: u8,
        code: ExceptionCode,
    },

    /// Function code outside the supported set; frame length cannot be known
    #[error("Unknown function code: 0x{code:02X}")]
    UnknownFunctionCode { code: u8 },

    /// Byte count field inconsistent with the function's data shape
    #[error("Invalid byte count {byte_count} for {function}")]
    InvalidByteCount {
        function: ModbusFunction,
        byte_count: u8,
    },

    /// Extraction requested a payload shape the response does not carry
    #[error("Response to {function} does not carry the requested payload")]
    UnexpectedPayload { function: ModbusFunction },

    /// Response not from requested slave
    #[error("Unit ID mismatch: expected {expected}, received {received}")]
    UnitMismatch { expected: SlaveId, received: SlaveId },

    /// Response is for a different function than the request
    #[error("Function mismatch: expected {expected}, received {received}")]
    FunctionMismatch {
        expected: ModbusFunction,
        received: ModbusFunction,
    },
}

impl ModbusError {
    /// True for a well-formed exception response from the device
    #[inline]
    pub fn is_exception(&self) -> bool {
        matches!(self, Self::Exception { .. })
    }

    /// The exception code, if this is an exception response
    pub fn exception_code(&self) -> Option<ExceptionCode> {
        match self {
            Self::Exception { code, .. } => Some(*code),
            _ => None,
        }
    }

    #[inline]
    pub fn is_crc_error(&self) -> bool {
        matches!(self, Self::BadCrc { .. })
    }

    /// Errors caused by the arguments of the call rather than by received data
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::TooManyItems { .. }
                | Self::EmptyRequest { .. }
                | Self::BufferTooSmall { .. }
                | Self::UnexpectedPayload { .. }
        )
    }

    /// Errors that mean the received bytes are damaged or misframed;
    /// a transport would typically discard the frame and resynchronise.
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            Self::FrameTooShort { .. }
                | Self::BadCrc { .. }
                | Self::UnknownFunctionCode { .. }
                | Self::InvalidByteCount { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModbusError::TooManyItems {
            function: ModbusFunction::ReadHoldingRegisters,
            requested: 126,
            max: 125,
        };
        assert_eq!(
            err.to_string(),
            "Too many items for Read Holding Registers (0x03): 126 > 125"
        );

        let err = ModbusError::BadCrc {
            expected: 0x8A11,
            received: 0x0000,
        };
        assert_eq!(
            err.to_string(),
            "Invalid CRC: expected 0x8A11, received 0x0000"
        );

        let err = ModbusError::Exception {
            unit: 1,
            function: 0x01,
            code: ExceptionCode::IllegalFunction,
        };
        assert_eq!(
            err.to_string(),
            "Modbus exception 0x01 (Illegal function) for function 0x01 from unit 1"
        );
    }

    #[test]
    fn test_error_classification() {
        let exception = ModbusError::Exception {
            unit: 1,
            function: 0x03,
            code: ExceptionCode::ServerDeviceBusy,
        };
        assert!(exception.is_exception());
        assert_eq!(exception.exception_code(), Some(ExceptionCode::ServerDeviceBusy));
        assert!(!exception.is_caller_error());
        assert!(!exception.is_frame_error());

        let crc = ModbusError::BadCrc {
            expected: 1,
            received: 2,
        };
        assert!(crc.is_crc_error());
        assert!(crc.is_frame_error());
        assert_eq!(crc.exception_code(), None);

        let too_many = ModbusError::TooManyItems {
            function: ModbusFunction::WriteMultipleCoils,
            requested: 1969,
            max: 1968,
        };
        assert!(too_many.is_caller_error());
        assert!(!too_many.is_frame_error());
    }
}
