//! Per-device quantity ceilings
//!
//! The encoder refuses requests above the protocol maxima (125/123 registers,
//! 2000/1968 bits). Plenty of field devices answer less than that; a
//! [`DeviceLimits`] lowers the ceilings for one device. Builders clamp to the
//! protocol maxima, so limits can only ever tighten.

use crate::constants::{MAX_READ_BITS, MAX_READ_REGISTERS, MAX_WRITE_BITS, MAX_WRITE_REGISTERS};
use crate::error::{ModbusError, ModbusResult};
use crate::protocol::ModbusFunction;

/// Device-specific Modbus quantity ceilings.
///
/// # Example
///
/// ```rust
/// use voltage_rtu::DeviceLimits;
///
/// // A device that only answers 50 registers per read
/// let limits = DeviceLimits::new().with_max_read_registers(50);
/// assert_eq!(limits.max_read_registers, 50);
///
/// // Values above the protocol ceiling are clamped
/// let limits = DeviceLimits::new().with_max_read_registers(500);
/// assert_eq!(limits.max_read_registers, 125);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Maximum bits per FC01/FC02 request.
    pub max_read_bits: u16,
    /// Maximum registers per FC03/FC04 request.
    pub max_read_registers: u16,
    /// Maximum coils per FC15 request.
    pub max_write_bits: u16,
    /// Maximum registers per FC16 request.
    pub max_write_registers: u16,
}

impl DeviceLimits {
    /// Protocol maxima.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits for slow serial devices: 50 registers, 500 bits per request.
    pub fn conservative() -> Self {
        Self {
            max_read_bits: 500,
            max_read_registers: 50,
            max_write_bits: 500,
            max_write_registers: 50,
        }
    }

    /// Set maximum read bits (clamped to 2000).
    pub fn with_max_read_bits(mut self, count: u16) -> Self {
        self.max_read_bits = count.min(MAX_READ_BITS);
        self
    }

    /// Set maximum read registers (clamped to 125).
    pub fn with_max_read_registers(mut self, count: u16) -> Self {
        self.max_read_registers = count.min(MAX_READ_REGISTERS);
        self
    }

    /// Set maximum write bits (clamped to 1968).
    pub fn with_max_write_bits(mut self, count: u16) -> Self {
        self.max_write_bits = count.min(MAX_WRITE_BITS);
        self
    }

    /// Set maximum write registers (clamped to 123).
    pub fn with_max_write_registers(mut self, count: u16) -> Self {
        self.max_write_registers = count.min(MAX_WRITE_REGISTERS);
        self
    }

    /// Ceiling for a function's quantity field, `None` for single writes.
    pub fn max_quantity(&self, function: ModbusFunction) -> Option<u16> {
        match function {
            ModbusFunction::ReadCoils | ModbusFunction::ReadDiscreteInputs => {
                Some(self.max_read_bits)
            }
            ModbusFunction::ReadHoldingRegisters | ModbusFunction::ReadInputRegisters => {
                Some(self.max_read_registers)
            }
            ModbusFunction::WriteMultipleCoils => Some(self.max_write_bits),
            ModbusFunction::WriteMultipleRegisters => Some(self.max_write_registers),
            ModbusFunction::WriteSingleCoil | ModbusFunction::WriteSingleRegister => None,
        }
    }

    /// Check a request quantity against these limits.
    ///
    /// Zero is rejected with [`ModbusError::EmptyRequest`], anything above the
    /// ceiling with [`ModbusError::TooManyItems`]. Single writes always pass.
    pub fn check_quantity(&self, function: ModbusFunction, quantity: usize) -> ModbusResult<()> {
        let Some(max) = self.max_quantity(function) else {
            return Ok(());
        };

        if quantity == 0 {
            return Err(ModbusError::EmptyRequest { function });
        }
        if quantity > max as usize {
            return Err(ModbusError::TooManyItems {
                function,
                requested: quantity,
                max,
            });
        }
        Ok(())
    }

    /// Check if a function's quantity is within limits.
    pub fn is_within_limits(&self, function: ModbusFunction, quantity: usize) -> bool {
        self.check_quantity(function, quantity).is_ok()
    }
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_read_bits: MAX_READ_BITS,
            max_read_registers: MAX_READ_REGISTERS,
            max_write_bits: MAX_WRITE_BITS,
            max_write_registers: MAX_WRITE_REGISTERS,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
