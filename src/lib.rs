//! # Voltage RTU - Allocation-free Modbus RTU Frame Codec
//!
//! **Author:** Evan Liu <liuyifanz.1996@gmail.com>
//! **License:** MIT
//!
//! Encodes Modbus RTU request ADUs and decodes response ADUs over caller-owned
//! buffers. There is no transport, retry or session logic here: a serial or
//! TCP layer hands this crate a buffer to encode into, or the bytes it
//! received, and gets typed results back.
//!
//! ## Features
//!
//! - **No allocation**: encoding writes into `&mut [u8]`, decoding borrows the
//!   receive buffer
//! - **CRC-16/MODBUS** checked on every decoded frame
//! - **Typed results**: exceptions, CRC failures and caller errors are distinct
//!   [`ModbusError`] variants
//! - **Device limits**: lower quantity ceilings per device
//!
//! ## Supported Function Codes
//!
//! | Code | Function | Encode | Decode |
//! |------|----------|--------|--------|
//! | 0x01 | Read Coils | ✅ | ✅ |
//! | 0x02 | Read Discrete Inputs | ✅ | ✅ |
//! | 0x03 | Read Holding Registers | ✅ | ✅ |
//! | 0x04 | Read Input Registers | ✅ | ✅ |
//! | 0x05 | Write Single Coil | ✅ | ✅ |
//! | 0x06 | Write Single Register | ✅ | ✅ |
//! | 0x0F | Write Multiple Coils | ✅ | ✅ |
//! | 0x10 | Write Multiple Registers | ✅ | ✅ |
//!
//! ## Quick Start
//!
//! ```rust
//! use voltage_rtu::{decode_response, encode_read_holding_registers, ModbusResult};
//!
//! fn main() -> ModbusResult<()> {
//!     // Read 3 holding registers from unit 2, starting at 0x006B
//!     let mut request = [0u8; 8];
//!     let len = encode_read_holding_registers(0x02, 0x006B, 3, &mut request)?;
//!     assert_eq!(len, 8);
//!
//!     // ... send request[..len], receive the response ...
//!     let received = [0x02, 0x03, 0x06, 0x02, 0x2B, 0x00, 0x00, 0x00, 0x64, 0x11, 0x8A];
//!
//!     let response = decode_response(&received)?;
//!     let mut registers = [0u16; 3];
//!     response.read_registers_into(&mut registers)?;
//!     assert_eq!(registers, [0x022B, 0x0000, 0x0064]);
//!     Ok(())
//! }
//! ```

// ============================================================================
// Core modules
// ============================================================================

/// Core error types and result handling
pub mod error;

/// Frame layout, quantity ceilings and raw codes
pub mod constants;

/// Function codes and exception codes
pub mod protocol;

/// CRC-16/MODBUS checksum
pub mod crc;

/// Bounds-checked ADU writer and stack-allocated frame
pub mod adu;

/// Request ADU encoding
pub mod request;

/// Response ADU decoding
pub mod response;

/// Device-specific protocol limits configuration
pub mod device_limits;

/// Packet logging helpers
pub mod logging;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// === Error handling ===
pub use error::{ModbusError, ModbusResult};

// === Core types ===
pub use adu::{AduWriter, ModbusAdu};
pub use protocol::{ExceptionCode, ModbusFunction, SlaveId};

// === CRC ===
pub use crc::{append_crc, compute_crc, verify_crc};

// === Encoder ===
pub use request::{
    encode_read_coils, encode_read_discrete_inputs, encode_read_holding_registers,
    encode_read_input_registers, encode_write_multiple_coils, encode_write_multiple_registers,
    encode_write_single_coil, encode_write_single_register, ModbusRequest, RequestEncoder,
    RequestHeader,
};

// === Decoder ===
pub use response::{
    decode_response, response_adu_len, Bits, ModbusResponse, Registers, ResponsePayload,
    WriteEcho,
};

// === Configuration ===
pub use device_limits::DeviceLimits;

// === Protocol limits (commonly needed constants) ===
pub use constants::{
    MAX_MESSAGE_LENGTH, MAX_READ_BITS, MAX_READ_REGISTERS, MAX_WRITE_BITS, MAX_WRITE_REGISTERS,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
