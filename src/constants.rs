//! Wire-level constants for Modbus RTU frames
//!
//! An RTU frame on a serial line is at most 256 bytes: one unit ID byte, up to
//! 253 PDU bytes and a two byte CRC. Quantity ceilings below are the largest
//! counts whose PDU still fits in those 253 bytes.

// ============================================================================
// Frame layout
// ============================================================================

/// PDU bytes available between the unit ID and the CRC
pub const MAX_PDU_SIZE: usize = 253;

/// Buffer size that fits any encoded or received frame.
///
/// Matches the largest Modbus ADU of either transport (TCP, 7 + 253).
pub const MAX_MESSAGE_LENGTH: usize = 260;

/// `[unit][function][addr_hi][addr_lo][param_hi][param_lo]`
pub const RTU_HEADER_LEN: usize = 6;

/// CRC-16, low byte first
pub const CRC_LEN: usize = 2;

/// Reads and single writes: header then CRC, nothing else
pub const RTU_FIXED_REQUEST_LEN: usize = RTU_HEADER_LEN + CRC_LEN;

/// `[unit][function | 0x80][exception][crc_lo][crc_hi]`
pub const EXCEPTION_ADU_LEN: usize = 5;

/// Write responses echo the request header
pub const WRITE_RESPONSE_ADU_LEN: usize = RTU_HEADER_LEN + CRC_LEN;

/// `[unit][function][byte_count]` plus CRC; data bytes come on top
pub const READ_RESPONSE_OVERHEAD: usize = 5;

pub const EXCEPTION_FLAG: u8 = 0x80;

/// FC05 value field for ON
pub const COIL_ON: u16 = 0xFF00;
/// FC05 value field for OFF
pub const COIL_OFF: u16 = 0x0000;

// ============================================================================
// Quantity ceilings
// ============================================================================
//
// | Function  | PDU layout                             | Bound                 |
// |-----------|----------------------------------------|-----------------------|
// | FC03/FC04 | fc, count, 2N                          | 2 + 2N <= 253         |
// | FC16      | fc, addr(2), qty(2), count, 2N         | 6 + 2N <= 253         |
// | FC01/FC02 | fc, count, ceil(N/8)                   | 2000 by protocol      |
// | FC15      | fc, addr(2), qty(2), count, ceil(N/8)  | 1968 (0x7B0) by protocol |

/// FC03/FC04 registers per request
pub const MAX_READ_REGISTERS: u16 = 125;

/// FC16 registers per request
pub const MAX_WRITE_REGISTERS: u16 = 123;

/// FC01/FC02 bits per request
pub const MAX_READ_BITS: u16 = 2000;

/// FC15 coils per request
pub const MAX_WRITE_BITS: u16 = 1968;

// ============================================================================
// Function codes
// ============================================================================

pub const FC_READ_COILS: u8 = 0x01;
pub const FC_READ_DISCRETE_INPUTS: u8 = 0x02;
pub const FC_READ_HOLDING_REGISTERS: u8 = 0x03;
pub const FC_READ_INPUT_REGISTERS: u8 = 0x04;
pub const FC_WRITE_SINGLE_COIL: u8 = 0x05;
pub const FC_WRITE_SINGLE_REGISTER: u8 = 0x06;
pub const FC_WRITE_MULTIPLE_COILS: u8 = 0x0F;
pub const FC_WRITE_MULTIPLE_REGISTERS: u8 = 0x10;

// ============================================================================
// Exception codes
// ============================================================================

pub const EXCEPTION_ILLEGAL_FUNCTION: u8 = 0x01;
pub const EXCEPTION_ILLEGAL_DATA_ADDRESS: u8 = 0x02;
pub const EXCEPTION_ILLEGAL_DATA_VALUE: u8 = 0x03;
pub const EXCEPTION_SERVER_DEVICE_FAILURE: u8 = 0x04;
pub const EXCEPTION_ACKNOWLEDGE: u8 = 0x05;
pub const EXCEPTION_SERVER_DEVICE_BUSY: u8 = 0x06;
pub const EXCEPTION_NEGATIVE_ACKNOWLEDGE: u8 = 0x07;
pub const EXCEPTION_MEMORY_PARITY_ERROR: u8 = 0x08;
// 0x09 is unassigned
pub const EXCEPTION_GATEWAY_PATH_UNAVAILABLE: u8 = 0x0A;
pub const EXCEPTION_GATEWAY_TARGET_FAILED: u8 = 0x0B;
