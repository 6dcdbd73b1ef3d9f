//! RTU ADU buffers
//!
//! [`AduWriter`] is a bounds-checked cursor over a caller-owned buffer and
//! [`ModbusAdu`] a fixed-size stack frame for callers that want to own the
//! encoded bytes. Neither allocates.

use tracing::debug;

use crate::constants::{CRC_LEN, MAX_MESSAGE_LENGTH};
use crate::crc::append_crc;
use crate::error::{ModbusError, ModbusResult};
use crate::logging::HexFrame;
use crate::protocol::{ModbusFunction, SlaveId};

/// Cursor that writes an RTU frame into a caller buffer.
///
/// The writer is created for a known frame length, so a buffer that cannot
/// hold the whole frame is rejected before the first byte is written.
pub struct AduWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> AduWriter<'a> {
    /// Start a frame of `frame_len` bytes (CRC included) in `buf`.
    #[inline]
    pub fn new(buf: &'a mut [u8], frame_len: usize) -> ModbusResult<Self> {
        if buf.len() < frame_len {
            return Err(ModbusError::BufferTooSmall {
                required: frame_len,
                available: buf.len(),
            });
        }
        Ok(Self { buf, len: 0 })
    }

    /// Push a single byte
    #[inline]
    pub fn push(&mut self, byte: u8) -> ModbusResult<()> {
        if self.len >= self.buf.len() {
            return Err(ModbusError::BufferTooSmall {
                required: self.len + 1,
                available: self.buf.len(),
            });
        }
        self.buf[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    /// Push u16 in big-endian
    #[inline]
    pub fn push_u16(&mut self, value: u16) -> ModbusResult<()> {
        self.extend(&value.to_be_bytes())
    }

    /// Extend with a byte slice
    #[inline]
    pub fn extend(&mut self, data: &[u8]) -> ModbusResult<()> {
        let end = self.len + data.len();
        if end > self.buf.len() {
            return Err(ModbusError::BufferTooSmall {
                required: end,
                available: self.buf.len(),
            });
        }
        self.buf[self.len..end].copy_from_slice(data);
        self.len = end;
        Ok(())
    }

    /// Write the 6-byte request header
    /// `[unit, function, addr_hi, addr_lo, param_hi, param_lo]`.
    ///
    /// `param` is the quantity, or the value itself for single writes.
    pub fn header(
        &mut self,
        unit: SlaveId,
        function: ModbusFunction,
        address: u16,
        param: u16,
    ) -> ModbusResult<()> {
        self.push(unit)?;
        self.push(function.to_u8())?;
        self.push_u16(address)?;
        self.push_u16(param)
    }

    /// Bytes written so far
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append the CRC and return the total frame length.
    pub fn finish(self) -> ModbusResult<usize> {
        let total = append_crc(self.buf, self.len)?;
        let frame = &self.buf[..total];

        if frame.len() >= 2 {
            let fc_desc = ModbusFunction::from_u8(frame[1])
                .map(ModbusFunction::name)
                .unwrap_or("Unknown Function");
            debug!(
                "ADU built: unit={} FC={:02X} ({}), total_len={} [{}]",
                frame[0],
                frame[1],
                fc_desc,
                total,
                HexFrame(frame)
            );
        }
        Ok(total)
    }
}

/// Stack-allocated RTU frame sized for the largest Modbus message
#[derive(Clone)]
pub struct ModbusAdu {
    /// Fixed-size buffer (stack)
    data: [u8; MAX_MESSAGE_LENGTH],
    /// Actual frame length
    len: usize,
}

impl ModbusAdu {
    /// Create an empty frame
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0; MAX_MESSAGE_LENGTH],
            len: 0,
        }
    }

    /// Copy a received frame.
    pub fn from_slice(data: &[u8]) -> ModbusResult<Self> {
        if data.len() > MAX_MESSAGE_LENGTH {
            return Err(ModbusError::BufferTooSmall {
                required: data.len(),
                available: MAX_MESSAGE_LENGTH,
            });
        }

        let mut adu = Self::new();
        adu.data[..data.len()].copy_from_slice(data);
        adu.len = data.len();
        Ok(adu)
    }

    /// Fill the frame with an encoder that writes into a buffer and
    /// returns the number of bytes used.
    pub fn encode_with<F>(encode: F) -> ModbusResult<Self>
    where
        F: FnOnce(&mut [u8]) -> ModbusResult<usize>,
    {
        let mut adu = Self::new();
        adu.len = encode(&mut adu.data)?;
        Ok(adu)
    }

    /// Get immutable frame slice
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Unit ID (first byte)
    #[inline]
    pub fn unit(&self) -> Option<SlaveId> {
        self.as_slice().first().copied()
    }

    /// Raw function code (second byte), exception flag included
    #[inline]
    pub fn function_code(&self) -> Option<u8> {
        self.as_slice().get(1).copied()
    }

    /// The PDU: function code and payload, without unit ID and CRC
    pub fn pdu(&self) -> &[u8] {
        if self.len < 1 + CRC_LEN {
            return &[];
        }
        &self.data[1..self.len - CRC_LEN]
    }
}

impl Default for ModbusAdu {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for ModbusAdu {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModbusAdu")
            .field("len", &self.len)
            .field("data", &HexFrame(self.as_slice()))
            .finish()
    }
}

impl AsRef<[u8]> for ModbusAdu {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
