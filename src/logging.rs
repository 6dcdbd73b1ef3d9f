//! Packet logging helpers
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application.

use core::fmt;

/// Displays raw bytes as space-separated hex (`01 03 00 6B`) without allocating.
///
/// Intended for `tracing` fields, where formatting only happens if the event
/// is enabled.
#[derive(Clone, Copy)]
pub struct HexFrame<'a>(pub &'a [u8]);

impl fmt::Display for HexFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HexFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self)
    }
}
