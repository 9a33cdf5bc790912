//! Native parameter types of the wrapped BLE stack.
//!
//! These are the values the decode routines reconstruct and hand to the
//! [`BleStack`](crate::app::ports::BleStack) port. Fixed-shape types
//! implement [`WireField`](crate::rpc::cursor::WireField) so they can be
//! read and written with the cursor primitives.

pub mod gap;
pub mod gatts;

use crate::error::{DecodeError, EncodeError};
use crate::rpc::cursor::{FieldCursor, FieldWriter, WireField};

/// Security mode and level packed into one permission byte.
///
/// ```text
/// bit 7..4  level (lv)
/// bit 3..0  mode  (sm)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SecurityMode {
    pub sm: u8,
    pub lv: u8,
}

impl SecurityMode {
    /// Mode 0, level 0: no access.
    pub const NO_ACCESS: Self = Self { sm: 0, lv: 0 };
    /// Mode 1, level 1: open link.
    pub const OPEN: Self = Self { sm: 1, lv: 1 };

    pub const fn from_byte(b: u8) -> Self {
        Self {
            sm: b & 0x0F,
            lv: b >> 4,
        }
    }

    pub const fn to_byte(self) -> u8 {
        (self.sm & 0x0F) | (self.lv << 4)
    }
}

impl<'a> WireField<'a> for SecurityMode {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        cur.u8().map(Self::from_byte)
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u8(self.to_byte())
    }
}
