//! Response encoding.
//!
//! ```text
//! Response := RESP  op_code:1  status:4  [payload, success only]
//! ```
//!
//! The payload shape depends on the op and on which out-parameters the
//! host asked for; a failed call (native or local) carries the status
//! alone. If the payload does not fit the transmit buffer the response is
//! rewritten as status-only with `DATA_SIZE`, so the host still gets its
//! one answer.

use crate::ble::gap::ConnParams;
use crate::ble::gatts::CharHandles;
use crate::error::{DecodeError, EncodeError, status};
use crate::rpc::codec::packet_type;
use crate::rpc::cursor::{FieldCursor, FieldWriter, WireField};
use crate::rpc::transport::TxBuffer;

/// Out-values captured from a native call, ready to serialize.
///
/// Byte slices borrow the engine's scratch buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reply<'s> {
    /// No payload.
    #[default]
    None,
    Appearance(u16),
    Ppcp(ConnParams),
    /// `len:2` if the length was requested, then the name bytes if a
    /// buffer was requested.
    DeviceName {
        len: Option<u16>,
        name: Option<&'s [u8]>,
    },
    ServiceHandle(u16),
    CharHandles(CharHandles),
    /// Bytes accepted by a value write.
    ValueLen(u16),
    /// `len:2 offset:2 [bytes]`.
    Value {
        len: u16,
        offset: u16,
        data: Option<&'s [u8]>,
    },
    /// `presence[len:2]`: bytes actually sent by a notification.
    HvxLen(Option<u16>),
}

impl Reply<'_> {
    pub fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        match self {
            Self::None => Ok(()),
            Self::Appearance(v) | Self::ServiceHandle(v) | Self::ValueLen(v) => w.u16(*v),
            Self::Ppcp(p) => p.encode(w),
            Self::DeviceName { len, name } => {
                if let Some(len) = len {
                    w.u16(*len)?;
                }
                match name {
                    Some(name) => w.bytes(name),
                    None => Ok(()),
                }
            }
            Self::CharHandles(h) => h.encode(w),
            Self::Value { len, offset, data } => {
                w.u16(*len)?;
                w.u16(*offset)?;
                match data {
                    Some(data) => w.bytes(data),
                    None => Ok(()),
                }
            }
            Self::HvxLen(len) => {
                w.presence(len.is_some())?;
                match len {
                    Some(len) => w.u16(*len),
                    None => Ok(()),
                }
            }
        }
    }
}

fn write_header(w: &mut FieldWriter<'_>, op_code: u8, code: u32) -> Result<(), EncodeError> {
    w.u8(packet_type::RESP)?;
    w.u8(op_code)?;
    w.u32(code)
}

/// Serialize one response into `tx`. Returns the status actually sent,
/// which differs from `code` only when the payload had to be dropped.
pub fn encode_response(
    op_code: u8,
    code: u32,
    reply: &Reply<'_>,
    tx: &mut TxBuffer,
) -> Result<u32, EncodeError> {
    let full = tx.fill(|w| {
        write_header(w, op_code, code)?;
        if code == status::SUCCESS {
            reply.encode(w)?;
        }
        Ok(())
    });

    match full {
        Ok(_) => Ok(code),
        Err(EncodeError::BufferFull { .. }) => {
            tx.clear();
            tx.fill(|w| write_header(w, op_code, status::DATA_SIZE))?;
            Ok(status::DATA_SIZE)
        }
    }
}

// ── Host side ─────────────────────────────────────────────────

/// A received response, split into header fields and raw payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseView<'a> {
    pub op_code: u8,
    pub status: u32,
    pub payload: &'a [u8],
}

impl<'a> ResponseView<'a> {
    /// Parse a response packet. Returns `None` for packets that are not
    /// responses.
    pub fn parse(packet: &'a [u8]) -> Option<Result<Self, DecodeError>> {
        let [packet_type::RESP, rest @ ..] = packet else {
            return None;
        };
        let mut cur = FieldCursor::new(rest);
        Some(Self::read(&mut cur))
    }

    fn read(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        let op_code = cur.u8()?;
        let status = cur.u32()?;
        let payload = cur.bytes(cur.remaining())?;
        Ok(Self {
            op_code,
            status,
            payload,
        })
    }

    pub fn is_success(&self) -> bool {
        self.status == status::SUCCESS
    }

    /// Cursor over the payload, for reading out-values.
    pub fn cursor(&self) -> FieldCursor<'a> {
        FieldCursor::new(self.payload)
    }
}
