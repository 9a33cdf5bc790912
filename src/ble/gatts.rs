//! GATT server parameter types: UUIDs, attribute and characteristic
//! metadata, attribute values and handle-value notifications.
//!
//! Byte-slice fields borrow straight from the received frame; nothing is
//! copied until the stack decides to keep it.

use crate::ble::SecurityMode;
use crate::error::{DecodeError, EncodeError};
use crate::rpc::cursor::{FieldCursor, FieldWriter, WireField};

pub mod service_type {
    pub const PRIMARY: u8 = 0x01;
    pub const SECONDARY: u8 = 0x02;
}

pub mod hvx_type {
    pub const NOTIFICATION: u8 = 0x01;
    pub const INDICATION: u8 = 0x02;
}

pub mod vloc {
    pub const STACK: u8 = 0x01;
    pub const USER: u8 = 0x02;
}

// ── UUID ──────────────────────────────────────────────────────

/// 16-bit UUID plus the index of its base (`uuid:2 type:1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Uuid {
    pub uuid: u16,
    pub uuid_type: u8,
}

impl<'a> WireField<'a> for Uuid {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        cur.ensure(3)?;
        Ok(Self {
            uuid: cur.u16()?,
            uuid_type: cur.u8()?,
        })
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u16(self.uuid)?;
        w.u8(self.uuid_type)
    }
}

// ── Attribute metadata ────────────────────────────────────────

/// ```text
/// read_perm:1  write_perm:1  flags:1
/// flags: bit0 vlen, bit1..2 vloc, bit3 rd_auth, bit4 wr_auth
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttrMd {
    pub read_perm: SecurityMode,
    pub write_perm: SecurityMode,
    pub vlen: bool,
    pub vloc: u8,
    pub rd_auth: bool,
    pub wr_auth: bool,
}

impl<'a> WireField<'a> for AttrMd {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        cur.ensure(3)?;
        let read_perm = SecurityMode::decode(cur)?;
        let write_perm = SecurityMode::decode(cur)?;
        let flags = cur.u8()?;
        Ok(Self {
            read_perm,
            write_perm,
            vlen: flags & 0x01 != 0,
            vloc: (flags >> 1) & 0x03,
            rd_auth: flags & 0x08 != 0,
            wr_auth: flags & 0x10 != 0,
        })
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        self.read_perm.encode(w)?;
        self.write_perm.encode(w)?;
        let flags = u8::from(self.vlen)
            | ((self.vloc & 0x03) << 1)
            | (u8::from(self.rd_auth) << 3)
            | (u8::from(self.wr_auth) << 4);
        w.u8(flags)
    }
}

// ── Characteristic properties ─────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharProps(pub u8);

impl CharProps {
    pub const BROADCAST: u8 = 0x01;
    pub const READ: u8 = 0x02;
    pub const WRITE_WO_RESP: u8 = 0x04;
    pub const WRITE: u8 = 0x08;
    pub const NOTIFY: u8 = 0x10;
    pub const INDICATE: u8 = 0x20;
    pub const AUTH_SIGNED_WR: u8 = 0x40;

    pub const fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharExtProps(pub u8);

impl CharExtProps {
    pub const RELIABLE_WR: u8 = 0x01;
    pub const WR_AUX: u8 = 0x02;

    pub const fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }
}

/// Characteristic presentation format descriptor (7 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentationFormat {
    pub format: u8,
    pub exponent: i8,
    pub unit: u16,
    pub name_space: u8,
    pub desc: u16,
}

impl<'a> WireField<'a> for PresentationFormat {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        cur.ensure(7)?;
        Ok(Self {
            format: cur.u8()?,
            exponent: cur.i8()?,
            unit: cur.u16()?,
            name_space: cur.u8()?,
            desc: cur.u16()?,
        })
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u8(self.format)?;
        w.i8(self.exponent)?;
        w.u16(self.unit)?;
        w.u8(self.name_space)?;
        w.u16(self.desc)
    }
}

// ── Characteristic metadata ───────────────────────────────────

/// ```text
/// props:1 ext_props:1 desc_max:2 desc_size:2 desc_presence[desc_size bytes]
/// pf_presence[7] desc_md_presence[3] cccd_md_presence[3] sccd_md_presence[3]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharMd<'a> {
    pub props: CharProps,
    pub ext_props: CharExtProps,
    pub user_desc_max_size: u16,
    pub user_desc_size: u16,
    pub user_desc: Option<&'a [u8]>,
    pub presentation_format: Option<PresentationFormat>,
    pub user_desc_md: Option<AttrMd>,
    pub cccd_md: Option<AttrMd>,
    pub sccd_md: Option<AttrMd>,
}

impl<'a> WireField<'a> for CharMd<'a> {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        let props = CharProps(cur.u8()?);
        let ext_props = CharExtProps(cur.u8()?);
        let user_desc_max_size = cur.u16()?;
        let user_desc_size = cur.u16()?;
        let user_desc = cur.optional_bytes(user_desc_size as usize)?;
        let presentation_format = cur.optional()?;
        let user_desc_md = cur.optional()?;
        let cccd_md = cur.optional()?;
        let sccd_md = cur.optional()?;
        Ok(Self {
            props,
            ext_props,
            user_desc_max_size,
            user_desc_size,
            user_desc,
            presentation_format,
            user_desc_md,
            cccd_md,
            sccd_md,
        })
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u8(self.props.0)?;
        w.u8(self.ext_props.0)?;
        w.u16(self.user_desc_max_size)?;
        let desc_size = self.user_desc.map_or(self.user_desc_size, |d| d.len() as u16);
        w.u16(desc_size)?;
        w.optional_bytes(self.user_desc)?;
        w.optional(self.presentation_format.as_ref())?;
        w.optional(self.user_desc_md.as_ref())?;
        w.optional(self.cccd_md.as_ref())?;
        w.optional(self.sccd_md.as_ref())
    }
}

// ── Characteristic attribute ──────────────────────────────────

/// ```text
/// uuid_presence[3] attr_md_presence[3] len:2 offset:2 maxlen:2
/// data_presence[len bytes]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttrChar<'a> {
    pub uuid: Option<Uuid>,
    pub md: Option<AttrMd>,
    pub init_len: u16,
    pub init_offs: u16,
    pub max_len: u16,
    pub value: Option<&'a [u8]>,
}

impl<'a> WireField<'a> for AttrChar<'a> {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        let uuid = cur.optional()?;
        let md = cur.optional()?;
        let init_len = cur.u16()?;
        let init_offs = cur.u16()?;
        let max_len = cur.u16()?;
        let value = cur.optional_bytes(init_len as usize)?;
        Ok(Self {
            uuid,
            md,
            init_len,
            init_offs,
            max_len,
            value,
        })
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.optional(self.uuid.as_ref())?;
        w.optional(self.md.as_ref())?;
        w.u16(self.value.map_or(self.init_len, |v| v.len() as u16))?;
        w.u16(self.init_offs)?;
        w.u16(self.max_len)?;
        w.optional_bytes(self.value)
    }
}

/// Handles assigned by the stack to a new characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharHandles {
    pub value_handle: u16,
    pub user_desc_handle: u16,
    pub cccd_handle: u16,
    pub sccd_handle: u16,
}

impl<'a> WireField<'a> for CharHandles {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        cur.ensure(8)?;
        Ok(Self {
            value_handle: cur.u16()?,
            user_desc_handle: cur.u16()?,
            cccd_handle: cur.u16()?,
            sccd_handle: cur.u16()?,
        })
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u16(self.value_handle)?;
        w.u16(self.user_desc_handle)?;
        w.u16(self.cccd_handle)?;
        w.u16(self.sccd_handle)
    }
}

// ── Attribute values ──────────────────────────────────────────

/// Value written by the host: `len:2 offset:2 data_presence[len bytes]`.
///
/// After the native call `len` holds the number of bytes the stack stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GattsValue<'a> {
    pub len: u16,
    pub offset: u16,
    pub data: Option<&'a [u8]>,
}

impl<'a> WireField<'a> for GattsValue<'a> {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        let len = cur.u16()?;
        let offset = cur.u16()?;
        let data = cur.optional_bytes(len as usize)?;
        Ok(Self { len, offset, data })
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u16(self.data.map_or(self.len, |d| d.len() as u16))?;
        w.u16(self.offset)?;
        w.optional_bytes(self.data)
    }
}

/// Read request from the host: `len:2 offset:2 data_presence`.
///
/// `len` is the capacity the host declares for the returned bytes;
/// `want_data` says whether it wants the bytes at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValueRequest {
    pub len: u16,
    pub offset: u16,
    pub want_data: bool,
}

impl<'a> WireField<'a> for ValueRequest {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        Ok(Self {
            len: cur.u16()?,
            offset: cur.u16()?,
            want_data: cur.presence()?,
        })
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u16(self.len)?;
        w.u16(self.offset)?;
        w.presence(self.want_data)
    }
}

/// Out-parameter of a value read, backed by local scratch.
///
/// The stack sets `len` to the full attribute length and copies at most
/// `data.len()` bytes.
#[derive(Debug, PartialEq, Eq)]
pub struct GattsValueOut<'s> {
    pub len: u16,
    pub offset: u16,
    pub data: Option<&'s mut [u8]>,
}

// ── Handle value notification ─────────────────────────────────

/// ```text
/// handle:2 type:1 offset:2 len_presence[len:2] data_presence[len bytes]
/// ```
///
/// The data presence flag is always on the wire. With the length absent
/// the data, if present, is empty.
///
/// After the native call `len` holds the number of bytes actually sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HvxParams<'a> {
    pub handle: u16,
    pub hvx_type: u8,
    pub offset: u16,
    pub len: Option<u16>,
    pub data: Option<&'a [u8]>,
}

impl<'a> WireField<'a> for HvxParams<'a> {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        let handle = cur.u16()?;
        let hvx_type = cur.u8()?;
        let offset = cur.u16()?;
        let len = cur.optional_with(FieldCursor::u16)?;
        let data = cur.optional_bytes(usize::from(len.unwrap_or(0)))?;
        Ok(Self {
            handle,
            hvx_type,
            offset,
            len,
            data,
        })
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u16(self.handle)?;
        w.u8(self.hvx_type)?;
        w.u16(self.offset)?;
        let len = self.len.map(|l| self.data.map_or(l, |d| d.len() as u16));
        w.presence(len.is_some())?;
        if let Some(len) = len {
            w.u16(len)?;
        }
        let data = match len {
            Some(_) => self.data,
            None => self.data.map(|_| &[][..]),
        };
        w.optional_bytes(data)
    }
}
