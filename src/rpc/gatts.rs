//! GATT server decode routines.
//!
//! | Op                 | Payload                                                       |
//! |--------------------|---------------------------------------------------------------|
//! | service add        | `type:1 presence[uuid] handle_out_presence`                   |
//! | characteristic add | `service:2 presence[char_md] presence[attr] handles_presence` |
//! | value set          | `conn:2 handle:2 presence[len:2 offset:2 presence[data]]`     |
//! | value get          | `conn:2 handle:2 presence[len:2 offset:2 data_out_presence]`  |
//! | hvx                | `conn:2 presence[handle:2 type:1 offset:2 presence[len:2] presence[data]]` |

use crate::ble::gatts::{AttrChar, CharMd, ValueRequest};
use crate::config::LinkConfig;
use crate::error::{DecodeError, EncodeError};
use crate::rpc::command::Command;
use crate::rpc::cursor::{FieldCursor, FieldWriter};

pub(crate) fn decode_service_add<'a>(
    cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    Ok(Command::GattsServiceAdd {
        service_type: cur.u8()?,
        uuid: cur.optional()?,
        want_handle: cur.presence()?,
    })
}

pub(crate) fn decode_characteristic_add<'a>(
    cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    Ok(Command::GattsCharacteristicAdd {
        service_handle: cur.u16()?,
        md: cur.optional::<CharMd<'a>>()?,
        attr: cur.optional::<AttrChar<'a>>()?,
        want_handles: cur.presence()?,
    })
}

pub(crate) fn decode_value_set<'a>(
    cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    Ok(Command::GattsValueSet {
        conn_handle: cur.u16()?,
        handle: cur.u16()?,
        value: cur.optional()?,
    })
}

/// Like the device name read, the declared length is bounded by the local
/// value scratch.
pub(crate) fn decode_value_get<'a>(
    cur: &mut FieldCursor<'a>,
    config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    let conn_handle = cur.u16()?;
    let handle = cur.u16()?;
    let value = cur.optional::<ValueRequest>()?;

    let capacity = config.value_capacity as usize;
    if let Some(req) = value.filter(|r| r.len as usize > capacity) {
        return Err(DecodeError::CapacityExceeded {
            requested: req.len as usize,
            capacity,
        });
    }

    Ok(Command::GattsValueGet {
        conn_handle,
        handle,
        value,
    })
}

pub(crate) fn decode_hvx<'a>(
    cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    Ok(Command::GattsHvx {
        conn_handle: cur.u16()?,
        params: cur.optional()?,
    })
}

pub(crate) fn encode_characteristic_add(
    w: &mut FieldWriter<'_>,
    service_handle: u16,
    md: Option<&CharMd<'_>>,
    attr: Option<&AttrChar<'_>>,
    want_handles: bool,
) -> Result<(), EncodeError> {
    w.u16(service_handle)?;
    w.optional(md)?;
    w.optional(attr)?;
    w.presence(want_handles)
}
