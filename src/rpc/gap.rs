//! GAP decode routines.
//!
//! | Op                 | Payload                                                |
//! |--------------------|--------------------------------------------------------|
//! | adv data set       | `len:1 presence[bytes] sr_len:1 presence[bytes]`       |
//! | adv start          | see [`AdvParams`]                                      |
//! | adv stop           | (empty)                                                |
//! | disconnect         | `conn_handle:2 hci_status:1`                           |
//! | tx power set       | `tx_power:1`                                           |
//! | appearance set     | `value:2`                                              |
//! | appearance get     | `out_presence`                                         |
//! | ppcp set           | `presence[min:2 max:2 latency:2 timeout:2]`            |
//! | ppcp get           | `out_presence`                                         |
//! | device name set    | `presence[perm:1] len:2 presence[name bytes]`          |
//! | device name get    | `presence[capacity:2] buf_presence`                    |

use crate::ble::SecurityMode;
use crate::ble::gap::AdvParams;
use crate::config::LinkConfig;
use crate::error::{DecodeError, EncodeError};
use crate::rpc::command::Command;
use crate::rpc::cursor::{FieldCursor, FieldWriter};

pub(crate) fn decode_adv_data_set<'a>(
    cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    let len = cur.u8()?;
    let data = cur.optional_bytes(len as usize)?;
    let sr_len = cur.u8()?;
    let sr_data = cur.optional_bytes(sr_len as usize)?;
    Ok(Command::GapAdvDataSet { data, sr_data })
}

pub(crate) fn decode_adv_start<'a>(
    cur: &mut FieldCursor<'a>,
    config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    AdvParams::decode(cur, config).map(Command::GapAdvStart)
}

pub(crate) fn decode_adv_stop<'a>(
    _cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    Ok(Command::GapAdvStop)
}

pub(crate) fn decode_disconnect<'a>(
    cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    Ok(Command::GapDisconnect {
        conn_handle: cur.u16()?,
        hci_status: cur.u8()?,
    })
}

pub(crate) fn decode_tx_power_set<'a>(
    cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    Ok(Command::GapTxPowerSet {
        tx_power: cur.i8()?,
    })
}

pub(crate) fn decode_appearance_set<'a>(
    cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    Ok(Command::GapAppearanceSet {
        appearance: cur.u16()?,
    })
}

pub(crate) fn decode_appearance_get<'a>(
    cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    Ok(Command::GapAppearanceGet {
        want_value: cur.presence()?,
    })
}

pub(crate) fn decode_ppcp_set<'a>(
    cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    Ok(Command::GapPpcpSet {
        params: cur.optional()?,
    })
}

pub(crate) fn decode_ppcp_get<'a>(
    cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    Ok(Command::GapPpcpGet {
        want_params: cur.presence()?,
    })
}

pub(crate) fn decode_device_name_set<'a>(
    cur: &mut FieldCursor<'a>,
    _config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    let write_perm = cur.optional::<SecurityMode>()?;
    let (len, name) = cur.len_prefixed()?;
    Ok(Command::GapDeviceNameSet {
        write_perm,
        len,
        name,
    })
}

/// The declared capacity is checked against the local name scratch, so a
/// host cannot make the stack write past it whatever it claims.
pub(crate) fn decode_device_name_get<'a>(
    cur: &mut FieldCursor<'a>,
    config: &LinkConfig,
) -> Result<Command<'a>, DecodeError> {
    let len = cur.optional_with(FieldCursor::u16)?;
    let want_name = cur.presence()?;

    let capacity = config.device_name_capacity as usize;
    if let Some(requested) = len.map(usize::from).filter(|&r| r > capacity) {
        return Err(DecodeError::CapacityExceeded {
            requested,
            capacity,
        });
    }

    Ok(Command::GapDeviceNameGet { len, want_name })
}

// ── Host-side payload encoders ────────────────────────────────

pub(crate) fn encode_adv_data_set(
    w: &mut FieldWriter<'_>,
    data: Option<&[u8]>,
    sr_data: Option<&[u8]>,
) -> Result<(), EncodeError> {
    w.u8(data.map_or(0, |d| d.len() as u8))?;
    w.optional_bytes(data)?;
    w.u8(sr_data.map_or(0, |d| d.len() as u8))?;
    w.optional_bytes(sr_data)
}

pub(crate) fn encode_device_name_set(
    w: &mut FieldWriter<'_>,
    write_perm: Option<&SecurityMode>,
    len: u16,
    name: Option<&[u8]>,
) -> Result<(), EncodeError> {
    w.optional(write_perm)?;
    w.len_prefixed(len, name)
}

pub(crate) fn encode_device_name_get(
    w: &mut FieldWriter<'_>,
    len: Option<u16>,
    want_name: bool,
) -> Result<(), EncodeError> {
    w.presence(len.is_some())?;
    if let Some(len) = len {
        w.u16(len)?;
    }
    w.presence(want_name)
}
