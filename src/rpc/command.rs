//! Decoded calls.
//!
//! A [`Command`] is one variant per operation, carrying exactly the
//! parameters its native function takes. `None` fields are null
//! references on the native side, not zeroed values.
//!
//! Decoding is pure: [`decode_command`] needs only the packet bytes and
//! the link limits, so every routine can be tested without a transport or
//! a stack. The same variants encode back into command packets for the
//! host side.

use crate::ble::SecurityMode;
use crate::ble::gap::{AdvParams, ConnParams};
use crate::ble::gatts::{AttrChar, CharMd, GattsValue, HvxParams, Uuid, ValueRequest};
use crate::config::LinkConfig;
use crate::error::{DecodeError, EncodeError};
use crate::rpc::codec::packet_type;
use crate::rpc::cursor::{FieldCursor, FieldWriter};
use crate::rpc::ops::{self, OpCode};
use crate::rpc::{gap, gatts};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    GapAdvDataSet {
        data: Option<&'a [u8]>,
        sr_data: Option<&'a [u8]>,
    },
    GapAdvStart(AdvParams),
    GapAdvStop,
    GapDisconnect {
        conn_handle: u16,
        hci_status: u8,
    },
    GapTxPowerSet {
        tx_power: i8,
    },
    GapAppearanceSet {
        appearance: u16,
    },
    GapAppearanceGet {
        want_value: bool,
    },
    GapPpcpSet {
        params: Option<ConnParams>,
    },
    GapPpcpGet {
        want_params: bool,
    },
    GapDeviceNameSet {
        write_perm: Option<SecurityMode>,
        len: u16,
        name: Option<&'a [u8]>,
    },
    GapDeviceNameGet {
        /// Declared output capacity; `None` is a null length pointer.
        len: Option<u16>,
        want_name: bool,
    },
    GattsServiceAdd {
        service_type: u8,
        uuid: Option<Uuid>,
        want_handle: bool,
    },
    GattsCharacteristicAdd {
        service_handle: u16,
        md: Option<CharMd<'a>>,
        attr: Option<AttrChar<'a>>,
        want_handles: bool,
    },
    GattsValueSet {
        conn_handle: u16,
        handle: u16,
        value: Option<GattsValue<'a>>,
    },
    GattsValueGet {
        conn_handle: u16,
        handle: u16,
        value: Option<ValueRequest>,
    },
    GattsHvx {
        conn_handle: u16,
        params: Option<HvxParams<'a>>,
    },
}

impl Command<'_> {
    pub fn op(&self) -> OpCode {
        match self {
            Self::GapAdvDataSet { .. } => OpCode::GapAdvDataSet,
            Self::GapAdvStart(_) => OpCode::GapAdvStart,
            Self::GapAdvStop => OpCode::GapAdvStop,
            Self::GapDisconnect { .. } => OpCode::GapDisconnect,
            Self::GapTxPowerSet { .. } => OpCode::GapTxPowerSet,
            Self::GapAppearanceSet { .. } => OpCode::GapAppearanceSet,
            Self::GapAppearanceGet { .. } => OpCode::GapAppearanceGet,
            Self::GapPpcpSet { .. } => OpCode::GapPpcpSet,
            Self::GapPpcpGet { .. } => OpCode::GapPpcpGet,
            Self::GapDeviceNameSet { .. } => OpCode::GapDeviceNameSet,
            Self::GapDeviceNameGet { .. } => OpCode::GapDeviceNameGet,
            Self::GattsServiceAdd { .. } => OpCode::GattsServiceAdd,
            Self::GattsCharacteristicAdd { .. } => OpCode::GattsCharacteristicAdd,
            Self::GattsValueSet { .. } => OpCode::GattsValueSet,
            Self::GattsValueGet { .. } => OpCode::GattsValueGet,
            Self::GattsHvx { .. } => OpCode::GattsHvx,
        }
    }

    /// Encode a full command packet: `CMD op_code payload`.
    pub fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u8(packet_type::CMD)?;
        w.u8(self.op() as u8)?;
        self.encode_payload(w)
    }

    /// Encode only the parameters following the op code.
    pub fn encode_payload(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        match self {
            Self::GapAdvDataSet { data, sr_data } => gap::encode_adv_data_set(w, *data, *sr_data),
            Self::GapAdvStart(params) => params.encode(w),
            Self::GapAdvStop => Ok(()),
            Self::GapDisconnect {
                conn_handle,
                hci_status,
            } => {
                w.u16(*conn_handle)?;
                w.u8(*hci_status)
            }
            Self::GapTxPowerSet { tx_power } => w.i8(*tx_power),
            Self::GapAppearanceSet { appearance } => w.u16(*appearance),
            Self::GapAppearanceGet { want_value } => w.presence(*want_value),
            Self::GapPpcpSet { params } => w.optional(params.as_ref()),
            Self::GapPpcpGet { want_params } => w.presence(*want_params),
            Self::GapDeviceNameSet {
                write_perm,
                len,
                name,
            } => gap::encode_device_name_set(w, write_perm.as_ref(), *len, *name),
            Self::GapDeviceNameGet { len, want_name } => {
                gap::encode_device_name_get(w, *len, *want_name)
            }
            Self::GattsServiceAdd {
                service_type,
                uuid,
                want_handle,
            } => {
                w.u8(*service_type)?;
                w.optional(uuid.as_ref())?;
                w.presence(*want_handle)
            }
            Self::GattsCharacteristicAdd {
                service_handle,
                md,
                attr,
                want_handles,
            } => gatts::encode_characteristic_add(
                w,
                *service_handle,
                md.as_ref(),
                attr.as_ref(),
                *want_handles,
            ),
            Self::GattsValueSet {
                conn_handle,
                handle,
                value,
            } => {
                w.u16(*conn_handle)?;
                w.u16(*handle)?;
                w.optional(value.as_ref())
            }
            Self::GattsValueGet {
                conn_handle,
                handle,
                value,
            } => {
                w.u16(*conn_handle)?;
                w.u16(*handle)?;
                w.optional(value.as_ref())
            }
            Self::GattsHvx {
                conn_handle,
                params,
            } => {
                w.u16(*conn_handle)?;
                w.optional(params.as_ref())
            }
        }
    }
}

/// Outcome of looking up and decoding a command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<'a> {
    Call(Command<'a>),
    Rejected(OpCode, DecodeError),
    Unsupported(u8),
}

/// Decode the payload that followed `op_code`.
///
/// The payload must be consumed exactly; leftovers are a length error.
pub fn decode_command<'a>(op_code: u8, payload: &'a [u8], config: &LinkConfig) -> Decoded<'a> {
    let Some(entry) = ops::lookup(op_code) else {
        return Decoded::Unsupported(op_code);
    };

    let mut cur = FieldCursor::new(payload);
    let result = (entry.decode)(&mut cur, config).and_then(|cmd| {
        cur.finish()?;
        Ok(cmd)
    });

    match result {
        Ok(cmd) => Decoded::Call(cmd),
        Err(e) => Decoded::Rejected(entry.op, e),
    }
}
