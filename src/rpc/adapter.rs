//! Native API adapter: runs a decoded [`Command`] against the stack.
//!
//! Absent parameters become `None` (null) arguments. Out-parameters are
//! backed by locals or by the [`Scratch`] buffers, and only what the stack
//! reports, capped at the buffer it was given, is copied into the
//! [`Reply`].

use crate::app::ports::BleStack;
use crate::ble::gap::ConnParams;
use crate::ble::gatts::{CharHandles, GattsValueOut};
use crate::config::{MAX_NAME_SCRATCH, MAX_VALUE_SCRATCH};
use crate::error::status;
use crate::rpc::command::Command;
use crate::rpc::response::Reply;

/// Fixed local buffers the stack writes variable-length results into.
pub struct Scratch {
    name: [u8; MAX_NAME_SCRATCH],
    value: [u8; MAX_VALUE_SCRATCH],
}

impl Scratch {
    pub const fn new() -> Self {
        Self {
            name: [0; MAX_NAME_SCRATCH],
            value: [0; MAX_VALUE_SCRATCH],
        }
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Scratch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scratch").finish_non_exhaustive()
    }
}

/// Call the stack function for `cmd`.
///
/// Returns the native status verbatim and, on success, the out-values to
/// serialize. On failure the reply is always [`Reply::None`].
pub fn invoke<'s, S: BleStack + ?Sized>(
    cmd: &Command<'_>,
    stack: &mut S,
    scratch: &'s mut Scratch,
) -> (u32, Reply<'s>) {
    let (code, reply) = match cmd {
        Command::GapAdvDataSet { data, sr_data } => {
            (stack.gap_adv_data_set(*data, *sr_data), Reply::None)
        }
        Command::GapAdvStart(params) => (stack.gap_adv_start(params), Reply::None),
        Command::GapAdvStop => (stack.gap_adv_stop(), Reply::None),
        Command::GapDisconnect {
            conn_handle,
            hci_status,
        } => (stack.gap_disconnect(*conn_handle, *hci_status), Reply::None),
        Command::GapTxPowerSet { tx_power } => (stack.gap_tx_power_set(*tx_power), Reply::None),
        Command::GapAppearanceSet { appearance } => {
            (stack.gap_appearance_set(*appearance), Reply::None)
        }
        Command::GapAppearanceGet { want_value } => {
            let mut value = 0u16;
            let code = stack.gap_appearance_get(want_value.then_some(&mut value));
            let reply = if *want_value {
                Reply::Appearance(value)
            } else {
                Reply::None
            };
            (code, reply)
        }
        Command::GapPpcpSet { params } => (stack.gap_ppcp_set(params.as_ref()), Reply::None),
        Command::GapPpcpGet { want_params } => {
            let mut params = ConnParams::default();
            let code = stack.gap_ppcp_get(want_params.then_some(&mut params));
            let reply = if *want_params {
                Reply::Ppcp(params)
            } else {
                Reply::None
            };
            (code, reply)
        }
        Command::GapDeviceNameSet {
            write_perm,
            len,
            name,
        } => (
            stack.gap_device_name_set(write_perm.as_ref(), *name, *len),
            Reply::None,
        ),
        Command::GapDeviceNameGet { len, want_name } => {
            let capacity = usize::from(len.unwrap_or(0)).min(MAX_NAME_SCRATCH);
            let mut reported = len.unwrap_or(0);
            let code = stack.gap_device_name_get(
                want_name.then_some(&mut scratch.name[..capacity]),
                len.is_some().then_some(&mut reported),
            );
            let copied = usize::from(reported).min(capacity);
            let name = if *want_name {
                Some(&scratch.name[..copied])
            } else {
                None
            };
            let reply = Reply::DeviceName {
                len: len.map(|_| reported),
                name,
            };
            (code, reply)
        }
        Command::GattsServiceAdd {
            service_type,
            uuid,
            want_handle,
        } => {
            let mut handle = 0u16;
            let code = stack.gatts_service_add(
                *service_type,
                uuid.as_ref(),
                want_handle.then_some(&mut handle),
            );
            let reply = if *want_handle {
                Reply::ServiceHandle(handle)
            } else {
                Reply::None
            };
            (code, reply)
        }
        Command::GattsCharacteristicAdd {
            service_handle,
            md,
            attr,
            want_handles,
        } => {
            let mut handles = CharHandles::default();
            let code = stack.gatts_characteristic_add(
                *service_handle,
                md.as_ref(),
                attr.as_ref(),
                want_handles.then_some(&mut handles),
            );
            let reply = if *want_handles {
                Reply::CharHandles(handles)
            } else {
                Reply::None
            };
            (code, reply)
        }
        Command::GattsValueSet {
            conn_handle,
            handle,
            value,
        } => {
            let mut value = *value;
            let code = stack.gatts_value_set(*conn_handle, *handle, value.as_mut());
            (code, value.map_or(Reply::None, |v| Reply::ValueLen(v.len)))
        }
        Command::GattsValueGet {
            conn_handle,
            handle,
            value: Some(req),
        } => {
            let capacity = usize::from(req.len).min(MAX_VALUE_SCRATCH);
            let mut out = GattsValueOut {
                len: req.len,
                offset: req.offset,
                data: req.want_data.then_some(&mut scratch.value[..capacity]),
            };
            let code = stack.gatts_value_get(*conn_handle, *handle, Some(&mut out));
            let reported = out.len;
            let copied = usize::from(reported).min(capacity);
            let data = if req.want_data {
                Some(&scratch.value[..copied])
            } else {
                None
            };
            let reply = Reply::Value {
                len: reported,
                offset: req.offset,
                data,
            };
            (code, reply)
        }
        Command::GattsValueGet {
            conn_handle,
            handle,
            value: None,
        } => (
            stack.gatts_value_get(*conn_handle, *handle, None),
            Reply::None,
        ),
        Command::GattsHvx {
            conn_handle,
            params,
        } => {
            let mut params = *params;
            let code = stack.gatts_hvx(*conn_handle, params.as_mut());
            (code, Reply::HvxLen(params.and_then(|p| p.len)))
        }
    };

    if code == status::SUCCESS {
        (code, reply)
    } else {
        (code, Reply::None)
    }
}
