//! Port traits: the boundary between the serialization layer and the
//! BLE stack it wraps.
//!
//! ```text
//!   RpcEngine ──▶ adapter ──▶ BleStack (port) ──▶ stack / mock
//! ```
//!
//! The engine only ever sees the stack through [`BleStack`]. On target
//! the implementation forwards to the stack's supervisor calls; in tests
//! a recording mock stands in.
//!
//! ## Conventions
//!
//! - Every method returns the stack's native `u32` status code
//!   ([`status::SUCCESS`](crate::error::status::SUCCESS) on success).
//! - `Option<&T>` / `Option<&mut T>` arguments are nullable pointers: the
//!   host said "absent" and the stack sees null, never a zeroed default.
//! - Out-parameters are written only on success.

use crate::ble::SecurityMode;
use crate::ble::gap::{AdvParams, ConnParams};
use crate::ble::gatts::{AttrChar, CharHandles, CharMd, GattsValue, GattsValueOut, HvxParams, Uuid};

// ───────────────────────────────────────────────────────────────
// GAP
// ───────────────────────────────────────────────────────────────

pub trait GapPort {
    /// Set advertising and scan response data.
    fn gap_adv_data_set(&mut self, data: Option<&[u8]>, sr_data: Option<&[u8]>) -> u32;

    fn gap_adv_start(&mut self, params: &AdvParams) -> u32;

    fn gap_adv_stop(&mut self) -> u32;

    fn gap_disconnect(&mut self, conn_handle: u16, hci_status: u8) -> u32;

    /// Radio transmit power in dBm.
    fn gap_tx_power_set(&mut self, tx_power: i8) -> u32;

    fn gap_appearance_set(&mut self, appearance: u16) -> u32;

    fn gap_appearance_get(&mut self, appearance: Option<&mut u16>) -> u32;

    /// Peripheral preferred connection parameters.
    fn gap_ppcp_set(&mut self, params: Option<&ConnParams>) -> u32;

    fn gap_ppcp_get(&mut self, params: Option<&mut ConnParams>) -> u32;

    /// `len` is passed through as declared, even with `name` absent.
    fn gap_device_name_set(
        &mut self,
        write_perm: Option<&SecurityMode>,
        name: Option<&[u8]>,
        len: u16,
    ) -> u32;

    /// `len` is in/out: capacity of `name` on entry, full name length on
    /// return. At most `name.len()` bytes are copied.
    fn gap_device_name_get(&mut self, name: Option<&mut [u8]>, len: Option<&mut u16>) -> u32;
}

// ───────────────────────────────────────────────────────────────
// GATT server
// ───────────────────────────────────────────────────────────────

pub trait GattsPort {
    fn gatts_service_add(
        &mut self,
        service_type: u8,
        uuid: Option<&Uuid>,
        handle: Option<&mut u16>,
    ) -> u32;

    fn gatts_characteristic_add(
        &mut self,
        service_handle: u16,
        md: Option<&CharMd<'_>>,
        attr: Option<&AttrChar<'_>>,
        handles: Option<&mut CharHandles>,
    ) -> u32;

    /// On return `value.len` holds the number of bytes stored.
    fn gatts_value_set(
        &mut self,
        conn_handle: u16,
        handle: u16,
        value: Option<&mut GattsValue<'_>>,
    ) -> u32;

    /// On return `value.len` holds the full attribute length; at most the
    /// buffer's length is copied.
    fn gatts_value_get(
        &mut self,
        conn_handle: u16,
        handle: u16,
        value: Option<&mut GattsValueOut<'_>>,
    ) -> u32;

    /// On return `params.len` holds the number of bytes sent.
    fn gatts_hvx(&mut self, conn_handle: u16, params: Option<&mut HvxParams<'_>>) -> u32;
}

/// The full stack surface the engine drives.
pub trait BleStack: GapPort + GattsPort {}

impl<T: GapPort + GattsPort> BleStack for T {}
