//! Op table: op code → decode routine and parameter shape.
//!
//! Lookup is a single index into a 256-entry table built at compile time.
//! The numbering is the controller stack's supervisor-call numbering for
//! the GAP and GATT-server families.

use crate::config::LinkConfig;
use crate::error::DecodeError;
use crate::rpc::command::Command;
use crate::rpc::cursor::FieldCursor;
use crate::rpc::{gap, gatts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    // ── GAP ───────────────────────────────────────────────
    GapAdvDataSet = 0x7E,
    GapAdvStart = 0x7F,
    GapAdvStop = 0x80,
    GapDisconnect = 0x82,
    GapTxPowerSet = 0x83,
    GapAppearanceSet = 0x84,
    GapAppearanceGet = 0x85,
    GapPpcpSet = 0x86,
    GapPpcpGet = 0x87,
    GapDeviceNameSet = 0x88,
    GapDeviceNameGet = 0x89,

    // ── GATTS ─────────────────────────────────────────────
    GattsServiceAdd = 0xA8,
    GattsCharacteristicAdd = 0xAA,
    GattsValueSet = 0xAC,
    GattsValueGet = 0xAD,
    GattsHvx = 0xAE,
}

impl OpCode {
    pub fn from_u8(op: u8) -> Option<Self> {
        lookup(op).map(|entry| entry.op)
    }

    pub fn entry(self) -> &'static OpEntry {
        &OPS[INDEX[self as usize] as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }
}

/// How a call's parameters are laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamShape {
    /// No parameters.
    Empty,
    /// Fixed scalars, no presence flags.
    Fixed,
    /// Presence-gated struct or blob.
    Optional,
    /// Declares an output capacity checked against local scratch.
    OutputCapacity,
    /// Counted list of fixed-size records.
    CompositeList,
    /// Several independently optional nested structures.
    NestedMetadata,
}

/// Decode routine: reconstructs the call from the payload after the op
/// code. Must not look past the cursor's buffer.
pub type DecodeFn =
    for<'a> fn(&mut FieldCursor<'a>, &LinkConfig) -> Result<Command<'a>, DecodeError>;

pub struct OpEntry {
    pub op: OpCode,
    pub name: &'static str,
    pub shape: ParamShape,
    pub decode: DecodeFn,
}

impl core::fmt::Debug for OpEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpEntry")
            .field("op", &self.op)
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

const fn entry(op: OpCode, name: &'static str, shape: ParamShape, decode: DecodeFn) -> OpEntry {
    OpEntry {
        op,
        name,
        shape,
        decode,
    }
}

const TABLE: [OpEntry; 16] = [
    entry(OpCode::GapAdvDataSet, "gap_adv_data_set", ParamShape::Optional, gap::decode_adv_data_set),
    entry(OpCode::GapAdvStart, "gap_adv_start", ParamShape::CompositeList, gap::decode_adv_start),
    entry(OpCode::GapAdvStop, "gap_adv_stop", ParamShape::Empty, gap::decode_adv_stop),
    entry(OpCode::GapDisconnect, "gap_disconnect", ParamShape::Fixed, gap::decode_disconnect),
    entry(OpCode::GapTxPowerSet, "gap_tx_power_set", ParamShape::Fixed, gap::decode_tx_power_set),
    entry(OpCode::GapAppearanceSet, "gap_appearance_set", ParamShape::Fixed, gap::decode_appearance_set),
    entry(OpCode::GapAppearanceGet, "gap_appearance_get", ParamShape::Optional, gap::decode_appearance_get),
    entry(OpCode::GapPpcpSet, "gap_ppcp_set", ParamShape::Optional, gap::decode_ppcp_set),
    entry(OpCode::GapPpcpGet, "gap_ppcp_get", ParamShape::Optional, gap::decode_ppcp_get),
    entry(OpCode::GapDeviceNameSet, "gap_device_name_set", ParamShape::Optional, gap::decode_device_name_set),
    entry(OpCode::GapDeviceNameGet, "gap_device_name_get", ParamShape::OutputCapacity, gap::decode_device_name_get),
    entry(OpCode::GattsServiceAdd, "gatts_service_add", ParamShape::Optional, gatts::decode_service_add),
    entry(
        OpCode::GattsCharacteristicAdd,
        "gatts_characteristic_add",
        ParamShape::NestedMetadata,
        gatts::decode_characteristic_add,
    ),
    entry(OpCode::GattsValueSet, "gatts_value_set", ParamShape::Optional, gatts::decode_value_set),
    entry(OpCode::GattsValueGet, "gatts_value_get", ParamShape::OutputCapacity, gatts::decode_value_get),
    entry(OpCode::GattsHvx, "gatts_hvx", ParamShape::Optional, gatts::decode_hvx),
];

/// Every supported operation.
pub static OPS: [OpEntry; TABLE.len()] = TABLE;

const NO_ENTRY: u8 = u8::MAX;

const fn build_index() -> [u8; 256] {
    let mut index = [NO_ENTRY; 256];
    let mut i = 0;
    while i < TABLE.len() {
        index[TABLE[i].op as usize] = i as u8;
        i += 1;
    }
    index
}

static INDEX: [u8; 256] = build_index();

/// Find the table entry for an op code.
pub fn lookup(op: u8) -> Option<&'static OpEntry> {
    match INDEX[op as usize] {
        NO_ENTRY => None,
        i => Some(&OPS[i as usize]),
    }
}
