//! Event encoding: controller → host notifications.
//!
//! ```text
//! Event := EVT  evt_id:2  conn_handle:2  payload
//! ```
//!
//! | Event                | Payload                                                   |
//! |----------------------|-----------------------------------------------------------|
//! | tx complete          | `count:1`                                                 |
//! | gap connected        | `peer:7 role:1 presence[irk_idx:1] params:8`              |
//! | gap disconnected     | `reason:1`                                                |
//! | conn param update    | `params:8`                                                |
//! | gap timeout          | `src:1`                                                   |
//! | gatts write          | `handle:2 op:1 auth_required:1 uuid:3 offset:2 len:2 data` |
//! | sys attr missing     | `hint:1`                                                  |
//! | hvc                  | `handle:2`                                                |
//!
//! Events are owned values so they can sit in the deferred queue after
//! the stack's event buffer has been reused.

use heapless::Vec;

use crate::ble::gap::{ConnParams, GapAddr};
use crate::ble::gatts::Uuid;
use crate::config::MAX_EVENT_DATA;
use crate::error::{DecodeError, EncodeError, EventDecodeError};
use crate::rpc::codec::packet_type;
use crate::rpc::cursor::{FieldCursor, FieldWriter, WireField};

pub mod evt_id {
    pub const TX_COMPLETE: u16 = 0x01;
    pub const GAP_CONNECTED: u16 = 0x10;
    pub const GAP_DISCONNECTED: u16 = 0x11;
    pub const GAP_CONN_PARAM_UPDATE: u16 = 0x12;
    pub const GAP_TIMEOUT: u16 = 0x19;
    pub const GATTS_WRITE: u16 = 0x50;
    pub const GATTS_SYS_ATTR_MISSING: u16 = 0x52;
    pub const GATTS_HVC: u16 = 0x53;
}

/// Event body, one variant per event id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BleEvent {
    TxComplete {
        count: u8,
    },
    GapConnected {
        peer: GapAddr,
        role: u8,
        /// Index of the whitelist IRK that resolved the peer, if any.
        irk_match: Option<u8>,
        params: ConnParams,
    },
    GapDisconnected {
        reason: u8,
    },
    GapConnParamUpdate {
        params: ConnParams,
    },
    GapTimeout {
        src: u8,
    },
    GattsWrite {
        handle: u16,
        op: u8,
        auth_required: bool,
        uuid: Uuid,
        offset: u16,
        data: Vec<u8, MAX_EVENT_DATA>,
    },
    GattsSysAttrMissing {
        hint: u8,
    },
    GattsHvc {
        handle: u16,
    },
}

impl BleEvent {
    pub fn id(&self) -> u16 {
        match self {
            Self::TxComplete { .. } => evt_id::TX_COMPLETE,
            Self::GapConnected { .. } => evt_id::GAP_CONNECTED,
            Self::GapDisconnected { .. } => evt_id::GAP_DISCONNECTED,
            Self::GapConnParamUpdate { .. } => evt_id::GAP_CONN_PARAM_UPDATE,
            Self::GapTimeout { .. } => evt_id::GAP_TIMEOUT,
            Self::GattsWrite { .. } => evt_id::GATTS_WRITE,
            Self::GattsSysAttrMissing { .. } => evt_id::GATTS_SYS_ATTR_MISSING,
            Self::GattsHvc { .. } => evt_id::GATTS_HVC,
        }
    }

    fn encode_payload(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        match self {
            Self::TxComplete { count } => w.u8(*count),
            Self::GapConnected {
                peer,
                role,
                irk_match,
                params,
            } => {
                peer.encode(w)?;
                w.u8(*role)?;
                w.presence(irk_match.is_some())?;
                if let Some(idx) = irk_match {
                    w.u8(*idx)?;
                }
                params.encode(w)
            }
            Self::GapDisconnected { reason } => w.u8(*reason),
            Self::GapConnParamUpdate { params } => params.encode(w),
            Self::GapTimeout { src } => w.u8(*src),
            Self::GattsWrite {
                handle,
                op,
                auth_required,
                uuid,
                offset,
                data,
            } => {
                w.u16(*handle)?;
                w.u8(*op)?;
                w.presence(*auth_required)?;
                uuid.encode(w)?;
                w.u16(*offset)?;
                w.u16(data.len() as u16)?;
                w.bytes(data)
            }
            Self::GattsSysAttrMissing { hint } => w.u8(*hint),
            Self::GattsHvc { handle } => w.u16(*handle),
        }
    }

    fn decode_payload(id: u16, cur: &mut FieldCursor<'_>) -> Result<Self, EventDecodeError> {
        let event = match id {
            evt_id::TX_COMPLETE => Self::TxComplete { count: cur.u8()? },
            evt_id::GAP_CONNECTED => Self::GapConnected {
                peer: GapAddr::decode(cur)?,
                role: cur.u8()?,
                irk_match: cur.optional_with(FieldCursor::u8)?,
                params: ConnParams::decode(cur)?,
            },
            evt_id::GAP_DISCONNECTED => Self::GapDisconnected { reason: cur.u8()? },
            evt_id::GAP_CONN_PARAM_UPDATE => Self::GapConnParamUpdate {
                params: ConnParams::decode(cur)?,
            },
            evt_id::GAP_TIMEOUT => Self::GapTimeout { src: cur.u8()? },
            evt_id::GATTS_WRITE => {
                let handle = cur.u16()?;
                let op = cur.u8()?;
                let auth_required = cur.presence()?;
                let uuid = Uuid::decode(cur)?;
                let offset = cur.u16()?;
                let len = usize::from(cur.u16()?);
                let data = Vec::from_slice(cur.bytes(len)?).map_err(|()| {
                    DecodeError::CapacityExceeded {
                        requested: len,
                        capacity: MAX_EVENT_DATA,
                    }
                })?;
                Self::GattsWrite {
                    handle,
                    op,
                    auth_required,
                    uuid,
                    offset,
                    data,
                }
            }
            evt_id::GATTS_SYS_ATTR_MISSING => Self::GattsSysAttrMissing { hint: cur.u8()? },
            evt_id::GATTS_HVC => Self::GattsHvc { handle: cur.u16()? },
            other => return Err(EventDecodeError::UnknownEvent(other)),
        };
        Ok(event)
    }
}

/// One queued event: the connection it concerns and its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub conn_handle: u16,
    pub body: BleEvent,
}

impl Event {
    pub fn new(conn_handle: u16, body: BleEvent) -> Self {
        Self { conn_handle, body }
    }

    /// Encode a full event packet.
    pub fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u8(packet_type::EVT)?;
        w.u16(self.body.id())?;
        w.u16(self.conn_handle)?;
        self.body.encode_payload(w)
    }

    /// Decode an event packet (host side). `None` if the packet is not an
    /// event.
    pub fn decode(packet: &[u8]) -> Option<Result<Self, EventDecodeError>> {
        let [packet_type::EVT, rest @ ..] = packet else {
            return None;
        };
        let mut cur = FieldCursor::new(rest);
        Some(Self::read(&mut cur))
    }

    fn read(cur: &mut FieldCursor<'_>) -> Result<Self, EventDecodeError> {
        let id = cur.u16()?;
        let conn_handle = cur.u16()?;
        let body = BleEvent::decode_payload(id, cur)?;
        cur.finish()?;
        Ok(Self { conn_handle, body })
    }
}
