//! GAP parameter types: addresses, whitelists, connection and
//! advertising parameters.

use heapless::Vec;

use crate::config::{LinkConfig, WHITELIST_ADDR_MAX, WHITELIST_IRK_MAX};
use crate::error::{DecodeError, EncodeError};
use crate::rpc::cursor::{FieldCursor, FieldWriter, WireField};

pub const ADDR_LEN: usize = 6;
pub const IRK_LEN: usize = 16;

/// Wire size of one whitelist address record (type + address).
pub const ADDR_RECORD_LEN: usize = 1 + ADDR_LEN;

pub mod addr_type {
    pub const PUBLIC: u8 = 0x00;
    pub const RANDOM_STATIC: u8 = 0x01;
    pub const RANDOM_PRIVATE_RESOLVABLE: u8 = 0x02;
    pub const RANDOM_PRIVATE_NON_RESOLVABLE: u8 = 0x03;
}

pub mod adv_type {
    pub const IND: u8 = 0x00;
    pub const DIRECT_IND: u8 = 0x01;
    pub const SCAN_IND: u8 = 0x02;
    pub const NONCONN_IND: u8 = 0x03;
}

pub mod filter_policy {
    pub const ANY: u8 = 0x00;
    pub const FILTER_SCAN_REQ: u8 = 0x01;
    pub const FILTER_CONN_REQ: u8 = 0x02;
    pub const FILTER_BOTH: u8 = 0x03;
}

pub mod role {
    pub const PERIPHERAL: u8 = 0x01;
    pub const CENTRAL: u8 = 0x02;
}

pub mod timeout_src {
    pub const ADVERTISING: u8 = 0x00;
    pub const SECURITY_REQUEST: u8 = 0x01;
    pub const SCAN: u8 = 0x02;
    pub const CONN: u8 = 0x03;
}

// ── Address ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GapAddr {
    pub addr_type: u8,
    pub addr: [u8; ADDR_LEN],
}

impl<'a> WireField<'a> for GapAddr {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        cur.ensure(ADDR_RECORD_LEN)?;
        Ok(Self {
            addr_type: cur.u8()?,
            addr: cur.array()?,
        })
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u8(self.addr_type)?;
        w.bytes(&self.addr)
    }
}

/// Identity resolving key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Irk(pub [u8; IRK_LEN]);

impl<'a> WireField<'a> for Irk {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        cur.array().map(Self)
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.bytes(&self.0)
    }
}

// ── Whitelist ─────────────────────────────────────────────────

/// Peer addresses and IRKs used to filter advertising/connection events.
///
/// Storage is preallocated at the build-time maximum; the configured
/// capacity bounds how much of it a host may use.
///
/// ```text
/// addr_count:1  {type:1 addr:6}*  irk_count:1  {irk:16}*
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Whitelist {
    pub addrs: Vec<GapAddr, WHITELIST_ADDR_MAX>,
    pub irks: Vec<Irk, WHITELIST_IRK_MAX>,
}

impl Whitelist {
    pub fn decode(cur: &mut FieldCursor<'_>, config: &LinkConfig) -> Result<Self, DecodeError> {
        let mut wl = Self::default();

        let addr_count = cur.count(config.whitelist_addr_capacity as usize)?;
        cur.ensure(addr_count * ADDR_RECORD_LEN)?;
        for _ in 0..addr_count {
            let addr = GapAddr::decode(cur)?;
            wl.addrs.push(addr).map_err(|_| DecodeError::CountExceeded {
                declared: addr_count,
                capacity: WHITELIST_ADDR_MAX,
            })?;
        }

        let irk_count = cur.count(config.whitelist_irk_capacity as usize)?;
        cur.ensure(irk_count * IRK_LEN)?;
        for _ in 0..irk_count {
            let irk = Irk::decode(cur)?;
            wl.irks.push(irk).map_err(|_| DecodeError::CountExceeded {
                declared: irk_count,
                capacity: WHITELIST_IRK_MAX,
            })?;
        }

        Ok(wl)
    }

    pub fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u8(self.addrs.len() as u8)?;
        for addr in &self.addrs {
            addr.encode(w)?;
        }
        w.u8(self.irks.len() as u8)?;
        for irk in &self.irks {
            irk.encode(w)?;
        }
        Ok(())
    }
}

// ── Connection parameters ─────────────────────────────────────

/// Connection parameters, in the stack's native units (1.25 ms intervals,
/// 10 ms supervision timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnParams {
    pub min_conn_interval: u16,
    pub max_conn_interval: u16,
    pub slave_latency: u16,
    pub conn_sup_timeout: u16,
}

impl<'a> WireField<'a> for ConnParams {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError> {
        cur.ensure(8)?;
        Ok(Self {
            min_conn_interval: cur.u16()?,
            max_conn_interval: cur.u16()?,
            slave_latency: cur.u16()?,
            conn_sup_timeout: cur.u16()?,
        })
    }

    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u16(self.min_conn_interval)?;
        w.u16(self.max_conn_interval)?;
        w.u16(self.slave_latency)?;
        w.u16(self.conn_sup_timeout)
    }
}

// ── Advertising parameters ────────────────────────────────────

/// ```text
/// type:1  peer_presence[addr_type:1 addr:6]  filter_policy:1
/// whitelist_presence[whitelist]  interval:2  timeout:2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvParams {
    pub adv_type: u8,
    pub peer_addr: Option<GapAddr>,
    pub filter_policy: u8,
    pub whitelist: Option<Whitelist>,
    pub interval: u16,
    pub timeout: u16,
}

impl AdvParams {
    pub fn decode(cur: &mut FieldCursor<'_>, config: &LinkConfig) -> Result<Self, DecodeError> {
        let adv_type = cur.u8()?;
        let peer_addr = cur.optional::<GapAddr>()?;
        let filter_policy = cur.u8()?;
        let whitelist = cur.optional_with(|c| Whitelist::decode(c, config))?;
        let interval = cur.u16()?;
        let timeout = cur.u16()?;
        Ok(Self {
            adv_type,
            peer_addr,
            filter_policy,
            whitelist,
            interval,
            timeout,
        })
    }

    pub fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError> {
        w.u8(self.adv_type)?;
        w.optional(self.peer_addr.as_ref())?;
        w.u8(self.filter_policy)?;
        w.presence(self.whitelist.is_some())?;
        if let Some(wl) = &self.whitelist {
            wl.encode(w)?;
        }
        w.u16(self.interval)?;
        w.u16(self.timeout)
    }
}
