//! Link configuration parameters
//!
//! Build-time maxima size the preallocated storage (scratch buffers,
//! whitelist arrays, transmit buffer, event queue). The runtime
//! [`LinkConfig`] narrows them; it can be loaded from JSON or a postcard
//! blob but is always validated, never clamped.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// --- Build-time maxima ---

/// Longest device name the stack accepts.
pub const MAX_NAME_SCRATCH: usize = 248;
/// Largest attribute value read back through local scratch.
pub const MAX_VALUE_SCRATCH: usize = 256;
/// Whitelist address pointer-array size.
pub const WHITELIST_ADDR_MAX: usize = 8;
/// Whitelist IRK pointer-array size.
pub const WHITELIST_IRK_MAX: usize = 8;
/// Largest frame the transport will deliver or accept.
pub const MAX_FRAME_SIZE: usize = 512;
/// Transmit scratch buffer size (one response or event in flight).
pub const TX_BUFFER_SIZE: usize = 320;
/// Depth of the deferred event queue.
pub const EVENT_QUEUE_DEPTH: usize = 16;
/// Largest GATTS write payload carried in a queued event.
pub const MAX_EVENT_DATA: usize = 244;

/// Response header: packet type, op code, 4-byte status.
const RESPONSE_HEADER_LEN: usize = 6;

/// Runtime link configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Local scratch for "device name get"; larger requests are rejected.
    pub device_name_capacity: u16,
    /// Local scratch for "value get"; larger requests are rejected.
    pub value_capacity: u16,
    /// Maximum whitelist addresses accepted per command.
    pub whitelist_addr_capacity: u8,
    /// Maximum whitelist IRKs accepted per command.
    pub whitelist_irk_capacity: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device_name_capacity: 32,
            value_capacity: 64,
            whitelist_addr_capacity: WHITELIST_ADDR_MAX as u8,
            whitelist_irk_capacity: WHITELIST_IRK_MAX as u8,
        }
    }
}

impl LinkConfig {
    /// Reject values the preallocated storage cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.device_name_capacity as usize > MAX_NAME_SCRATCH {
            return Err(Error::Config("device_name_capacity exceeds name scratch"));
        }
        if self.value_capacity as usize > MAX_VALUE_SCRATCH {
            return Err(Error::Config("value_capacity exceeds value scratch"));
        }
        if self.whitelist_addr_capacity as usize > WHITELIST_ADDR_MAX {
            return Err(Error::Config("whitelist_addr_capacity exceeds array size"));
        }
        if self.whitelist_irk_capacity as usize > WHITELIST_IRK_MAX {
            return Err(Error::Config("whitelist_irk_capacity exceeds array size"));
        }
        // name get: len:2 + name; value get: len:2 offset:2 + value
        let largest = RESPONSE_HEADER_LEN
            + (2 + self.device_name_capacity as usize).max(4 + self.value_capacity as usize);
        if largest > TX_BUFFER_SIZE {
            return Err(Error::Config("largest response exceeds transmit buffer"));
        }
        Ok(())
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            serde_json::from_slice(bytes).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a postcard blob (as persisted by the host).
    pub fn from_postcard(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Config("malformed postcard blob"))?;
        config.validate()?;
        Ok(config)
    }
}
