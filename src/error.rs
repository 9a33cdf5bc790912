//! Unified error types for the serialization link.
//!
//! Two families matter on the wire:
//!
//! - [`DecodeError`]: the command was rejected locally, before the stack
//!   was ever called. Malformed input is data, not a fault.
//! - Native status codes: whatever the wrapped stack function returned,
//!   success included.
//!
//! Both end up as the 4-byte status of exactly one response, but they are
//! kept apart in [`Status`] so the two rates can be diagnosed separately.
//! All variants are `Copy` so they can be passed around without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Wire status codes
// ---------------------------------------------------------------------------

/// Status codes carried in the 4-byte response status field.
///
/// Numbering follows the controller stack's error header.
pub mod status {
    pub const SUCCESS: u32 = 0;
    pub const INTERNAL: u32 = 3;
    pub const NO_MEM: u32 = 4;
    pub const NOT_FOUND: u32 = 5;
    pub const NOT_SUPPORTED: u32 = 6;
    pub const INVALID_PARAM: u32 = 7;
    pub const INVALID_STATE: u32 = 8;
    pub const INVALID_LENGTH: u32 = 9;
    pub const INVALID_FLAGS: u32 = 10;
    pub const INVALID_DATA: u32 = 11;
    pub const DATA_SIZE: u32 = 12;
    pub const TIMEOUT: u32 = 13;
    pub const NULL: u32 = 14;
    pub const BUSY: u32 = 17;
}

// ---------------------------------------------------------------------------
// Decode errors (local rejection)
// ---------------------------------------------------------------------------

/// Why a command was rejected before the native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A field needed more bytes than the frame had left.
    Truncated { needed: usize, remaining: usize },
    /// The frame had bytes left over after the last field.
    TrailingBytes(usize),
    /// A caller-declared output capacity exceeds the local scratch buffer.
    CapacityExceeded { requested: usize, capacity: usize },
    /// A declared element count exceeds the preallocated array capacity.
    CountExceeded { declared: usize, capacity: usize },
    /// A presence flag was neither 0 nor 1.
    InvalidPresence(u8),
}

impl DecodeError {
    /// Wire status reported to the host for this rejection.
    pub const fn status_code(self) -> u32 {
        match self {
            Self::Truncated { .. } | Self::TrailingBytes(_) | Self::CapacityExceeded { .. } => {
                status::INVALID_LENGTH
            }
            Self::CountExceeded { .. } => status::INVALID_PARAM,
            Self::InvalidPresence(_) => status::INVALID_DATA,
        }
    }

    /// `true` for the length class of rejections (short frame, oversized
    /// request, leftovers).
    pub const fn is_length_error(self) -> bool {
        self.status_code() == status::INVALID_LENGTH
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { needed, remaining } => {
                write!(f, "truncated: need {needed} bytes, {remaining} left")
            }
            Self::TrailingBytes(n) => write!(f, "{n} trailing bytes"),
            Self::CapacityExceeded {
                requested,
                capacity,
            } => write!(f, "requested {requested} bytes, scratch holds {capacity}"),
            Self::CountExceeded { declared, capacity } => {
                write!(f, "declared {declared} entries, capacity {capacity}")
            }
            Self::InvalidPresence(v) => write!(f, "invalid presence flag 0x{v:02x}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Event decode errors (host side)
// ---------------------------------------------------------------------------

/// Why the host could not read an event packet. Never sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDecodeError {
    /// The payload did not match the layout for its id.
    Malformed(DecodeError),
    /// An event id this build does not know.
    UnknownEvent(u16),
}

impl fmt::Display for EventDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "malformed event: {e}"),
            Self::UnknownEvent(id) => write!(f, "unknown event id 0x{id:04x}"),
        }
    }
}

impl From<DecodeError> for EventDecodeError {
    fn from(e: DecodeError) -> Self {
        Self::Malformed(e)
    }
}

// ---------------------------------------------------------------------------
// Encode errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The output buffer cannot hold the next field.
    BufferFull { needed: usize, remaining: usize },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferFull { needed, remaining } => {
                write!(f, "buffer full: need {needed} bytes, {remaining} left")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response status
// ---------------------------------------------------------------------------

/// Outcome of one command, as reported in its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The stack was called; its return code, verbatim.
    Native(u32),
    /// Rejected locally; the stack was never called.
    Rejected(DecodeError),
    /// No decode routine for this op code.
    Unsupported(u8),
}

impl Status {
    pub const fn code(self) -> u32 {
        match self {
            Self::Native(code) => code,
            Self::Rejected(e) => e.status_code(),
            Self::Unsupported(_) => status::NOT_SUPPORTED,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Native(status::SUCCESS))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(code) => write!(f, "native status {code}"),
            Self::Rejected(e) => write!(f, "rejected: {e}"),
            Self::Unsupported(op) => write!(f, "unsupported op 0x{op:02x}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Errors that surface to the code driving the link (never to the host).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A frame or event could not be decoded.
    Decode(DecodeError),
    /// A frame or event did not fit its output buffer.
    Encode(EncodeError),
    /// The transport refused an open/read/alloc/write.
    Transport(&'static str),
    /// The deferred event queue is full; the event was not accepted.
    EventQueueFull,
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Encode(e) => write!(f, "encode: {e}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::EventQueueFull => write!(f, "event queue full"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
