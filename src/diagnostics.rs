//! Link counters.
//!
//! Local rejections and native failures are counted separately so a noisy
//! host (malformed frames) can be told apart from a stack that is refusing
//! well-formed calls. The snapshot serializes for a diagnostics dump.

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Status, status};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    /// Command frames answered with a response.
    pub frames_handled: u32,
    pub native_ok: u32,
    pub native_failed: u32,
    pub rejected_truncated: u32,
    pub rejected_trailing: u32,
    pub rejected_capacity: u32,
    pub rejected_count: u32,
    /// Bad presence flags and other malformed values.
    pub rejected_invalid: u32,
    pub unsupported: u32,
    /// Frames that could not be correlated to an op code.
    pub frames_dropped: u32,
    /// Responses whose payload did not fit and were sent status-only.
    pub responses_truncated: u32,
    pub events_sent: u32,
    /// Events refused because the queue was full (mirrors the queue's
    /// own counter).
    pub events_rejected: u32,
    /// Events that could not be encoded (mirrors the queue's own counter).
    pub events_dropped: u32,
    pub tx_failures: u32,
}

impl LinkStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_status(&mut self, outcome: &Status) {
        self.frames_handled = self.frames_handled.wrapping_add(1);
        let counter = match outcome {
            Status::Native(status::SUCCESS) => &mut self.native_ok,
            Status::Native(_) => &mut self.native_failed,
            Status::Rejected(DecodeError::Truncated { .. }) => &mut self.rejected_truncated,
            Status::Rejected(DecodeError::TrailingBytes(_)) => &mut self.rejected_trailing,
            Status::Rejected(DecodeError::CapacityExceeded { .. }) => &mut self.rejected_capacity,
            Status::Rejected(DecodeError::CountExceeded { .. }) => &mut self.rejected_count,
            Status::Rejected(DecodeError::InvalidPresence(_)) => &mut self.rejected_invalid,
            Status::Unsupported(_) => &mut self.unsupported,
        };
        *counter = counter.wrapping_add(1);
    }

    pub fn record_drop(&mut self) {
        self.frames_dropped = self.frames_dropped.wrapping_add(1);
    }

    pub fn record_response_truncated(&mut self) {
        self.responses_truncated = self.responses_truncated.wrapping_add(1);
    }

    pub fn record_events_sent(&mut self, n: usize) {
        self.events_sent = self.events_sent.wrapping_add(n as u32);
    }

    pub fn record_tx_failure(&mut self) {
        self.tx_failures = self.tx_failures.wrapping_add(1);
    }

    /// All local rejections, regardless of cause.
    pub fn rejected_total(&self) -> u32 {
        self.rejected_truncated
            .wrapping_add(self.rejected_trailing)
            .wrapping_add(self.rejected_capacity)
            .wrapping_add(self.rejected_count)
            .wrapping_add(self.rejected_invalid)
    }

    /// JSON snapshot for the diagnostics dump.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
