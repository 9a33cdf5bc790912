//! RPC engine: one command frame in, exactly one response out.
//!
//! Per frame:
//!
//! ```text
//! AwaitingFrame → Decoding → { NativeCall | LocallyRejected } → Encoding → Sent
//! ```
//!
//! Handling is synchronous and runs to completion; a second frame is not
//! looked at until the first one's response has been handed to the
//! transport. There is no retry. Frames too short to carry an op code (or
//! not tagged as commands) cannot be correlated and are dropped with a
//! warning instead.
//!
//! The engine owns no transport and no stack; both are passed in, so the
//! same engine runs against the real stack on target and a mock in tests.

use log::{debug, warn};

use crate::app::ports::BleStack;
use crate::config::{LinkConfig, MAX_FRAME_SIZE};
use crate::diagnostics::LinkStats;
use crate::error::{Error, Result, Status};
use crate::events::EventQueue;
use crate::rpc::adapter::{self, Scratch};
use crate::rpc::codec::CommandHeader;
use crate::rpc::command::{Decoded, decode_command};
use crate::rpc::ops;
use crate::rpc::response::{Reply, encode_response};
use crate::rpc::transport::Transport;

fn op_name(op: u8) -> &'static str {
    ops::lookup(op).map_or("unknown", |entry| entry.name)
}

pub struct RpcEngine {
    config: LinkConfig,
    scratch: Scratch,
    stats: LinkStats,
}

impl RpcEngine {
    /// Create an engine. The config is validated, never clamped.
    pub fn new(config: LinkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            scratch: Scratch::new(),
            stats: LinkStats::new(),
        })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// Handle one received packet.
    ///
    /// Returns the status sent back, or `None` if the packet was dropped
    /// without a response. An `Err` means the response could not be
    /// handed to the transport.
    pub fn handle_frame<S, T>(
        &mut self,
        frame: &[u8],
        stack: &mut S,
        transport: &mut T,
    ) -> Result<Option<Status>>
    where
        S: BleStack + ?Sized,
        T: Transport,
    {
        let Some((header, payload)) = CommandHeader::parse(frame) else {
            self.stats.record_drop();
            warn!("RPC: dropped {}-byte frame without a command header", frame.len());
            return Ok(None);
        };
        let op = header.op_code;

        let (status, reply) = match decode_command(op, payload, &self.config) {
            Decoded::Call(cmd) => {
                let (code, reply) = adapter::invoke(&cmd, stack, &mut self.scratch);
                (Status::Native(code), reply)
            }
            Decoded::Rejected(op_code, e) => {
                warn!("RPC[op=0x{:02x}] {}: rejected: {}", op, op_code.name(), e);
                (Status::Rejected(e), Reply::None)
            }
            Decoded::Unsupported(op) => {
                warn!("RPC[op=0x{:02x}]: unsupported", op);
                (Status::Unsupported(op), Reply::None)
            }
        };
        self.stats.record_status(&status);

        let mut tx = transport.alloc_tx_buffer().map_err(|e| {
            self.stats.record_tx_failure();
            warn!("RPC[op=0x{:02x}]: no tx buffer: {:?}", op, e);
            Error::Transport("tx buffer unavailable")
        })?;

        let sent = match encode_response(op, status.code(), &reply, &mut tx) {
            Ok(sent) => sent,
            Err(e) => {
                transport.free_tx_buffer(tx);
                self.stats.record_tx_failure();
                return Err(e.into());
            }
        };
        if sent != status.code() {
            self.stats.record_response_truncated();
            warn!("RPC[op=0x{:02x}] {}: reply too large, sent status {}", op, op_name(op), sent);
        }

        transport.write(tx).map_err(|e| {
            self.stats.record_tx_failure();
            warn!("RPC[op=0x{:02x}]: response write failed: {:?}", op, e);
            Error::Transport("response write failed")
        })?;

        debug!("RPC[op=0x{:02x}] {}: {}", op, op_name(op), status);
        Ok(Some(status))
    }

    /// Handle every frame the transport has pending. Returns how many
    /// were answered.
    pub fn poll<S, T>(&mut self, stack: &mut S, transport: &mut T) -> Result<usize>
    where
        S: BleStack + ?Sized,
        T: Transport,
    {
        let mut rx = [0u8; MAX_FRAME_SIZE];
        let mut answered = 0;
        while let Some(n) = transport
            .read_frame(&mut rx)
            .map_err(|_| Error::Transport("read failed"))?
        {
            if self.handle_frame(&rx[..n], stack, transport)?.is_some() {
                answered += 1;
            }
        }
        Ok(answered)
    }

    /// Drain the deferred event queue through `transport`.
    pub fn flush_events<T: Transport, const N: usize>(
        &mut self,
        queue: &EventQueue<N>,
        transport: &mut T,
    ) -> Result<usize> {
        let result = queue.run(transport);
        self.stats.events_rejected = queue.rejected_count();
        self.stats.events_dropped = queue.dropped_count();
        match result {
            Ok(sent) => {
                self.stats.record_events_sent(sent);
                Ok(sent)
            }
            Err(e) => {
                self.stats.record_tx_failure();
                Err(e)
            }
        }
    }
}
