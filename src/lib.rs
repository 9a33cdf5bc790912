//! BLE stack serialization library.
//!
//! Runs on the controller side of a host/controller split: decodes command
//! frames from the host, calls the local stack through the
//! [`BleStack`](app::ports::BleStack) port, and encodes exactly one
//! response per command. Stack events are queued and encoded separately.
//!
//! Everything here is pure logic over byte buffers and port traits, so the
//! whole path is testable on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod ble;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod rpc;

pub use config::LinkConfig;
pub use error::{DecodeError, EncodeError, Error, EventDecodeError, Result, Status};
pub use rpc::engine::RpcEngine;
