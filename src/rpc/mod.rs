//! Serialization layer between a host and the local BLE stack.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        RPC Stack                               │
//! │                                                                │
//! │  ┌───────────┐   ┌──────────┐   ┌──────────┐   ┌────────────┐  │
//! │  │ Transport │──▶│  Codec   │──▶│ Op table │──▶│  Decode    │  │
//! │  │  (trait)  │   │ (header) │   │  (ops)   │   │ (gap/gatts)│  │
//! │  └───────────┘   └──────────┘   └──────────┘   └────────────┘  │
//! │       ▲                                              │         │
//! │       │          ┌──────────┐   ┌──────────┐         ▼         │
//! │       └──────────│ Response │◀──│ Adapter  │◀── BleStack port  │
//! │                  │ encoder  │   │ (invoke) │                   │
//! │                  └──────────┘   └──────────┘                   │
//! │                                                                │
//! │  Event encoder ──▶ EventQueue ──▶ Transport                    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapter;
pub mod codec;
pub mod command;
pub mod cursor;
pub mod engine;
pub mod event;
pub mod ops;
pub mod response;
pub mod transport;

mod gap;
mod gatts;
