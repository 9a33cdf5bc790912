//! Application boundary.
//!
//! The serialization layer never calls the BLE stack directly; it goes
//! through the port traits in [`ports`], so the whole decode/invoke/encode
//! path is testable with a mock stack.

pub mod ports;
