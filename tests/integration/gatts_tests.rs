//! GATT server calls end to end against one mock stack, so handles
//! allocated by one command are usable by the next.

use blelink::ble::gatts::{CharProps, Uuid, hvx_type, service_type};
use blelink::error::{DecodeError, status};
use blelink::rpc::codec::packet_type::CMD;
use blelink::rpc::ops::OpCode;
use blelink::{LinkConfig, Status};

use crate::mock_stack::{MockStack, StackCall, exchange, exchange_with, response};

const SERVICE_ADD: u8 = OpCode::GattsServiceAdd as u8;
const CHAR_ADD: u8 = OpCode::GattsCharacteristicAdd as u8;
const VALUE_SET: u8 = OpCode::GattsValueSet as u8;
const VALUE_GET: u8 = OpCode::GattsValueGet as u8;
const HVX: u8 = OpCode::GattsHvx as u8;

fn battery_service() -> Vec<u8> {
    vec![CMD, SERVICE_ADD, service_type::PRIMARY, 1, 0x0F, 0x18, 0x01, 1]
}

fn battery_level_char(service_handle: u16) -> Vec<u8> {
    let mut frame = vec![CMD, CHAR_ADD];
    frame.extend_from_slice(&service_handle.to_le_bytes());
    frame.extend_from_slice(&[
        1, // md
        CharProps::READ | CharProps::NOTIFY,
        0,
        0x00,
        0x00,
        0x00,
        0x00,
        0, // user desc
        0, // presentation format
        0, // user desc md
        1,
        0x11,
        0x11,
        0x02, // cccd md
        0,    // sccd md
        1,    // attr
        1,
        0x19,
        0x2A,
        0x01, // uuid
        1,
        0x11,
        0x00,
        0x02, // attr md
        0x01,
        0x00, // init len
        0x00,
        0x00, // init offs
        0x01,
        0x00, // max len
        1,
        0x64, // initial value
        1,    // handles out
    ]);
    frame
}

/// Stack with one service (0x000C) and one characteristic (value 0x000D,
/// cccd 0x000E) holding `[0x64]`.
fn provisioned() -> MockStack {
    let mut stack = MockStack::new();
    exchange(&mut stack, &battery_service());
    exchange(&mut stack, &battery_level_char(0x000C));
    stack.calls.clear();
    stack
}

// ── Service / characteristic ──────────────────────────────────

#[test]
fn service_add_returns_allocated_handle() {
    let mut stack = MockStack::new();
    let (st, resp) = exchange(&mut stack, &battery_service());

    assert_eq!(st, Some(Status::Native(status::SUCCESS)));
    assert_eq!(resp, Some(response(SERVICE_ADD, 0, &[0x0C, 0x00])));
    assert_eq!(
        stack.calls,
        vec![StackCall::ServiceAdd {
            service_type: service_type::PRIMARY,
            uuid: Some(Uuid {
                uuid: 0x180F,
                uuid_type: 0x01
            }),
            out: true,
        }]
    );
}

#[test]
fn service_add_without_handle_out() {
    let mut stack = MockStack::new();
    let (_, resp) = exchange(&mut stack, &[CMD, SERVICE_ADD, service_type::PRIMARY, 0, 0]);
    assert_eq!(resp, Some(response(SERVICE_ADD, 0, &[])));
}

#[test]
fn characteristic_add_returns_handles() {
    let mut stack = MockStack::new();
    exchange(&mut stack, &battery_service());
    let (_, resp) = exchange(&mut stack, &battery_level_char(0x000C));

    assert_eq!(
        resp,
        Some(response(
            CHAR_ADD,
            0,
            &[0x0D, 0x00, 0x00, 0x00, 0x0E, 0x00, 0x00, 0x00]
        ))
    );
    assert_eq!(
        stack.last_call(),
        Some(&StackCall::CharacteristicAdd {
            service_handle: 0x000C,
            md_present: true,
            cccd_md_present: true,
            attr_uuid: Some(Uuid {
                uuid: 0x2A19,
                uuid_type: 0x01
            }),
            init_value: Some(vec![0x64]),
            out: true,
        })
    );
    assert_eq!(stack.values.get(&0x000D), Some(&vec![0x64]));
}

#[test]
fn characteristic_add_failure_is_status_only() {
    let mut stack = MockStack::failing(status::NO_MEM);
    let (_, resp) = exchange(&mut stack, &battery_level_char(0x000C));
    assert_eq!(resp, Some(response(CHAR_ADD, status::NO_MEM, &[])));
}

// ── Values ────────────────────────────────────────────────────

#[test]
fn value_set_then_get() {
    let mut stack = provisioned();

    let (_, resp) = exchange(
        &mut stack,
        &[CMD, VALUE_SET, 0, 0, 0x0D, 0, 2, 0, 0, 0, 1, 7, 8],
    );
    assert_eq!(resp, Some(response(VALUE_SET, 0, &[2, 0])));

    let (_, resp) = exchange(&mut stack, &[CMD, VALUE_GET, 0, 0, 0x0D, 0, 1, 10, 0, 0, 0, 1]);
    assert_eq!(resp, Some(response(VALUE_GET, 0, &[2, 0, 0, 0, 7, 8])));
    assert_eq!(
        stack.last_call(),
        Some(&StackCall::ValueGet {
            conn_handle: 0,
            handle: 0x0D,
            buf_len: Some(Some(10)),
        })
    );
}

#[test]
fn value_get_short_buffer_reports_full_length() {
    let mut stack = provisioned();
    stack.values.insert(0x0D, vec![1, 2, 3, 4]);

    let (_, resp) = exchange(&mut stack, &[CMD, VALUE_GET, 0, 0, 0x0D, 0, 1, 2, 0, 0, 0, 1]);
    assert_eq!(resp, Some(response(VALUE_GET, 0, &[4, 0, 0, 0, 1, 2])));
}

#[test]
fn value_get_length_only() {
    let mut stack = provisioned();
    let (_, resp) = exchange(&mut stack, &[CMD, VALUE_GET, 0, 0, 0x0D, 0, 1, 10, 0, 0, 0, 0]);
    assert_eq!(resp, Some(response(VALUE_GET, 0, &[1, 0, 0, 0])));
    assert_eq!(
        stack.last_call(),
        Some(&StackCall::ValueGet {
            conn_handle: 0,
            handle: 0x0D,
            buf_len: Some(None),
        })
    );
}

#[test]
fn value_get_over_scratch_never_reaches_stack() {
    let mut stack = provisioned();
    let (st, resp) = exchange(&mut stack, &[CMD, VALUE_GET, 0, 0, 0x0D, 0, 1, 65, 0, 0, 0, 1]);

    assert_eq!(
        st,
        Some(Status::Rejected(DecodeError::CapacityExceeded {
            requested: 65,
            capacity: 64
        }))
    );
    assert_eq!(resp, Some(response(VALUE_GET, status::INVALID_LENGTH, &[])));
    assert!(stack.calls.is_empty());
}

#[test]
fn value_get_capacity_follows_config() {
    let config = LinkConfig {
        value_capacity: 128,
        ..LinkConfig::default()
    };
    let mut stack = provisioned();
    let (_, resp) = exchange_with(
        config,
        &mut stack,
        &[CMD, VALUE_GET, 0, 0, 0x0D, 0, 1, 65, 0, 0, 0, 1],
    );
    assert_eq!(resp, Some(response(VALUE_GET, 0, &[1, 0, 0, 0, 0x64])));
}

#[test]
fn value_get_unknown_handle_passes_native_status() {
    let mut stack = provisioned();
    let (st, resp) = exchange(&mut stack, &[CMD, VALUE_GET, 0, 0, 0x40, 0, 1, 4, 0, 0, 0, 1]);
    assert_eq!(st, Some(Status::Native(status::NOT_FOUND)));
    assert_eq!(resp, Some(response(VALUE_GET, status::NOT_FOUND, &[])));
}

#[test]
fn value_set_absent_value_is_null_pointer() {
    let mut stack = provisioned();
    let (_, resp) = exchange(&mut stack, &[CMD, VALUE_SET, 0, 0, 0x0D, 0, 0]);
    assert_eq!(resp, Some(response(VALUE_SET, status::NULL, &[])));
    assert_eq!(
        stack.last_call(),
        Some(&StackCall::ValueSet {
            conn_handle: 0,
            handle: 0x0D,
            data: None,
        })
    );
}

// ── Notifications ─────────────────────────────────────────────

#[test]
fn hvx_reports_bytes_sent() {
    let mut stack = provisioned();
    let frame = [
        CMD,
        HVX,
        0x01,
        0x00, // conn handle
        1,
        0x0D,
        0x00,
        hvx_type::NOTIFICATION,
        0x00,
        0x00,
        1,
        0x02,
        0x00,
        1,
        9,
        9,
    ];
    let (_, resp) = exchange(&mut stack, &frame);
    assert_eq!(resp, Some(response(HVX, 0, &[1, 2, 0])));
    assert_eq!(
        stack.last_call(),
        Some(&StackCall::Hvx {
            conn_handle: 1,
            handle: Some(0x0D),
            data: Some(vec![9, 9]),
        })
    );
}

#[test]
fn hvx_without_length_has_absent_length_in_reply() {
    let mut stack = provisioned();
    let frame = [CMD, HVX, 0x01, 0x00, 1, 0x0D, 0x00, hvx_type::INDICATION, 0, 0, 0, 0];
    let (_, resp) = exchange(&mut stack, &frame);
    assert_eq!(resp, Some(response(HVX, 0, &[0])));
}

#[test]
fn hvx_invalid_presence_rejected() {
    let mut stack = provisioned();
    let (st, resp) = exchange(&mut stack, &[CMD, HVX, 0x01, 0x00, 7]);
    assert_eq!(st, Some(Status::Rejected(DecodeError::InvalidPresence(7))));
    assert_eq!(resp, Some(response(HVX, status::INVALID_DATA, &[])));
    assert!(stack.calls.is_empty());
}
