//! GAP calls end to end: frame in, native call recorded, response out.

use blelink::ble::SecurityMode;
use blelink::ble::gap::{ConnParams, GapAddr, Irk, adv_type, filter_policy};
use blelink::error::{DecodeError, status};
use blelink::rpc::codec::packet_type::CMD;
use blelink::rpc::ops::OpCode;
use blelink::{LinkConfig, Status};

use crate::mock_stack::{MockStack, StackCall, exchange, exchange_with, response};

const NAME_SET: u8 = OpCode::GapDeviceNameSet as u8;
const NAME_GET: u8 = OpCode::GapDeviceNameGet as u8;
const APPEARANCE_SET: u8 = OpCode::GapAppearanceSet as u8;
const APPEARANCE_GET: u8 = OpCode::GapAppearanceGet as u8;
const ADV_START: u8 = OpCode::GapAdvStart as u8;

// ── Device name ───────────────────────────────────────────────

#[test]
fn device_name_set_with_permission() {
    let mut stack = MockStack::new();
    let (st, resp) = exchange(
        &mut stack,
        &[CMD, NAME_SET, 1, 0x32, 0x04, 0x00, 1, 5, 6, 7, 8],
    );

    assert_eq!(st, Some(Status::Native(status::SUCCESS)));
    assert_eq!(resp, Some(response(NAME_SET, 0, &[])));
    assert_eq!(
        stack.calls,
        vec![StackCall::DeviceNameSet {
            perm: Some(SecurityMode { sm: 2, lv: 3 }),
            name: Some(vec![5, 6, 7, 8]),
            len: 4,
        }]
    );
}

#[test]
fn device_name_set_absent_fields_are_null() {
    let mut stack = MockStack::new();
    exchange(&mut stack, &[CMD, NAME_SET, 0, 0x04, 0x00, 0]);
    assert_eq!(
        stack.last_call(),
        Some(&StackCall::DeviceNameSet {
            perm: None,
            name: None,
            len: 4,
        })
    );
}

#[test]
fn device_name_get_returns_length_and_name() {
    let mut stack = MockStack::new();
    let (_, resp) = exchange(&mut stack, &[CMD, NAME_GET, 1, 20, 0, 1]);

    let mut payload = vec![11, 0];
    payload.extend_from_slice(b"Hello_world");
    assert_eq!(resp, Some(response(NAME_GET, 0, &payload)));
    assert_eq!(
        stack.calls,
        vec![StackCall::DeviceNameGet {
            buf_len: Some(20),
            len_in: Some(20),
        }]
    );
}

#[test]
fn device_name_get_copies_no_more_than_capacity() {
    let mut stack = MockStack::new();
    let (_, resp) = exchange(&mut stack, &[CMD, NAME_GET, 1, 5, 0, 1]);

    // Full length reported, only five bytes returned.
    let mut payload = vec![11, 0];
    payload.extend_from_slice(b"Hello");
    assert_eq!(resp, Some(response(NAME_GET, 0, &payload)));
}

#[test]
fn device_name_get_length_only() {
    let mut stack = MockStack::new();
    let (_, resp) = exchange(&mut stack, &[CMD, NAME_GET, 1, 20, 0, 0]);
    assert_eq!(resp, Some(response(NAME_GET, 0, &[11, 0])));
}

#[test]
fn device_name_get_over_scratch_never_reaches_stack() {
    let mut stack = MockStack::new();
    let (st, resp) = exchange(&mut stack, &[CMD, NAME_GET, 1, 90, 0, 1]);

    assert_eq!(
        st,
        Some(Status::Rejected(DecodeError::CapacityExceeded {
            requested: 90,
            capacity: 32
        }))
    );
    assert_eq!(resp, Some(response(NAME_GET, status::INVALID_LENGTH, &[])));
    assert!(stack.calls.is_empty());
}

#[test]
fn device_name_get_failure_is_status_only() {
    let mut stack = MockStack::failing(status::INVALID_STATE);
    let (_, resp) = exchange(&mut stack, &[CMD, NAME_GET, 1, 20, 0, 1]);
    assert_eq!(resp, Some(response(NAME_GET, status::INVALID_STATE, &[])));
}

// ── Appearance / PPCP ─────────────────────────────────────────

#[test]
fn appearance_set_fixed_value() {
    let mut stack = MockStack::new();
    let (_, resp) = exchange(&mut stack, &[CMD, APPEARANCE_SET, 0x02, 0x00]);
    assert_eq!(resp, Some(response(APPEARANCE_SET, 0, &[])));
    assert_eq!(stack.calls, vec![StackCall::AppearanceSet(2)]);
}

#[test]
fn appearance_get_value_when_requested() {
    let mut stack = MockStack::new();
    stack.appearance = 0x03C1;
    let (_, resp) = exchange(&mut stack, &[CMD, APPEARANCE_GET, 1]);
    assert_eq!(resp, Some(response(APPEARANCE_GET, 0, &[0xC1, 0x03])));
}

#[test]
fn appearance_get_null_out_param_passes_through() {
    let mut stack = MockStack::new();
    let (st, resp) = exchange(&mut stack, &[CMD, APPEARANCE_GET, 0]);
    assert_eq!(st, Some(Status::Native(status::NULL)));
    assert_eq!(resp, Some(response(APPEARANCE_GET, status::NULL, &[])));
    assert_eq!(stack.calls, vec![StackCall::AppearanceGet { out: false }]);
}

#[test]
fn ppcp_set_then_get() {
    let mut stack = MockStack::new();
    let params = [0x06, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x90, 0x01];

    let mut set = vec![CMD, OpCode::GapPpcpSet as u8, 1];
    set.extend_from_slice(&params);
    exchange(&mut stack, &set);
    assert_eq!(
        stack.ppcp,
        ConnParams {
            min_conn_interval: 6,
            max_conn_interval: 12,
            slave_latency: 0,
            conn_sup_timeout: 400,
        }
    );

    let (_, resp) = exchange(&mut stack, &[CMD, OpCode::GapPpcpGet as u8, 1]);
    assert_eq!(resp, Some(response(OpCode::GapPpcpGet as u8, 0, &params)));
}

// ── Advertising ───────────────────────────────────────────────

#[test]
fn adv_start_directed_with_peer_no_whitelist() {
    let mut stack = MockStack::new();
    let frame = [
        CMD,
        ADV_START,
        adv_type::DIRECT_IND,
        1,
        0x01,
        0xA1,
        0xA2,
        0xA3,
        0xA4,
        0xA5,
        0xA6,
        filter_policy::ANY,
        0,
        0x34,
        0x12,
        0x78,
        0x56,
    ];
    let (_, resp) = exchange(&mut stack, &frame);
    assert_eq!(resp, Some(response(ADV_START, 0, &[])));

    let Some(StackCall::AdvStart(p)) = stack.last_call() else {
        panic!("adv start not called");
    };
    assert_eq!(p.adv_type, adv_type::DIRECT_IND);
    assert!(p.peer_addr.is_some());
    assert!(p.whitelist.is_none());
    assert_eq!(p.interval, 0x1234);
    assert_eq!(p.timeout, 0x5678);
}

fn adv_start_with_whitelist(addrs: u8, irks: u8) -> Vec<u8> {
    let mut frame = vec![CMD, ADV_START, adv_type::IND, 0, filter_policy::FILTER_BOTH, 1];
    frame.push(addrs);
    for i in 0..addrs {
        frame.extend_from_slice(&[0x00, i, 0, 0, 0, 0, 0xC0]);
    }
    frame.push(irks);
    for i in 0..irks {
        frame.extend_from_slice(&[i; 16]);
    }
    frame.extend_from_slice(&[0x40, 0x00, 0x00, 0x00]);
    frame
}

#[test]
fn adv_start_whitelist_records_mapped_one_to_one() {
    let mut stack = MockStack::new();
    let (_, resp) = exchange(&mut stack, &adv_start_with_whitelist(2, 1));
    assert_eq!(resp, Some(response(ADV_START, 0, &[])));

    let Some(StackCall::AdvStart(p)) = stack.last_call() else {
        panic!("adv start not called");
    };
    let wl = p.whitelist.as_ref().unwrap();
    assert_eq!(
        wl.addrs.as_slice(),
        &[
            GapAddr {
                addr_type: 0,
                addr: [0, 0, 0, 0, 0, 0xC0]
            },
            GapAddr {
                addr_type: 0,
                addr: [1, 0, 0, 0, 0, 0xC0]
            },
        ]
    );
    assert_eq!(wl.irks.as_slice(), &[Irk([0; 16])]);
}

#[test]
fn adv_start_whitelist_over_configured_capacity_rejected() {
    let config = LinkConfig {
        whitelist_irk_capacity: 2,
        ..LinkConfig::default()
    };
    let mut stack = MockStack::new();
    let (st, resp) = exchange_with(config, &mut stack, &adv_start_with_whitelist(1, 3));

    assert_eq!(
        st,
        Some(Status::Rejected(DecodeError::CountExceeded {
            declared: 3,
            capacity: 2
        }))
    );
    assert_eq!(resp, Some(response(ADV_START, status::INVALID_PARAM, &[])));
    assert!(stack.calls.is_empty());
}

#[test]
fn adv_data_set_and_stop() {
    let mut stack = MockStack::new();
    exchange(
        &mut stack,
        &[CMD, OpCode::GapAdvDataSet as u8, 3, 1, 0x02, 0x01, 0x06, 2, 0],
    );
    exchange(&mut stack, &[CMD, OpCode::GapAdvStop as u8]);
    assert_eq!(
        stack.calls,
        vec![
            StackCall::AdvDataSet {
                data: Some(vec![0x02, 0x01, 0x06]),
                sr_data: None,
            },
            StackCall::AdvStop,
        ]
    );
}

#[test]
fn disconnect_and_tx_power() {
    let mut stack = MockStack::new();
    exchange(&mut stack, &[CMD, OpCode::GapDisconnect as u8, 0x01, 0x00, 0x13]);
    exchange(&mut stack, &[CMD, OpCode::GapTxPowerSet as u8, 0xF8]);
    assert_eq!(
        stack.calls,
        vec![
            StackCall::Disconnect {
                conn_handle: 1,
                hci_status: 0x13
            },
            StackCall::TxPowerSet(-8),
        ]
    );
}

// ── Dispatch edge cases ───────────────────────────────────────

#[test]
fn native_error_returned_verbatim() {
    let mut stack = MockStack::failing(status::BUSY);
    let (st, resp) = exchange(&mut stack, &[CMD, APPEARANCE_SET, 0x02, 0x00]);
    assert_eq!(st, Some(Status::Native(status::BUSY)));
    assert_eq!(resp, Some(response(APPEARANCE_SET, status::BUSY, &[])));
}

#[test]
fn unknown_op_answered_not_supported() {
    let mut stack = MockStack::new();
    let (st, resp) = exchange(&mut stack, &[CMD, 0x01, 9, 9]);
    assert_eq!(st, Some(Status::Unsupported(0x01)));
    assert_eq!(resp, Some(response(0x01, status::NOT_SUPPORTED, &[])));
    assert!(stack.calls.is_empty());
}

#[test]
fn uncorrelatable_frames_dropped() {
    let mut stack = MockStack::new();
    assert_eq!(exchange(&mut stack, &[CMD]), (None, None));
    assert_eq!(exchange(&mut stack, &[]), (None, None));
    assert_eq!(
        exchange(&mut stack, &[blelink::rpc::codec::packet_type::EVT, APPEARANCE_SET]),
        (None, None)
    );
    assert!(stack.calls.is_empty());
}

#[test]
fn trailing_bytes_rejected_before_call() {
    let mut stack = MockStack::new();
    let (st, resp) = exchange(&mut stack, &[CMD, APPEARANCE_SET, 0x02, 0x00, 0xFF]);
    assert_eq!(st, Some(Status::Rejected(DecodeError::TrailingBytes(1))));
    assert_eq!(resp, Some(response(APPEARANCE_SET, status::INVALID_LENGTH, &[])));
    assert!(stack.calls.is_empty());
}

#[test]
fn bad_presence_flag_rejected_before_call() {
    let mut stack = MockStack::new();
    let (_, resp) = exchange(&mut stack, &[CMD, NAME_SET, 2, 0x32, 0x04, 0x00, 0]);
    assert_eq!(resp, Some(response(NAME_SET, status::INVALID_DATA, &[])));
    assert!(stack.calls.is_empty());
}
