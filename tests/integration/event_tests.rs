//! Stack events: scheduled from the callback side, flushed by the engine,
//! decoded on the host.

use blelink::ble::gap::{ConnParams, GapAddr, addr_type, role, timeout_src};
use blelink::ble::gatts::Uuid;
use blelink::error::{DecodeError, Error, EventDecodeError};
use blelink::events::EventQueue;
use blelink::rpc::codec::packet_type::EVT;
use blelink::rpc::event::{BleEvent, Event};
use blelink::{LinkConfig, RpcEngine};

use crate::mock_stack::MockTransport;

fn connected() -> Event {
    Event::new(
        0x0001,
        BleEvent::GapConnected {
            peer: GapAddr {
                addr_type: addr_type::RANDOM_STATIC,
                addr: [0x11, 0x22, 0x33, 0x44, 0x55, 0xC6],
            },
            role: role::PERIPHERAL,
            irk_match: None,
            params: ConnParams {
                min_conn_interval: 24,
                max_conn_interval: 40,
                slave_latency: 0,
                conn_sup_timeout: 400,
            },
        },
    )
}

fn write(data: &[u8]) -> Event {
    Event::new(
        0x0001,
        BleEvent::GattsWrite {
            handle: 0x000D,
            op: 0x01,
            auth_required: false,
            uuid: Uuid {
                uuid: 0x2A19,
                uuid_type: 0x01,
            },
            offset: 0,
            data: heapless::Vec::from_slice(data).unwrap(),
        },
    )
}

#[test]
fn flushed_events_decode_on_host_in_order() {
    let queue: EventQueue<8> = EventQueue::new();
    let mut engine = RpcEngine::new(LinkConfig::default()).unwrap();
    let mut transport = MockTransport::new();

    let sent = vec![
        connected(),
        write(&[0x01, 0x00]),
        Event::new(0x0001, BleEvent::GattsSysAttrMissing { hint: 0 }),
        Event::new(
            0xFFFF,
            BleEvent::GapTimeout {
                src: timeout_src::ADVERTISING,
            },
        ),
    ];
    for event in &sent {
        queue.schedule(event.clone()).unwrap();
    }

    assert_eq!(engine.flush_events(&queue, &mut transport).unwrap(), 4);
    assert!(queue.is_empty());

    let received: Vec<Event> = transport
        .sent
        .iter()
        .map(|p| Event::decode(p).unwrap().unwrap())
        .collect();
    assert_eq!(received, sent);
    assert_eq!(engine.stats().events_sent, 4);
}

#[test]
fn write_event_wire_layout() {
    let queue: EventQueue<2> = EventQueue::new();
    let mut transport = MockTransport::new();
    queue.schedule(write(&[0xAA, 0xBB])).unwrap();
    queue.run(&mut transport).unwrap();

    assert_eq!(
        transport.last_sent(),
        Some(
            &[
                EVT, 0x50, 0x00, // id
                0x01, 0x00, // conn
                0x0D, 0x00, 0x01, 0x00, // handle, op, auth
                0x19, 0x2A, 0x01, // uuid
                0x00, 0x00, // offset
                0x02, 0x00, 0xAA, 0xBB,
            ][..]
        )
    );
}

#[test]
fn full_queue_refuses_and_counts() {
    let queue: EventQueue<2> = EventQueue::new();
    let mut engine = RpcEngine::new(LinkConfig::default()).unwrap();
    let mut transport = MockTransport::new();

    queue.schedule(Event::new(0, BleEvent::TxComplete { count: 1 })).unwrap();
    queue.schedule(Event::new(0, BleEvent::TxComplete { count: 2 })).unwrap();
    assert_eq!(
        queue.schedule(Event::new(0, BleEvent::TxComplete { count: 3 })),
        Err(Error::EventQueueFull)
    );

    assert_eq!(engine.flush_events(&queue, &mut transport).unwrap(), 2);
    assert_eq!(engine.stats().events_rejected, 1);

    // The first two survive, the refused one never appears.
    let counts: Vec<BleEvent> = transport
        .sent
        .iter()
        .map(|p| Event::decode(p).unwrap().unwrap().body)
        .collect();
    assert_eq!(
        counts,
        vec![
            BleEvent::TxComplete { count: 1 },
            BleEvent::TxComplete { count: 2 }
        ]
    );
}

#[test]
fn busy_transport_keeps_event_queued() {
    let queue: EventQueue<2> = EventQueue::new();
    let mut engine = RpcEngine::new(LinkConfig::default()).unwrap();
    let mut transport = MockTransport::new();
    queue.schedule(Event::new(0, BleEvent::GattsHvc { handle: 0x0D })).unwrap();

    let held = transport.slot.acquire().unwrap();
    assert!(engine.flush_events(&queue, &mut transport).is_err());
    assert_eq!(queue.len(), 1);
    assert_eq!(engine.stats().tx_failures, 1);

    transport.slot.release(held);
    assert_eq!(engine.flush_events(&queue, &mut transport).unwrap(), 1);
}

#[test]
fn event_survives_failed_write() {
    let queue: EventQueue<4> = EventQueue::new();
    let mut engine = RpcEngine::new(LinkConfig::default()).unwrap();
    let mut transport = MockTransport::new();
    queue.schedule(Event::new(0, BleEvent::GattsHvc { handle: 0x0D })).unwrap();
    queue.schedule(Event::new(0, BleEvent::GattsHvc { handle: 0x0E })).unwrap();

    transport.fail_writes = true;
    assert!(engine.flush_events(&queue, &mut transport).is_err());
    assert_eq!(queue.len(), 2);
    assert_eq!(engine.stats().events_dropped, 0);

    transport.fail_writes = false;
    assert_eq!(engine.flush_events(&queue, &mut transport).unwrap(), 2);
    let bodies: Vec<BleEvent> = transport
        .sent
        .iter()
        .map(|p| Event::decode(p).unwrap().unwrap().body)
        .collect();
    assert_eq!(
        bodies,
        vec![
            BleEvent::GattsHvc { handle: 0x0D },
            BleEvent::GattsHvc { handle: 0x0E }
        ]
    );
}

#[test]
fn host_rejects_unknown_and_short_events() {
    assert_eq!(
        Event::decode(&[EVT, 0x7F, 0x00, 0x00, 0x00]),
        Some(Err(EventDecodeError::UnknownEvent(0x7F)))
    );
    assert!(matches!(
        Event::decode(&[EVT, 0x11, 0x00, 0x01]),
        Some(Err(EventDecodeError::Malformed(DecodeError::Truncated { .. })))
    ));
    assert_eq!(
        Event::decode(&[EVT, 0x11, 0x00, 0x01, 0x00, 0x13, 0x00]),
        Some(Err(EventDecodeError::Malformed(DecodeError::TrailingBytes(1))))
    );
    assert_eq!(Event::decode(&[0x01, 0x11]), None);
}
