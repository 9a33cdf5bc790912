//! Fuzz target: command decode and dispatch
//!
//! Runs arbitrary packets through `RpcEngine::handle_frame` against a
//! stack that refuses every call, and checks at most one response goes
//! out and that it echoes the op code.
//!
//! cargo fuzz run fuzz_command_decoder

#![no_main]

use blelink::app::ports::{GapPort, GattsPort};
use blelink::ble::SecurityMode;
use blelink::ble::gap::{AdvParams, ConnParams};
use blelink::ble::gatts::{
    AttrChar, CharHandles, CharMd, GattsValue, GattsValueOut, HvxParams, Uuid,
};
use blelink::error::status;
use blelink::rpc::response::ResponseView;
use blelink::rpc::transport::{Transport, TransportError, TxBuffer, TxSlot};
use blelink::{LinkConfig, RpcEngine};
use libfuzzer_sys::fuzz_target;

struct Refusing;

impl GapPort for Refusing {
    fn gap_adv_data_set(&mut self, _: Option<&[u8]>, _: Option<&[u8]>) -> u32 {
        status::INVALID_STATE
    }
    fn gap_adv_start(&mut self, _: &AdvParams) -> u32 {
        status::INVALID_STATE
    }
    fn gap_adv_stop(&mut self) -> u32 {
        status::INVALID_STATE
    }
    fn gap_disconnect(&mut self, _: u16, _: u8) -> u32 {
        status::INVALID_STATE
    }
    fn gap_tx_power_set(&mut self, _: i8) -> u32 {
        status::INVALID_STATE
    }
    fn gap_appearance_set(&mut self, _: u16) -> u32 {
        status::INVALID_STATE
    }
    fn gap_appearance_get(&mut self, _: Option<&mut u16>) -> u32 {
        status::INVALID_STATE
    }
    fn gap_ppcp_set(&mut self, _: Option<&ConnParams>) -> u32 {
        status::INVALID_STATE
    }
    fn gap_ppcp_get(&mut self, _: Option<&mut ConnParams>) -> u32 {
        status::INVALID_STATE
    }
    fn gap_device_name_set(&mut self, _: Option<&SecurityMode>, _: Option<&[u8]>, _: u16) -> u32 {
        status::INVALID_STATE
    }
    fn gap_device_name_get(&mut self, _: Option<&mut [u8]>, _: Option<&mut u16>) -> u32 {
        status::INVALID_STATE
    }
}

impl GattsPort for Refusing {
    fn gatts_service_add(&mut self, _: u8, _: Option<&Uuid>, _: Option<&mut u16>) -> u32 {
        status::INVALID_STATE
    }
    fn gatts_characteristic_add(
        &mut self,
        _: u16,
        _: Option<&CharMd<'_>>,
        _: Option<&AttrChar<'_>>,
        _: Option<&mut CharHandles>,
    ) -> u32 {
        status::INVALID_STATE
    }
    fn gatts_value_set(&mut self, _: u16, _: u16, _: Option<&mut GattsValue<'_>>) -> u32 {
        status::INVALID_STATE
    }
    fn gatts_value_get(&mut self, _: u16, _: u16, _: Option<&mut GattsValueOut<'_>>) -> u32 {
        status::INVALID_STATE
    }
    fn gatts_hvx(&mut self, _: u16, _: Option<&mut HvxParams<'_>>) -> u32 {
        status::INVALID_STATE
    }
}

#[derive(Default)]
struct Sink {
    slot: TxSlot,
    sent: Vec<Vec<u8>>,
}

impl Transport for Sink {
    type Error = TransportError;

    fn open(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
    fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
    fn read_frame(&mut self, _: &mut [u8]) -> Result<Option<usize>, TransportError> {
        Ok(None)
    }
    fn alloc_tx_buffer(&mut self) -> Result<TxBuffer, TransportError> {
        self.slot.acquire().ok_or(TransportError::TxBusy)
    }
    fn write(&mut self, buf: TxBuffer) -> Result<(), TransportError> {
        self.sent.push(buf.as_slice().to_vec());
        self.slot.release(buf);
        Ok(())
    }
    fn free_tx_buffer(&mut self, buf: TxBuffer) {
        self.slot.release(buf);
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(mut engine) = RpcEngine::new(LinkConfig::default()) else {
        return;
    };
    let mut sink = Sink::default();

    let Ok(outcome) = engine.handle_frame(data, &mut Refusing, &mut sink) else {
        panic!("transport never fails here");
    };

    assert!(sink.sent.len() <= 1, "more than one response");
    match (outcome, sink.sent.first()) {
        (Some(outcome), Some(packet)) => {
            let view = ResponseView::parse(packet)
                .and_then(Result::ok)
                .expect("response parses");
            assert_eq!(view.op_code, data[1]);
            assert_eq!(view.status, outcome.code());
            assert!(view.payload.is_empty(), "failed call carried a payload");
        }
        (None, None) => {}
        other => panic!("status and response disagree: {other:?}"),
    }
});
