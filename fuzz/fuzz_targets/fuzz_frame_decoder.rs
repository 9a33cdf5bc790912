//! Fuzz target: `FrameDecoder::feed`
//!
//! Feeds arbitrary bytes through the streaming decoder until they are
//! consumed, checking every yielded packet is non-empty and within the
//! frame limit, and that a reset decoder behaves the same way.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use blelink::config::MAX_FRAME_SIZE;
use blelink::rpc::codec::FrameDecoder;
use libfuzzer_sys::fuzz_target;

fn drain(decoder: &mut FrameDecoder, mut data: &[u8]) -> usize {
    let mut packets = 0;
    while !data.is_empty() {
        let (used, packet) = decoder.feed(data);
        if let Some(packet) = packet {
            assert!(!packet.is_empty(), "decoder yielded an empty packet");
            assert!(packet.len() <= MAX_FRAME_SIZE, "packet exceeds MAX_FRAME_SIZE");
            packets += 1;
        }
        assert!(used <= data.len());
        if used == 0 {
            break;
        }
        data = &data[used..];
    }
    packets
}

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new();
    let first = drain(&mut decoder, data);

    // Whatever state the first pass left behind, a reset starts over.
    decoder.reset();
    assert_eq!(drain(&mut decoder, data), first);
});
