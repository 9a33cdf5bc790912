//! Packet header and byte-stream framing.
//!
//! Every serialized packet starts with a packet-type tag:
//!
//! ```text
//! Command   := CMD   op_code:1  payload
//! Response  := RESP  op_code:1  status:4  [payload]
//! Event     := EVT   evt_id:2   payload
//! ```
//!
//! On byte-stream links (UART) each packet is additionally wrapped in a
//! 2-byte little-endian length prefix:
//!
//! ```text
//! ┌────────────┬──────────────────────┐
//! │ Length (2B)│ Packet (N B)         │
//! │ LE u16     │                      │
//! └────────────┴──────────────────────┘
//! ```
//!
//! [`FrameDecoder`] accumulates incoming bytes and yields complete
//! packets. A single read may deliver part of the header, part of the
//! packet, or several packets back to back.

use crate::config::MAX_FRAME_SIZE;

pub mod packet_type {
    pub const CMD: u8 = 0x00;
    pub const RESP: u8 = 0x01;
    pub const EVT: u8 = 0x02;
}

/// Stream framing header size (2-byte little-endian length).
pub const HEADER_SIZE: usize = 2;

/// Leading bytes of a command packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandHeader {
    pub op_code: u8,
}

impl CommandHeader {
    /// Split a packet into its command header and payload.
    ///
    /// Returns `None` when the packet is not a command or is too short to
    /// carry an op code; such packets cannot be answered.
    pub fn parse(packet: &[u8]) -> Option<(Self, &[u8])> {
        match packet {
            [packet_type::CMD, op_code, payload @ ..] => Some((Self { op_code: *op_code }, payload)),
            _ => None,
        }
    }
}

/// Decoder state machine.
enum DecoderState {
    /// Waiting for header bytes.
    ReadingHeader { collected: usize },
    /// Header received, reading the packet.
    ReadingPayload { expected: usize, collected: usize },
}

/// Streaming frame decoder.
pub struct FrameDecoder {
    state: DecoderState,
    header_buf: [u8; HEADER_SIZE],
    payload_buf: [u8; MAX_FRAME_SIZE],
    /// Frames discarded for a zero or oversized length prefix.
    rejected: u32,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::ReadingHeader { collected: 0 },
            header_buf: [0; HEADER_SIZE],
            payload_buf: [0; MAX_FRAME_SIZE],
            rejected: 0,
        }
    }

    /// Feed bytes into the decoder.
    ///
    /// Returns how many bytes of `data` were consumed and, once a packet
    /// is complete, the packet itself. Bytes after a completed packet are
    /// left unconsumed; feed them again after handling the packet. The
    /// returned slice is valid until the next call to `feed`.
    pub fn feed(&mut self, data: &[u8]) -> (usize, Option<&[u8]>) {
        let mut offset = 0;

        while offset < data.len() {
            match &mut self.state {
                DecoderState::ReadingHeader { collected } => {
                    let needed = HEADER_SIZE - *collected;
                    let to_copy = needed.min(data.len() - offset);

                    self.header_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);

                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == HEADER_SIZE {
                        let expected = u16::from_le_bytes(self.header_buf) as usize;

                        if expected == 0 || expected > MAX_FRAME_SIZE {
                            // Invalid length; resynchronise on the next header.
                            self.rejected = self.rejected.saturating_add(1);
                            self.state = DecoderState::ReadingHeader { collected: 0 };
                            continue;
                        }

                        self.state = DecoderState::ReadingPayload {
                            expected,
                            collected: 0,
                        };
                    }
                }

                DecoderState::ReadingPayload {
                    expected,
                    collected,
                } => {
                    let needed = *expected - *collected;
                    let to_copy = needed.min(data.len() - offset);

                    self.payload_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);

                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == *expected {
                        let len = *expected;
                        self.state = DecoderState::ReadingHeader { collected: 0 };
                        return (offset, Some(&self.payload_buf[..len]));
                    }
                }
            }
        }

        (offset, None)
    }

    /// Reset decoder state (e.g. after the link is reopened).
    pub fn reset(&mut self) {
        self.state = DecoderState::ReadingHeader { collected: 0 };
    }

    pub fn rejected_count(&self) -> u32 {
        self.rejected
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a packet in a length-prefixed frame.
///
/// Writes `[LE-u16 length][packet]` into `out_buf` and returns the total
/// number of bytes written.
pub fn encode_frame(packet: &[u8], out_buf: &mut [u8]) -> Option<usize> {
    let total = HEADER_SIZE + packet.len();
    if packet.is_empty() || packet.len() > MAX_FRAME_SIZE || total > out_buf.len() {
        return None;
    }

    out_buf[..HEADER_SIZE].copy_from_slice(&(packet.len() as u16).to_le_bytes());
    out_buf[HEADER_SIZE..total].copy_from_slice(packet);

    Some(total)
}
