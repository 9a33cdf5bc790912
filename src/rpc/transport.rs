//! Transport abstraction.
//!
//! Two layers:
//!
//! - [`ByteLink`]: any byte-oriented channel (UART, SPI, USB CDC).
//! - [`Transport`]: packet-level open/close/read/write plus ownership of
//!   the single transmit buffer. [`FramedTransport`] builds one on top of
//!   a `ByteLink` using the length-prefix codec.
//!
//! The transmit buffer is an owned [`TxBuffer`]. A transport hands it out
//! through [`Transport::alloc_tx_buffer`] and gets it back in
//! [`Transport::write`]; while it is out, a second allocation fails. Only
//! [`TxSlot`] can mint a buffer, so one response (or event) in flight is
//! enforced by ownership rather than by convention.

use crate::config::{MAX_FRAME_SIZE, TX_BUFFER_SIZE};
use crate::rpc::codec::{FrameDecoder, HEADER_SIZE, encode_frame};
use crate::rpc::cursor::FieldWriter;

// ── Transmit buffer ───────────────────────────────────────────

/// The transmit scratch buffer.
pub struct TxBuffer {
    data: [u8; TX_BUFFER_SIZE],
    len: usize,
}

impl TxBuffer {
    const fn new() -> Self {
        Self {
            data: [0; TX_BUFFER_SIZE],
            len: 0,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Replace the contents with whatever `f` writes.
    ///
    /// On error the bytes written before the failure are kept; callers
    /// normally `clear` and write a fallback.
    pub fn fill<E>(
        &mut self,
        f: impl FnOnce(&mut FieldWriter<'_>) -> Result<(), E>,
    ) -> Result<usize, E> {
        let mut w = FieldWriter::new(&mut self.data);
        let result = f(&mut w);
        self.len = w.len();
        result.map(|()| self.len)
    }
}

impl core::fmt::Debug for TxBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TxBuffer").field("len", &self.len).finish()
    }
}

/// Holder of the one transmit buffer a transport owns.
#[derive(Debug)]
pub struct TxSlot {
    buf: Option<TxBuffer>,
}

impl TxSlot {
    pub const fn new() -> Self {
        Self {
            buf: Some(TxBuffer::new()),
        }
    }

    /// Take the buffer, emptied. `None` while it is already out.
    pub fn acquire(&mut self) -> Option<TxBuffer> {
        self.buf.take().map(|mut b| {
            b.clear();
            b
        })
    }

    /// Return the buffer after a write completes.
    pub fn release(&mut self, buf: TxBuffer) {
        self.buf = Some(buf);
    }

    pub fn is_busy(&self) -> bool {
        self.buf.is_none()
    }
}

impl Default for TxSlot {
    fn default() -> Self {
        Self::new()
    }
}

// ── Packet-level transport ────────────────────────────────────

/// Packet-level transport.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    fn open(&mut self) -> Result<(), Self::Error>;

    fn close(&mut self) -> Result<(), Self::Error>;

    /// Copy the next complete received packet into `buf`.
    /// Returns `Ok(None)` when nothing is pending.
    fn read_frame(&mut self, buf: &mut [u8]) -> Result<Option<usize>, Self::Error>;

    /// Take exclusive ownership of the transmit buffer.
    fn alloc_tx_buffer(&mut self) -> Result<TxBuffer, Self::Error>;

    /// Send the buffer's contents. The buffer is returned to the
    /// transport whether or not the write succeeds.
    fn write(&mut self, buf: TxBuffer) -> Result<(), Self::Error>;

    /// Hand the buffer back without sending anything.
    fn free_tx_buffer(&mut self, buf: TxBuffer);
}

/// A transport that never receives and discards all writes.
/// Useful as a default when no host is attached.
#[derive(Debug, Default)]
pub struct NullTransport {
    slot: TxSlot,
}

impl NullTransport {
    pub const fn new() -> Self {
        Self {
            slot: TxSlot::new(),
        }
    }
}

impl Transport for NullTransport {
    type Error = TransportError;

    fn open(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn read_frame(&mut self, _buf: &mut [u8]) -> Result<Option<usize>, TransportError> {
        Ok(None)
    }

    fn alloc_tx_buffer(&mut self) -> Result<TxBuffer, TransportError> {
        self.slot.acquire().ok_or(TransportError::TxBusy)
    }

    fn write(&mut self, buf: TxBuffer) -> Result<(), TransportError> {
        self.slot.release(buf);
        Ok(())
    }

    fn free_tx_buffer(&mut self, buf: TxBuffer) {
        self.slot.release(buf);
    }
}

// ── Byte-level link ───────────────────────────────────────────

/// Byte-oriented channel.
pub trait ByteLink {
    /// Error type for this link.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write all of `data`.
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The link has not been opened.
    Closed,
    /// The transmit buffer is already out.
    TxBusy,
    /// A received packet does not fit the caller's buffer.
    FrameTooLarge,
    /// The packet cannot be framed (empty or oversized).
    Unframeable,
    /// The underlying link failed.
    Io,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Closed => write!(f, "link closed"),
            Self::TxBusy => write!(f, "transmit buffer busy"),
            Self::FrameTooLarge => write!(f, "frame too large"),
            Self::Unframeable => write!(f, "packet cannot be framed"),
            Self::Io => write!(f, "link I/O error"),
        }
    }
}

const READ_CHUNK: usize = 64;

/// Length-prefix framing over a [`ByteLink`].
pub struct FramedTransport<L: ByteLink> {
    link: L,
    decoder: FrameDecoder,
    slot: TxSlot,
    open: bool,
    chunk: [u8; READ_CHUNK],
    chunk_pos: usize,
    chunk_len: usize,
}

impl<L: ByteLink> FramedTransport<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            decoder: FrameDecoder::new(),
            slot: TxSlot::new(),
            open: false,
            chunk: [0; READ_CHUNK],
            chunk_pos: 0,
            chunk_len: 0,
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

impl<L: ByteLink> Transport for FramedTransport<L> {
    type Error = TransportError;

    fn open(&mut self) -> Result<(), TransportError> {
        self.decoder.reset();
        self.chunk_pos = 0;
        self.chunk_len = 0;
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.open = false;
        self.link.flush().map_err(|_| TransportError::Io)
    }

    fn read_frame(&mut self, buf: &mut [u8]) -> Result<Option<usize>, TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        loop {
            if self.chunk_pos == self.chunk_len {
                let n = self.link.read(&mut self.chunk).map_err(|_| TransportError::Io)?;
                if n == 0 {
                    return Ok(None);
                }
                self.chunk_pos = 0;
                self.chunk_len = n;
            }

            let (used, frame) = self.decoder.feed(&self.chunk[self.chunk_pos..self.chunk_len]);
            let copied = match frame {
                Some(frame) if frame.len() > buf.len() => Err(TransportError::FrameTooLarge),
                Some(frame) => {
                    buf[..frame.len()].copy_from_slice(frame);
                    Ok(Some(frame.len()))
                }
                None => Ok(None),
            };
            self.chunk_pos += used;

            match copied {
                Ok(None) => continue,
                other => return other,
            }
        }
    }

    fn alloc_tx_buffer(&mut self) -> Result<TxBuffer, TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        self.slot.acquire().ok_or(TransportError::TxBusy)
    }

    fn write(&mut self, buf: TxBuffer) -> Result<(), TransportError> {
        let mut framed = [0u8; HEADER_SIZE + MAX_FRAME_SIZE];
        let result = match encode_frame(buf.as_slice(), &mut framed) {
            Some(n) => self
                .link
                .write_all(&framed[..n])
                .and_then(|()| self.link.flush())
                .map_err(|_| TransportError::Io),
            None => Err(TransportError::Unframeable),
        };
        self.slot.release(buf);
        result
    }

    fn free_tx_buffer(&mut self, buf: TxBuffer) {
        self.slot.release(buf);
    }
}
