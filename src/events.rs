//! Deferred event delivery.
//!
//! The stack reports events from its own callback context. They are not
//! encoded there; instead they are scheduled onto a bounded FIFO and sent
//! later from the main loop, one at a time, through the same single
//! transmit buffer responses use.
//!
//! ```text
//! ┌─────────────┐  schedule  ┌──────────────┐   run   ┌──────────────┐
//! │ Stack event │──────────▶│  EventQueue  │───────▶│  Transport   │
//! │  callback   │            │   (FIFO)     │         │  (one TX)    │
//! └─────────────┘            └──────────────┘         └──────────────┘
//! ```
//!
//! A full queue is a reportable fault: [`EventQueue::schedule`] hands the
//! error back to the caller and nothing is dropped silently. An event whose
//! write fails is held and goes out first on the next run.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, warn};

use crate::config::EVENT_QUEUE_DEPTH;
use crate::error::{Error, Result};
use crate::rpc::event::Event;
use crate::rpc::transport::Transport;

/// Bounded FIFO of events awaiting transmission.
///
/// Can live in a `static`: scheduling takes `&self`.
pub struct EventQueue<const N: usize = EVENT_QUEUE_DEPTH> {
    channel: Channel<CriticalSectionRawMutex, Event, N>,
    /// Dequeued but not yet written.
    held: Mutex<CriticalSectionRawMutex, RefCell<Option<Event>>>,
    rejected: AtomicU32,
    dropped: AtomicU32,
}

impl<const N: usize> EventQueue<N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            held: Mutex::new(RefCell::new(None)),
            rejected: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue an event for later delivery.
    pub fn schedule(&self, event: Event) -> Result<()> {
        self.channel.try_send(event).map_err(|_| {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            warn!("EVT: queue full ({} pending), event refused", N);
            Error::EventQueueFull
        })
    }

    /// Pending events, including one held back by a failed write.
    pub fn len(&self) -> usize {
        self.channel.len() + usize::from(self.has_held())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events refused since creation.
    pub fn rejected_count(&self) -> u32 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Events discarded because they could not be encoded.
    pub fn dropped_count(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn has_held(&self) -> bool {
        self.held.lock(|held| held.borrow().is_some())
    }

    fn next(&self) -> Option<Event> {
        self.held
            .lock(|held| held.borrow_mut().take())
            .or_else(|| self.channel.try_receive().ok())
    }

    fn hold(&self, event: Event) {
        self.held.lock(|held| *held.borrow_mut() = Some(event));
    }

    /// Send every queued event, oldest first.
    ///
    /// Must be the only consumer. Stops at the first transport failure and
    /// keeps the event it was sending for the next run. An event that does
    /// not encode into one buffer never will; it is dropped and counted.
    pub fn run<T: Transport>(&self, transport: &mut T) -> Result<usize> {
        let mut sent = 0;
        while let Some(event) = self.next() {
            let mut tx = match transport.alloc_tx_buffer() {
                Ok(tx) => tx,
                Err(_) => {
                    self.hold(event);
                    return Err(Error::Transport("tx buffer unavailable"));
                }
            };

            if let Err(e) = tx.fill(|w| event.encode(w)) {
                transport.free_tx_buffer(tx);
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("EVT[0x{:04x}]: encode failed, dropped: {}", event.body.id(), e);
                return Err(e.into());
            }

            if transport.write(tx).is_err() {
                warn!("EVT[0x{:04x}]: write failed, held for retry", event.body.id());
                self.hold(event);
                return Err(Error::Transport("event write failed"));
            }
            debug!("EVT[0x{:04x}]: sent (conn {})", event.body.id(), event.conn_handle);
            sent += 1;
        }
        Ok(sent)
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
