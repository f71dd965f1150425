//! # Channel Multiplexer
//!
//! Pull-based render step that turns at most one queued transmit request per
//! tick into bytes on one of several output channels.
//!
//! ## Output buffer contract
//!
//! For a packet of `L` bytes targeting channel `c`, one tick writes:
//!
//! ```text
//! outputs[c][0..L]      packet bytes
//! outputs[c][L..2L]     NOT WRITTEN (keeps whatever the caller left there)
//! outputs[c][2L..3L]    packet bytes again
//! outputs[k][0..2L]     zeros, for every k != c
//! ```
//!
//! and reports `2L` items produced. Callers that need a defined value in the
//! gap must clear it before the tick. Target buffers must hold `3L` bytes and
//! all others `2L`.

use tracing::{debug, warn};

use super::queue::{tx_queue, TxQueue, TxQueueHandle};
use super::request::TransmitRequest;
use crate::error::{NordicTxError, Result};
use crate::shockburst::protocol::ShockburstPacket;

/// Maximum number of output channels
pub const MAX_CHANNEL_COUNT: u8 = 32;

/// Consecutive deferred ticks before a stuck packet is reported at warn level
pub const DEFER_WARN_TICKS: u32 = 8;

/// A packet encoded but not yet written, waiting for large enough buffers
#[derive(Debug)]
struct PendingPacket {
    channel: u8,
    packet: ShockburstPacket,
}

/// Multi-channel Enhanced ShockBurst transmitter
#[derive(Debug)]
pub struct NordicTx {
    channel_count: u8,
    queue: TxQueue,
    pending: Option<PendingPacket>,
    deferred_ticks: u32,
    packets_rendered: u64,
    requests_dropped: u64,
}

impl NordicTx {
    /// Create a transmitter with `channel_count` outputs
    ///
    /// # Returns
    ///
    /// * `Result<(NordicTx, TxQueueHandle)>` - Transmitter and the producer
    ///   handle feeding its queue
    ///
    /// # Errors
    ///
    /// Returns error if `channel_count` is 0 or above [`MAX_CHANNEL_COUNT`]
    pub fn new(channel_count: u8) -> Result<(Self, TxQueueHandle)> {
        let (handle, queue) = tx_queue();
        Ok((Self::with_queue(channel_count, queue)?, handle))
    }

    /// Create a transmitter draining an existing queue
    pub fn with_queue(channel_count: u8, queue: TxQueue) -> Result<Self> {
        if channel_count == 0 || channel_count > MAX_CHANNEL_COUNT {
            return Err(NordicTxError::OutputBuffer(
                format!("channel count {} (must be 1-{})", channel_count, MAX_CHANNEL_COUNT)
            ));
        }

        Ok(Self {
            channel_count,
            queue,
            pending: None,
            deferred_ticks: 0,
            packets_rendered: 0,
            requests_dropped: 0,
        })
    }

    /// Run one render tick
    ///
    /// Takes the deferred packet if there is one, otherwise polls the queue
    /// without blocking. An idle tick returns `Ok(0)` and touches no buffer.
    ///
    /// # Arguments
    ///
    /// * `noutput_items` - Items the caller can accept per buffer this tick
    /// * `outputs` - One buffer per channel
    ///
    /// # Returns
    ///
    /// * `Result<usize>` - Items produced per buffer (`2L`, or 0)
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `outputs.len()` differs from the channel count (nothing is dequeued)
    /// - The dequeued blob is malformed, targets a missing channel, or has
    ///   unsupported lengths; the request is dropped
    ///
    /// If the packet does not fit `noutput_items` or the buffers, it is kept
    /// for the next tick and `Ok(0)` is returned.
    pub fn work(&mut self, noutput_items: usize, outputs: &mut [&mut [u8]]) -> Result<usize> {
        if outputs.len() != self.channel_count as usize {
            return Err(NordicTxError::OutputBuffer(
                format!("expected {} output buffers, got {}", self.channel_count, outputs.len())
            ));
        }

        let pending = match self.pending.take() {
            Some(pending) => pending,
            None => match self.queue.try_dequeue() {
                Some(blob) => self.prepare(&blob)?,
                None => return Ok(0),
            },
        };

        let length = pending.packet.byte_length();
        let produced = length * 2;

        if !Self::fits(pending.channel as usize, length, noutput_items, outputs) {
            self.deferred_ticks = self.deferred_ticks.saturating_add(1);
            if self.deferred_ticks == DEFER_WARN_TICKS {
                warn!(
                    "{}-byte packet for channel {} deferred for {} ticks: needs {} items and {}-byte target buffer, budget {}",
                    length, pending.channel, self.deferred_ticks, produced, length * 3, noutput_items
                );
            } else {
                debug!(
                    "Deferring {}-byte packet for channel {}: budget {} items",
                    length, pending.channel, noutput_items
                );
            }
            self.pending = Some(pending);
            return Ok(0);
        }
        self.deferred_ticks = 0;

        let bytes = pending.packet.bytes();
        for (channel, out) in outputs.iter_mut().enumerate() {
            if channel == pending.channel as usize {
                out[..length].copy_from_slice(bytes);
                out[length * 2..length * 3].copy_from_slice(bytes);
            } else {
                out[..produced].fill(0);
            }
        }

        self.packets_rendered += 1;
        debug!(
            "Rendered {}-byte packet on channel {} ({} items)",
            length, pending.channel, produced
        );

        Ok(produced)
    }

    /// Decode and encode a dequeued blob, dropping it on failure
    fn prepare(&mut self, blob: &[u8]) -> Result<PendingPacket> {
        let result = TransmitRequest::from_blob(blob).and_then(|request| {
            if request.channel >= self.channel_count {
                return Err(NordicTxError::InvalidChannel {
                    channel: request.channel,
                    channel_count: self.channel_count,
                });
            }

            Ok(PendingPacket {
                channel: request.channel,
                packet: request.encode()?,
            })
        });

        if let Err(e) = &result {
            self.requests_dropped += 1;
            warn!("Dropping transmit request: {}", e);
        }

        result
    }

    fn fits(target: usize, length: usize, noutput_items: usize, outputs: &[&mut [u8]]) -> bool {
        if noutput_items < length * 2 {
            return false;
        }

        outputs.iter().enumerate().all(|(channel, out)| {
            let needed = if channel == target { length * 3 } else { length * 2 };
            out.len() >= needed
        })
    }

    pub fn channel_count(&self) -> u8 {
        self.channel_count
    }

    /// True if a packet is waiting for larger buffers
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consecutive ticks the pending packet has waited for room
    pub fn deferred_ticks(&self) -> u32 {
        self.deferred_ticks
    }

    /// True when nothing is pending and the queue is empty
    pub fn is_idle(&self) -> bool {
        self.pending.is_none() && self.queue.is_empty()
    }

    /// True once all producers are gone and everything has been rendered
    pub fn is_finished(&self) -> bool {
        self.pending.is_none() && self.queue.is_empty() && self.queue.is_closed()
    }

    pub fn packets_rendered(&self) -> u64 {
        self.packets_rendered
    }

    pub fn requests_dropped(&self) -> u64 {
        self.requests_dropped
    }
}
