//! # Transmit Request Queue
//!
//! FIFO handoff of inbound transmit blobs from any producer context to the
//! render step. Producers hold cloneable [`TxQueueHandle`]s; the render step
//! owns the single [`TxQueue`] consumer and polls it without blocking.

use bytes::Bytes;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::trace;

use crate::error::{NordicTxError, Result};

/// Create a connected producer handle and consumer
///
/// The queue is unbounded; backpressure is left to the producer.
pub fn tx_queue() -> (TxQueueHandle, TxQueue) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        TxQueueHandle { sender },
        TxQueue {
            receiver,
            closed: false,
        },
    )
}

/// Producer side of the transmit queue
#[derive(Debug, Clone)]
pub struct TxQueueHandle {
    sender: mpsc::UnboundedSender<Bytes>,
}

impl TxQueueHandle {
    /// Append a blob to the queue
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` if the consumer has been dropped.
    pub fn enqueue(&self, blob: impl Into<Bytes>) -> Result<()> {
        let blob = blob.into();
        let len = blob.len();

        self.sender.send(blob).map_err(|_| NordicTxError::QueueClosed)?;
        trace!("Enqueued transmit request ({} bytes)", len);
        Ok(())
    }
}

/// Consumer side of the transmit queue
#[derive(Debug)]
pub struct TxQueue {
    receiver: mpsc::UnboundedReceiver<Bytes>,
    closed: bool,
}

impl TxQueue {
    /// Remove and return the oldest blob, or `None` if the queue is empty
    ///
    /// Never blocks.
    pub fn try_dequeue(&mut self) -> Option<Bytes> {
        match self.receiver.try_recv() {
            Ok(blob) => Some(blob),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    /// Number of blobs waiting
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// True once every producer handle is gone and the queue has drained
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
