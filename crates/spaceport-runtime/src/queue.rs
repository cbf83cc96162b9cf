//! In-process asynchronous boundary.
//!
//! [`LocalQueue`] is a bounded channel: the router enqueues without waiting
//! so the webhook caller is answered immediately, and [`consume`] drains the
//! other end, dispatching each envelope on its own task.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use spaceport_core::{
    Envelope, EnvelopeSink, EnvelopeSource, TransportError, TransportEvent, TransportResult,
};

use crate::router::IngressRouter;

/// Producing half of the in-process queue.
#[derive(Debug, Clone)]
pub struct LocalQueue {
    tx: mpsc::Sender<Envelope>,
}

/// Consuming half of the in-process queue.
#[derive(Debug)]
pub struct LocalQueueReceiver {
    rx: mpsc::Receiver<Envelope>,
}

impl LocalQueue {
    /// Creates a queue holding at most `capacity` envelopes.
    pub fn new(capacity: usize) -> (Self, LocalQueueReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, LocalQueueReceiver { rx })
    }

    /// Envelopes currently waiting.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EnvelopeSink for LocalQueue {
    async fn enqueue(&self, envelope: Envelope) -> TransportResult<()> {
        self.tx.try_send(envelope).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

#[async_trait]
impl EnvelopeSource for LocalQueueReceiver {
    async fn dequeue(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }
}

/// Feeds every dequeued envelope to `router` until cancelled or the source
/// closes, then waits for in-flight dispatches.
///
/// Returns the source so a later run can resume draining it.
pub async fn consume<S: EnvelopeSource>(
    mut source: S,
    router: IngressRouter,
    cancel: CancellationToken,
) -> S {
    let tracker = TaskTracker::new();
    info!("Queue consumer started");

    loop {
        let envelope = tokio::select! {
            _ = cancel.cancelled() => break,
            next = source.dequeue() => match next {
                Some(envelope) => envelope,
                None => {
                    warn!("Queue closed");
                    break;
                }
            },
        };

        debug!(endpoint = %envelope.endpoint, "Dequeued envelope");
        let router = router.clone();
        tracker.spawn(async move {
            router.handle(TransportEvent::Queued(envelope)).await;
        });
    }

    tracker.close();
    tracker.wait().await;
    info!("Queue consumer stopped");
    source
}
