use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use futures::Stream;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use super::ChangeEvent;

pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// A published change event stamped with its bus sequence number.
#[derive(Debug, Clone)]
pub struct BusEvent {
    pub seq: u64,
    pub published_at: String,
    pub change: ChangeEvent,
}

/// Live-only fan-out of change events.
///
/// Every subscriber reads from its own cursor into a bounded ring. A slow
/// subscriber that falls more than `capacity` events behind loses the oldest
/// ones; publishers and other subscribers are never held up.
pub struct EventBus {
    tx: broadcast::Sender<BusEvent>,
    seq: AtomicU64,
    next_subscriber: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            seq: AtomicU64::new(0),
            next_subscriber: AtomicU64::new(1),
        }
    }

    /// Publish `change` to everyone currently subscribed. Returns the stamped
    /// event; having no subscribers is not an error.
    pub fn publish(&self, change: ChangeEvent) -> BusEvent {
        let event = BusEvent {
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            published_at: Utc::now().to_rfc3339(),
            change,
        };
        match self.tx.send(event.clone()) {
            Ok(receivers) => tracing::debug!(
                seq = event.seq,
                event_type = event.change.event_type(),
                receivers,
                "published change event"
            ),
            Err(_) => tracing::debug!(
                seq = event.seq,
                event_type = event.change.event_type(),
                "no subscribers for change event"
            ),
        }
        event
    }

    /// Start receiving events published from now on. Nothing is replayed.
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let rx = self.tx.subscribe();
        tracing::info!(subscriber = id, active = self.subscriber_count(), "subscriber attached");
        Subscription { id, rx }
    }

    /// Detach a subscriber. Dropping the subscription has the same effect.
    pub fn unsubscribe(&self, subscription: Subscription) {
        drop(subscription);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// One listener's delivery path.
pub struct Subscription {
    id: u64,
    rx: broadcast::Receiver<BusEvent>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next event. Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<BusEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(subscriber = self.id, skipped, "subscriber lagged, dropped oldest events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<BusEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(subscriber = self.id, skipped, "subscriber lagged, dropped oldest events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Turn the subscription into a stream that ends when the bus closes.
    /// Dropping the stream unsubscribes.
    pub fn into_stream(self) -> impl Stream<Item = BusEvent> + Send + 'static {
        futures::stream::unfold(self, |mut subscription| async move {
            let event = subscription.recv().await?;
            Some((event, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        tracing::info!(subscriber = self.id, "subscriber detached");
    }
}
