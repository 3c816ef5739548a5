use model::events::Event;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

type SubscriberMap = HashMap<TypeId, HashMap<u64, Box<dyn Any + Send + Sync>>>;

/// A subscription handle that can be used to unsubscribe from events.
#[derive(Debug, Clone)]
pub struct Subscription {
    event_type_id: TypeId,
    subscriber_id: u64,
}

/// Typed fan-out of run lifecycle events.
///
/// Publishing never blocks the scheduler: a subscriber whose channel is full
/// misses the event and a warning is logged.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<SubscriberMap>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe<E>(&self, sender: mpsc::Sender<Arc<E>>) -> Subscription
    where
        E: Event + Clone,
    {
        let event_type_id = TypeId::of::<E>();
        let subscriber_id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.subscribers
            .write()
            .await
            .entry(event_type_id)
            .or_default()
            .insert(subscriber_id, Box::new(sender));

        debug!(
            event_type = std::any::type_name::<E>(),
            subscriber_id, "Subscribed to event"
        );

        Subscription {
            event_type_id,
            subscriber_id,
        }
    }

    /// Subscribes with a freshly created bounded channel.
    pub async fn channel<E>(&self, capacity: usize) -> (Subscription, mpsc::Receiver<Arc<E>>)
    where
        E: Event + Clone,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let subscription = self.subscribe(tx).await;
        (subscription, rx)
    }

    pub async fn publish<E>(&self, event: E)
    where
        E: Event + Clone,
    {
        let event_type_id = TypeId::of::<E>();
        let subscribers = self.subscribers.read().await;

        let Some(type_subscribers) = subscribers.get(&event_type_id) else {
            debug!(event_type = event.event_type(), "No subscribers for event");
            return;
        };

        let event = Arc::new(event);
        for (subscriber_id, boxed_sender) in type_subscribers {
            let Some(sender) = boxed_sender.downcast_ref::<mpsc::Sender<Arc<E>>>() else {
                warn!(
                    event_type = event.event_type(),
                    subscriber_id, "Failed to downcast sender for subscriber"
                );
                continue;
            };

            if let Err(e) = sender.try_send(event.clone()) {
                warn!(
                    event_type = event.event_type(),
                    subscriber_id,
                    error = %e,
                    "Dropped event for subscriber"
                );
            }
        }
    }

    pub async fn unsubscribe(&self, subscription: Subscription) {
        let mut subscribers = self.subscribers.write().await;

        if let Some(type_subscribers) = subscribers.get_mut(&subscription.event_type_id) {
            type_subscribers.remove(&subscription.subscriber_id);
            if type_subscribers.is_empty() {
                subscribers.remove(&subscription.event_type_id);
            }
        }
    }

    pub async fn subscriber_count<E>(&self) -> usize
    where
        E: Event,
    {
        self.subscribers
            .read()
            .await
            .get(&TypeId::of::<E>())
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{core::identifiers::RunId, events::RunResumed};

    fn resumed() -> RunResumed {
        RunResumed {
            run_id: RunId::from("run-1"),
            timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn delivers_to_typed_subscribers() {
        let bus = EventBus::new();
        let (_sub, mut rx) = bus.channel::<RunResumed>(4).await;

        bus.publish(resumed()).await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.run_id.as_str(), "run-1");
    }

    #[tokio::test]
    async fn unsubscribe_removes_subscriber() {
        let bus = EventBus::new();
        let (sub, _rx) = bus.channel::<RunResumed>(4).await;
        assert_eq!(bus.subscriber_count::<RunResumed>().await, 1);

        bus.unsubscribe(sub).await;
        assert_eq!(bus.subscriber_count::<RunResumed>().await, 0);
    }

    #[tokio::test]
    async fn full_subscriber_does_not_block_publisher() {
        let bus = EventBus::new();
        let (_sub, mut rx) = bus.channel::<RunResumed>(1).await;

        bus.publish(resumed()).await;
        bus.publish(resumed()).await;

        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }
}
