use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::engine::EngineEvent;

type Subscribers = BTreeMap<u64, Sender<EngineEvent>>;

/// Fan-out channel from an engine to its subscribers. Clones share the same subscriber set.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Subscribers>>,
    next_id: Arc<AtomicU64>,
}

/// Handle returned by [`EventBus::subscribe`]. Events queue up until drained.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    receiver: Receiver<EngineEvent>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn drain(&self) -> Vec<EngineEvent> {
        self.receiver.try_iter().collect()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel();
        self.lock().insert(id, sender);
        debug!(subscription = id, "event subscription opened");
        Subscription { id, receiver }
    }

    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let removed = self.lock().remove(&subscription.id).is_some();
        if removed {
            debug!(subscription = subscription.id, "event subscription closed");
        }
        removed
    }

    /// Delivers `event` to every live subscriber and returns how many received it.
    pub fn publish(&self, event: EngineEvent) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|_, sender| sender.send(event.clone()).is_ok());
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        // Senders hold no invariants a panicking publisher could break.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use crate::engine::EngineEvent;

    #[test]
    fn delivers_in_publish_order() {
        let bus = EventBus::new();
        let subscription = bus.subscribe();
        bus.publish(EngineEvent::ScanCount(1));
        bus.publish(EngineEvent::ScanCount(2));

        assert_eq!(
            subscription.drain(),
            vec![EngineEvent::ScanCount(1), EngineEvent::ScanCount(2)]
        );
        assert!(subscription.drain().is_empty());
    }

    #[test]
    fn unsubscribed_handles_stop_receiving() {
        let bus = EventBus::new();
        let first = bus.subscribe();
        let second = bus.clone().subscribe();
        assert_ne!(first.id(), second.id());

        assert!(bus.unsubscribe(&first));
        assert!(!bus.unsubscribe(&first));
        assert_eq!(bus.publish(EngineEvent::ParseCount(3)), 1);
        assert!(first.drain().is_empty());
        assert_eq!(second.drain(), vec![EngineEvent::ParseCount(3)]);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        drop(bus.subscribe());
        assert_eq!(bus.publish(EngineEvent::ScanCount(1)), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
