//! Publish/subscribe bus for app-wide events such as purchase attempts.
//!
//! Any part of the app can publish a purchase attempt; the impulse guard (or
//! anything else) subscribes. A subscription is a channel receiver: dropping
//! it unsubscribes, so a listener's lifetime is its scope.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A purchase is about to happen (demo buttons, CLI `guard`).
    PurchaseAttempt { amount: f64, merchant: String },
    GuardToggled { enabled: bool },
}

pub struct EventBus<E> {
    subscribers: Vec<(u64, Sender<E>)>,
    next_id: u64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
        }
    }
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription<E> {
        let (tx, rx) = mpsc::channel();
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, tx));
        Subscription { id, rx }
    }

    /// Deliver `event` to every live subscriber, pruning dropped ones.
    /// Returns how many subscribers received it.
    pub fn publish(&mut self, event: &E) -> usize {
        self.subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
        let delivered = self.subscribers.len();
        tracing::debug!(delivered, "event published");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

pub struct Subscription<E> {
    id: u64,
    rx: Receiver<E>,
}

impl<E> Subscription<E> {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next pending event, if any.
    pub fn try_next(&self) -> Option<E> {
        match self.rx.try_recv() {
            Ok(e) => Some(e),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// All events published since the last drain, in publish order.
    pub fn drain(&self) -> Vec<E> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(amount: f64) -> AppEvent {
        AppEvent::PurchaseAttempt {
            amount,
            merchant: "Zalando".to_string(),
        }
    }

    #[test]
    fn test_publish_reaches_all_subscribers() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        assert_ne!(a.id(), b.id());
        assert_eq!(bus.publish(&attempt(10.0)), 2);
        assert_eq!(a.try_next(), Some(attempt(10.0)));
        assert_eq!(b.drain(), vec![attempt(10.0)]);
        assert_eq!(a.try_next(), None);
    }

    #[test]
    fn test_dropped_subscription_unsubscribes() {
        let mut bus = EventBus::new();
        let keep = bus.subscribe();
        {
            let _scoped = bus.subscribe();
            assert_eq!(bus.subscriber_count(), 2);
        }
        assert_eq!(bus.publish(&AppEvent::GuardToggled { enabled: false }), 1);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.drain().len(), 1);
    }

    #[test]
    fn test_no_subscribers_is_not_an_error() {
        let mut bus: EventBus<AppEvent> = EventBus::new();
        assert_eq!(bus.publish(&attempt(1.0)), 0);
    }

    #[test]
    fn test_events_keep_publish_order() {
        let mut bus = EventBus::new();
        let sub = bus.subscribe();
        bus.publish(&attempt(1.0));
        bus.publish(&attempt(2.0));
        assert_eq!(sub.drain(), vec![attempt(1.0), attempt(2.0)]);
    }
}
