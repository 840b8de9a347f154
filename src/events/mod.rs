//! Cross-thread event delivery
//!
//! Producers own an [`EventBus`] and expose `subscribe`; consumers hold the
//! returned receiver. Delivery is FIFO per subscriber and marshalled across
//! threads through `std::sync::mpsc`, so no subscriber ever shares mutable
//! state with a producer.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};

/// Fan-out event channel.
///
/// Each subscriber gets its own queue; `emit` clones the event into every
/// live queue and drops senders whose receiver has gone away.
#[derive(Clone)]
pub struct EventBus<T: Clone + Send> {
    subscribers: Arc<Mutex<Vec<Sender<T>>>>,
}

impl<T: Clone + Send> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send> EventBus<T> {
    /// Create a bus with no subscribers
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a new subscriber and return its receiving end
    #[must_use]
    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    /// Deliver an event to every live subscriber, in subscription order
    pub fn emit(&self, event: &T) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    /// Number of live subscribers (disconnected ones are pruned on emit)
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_fifo_order() {
        let bus = EventBus::new();
        let rx = bus.subscribe();

        bus.emit(&1);
        bus.emit(&2);
        bus.emit(&3);

        assert_eq!(rx.try_recv().unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap(), 2);
        assert_eq!(rx.try_recv().unwrap(), 3);
    }

    #[test]
    fn fans_out_to_all_subscribers() {
        let bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.emit(&"hello".to_string());

        assert_eq!(a.try_recv().unwrap(), "hello");
        assert_eq!(b.try_recv().unwrap(), "hello");
    }

    #[test]
    fn prunes_dropped_subscribers() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        drop(rx);

        bus.emit(&0u8);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
