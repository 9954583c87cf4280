//! Observable state container.
//!
//! A [`StateCell`] owns one value and notifies subscribers after every
//! change. The trainer uses it to persist the deck and the counters whenever
//! they change, without the core knowing about storage.

use std::fmt;

/// Callback invoked with the new value after a change.
pub type Subscriber<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Handle returned by [`StateCell::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A value plus the callbacks watching it.
pub struct StateCell<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_id: u64,
}

impl<T> StateCell<T> {
    /// Create a cell with no subscribers.
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and notify subscribers.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.notify();
    }

    /// Mutate the value in place and notify subscribers.
    ///
    /// Returns whatever the closure returns.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.value);
        self.notify();
        result
    }

    /// Register a callback for future changes.
    ///
    /// The callback is not invoked for the current value.
    pub fn subscribe(&mut self, subscriber: Subscriber<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    /// Remove a callback. Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn notify(&self) {
        for (_, subscriber) in &self.subscribers {
            subscriber(&self.value);
        }
    }
}

impl<T: Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<i32>>>, Subscriber<i32>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscriber: Subscriber<i32> = Box::new(move |v: &i32| sink.lock().unwrap().push(*v));
        (seen, subscriber)
    }

    #[test]
    fn test_get_and_set() {
        let mut cell = StateCell::new(1);
        assert_eq!(*cell.get(), 1);
        cell.set(2);
        assert_eq!(*cell.get(), 2);
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let mut cell = StateCell::new(0);
        let (seen, subscriber) = recorder();
        cell.subscribe(subscriber);

        cell.set(5);
        let doubled = cell.update(|v| {
            *v *= 2;
            *v
        });

        assert_eq!(doubled, 10);
        assert_eq!(*seen.lock().unwrap(), vec![5, 10]);
    }

    #[test]
    fn test_subscribe_does_not_fire_immediately() {
        let mut cell = StateCell::new(3);
        let (seen, subscriber) = recorder();
        cell.subscribe(subscriber);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let mut cell = StateCell::new(0);
        let (first, a) = recorder();
        let (second, b) = recorder();
        let id = cell.subscribe(a);
        cell.subscribe(b);

        assert!(cell.unsubscribe(id));
        assert!(!cell.unsubscribe(id));
        cell.set(9);

        assert!(first.lock().unwrap().is_empty());
        assert_eq!(*second.lock().unwrap(), vec![9]);
    }
}
