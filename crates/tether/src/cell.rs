//! Values with synchronous observers and streams of updates.
use std::sync::{Arc, Mutex};

use async_broadcast::{broadcast, Receiver, Sender};
use futures::Stream;

use crate::target::{Observing, Sendable, Syncable};

/// Identifies one observer of a [`ReactiveCell`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

struct Slots<T> {
    current: T,
    next_key: usize,
    observers: Vec<(usize, Arc<Observing<T>>)>,
}

/// Wraps a value `T` and hands every replacement to a set of observers.
///
/// A `ReactiveCell` always holds exactly one current value. Observers are
/// called synchronously and in subscription order on each [`update`], and a
/// late joiner is called once with the current value the moment it
/// subscribes, so it never misses the latest state.
///
/// Cloning the cell is cheap and shares the same slot, which is how a
/// controller hands its cell to the producer task it supervises.
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use tether::cell::ReactiveCell;
///
/// let cell = ReactiveCell::new(0u32);
/// cell.update(1);
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let log = seen.clone();
/// let id = cell.subscribe(move |n: &u32| log.lock().unwrap().push(*n));
/// cell.update(2);
/// cell.unsubscribe(id);
/// cell.update(3);
///
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
/// ```
///
/// [`update`]: ReactiveCell::update
pub struct ReactiveCell<T> {
    slots: Arc<Mutex<Slots<T>>>,
    chan: (Sender<T>, Receiver<T>),
}

impl<T> Clone for ReactiveCell<T> {
    fn clone(&self) -> Self {
        ReactiveCell {
            slots: self.slots.clone(),
            chan: self.chan.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ReactiveCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(&format!("ReactiveCell<{}>", std::any::type_name::<T>()))
            .finish()
    }
}

impl<T: Clone + Sendable> ReactiveCell<T> {
    /// Create a new cell holding the given value.
    pub fn new(value: T) -> Self {
        let (mut tx, rx) = broadcast::<T>(1);
        tx.set_overflow(true);
        // UNWRAP: the channel was just created with room for one message
        tx.try_broadcast(value.clone()).unwrap();

        ReactiveCell {
            slots: Arc::new(Mutex::new(Slots {
                current: value,
                next_key: 0,
                observers: Vec::new(),
            })),
            chan: (tx, rx),
        }
    }

    /// A clone of the current value.
    pub fn read(&self) -> T {
        self.slots.lock().unwrap().current.clone()
    }

    /// Register an observer of every subsequent update.
    ///
    /// The observer is called once, immediately and on the caller's context,
    /// with the current value. The returned id can be handed to
    /// [`ReactiveCell::unsubscribe`] later.
    pub fn subscribe(&self, observer: impl Fn(&T) + Sendable + Syncable) -> SubscriptionId {
        let (id, seen, observer) = {
            let mut slots = self.slots.lock().unwrap();
            let key = slots.next_key;
            slots.next_key += 1;
            let observer: Arc<Observing<T>> = Arc::new(observer);
            slots.observers.push((key, observer.clone()));
            (SubscriptionId(key), slots.current.clone(), observer)
        };
        // Outside the lock, so the observer itself may subscribe or
        // unsubscribe without deadlocking.
        observer(&seen);
        id
    }

    /// Remove an observer.
    ///
    /// Removing an observer that is already gone is a no-op, not an error.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.slots
            .lock()
            .unwrap()
            .observers
            .retain(|(key, _)| *key != id.0);
    }

    /// Replace the current value, then hand it to every registered observer
    /// in subscription order.
    ///
    /// Observers registered while a pass is running are not called for that
    /// pass; observers removed while it is running are skipped for the rest
    /// of it.
    pub fn update(&self, value: T) {
        let roster = {
            let mut slots = self.slots.lock().unwrap();
            slots.current = value.clone();
            slots.observers.clone()
        };
        let _ = self.chan.0.try_broadcast(value.clone());
        for (key, observer) in roster {
            let live = {
                let slots = self.slots.lock().unwrap();
                slots.observers.iter().any(|(k, _)| *k == key)
            };
            if live {
                observer(&value);
            }
        }
    }

    /// Produce a stream of updated values.
    ///
    /// Streams should rely only on receiving the most recent value. When
    /// updates happen in fast succession, earlier sends are clobbered.
    pub fn stream(&self) -> impl Stream<Item = T> {
        self.chan.1.clone()
    }
}

#[cfg(test)]
mod test {
    use std::sync::{Arc, Mutex};

    use futures::StreamExt;

    use super::*;

    fn log_into(seen: &Arc<Mutex<Vec<u32>>>) -> impl Fn(&u32) + Send + Sync + 'static {
        let seen = seen.clone();
        move |n: &u32| seen.lock().unwrap().push(*n)
    }

    #[test]
    fn late_subscriber_immediately_sees_latest() {
        let cell = ReactiveCell::new(0u32);
        cell.update(1);
        cell.update(2);

        let seen = Arc::new(Mutex::new(Vec::new()));
        cell.subscribe(log_into(&seen));
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[test]
    fn notifies_in_subscription_order() {
        let cell = ReactiveCell::new("start".to_string());
        let seen = Arc::new(Mutex::new(Vec::new()));

        for name in ["a", "b", "c"] {
            let log = seen.clone();
            cell.subscribe(move |value: &String| {
                log.lock().unwrap().push(format!("{}:{}", name, value));
            });
        }
        seen.lock().unwrap().clear();

        cell.update("go".to_string());
        assert_eq!(*seen.lock().unwrap(), vec!["a:go", "b:go", "c:go"]);
    }

    #[test]
    fn unsubscribe_during_a_pass_skips_the_rest_of_it() {
        let cell = ReactiveCell::new(0u32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let victim: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        cell.subscribe(log_into(&seen));
        {
            let cell = cell.clone();
            let victim = victim.clone();
            cell.clone().subscribe(move |_: &u32| {
                if let Some(id) = victim.lock().unwrap().take() {
                    cell.unsubscribe(id);
                }
            });
        }
        let last = Arc::new(Mutex::new(Vec::new()));
        *victim.lock().unwrap() = Some(cell.subscribe(log_into(&last)));
        last.lock().unwrap().clear();

        cell.update(7);
        // The first observer ran, the second removed the third mid-pass.
        assert_eq!(*seen.lock().unwrap(), vec![0, 7]);
        assert!(last.lock().unwrap().is_empty());

        // Re-subscribing joins future passes as usual.
        cell.subscribe(log_into(&last));
        cell.update(8);
        assert_eq!(*last.lock().unwrap(), vec![7, 8]);
    }

    #[test]
    fn subscribing_during_a_pass_misses_that_update() {
        let cell = ReactiveCell::new(0u32);
        let joined = Arc::new(Mutex::new(Vec::new()));

        {
            let cell = cell.clone();
            let joined = joined.clone();
            let once = Mutex::new(false);
            cell.clone().subscribe(move |n: &u32| {
                let mut done = once.lock().unwrap();
                if *n == 5 && !*done {
                    *done = true;
                    cell.subscribe(log_into(&joined));
                }
            });
        }

        cell.update(5);
        // The new observer saw 5 exactly once, via its own subscription call,
        // not a second time from the pass that was already running.
        assert_eq!(*joined.lock().unwrap(), vec![5]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let cell = ReactiveCell::new(0u32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let id = cell.subscribe(log_into(&seen));
        cell.unsubscribe(id);
        cell.unsubscribe(id);
        cell.update(1);
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn streams_the_latest_value() {
        let cell = ReactiveCell::new("hello".to_string());
        let updates = cell.stream();
        smol::block_on(async move {
            cell.update("hi".to_string());
            cell.update("goodbye".to_string());
            drop(cell);

            assert_eq!(
                updates.collect::<Vec<_>>().await,
                vec!["goodbye".to_string()]
            );
        });
    }
}
