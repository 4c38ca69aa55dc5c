//! Cooperative cancellation of producer tasks.
use std::{
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll, Waker},
};

use futures::Future;

#[derive(Default)]
struct Flag {
    raised: bool,
    next_key: usize,
    wakers: Vec<(usize, Waker)>,
}

/// A clonable one-way stop flag.
///
/// Producer tasks observe the flag at their suspension points by racing
/// [`StopSignal::stopped`] against whatever they are waiting on. Raising the
/// flag never interrupts in-flight work, it only makes the next suspension
/// point resolve immediately.
///
/// ```rust
/// use tether::cancel::StopSignal;
///
/// let signal = StopSignal::new();
/// assert!(!signal.is_stopped());
/// signal.stop();
/// signal.stop(); // raising twice is fine
/// assert!(signal.is_stopped());
/// ```
#[derive(Clone, Default)]
pub struct StopSignal {
    flag: Arc<Mutex<Flag>>,
}

impl std::fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopSignal")
            .field("raised", &self.is_stopped())
            .finish()
    }
}

impl StopSignal {
    /// Create a new, unraised signal.
    pub fn new() -> Self {
        Default::default()
    }

    /// Raise the flag, waking every task parked on [`StopSignal::stopped`].
    ///
    /// Raising an already raised flag is a no-op.
    pub fn stop(&self) {
        // UNWRAP: a panic while raising the flag is unrecoverable anyway
        let mut flag = self.flag.lock().unwrap();
        if !flag.raised {
            flag.raised = true;
            for (_, waker) in flag.wakers.drain(..) {
                waker.wake();
            }
        }
    }

    /// Whether the flag has been raised.
    pub fn is_stopped(&self) -> bool {
        self.flag.lock().unwrap().raised
    }

    /// Returns a future that resolves once the flag is raised.
    pub fn stopped(&self) -> Stopped {
        Stopped {
            flag: self.flag.clone(),
            key: None,
        }
    }
}

/// Future returned by [`StopSignal::stopped`].
///
/// Each `Stopped` parks at most one waker and unparks itself when dropped,
/// so racing it at every suspension point of a long-lived producer does not
/// accumulate stale wakers.
pub struct Stopped {
    flag: Arc<Mutex<Flag>>,
    key: Option<usize>,
}

impl Future for Stopped {
    type Output = ();

    fn poll(self: Pin<&mut Self>, ctx: &mut Context) -> Poll<Self::Output> {
        let future: &mut Stopped = self.get_mut();
        let mut flag = future.flag.lock().unwrap();
        if flag.raised {
            Poll::Ready(())
        } else {
            match future.key {
                Some(key) => {
                    if let Some(entry) = flag.wakers.iter_mut().find(|(k, _)| *k == key) {
                        entry.1 = ctx.waker().clone();
                    }
                }
                None => {
                    let key = flag.next_key;
                    flag.next_key += 1;
                    flag.wakers.push((key, ctx.waker().clone()));
                    future.key = Some(key);
                }
            }
            Poll::Pending
        }
    }
}

impl Drop for Stopped {
    fn drop(&mut self) {
        if let Some(key) = self.key {
            self.flag
                .lock()
                .unwrap()
                .wakers
                .retain(|(k, _)| *k != key);
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod test {
    use super::*;
    use crate::time::{now, wait_millis};

    #[test]
    fn stopping_wakes_a_parked_task() {
        let signal = StopSignal::new();
        let parked = signal.stopped();

        let remote = signal.clone();
        let _ = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(10));
            remote.stop();
        });

        smol::block_on(parked);
        assert!(signal.is_stopped());
    }

    #[test]
    fn stop_cuts_a_wait_short() {
        let signal = StopSignal::new();
        signal.stop();

        let start = now();
        smol::block_on(async {
            let wait = wait_millis(10_000);
            futures::pin_mut!(wait);
            futures::future::select(signal.stopped(), wait).await;
        });
        assert!(now() - start < 1_000.0);
    }

    #[test]
    fn dropped_futures_unpark_themselves() {
        let signal = StopSignal::new();
        smol::block_on(async {
            for _ in 0..3 {
                let stopped = signal.stopped();
                futures::pin_mut!(stopped);
                let wait = wait_millis(1);
                futures::pin_mut!(wait);
                futures::future::select(stopped, wait).await;
            }
        });
        assert!(signal.flag.lock().unwrap().wakers.is_empty());
    }
}
