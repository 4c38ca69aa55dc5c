//! Lifecycle-scoped supervision of one producer task.
use std::sync::{Arc, Mutex};

use futures::{
    future::{self, Either},
    Future, Stream, StreamExt,
};

use crate::{
    cancel::StopSignal,
    cell::{ReactiveCell, SubscriptionId},
    error::{ControllerError, ProducerError},
    producer::Producer,
    state::OutcomeState,
    target::{self, Sendable, Syncable},
};

enum Phase<T> {
    Idle(Producer<T>),
    Running,
    Disposed,
}

/// Owns one [`ReactiveCell`] and at most one running producer task.
///
/// The controller is the piece that survives UI re-creation: the surrounding
/// application holds it outside of any recreation-sensitive storage and
/// re-attaches renderers to it as often as it likes. [`activate`] is safe to
/// call on every attachment because it only ever starts one producer;
/// [`dispose`] is called once, on permanent teardown, and cancels the
/// producer at its next suspension point. No outcome is ever published after
/// `dispose` returns, even when an in-flight step completes later.
///
/// Dropping a controller disposes it.
///
/// Observers registered through [`subscribe`] are called on the producer's
/// context and must not call back into [`activate`] or [`dispose`] from
/// inside a notification.
///
/// [`activate`]: ScopedController::activate
/// [`dispose`]: ScopedController::dispose
/// [`subscribe`]: ScopedController::subscribe
pub struct ScopedController<T> {
    cell: ReactiveCell<OutcomeState<T>>,
    phase: Arc<Mutex<Phase<T>>>,
    stop: StopSignal,
}

impl<T> std::fmt::Debug for ScopedController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(&format!(
            "ScopedController<{}>",
            std::any::type_name::<T>()
        ))
        .finish()
    }
}

impl<T> ScopedController<T> {
    /// The cell this controller publishes into.
    ///
    /// Renderers borrow the cell to subscribe. They never own it, and only
    /// the controller writes to it.
    pub fn cell(&self) -> &ReactiveCell<OutcomeState<T>> {
        &self.cell
    }

    /// Permanently retire the controller.
    ///
    /// The running producer observes the stop at its next suspension point
    /// and publishes nothing further. Safe to call any number of times, and
    /// safe to call without [`ScopedController::activate`] ever having run.
    pub fn dispose(&self) {
        {
            let mut phase = self.phase.lock().unwrap();
            if matches!(*phase, Phase::Disposed) {
                return;
            }
            *phase = Phase::Disposed;
        }
        self.stop.stop();
        log::trace!("controller disposed");
    }
}

impl<T: Clone + Sendable> ScopedController<T> {
    /// Wrap a producer. The cell starts out [`OutcomeState::Loading`].
    pub fn new(producer: Producer<T>) -> Self {
        ScopedController {
            cell: ReactiveCell::new(OutcomeState::Loading),
            phase: Arc::new(Mutex::new(Phase::Idle(producer))),
            stop: StopSignal::new(),
        }
    }

    /// A controller around one attempt at a payload.
    pub fn fetching(
        fetch: impl Future<Output = Result<T, ProducerError>> + Sendable,
    ) -> Self {
        Self::new(Producer::one_shot(fetch))
    }

    /// Start the producer.
    ///
    /// Activating a controller that is already running is a no-op, so UI
    /// re-creation may call this on every attachment without duplicating the
    /// task. Activating after [`ScopedController::dispose`] is a contract
    /// violation and fails.
    pub fn activate(&self) -> Result<(), ControllerError> {
        let mut phase = self.phase.lock().unwrap();
        match std::mem::replace(&mut *phase, Phase::Running) {
            Phase::Idle(producer) => {
                log::trace!("controller activated, starting {:?}", producer);
                target::spawn(supervise(
                    producer,
                    self.cell.clone(),
                    self.phase.clone(),
                    self.stop.clone(),
                ));
                Ok(())
            }
            Phase::Running => Ok(()),
            Phase::Disposed => {
                *phase = Phase::Disposed;
                log::error!("activate called on a disposed controller");
                Err(ControllerError::AlreadyDisposed)
            }
        }
    }

    /// See [`ReactiveCell::read`].
    pub fn current(&self) -> OutcomeState<T> {
        self.cell.read()
    }

    /// See [`ReactiveCell::subscribe`].
    pub fn subscribe(
        &self,
        observer: impl Fn(&OutcomeState<T>) + Sendable + Syncable,
    ) -> SubscriptionId {
        self.cell.subscribe(observer)
    }

    /// See [`ReactiveCell::unsubscribe`].
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.cell.unsubscribe(id)
    }

    /// See [`ReactiveCell::stream`].
    pub fn stream(&self) -> impl Stream<Item = OutcomeState<T>> {
        self.cell.stream()
    }
}

impl ScopedController<u64> {
    /// A controller that counts up from 1, one tick every `millis`
    /// milliseconds.
    pub fn counting(millis: u64) -> Self {
        Self::new(Producer::counter(millis))
    }
}

impl<T> Drop for ScopedController<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Write an outcome into the cell, unless the controller has been disposed.
///
/// The phase lock is held across the write, so an outcome can never land
/// after `dispose` has returned.
fn publish<T: Clone + Sendable>(
    phase: &Mutex<Phase<T>>,
    cell: &ReactiveCell<OutcomeState<T>>,
    next: OutcomeState<T>,
) -> bool {
    // UNWRAP: a poisoned phase lock means a publish already panicked
    let guard = phase.lock().unwrap();
    if matches!(*guard, Phase::Disposed) {
        log::trace!("discarding late outcome, controller is disposed");
        return false;
    }
    cell.update(next);
    drop(guard);
    true
}

/// Drive one producer to completion, translating its yields into cell
/// updates for as long as the controller stays alive.
async fn supervise<T: Clone + Sendable>(
    producer: Producer<T>,
    cell: ReactiveCell<OutcomeState<T>>,
    phase: Arc<Mutex<Phase<T>>>,
    stop: StopSignal,
) {
    match producer {
        Producer::Periodic(mut ticks) => loop {
            let step = match future::select(stop.stopped(), ticks.next()).await {
                Either::Left(((), _)) => break,
                Either::Right((None, _)) => {
                    log::trace!("tick source ended");
                    break;
                }
                Either::Right((Some(step), _)) => step,
            };
            match step {
                Ok(value) => {
                    if !publish(&phase, &cell, OutcomeState::Value(value)) {
                        break;
                    }
                }
                Err(e) => log::warn!("tick failed, producer stays up: {}", e),
            }
        },
        Producer::OneShot(fetch) => {
            if !publish(&phase, &cell, OutcomeState::Loading) {
                return;
            }
            match future::select(stop.stopped(), fetch).await {
                Either::Left(((), _)) => {
                    log::trace!("fetch dropped before completion");
                }
                Either::Right((Ok(payload), _)) => {
                    publish(&phase, &cell, OutcomeState::Value(payload));
                }
                Either::Right((Err(e), _)) => {
                    publish(&phase, &cell, OutcomeState::Failure(e.to_string()));
                }
            }
        }
    }
}
