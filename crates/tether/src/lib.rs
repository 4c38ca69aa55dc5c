//! # Tether
//!
//! Tether keeps a piece of asynchronous state tied to the lifecycle that
//! owns it.
//!
//! A [`ScopedController`](controller::ScopedController) owns a single
//! [`ReactiveCell`](cell::ReactiveCell) and supervises one background
//! [`Producer`](producer::Producer) - either a periodic tick or a one-shot
//! fetch. Renderers subscribe to the cell and redraw on each emission; the
//! controller outlives any number of renderer re-creations and cancels its
//! producer exactly once, when it is disposed.
//!
//! Its goals are simple:
//! * hold exactly one current value and hand it to observers synchronously,
//!   so a late joiner never misses the latest state
//! * run at most one producer task per controller, no matter how many times
//!   the surrounding UI re-attaches
//! * cancel cooperatively at suspension points, and never publish an outcome
//!   after disposal
//! * stay out of the way of the UI and transport layers - both are plugged
//!   in from the outside
//!
//! ```rust
//! use futures::StreamExt;
//! use tether::{controller::ScopedController, state::OutcomeState};
//!
//! let stopwatch = ScopedController::counting(10);
//! stopwatch.activate().unwrap();
//!
//! smol::block_on(async {
//!     let mut updates = stopwatch.stream();
//!     while let Some(state) = updates.next().await {
//!         if matches!(state, OutcomeState::Value(n) if n >= 3) {
//!             break;
//!         }
//!     }
//! });
//!
//! stopwatch.dispose();
//! ```
pub mod cancel;
pub mod cell;
pub mod controller;
pub mod error;
pub mod producer;
pub mod state;
pub mod target;
pub mod time;

pub mod prelude {
    //! Re-exports for convenience.
    pub use crate::cancel::StopSignal;
    pub use crate::cell::{ReactiveCell, SubscriptionId};
    pub use crate::controller::ScopedController;
    pub use crate::error::{ControllerError, ProducerError};
    pub use crate::producer::{decode_json, Producer};
    pub use crate::state::OutcomeState;
    pub use crate::target::{spawn, Sendable, Spawnable, Syncable};
    pub use crate::time::{now, wait_millis};
}
