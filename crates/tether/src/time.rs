//! Timestamps and suspending waits.
use std::{
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll, Waker},
};

use futures::Future;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::Closure, JsCast, UnwrapThrowExt};

#[cfg(not(target_arch = "wasm32"))]
static START: std::sync::LazyLock<std::time::Instant> =
    std::sync::LazyLock::new(std::time::Instant::now);

/// Returns a timestamp representing the number of milliseconds elapsed since
/// an arbitrary start time.
#[cfg(not(target_arch = "wasm32"))]
pub fn now() -> f64 {
    START.elapsed().as_secs_f64() * 1000.0
}

/// Returns a timestamp representing the number of milliseconds elapsed since
/// an arbitrary start time.
#[cfg(target_arch = "wasm32")]
pub fn now() -> f64 {
    web_sys::window()
        .expect("no global window")
        .performance()
        .expect("no performance object")
        .now()
}

/// Sets a static rust closure to be called after a given amount of
/// milliseconds. The given function may return whether or not this timeout
/// should be rescheduled: `true` reschedules it, `false` does not.
#[cfg(target_arch = "wasm32")]
pub(crate) fn timeout<F>(millis: i32, mut logic: F) -> i32
where
    F: FnMut() -> bool + 'static,
{
    let f = std::rc::Rc::new(std::cell::RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let should_continue = logic();
        if should_continue {
            set_timeout(millis, f.borrow().as_ref().unwrap_throw());
        }
    }) as Box<dyn FnMut()>));

    set_timeout(millis, g.borrow().as_ref().unwrap_throw())
}

#[cfg(target_arch = "wasm32")]
fn set_timeout(millis: i32, f: &Closure<dyn FnMut()>) -> i32 {
    web_sys::window()
        .expect("no global window")
        .set_timeout_with_callback_and_timeout_and_arguments_0(f.as_ref().unchecked_ref(), millis)
        .expect("could not set timeout")
}

struct Sleep {
    due: f64,
    waker: Arc<Mutex<Option<Waker>>>,
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, ctx: &mut Context) -> Poll<Self::Output> {
        if now() >= self.due {
            Poll::Ready(())
        } else {
            // UNWRAP: only the polling task and the timer touch this slot
            *self.waker.lock().unwrap() = Some(ctx.waker().clone());
            Poll::Pending
        }
    }
}

/// Suspend for approximately the given number of milliseconds.
///
/// The wait does not occupy a thread of the caller's executor. To make the
/// wait cancellable, race it against another future such as
/// [`StopSignal::stopped`](crate::cancel::StopSignal::stopped).
pub fn wait_millis(millis: u64) -> impl Future<Output = ()> {
    let waker: Arc<Mutex<Option<Waker>>> = Default::default();

    #[cfg(not(target_arch = "wasm32"))]
    {
        let slot = waker.clone();
        let _ = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(millis));
            if let Some(waker) = slot.lock().unwrap().take() {
                waker.wake();
            }
        });
    }

    #[cfg(target_arch = "wasm32")]
    {
        let slot = waker.clone();
        timeout(millis as i32, move || {
            if let Some(waker) = slot.lock().unwrap().take() {
                waker.wake();
            }
            false
        });
    }

    Sleep {
        due: now() + millis as f64,
        waker,
    }
}
