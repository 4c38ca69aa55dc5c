//! Support for async operations depending on the target.

/// Marker traits and type aliases for sending async messages.
#[cfg(target_arch = "wasm32")]
mod send {
    use futures::{Future, Stream};

    /// Marker trait for values that may cross an async boundary.
    pub trait Sendable: 'static {}

    impl<T: 'static> Sendable for T {}

    /// Marker trait for values that may be shared across async boundaries.
    pub trait Syncable: 'static {}

    impl<T: 'static> Syncable for T {}

    /// Stream type alias.
    pub type Streaming<T> = dyn Stream<Item = T> + 'static;

    /// Future type alias.
    pub type Running<T> = dyn Future<Output = T> + 'static;

    /// Observer callback type alias.
    pub type Observing<T> = dyn Fn(&T) + 'static;

    /// Marker trait for futures that can be spawned.
    pub trait Spawnable: Future<Output = ()> + 'static {}
    impl<T: Future<Output = ()> + 'static> Spawnable for T {}
}

/// Marker traits and type aliases for sending async messages.
#[cfg(not(target_arch = "wasm32"))]
mod send {
    use futures::{Future, Stream};

    /// Marker trait for values that may cross an async boundary.
    pub trait Sendable: Sized + Send + 'static {}

    impl<T: Send + 'static> Sendable for T {}

    /// Marker trait for values that may be shared across async boundaries.
    pub trait Syncable: Sized + Sync + 'static {}

    impl<T: Sync + 'static> Syncable for T {}

    /// Stream type alias.
    pub type Streaming<T> = dyn Stream<Item = T> + Send + 'static;

    /// Future type alias.
    pub type Running<T> = dyn Future<Output = T> + Send + 'static;

    /// Observer callback type alias.
    pub type Observing<T> = dyn Fn(&T) + Send + Sync + 'static;

    /// Marker trait for futures that can be spawned.
    pub trait Spawnable: Future<Output = ()> + Send + 'static {}
    impl<T: Future<Output = ()> + Send + 'static> Spawnable for T {}
}

pub use send::*;

/// Spawn an async operation.
#[cfg(target_arch = "wasm32")]
pub fn spawn<Fut>(fut: Fut)
where
    Fut: Spawnable,
{
    wasm_bindgen_futures::spawn_local(fut)
}

#[cfg(not(target_arch = "wasm32"))]
/// Spawn an async operation.
pub fn spawn<Fut>(fut: Fut)
where
    Fut: Spawnable,
{
    let task = smol::spawn(fut);
    task.detach();
}
