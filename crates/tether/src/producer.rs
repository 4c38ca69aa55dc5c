//! Sources of outcomes over time.
use std::pin::Pin;

use futures::{Future, Stream};
use serde::de::DeserializeOwned;

use crate::{
    error::ProducerError,
    target::{Running, Sendable, Streaming},
    time::wait_millis,
};

/// A boxed source of periodic yields.
pub type TickStream<T> = Pin<Box<Streaming<Result<T, ProducerError>>>>;

/// A boxed one-shot attempt at a payload.
pub type FetchFuture<T> = Pin<Box<Running<Result<T, ProducerError>>>>;

/// An abstract source of outcomes for a
/// [`ScopedController`](crate::controller::ScopedController).
///
/// A producer is driven by exactly one controller, which races every
/// suspension point against its [`StopSignal`](crate::cancel::StopSignal).
/// The delay and transport primitives live inside the stream or future the
/// producer wraps, so callers (and tests) may swap in their own.
pub enum Producer<T> {
    /// Yields a payload per tick, forever.
    ///
    /// A failed tick is retryable and does not end the producer.
    Periodic(TickStream<T>),
    /// Makes exactly one attempt at a payload, then ends.
    OneShot(FetchFuture<T>),
}

impl<T> std::fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Producer::Periodic(_) => f.write_str("Producer::Periodic"),
            Producer::OneShot(_) => f.write_str("Producer::OneShot"),
        }
    }
}

impl<T: Sendable> Producer<T> {
    /// Tick every `millis` milliseconds, mapping the running tick count
    /// (starting at 1) to a payload.
    pub fn ticking(millis: u64, payload: impl FnMut(u64) -> T + Sendable) -> Self {
        let steps = futures::stream::unfold(
            (0u64, payload),
            move |(count, mut payload)| async move {
                wait_millis(millis).await;
                let count = count + 1;
                let value = payload(count);
                Some((Ok(value), (count, payload)))
            },
        );
        Producer::Periodic(Box::pin(steps))
    }

    /// Tick from a custom source.
    ///
    /// Use this to bring your own delay primitive, or to drive a controller
    /// by hand.
    pub fn periodic(ticks: impl Stream<Item = Result<T, ProducerError>> + Sendable) -> Self {
        Producer::Periodic(Box::pin(ticks))
    }

    /// Make one attempt with the given future.
    pub fn one_shot(fetch: impl Future<Output = Result<T, ProducerError>> + Sendable) -> Self {
        Producer::OneShot(Box::pin(fetch))
    }
}

impl Producer<u64> {
    /// Tick every `millis` milliseconds, yielding the running tick count:
    /// 1, 2, 3, …
    pub fn counter(millis: u64) -> Self {
        Producer::ticking(millis, |count| count)
    }
}

/// Decode a raw JSON body into the expected payload shape.
///
/// Decode problems come back as [`ProducerError::Decode`], keeping them
/// distinct from transport failures.
///
/// ```rust
/// use tether::producer::decode_json;
///
/// let title: String = decode_json(r#""delectus aut autem""#).unwrap();
/// assert_eq!(title, "delectus aut autem");
/// ```
pub fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, ProducerError> {
    serde_json::from_str(raw).map_err(|e| ProducerError::Decode(e.to_string()))
}
