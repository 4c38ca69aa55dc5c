//! The outcome of a producer, as observed by renderers.

/// What a controller's producer has most recently yielded.
///
/// Exactly one variant holds at any time. A renderer typically shows a
/// spinner for [`OutcomeState::Loading`], the payload for
/// [`OutcomeState::Value`] and a message for [`OutcomeState::Failure`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutcomeState<T> {
    /// No outcome yet.
    Loading,
    /// The most recent payload the producer yielded.
    Value(T),
    /// The producer failed, with a human-readable reason.
    Failure(String),
}

impl<T> OutcomeState<T> {
    /// Whether no outcome has been produced yet.
    pub fn is_loading(&self) -> bool {
        matches!(self, OutcomeState::Loading)
    }

    /// The payload, if one has been produced.
    pub fn value(&self) -> Option<&T> {
        match self {
            OutcomeState::Value(payload) => Some(payload),
            _ => None,
        }
    }

    /// The failure reason, if the producer failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            OutcomeState::Failure(reason) => Some(reason),
            _ => None,
        }
    }
}
