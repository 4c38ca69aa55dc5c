//! Errors.
use std::fmt;

/// Ways a producer attempt can fail.
///
/// There is no variant for cancellation. A producer that is stopped
/// mid-flight does not fail, it simply ends without yielding an outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProducerError {
    /// The outbound request could not complete.
    Transport(String),
    /// A response arrived but could not be read as the expected payload shape.
    Decode(String),
}

impl fmt::Display for ProducerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProducerError::Transport(reason) => write!(f, "transport error: {}", reason),
            ProducerError::Decode(reason) => write!(f, "decode error: {}", reason),
        }
    }
}

impl std::error::Error for ProducerError {}

/// Misuse of a controller's lifecycle.
///
/// Unlike [`ProducerError`] this is never folded into a published state. It
/// marks a contract violation by the caller and is handed straight back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerError {
    /// `activate` was called on a controller that has already been disposed.
    AlreadyDisposed,
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::AlreadyDisposed => {
                f.write_str("cannot activate a disposed controller")
            }
        }
    }
}

impl std::error::Error for ControllerError {}
