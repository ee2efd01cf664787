//! The contract between an [`ErrorHandler`](crate::ErrorHandler) and the
//! request pipeline hosting it.
//!
//! A request context is the per-request state an error handler looks at: the
//! errors recorded so far and whether a response has already been written.
//! Contexts are owned by a single request flow and are never shared between
//! requests; the error handler itself keeps no per-request state.

use crate::error::Error;

/// The response state of a request after its downstream step has run.
///
/// This is everything [`ErrorHandler::respond`](crate::ErrorHandler::respond)
/// needs to pick a response producer.
pub trait ResponseState {
    /// Returns the most recently recorded error, if any.
    ///
    /// [`Error`] is cheap to clone, so implementations usually return a clone
    /// of the last element of their list of recorded errors.
    fn last_error(&self) -> Option<Error>;

    /// Returns `true` if a response has already been written.
    fn is_written(&self) -> bool;
}

/// A request context that can also run the downstream step.
///
/// Used by [`ErrorHandler::handle`](crate::ErrorHandler::handle), which runs
/// the downstream step first and then picks a response producer.
pub trait ErrorContext: ResponseState {
    /// Runs the rest of the request pipeline.
    ///
    /// The downstream step performs the request-specific work. It may record
    /// any number of errors, and it may or may not write a response.
    fn next(&mut self);
}
