//! Error types recorded while handling a request, and the errors this crate
//! reports itself.
//!
//! The main type here is [`Error`], which is what downstream handlers record
//! and what [`ErrorMarker`](crate::ErrorMarker)s are matched against. It can
//! wrap any [`std::error::Error`], add a context message on top of another
//! [`Error`], or join several errors together. In all cases the whole tree of
//! causes stays reachable through [`Error::chain`].

pub(crate) mod error_impl;
mod validation;

pub use error_impl::{Chain, Error, ErrorKind, impl_into_errmap_error};
pub use validation::{FieldError, ValidationErrors};

/// An error returned when an [`ErrorHandlerConfig`](crate::ErrorHandlerConfig)
/// cannot be turned into an [`ErrorHandler`](crate::ErrorHandler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No default response producer was set.
    #[error("a default response producer is required")]
    MissingDefaultResponse,
}

/// An error returned when a request finished without either a response or a
/// recorded error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("the request produced neither a response nor an error")]
pub struct NoResponse;
