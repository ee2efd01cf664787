//! errmap maps the error recorded while handling an HTTP request to a
//! response.
//!
//! An [`ErrorHandler`] holds an ordered list of [`ErrorMapping`]s, each
//! pairing a set of [`ErrorMarker`]s with a response producer, plus a
//! mandatory default response producer. After the rest of the request
//! pipeline has run, the handler looks at the last recorded error and invokes
//! the producer of the first mapping matching it. If none matches, the
//! default producer runs, unless a response has already been written.
//!
//! Markers match through the whole chain of causes of an [`Error`]: an error
//! wrapped with context, or joined with other errors, still matches a marker
//! for the original error. Errors that cannot be compared by value, such as
//! [`ValidationErrors`], are matched by their [`ErrorKind`] instead.
//!
//! The handler itself is framework-agnostic: it works with any context
//! implementing [`ResponseState`] (and [`ErrorContext`] to also run the
//! downstream step). For `tower`-based HTTP stacks, see
//! [`middleware::ErrorHandlerLayer`].
//!
//! # Examples
//!
//! ```
//! use errmap::middleware::ErrorHandlerLayer;
//! use errmap::response::HttpContext;
//! use errmap::{ErrorHandler, ErrorHandlerConfig, ErrorMarker};
//! use http::StatusCode;
//!
//! #[derive(Debug, PartialEq, thiserror::Error)]
//! enum AppError {
//!     #[error("not found")]
//!     NotFound,
//! }
//!
//! let mut config = ErrorHandlerConfig::new();
//! config
//!     .error_mappings([errmap::map([ErrorMarker::new(AppError::NotFound)]).to_response(
//!         |context: &mut HttpContext, _error| context.text(StatusCode::NOT_FOUND, "not found"),
//!     )])
//!     .default_response(|context: &mut HttpContext| {
//!         context.text(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
//!     });
//!
//! let _layer = ErrorHandlerLayer::new(ErrorHandler::new(config)?);
//! # Ok::<(), errmap::ConfigError>(())
//! ```

#![warn(missing_docs, rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod mapping;
pub mod marker;
pub mod middleware;
pub mod response;

pub use config::ErrorHandlerConfig;
pub use context::{ErrorContext, ResponseState};
pub use error::{ConfigError, Error, ErrorKind, FieldError, NoResponse, ValidationErrors};
pub use handler::ErrorHandler;
pub use mapping::{ErrorMapping, MappedErrors, map};
pub use marker::ErrorMarker;

/// A type alias for a result that can return an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
