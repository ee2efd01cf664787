//! The error handler: picks a response producer for the error recorded while
//! handling a request.

use std::fmt::Debug;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::Result;
use crate::config::{DefaultResponseFn, ErrorHandlerConfig};
use crate::context::{ErrorContext, ResponseState};
use crate::error::{ConfigError, Error};
use crate::mapping::ErrorMapping;

/// Maps the error recorded during a request to a response.
///
/// An `ErrorHandler` is created once, at application startup, from a
/// validated [`ErrorHandlerConfig`]. It is immutable afterwards and cheap to
/// clone, so the same instance can serve any number of concurrent requests;
/// all per-request state lives in the context passed to
/// [`ErrorHandler::handle`] or [`ErrorHandler::respond`].
///
/// For each request, at most one response producer is invoked:
///
/// * if no error was recorded, nothing happens;
/// * otherwise, the first mapping (in configuration order) with a marker
///   matching the last recorded error gets to produce the response;
/// * if no mapping matches, the default response producer is invoked, unless
///   a response was already written.
///
/// # Examples
///
/// ```
/// use errmap::{ErrorContext, ErrorHandler, ErrorHandlerConfig, ErrorMarker, ResponseState};
///
/// #[derive(Debug, PartialEq, thiserror::Error)]
/// #[error("not found")]
/// struct NotFound;
///
/// #[derive(Default)]
/// struct Context {
///     errors: Vec<errmap::Error>,
///     status: Option<u16>,
/// }
///
/// impl ResponseState for Context {
///     fn last_error(&self) -> Option<errmap::Error> {
///         self.errors.last().cloned()
///     }
///
///     fn is_written(&self) -> bool {
///         self.status.is_some()
///     }
/// }
///
/// impl ErrorContext for Context {
///     fn next(&mut self) {
///         self.errors.push(errmap::Error::wrap(NotFound, "loading user"));
///     }
/// }
///
/// let mut config = ErrorHandlerConfig::new();
/// config
///     .error_mappings([errmap::map([ErrorMarker::new(NotFound)]).to_response(
///         |context: &mut Context, _error| {
///             context.status = Some(404);
///             Ok(())
///         },
///     )])
///     .default_response(|context: &mut Context| {
///         context.status = Some(500);
///         Ok(())
///     });
/// let handler = ErrorHandler::new(config)?;
///
/// let mut context = Context::default();
/// handler.handle(&mut context)?;
/// assert_eq!(context.status, Some(404));
/// # Ok::<(), errmap::Error>(())
/// ```
pub struct ErrorHandler<C> {
    inner: Arc<ErrorHandlerInner<C>>,
}

struct ErrorHandlerInner<C> {
    error_mappings: Vec<ErrorMapping<C>>,
    default_response: Arc<DefaultResponseFn<C>>,
}

impl<C> ErrorHandler<C> {
    /// Creates a new `ErrorHandler` from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDefaultResponse`] if the configuration
    /// has no default response producer.
    pub fn new(config: ErrorHandlerConfig<C>) -> std::result::Result<Self, ConfigError> {
        let ErrorHandlerConfig {
            error_mappings,
            default_response,
        } = config;
        // same check as `ErrorHandlerConfig::validate`
        let default_response = default_response.ok_or(ConfigError::MissingDefaultResponse)?;

        Ok(Self {
            inner: Arc::new(ErrorHandlerInner {
                error_mappings,
                default_response,
            }),
        })
    }

    /// The configured error mappings, in the order they are checked.
    #[must_use]
    pub fn error_mappings(&self) -> &[ErrorMapping<C>] {
        &self.inner.error_mappings
    }

    /// Returns the first mapping matching `error`, if any.
    ///
    /// Mappings are checked in configuration order, and the markers of each
    /// mapping in the order they were given.
    #[must_use]
    pub fn find_mapping(&self, error: &Error) -> Option<&ErrorMapping<C>> {
        self.find_mapping_with_index(error)
            .map(|(_, mapping)| mapping)
    }

    fn find_mapping_with_index(&self, error: &Error) -> Option<(usize, &ErrorMapping<C>)> {
        self.inner
            .error_mappings
            .iter()
            .enumerate()
            .find(|(_, mapping)| mapping.matches(error))
    }
}

impl<C: ResponseState> ErrorHandler<C> {
    /// Picks and invokes a response producer for the request in `context`.
    ///
    /// This assumes the downstream step has already run. Use
    /// [`ErrorHandler::handle`] to run it as well.
    ///
    /// # Errors
    ///
    /// Returns whatever error the invoked response producer returns. The
    /// handler itself never fails.
    pub fn respond(&self, context: &mut C) -> Result<()> {
        let Some(error) = context.last_error() else {
            trace!("No error recorded; leaving the response untouched");
            return Ok(());
        };

        if let Some((index, mapping)) = self.find_mapping_with_index(&error) {
            debug!(mapping = index, %error, "Producing a mapped error response");
            return mapping.produce(context, &error);
        }

        if context.is_written() {
            debug!(%error, "No error mapping matched, but a response was already written");
            return Ok(());
        }

        debug!(%error, "No error mapping matched; producing the default response");
        (self.inner.default_response)(context)
    }
}

impl<C: ErrorContext> ErrorHandler<C> {
    /// Runs the downstream step of `context`, then picks and invokes a
    /// response producer.
    ///
    /// See [`ErrorHandler::respond`].
    ///
    /// # Errors
    ///
    /// Returns whatever error the invoked response producer returns.
    pub fn handle(&self, context: &mut C) -> Result<()> {
        context.next();
        self.respond(context)
    }
}

impl<C> Clone for ErrorHandler<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> Debug for ErrorHandler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("error_mappings", &self.inner.error_mappings)
            .field("default_response", &"..")
            .finish()
    }
}
