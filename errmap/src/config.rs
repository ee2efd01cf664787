//! Configuration of an [`ErrorHandler`](crate::ErrorHandler).
//!
//! The main struct in this module is [`ErrorHandlerConfig`], which holds the
//! ordered list of [`ErrorMapping`]s and the default response producer. It is
//! assembled during application startup and then consumed by
//! [`ErrorHandler::new`](crate::ErrorHandler::new), which validates it.

use std::fmt::Debug;
use std::sync::Arc;

use crate::Result;
use crate::error::ConfigError;
use crate::mapping::ErrorMapping;

pub(crate) type DefaultResponseFn<C> = dyn Fn(&mut C) -> Result<()> + Send + Sync;

/// The configuration for an [`ErrorHandler`](crate::ErrorHandler).
///
/// Mappings are checked in the order they were added; the first mapping
/// matching the recorded error wins, no matter how specific the other
/// mappings are. A default response producer is mandatory.
///
/// # Examples
///
/// ```
/// use errmap::{ErrorHandler, ErrorHandlerConfig, ErrorMarker};
///
/// #[derive(Debug, PartialEq, thiserror::Error)]
/// #[error("not found")]
/// struct NotFound;
///
/// #[derive(Default)]
/// struct Context {
///     status: Option<u16>,
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
///
/// let _handler = ErrorHandler::new(config)?;
/// # Ok::<(), errmap::ConfigError>(())
/// ```
pub struct ErrorHandlerConfig<C> {
    pub(crate) error_mappings: Vec<ErrorMapping<C>>,
    pub(crate) default_response: Option<Arc<DefaultResponseFn<C>>>,
}

impl<C> ErrorHandlerConfig<C> {
    /// Creates an empty configuration, without mappings and without a
    /// default response producer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            error_mappings: Vec::new(),
            default_response: None,
        }
    }

    /// Replaces the list of error mappings.
    ///
    /// The list may be empty, in which case every recorded error is handled
    /// by the default response producer.
    pub fn error_mappings<I>(&mut self, mappings: I) -> &mut Self
    where
        I: IntoIterator<Item = ErrorMapping<C>>,
    {
        self.error_mappings = mappings.into_iter().collect();
        self
    }

    /// Appends a single error mapping after the ones already configured.
    pub fn push_error_mapping(&mut self, mapping: ErrorMapping<C>) -> &mut Self {
        self.error_mappings.push(mapping);
        self
    }

    /// Sets the default response producer.
    ///
    /// It is invoked when an error was recorded but no mapping matched it,
    /// unless a response was already written.
    pub fn default_response<F>(&mut self, producer: F) -> &mut Self
    where
        F: Fn(&mut C) -> Result<()> + Send + Sync + 'static,
    {
        self.default_response = Some(Arc::new(producer));
        self
    }

    /// The number of configured error mappings.
    #[must_use]
    pub fn error_mapping_count(&self) -> usize {
        self.error_mappings.len()
    }

    /// Checks that the configuration can be used to build an
    /// [`ErrorHandler`](crate::ErrorHandler).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDefaultResponse`] if no default response
    /// producer was set.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.default_response.is_none() {
            return Err(ConfigError::MissingDefaultResponse);
        }
        Ok(())
    }
}

impl<C> Default for ErrorHandlerConfig<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Debug for ErrorHandlerConfig<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandlerConfig")
            .field("error_mappings", &self.error_mappings)
            .field(
                "default_response",
                &self.default_response.as_ref().map(|_| ".."),
            )
            .finish()
    }
}
