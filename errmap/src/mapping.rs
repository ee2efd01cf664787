//! Mappings from marker errors to response producers.

use std::fmt::Debug;
use std::sync::Arc;

use crate::Result;
use crate::error::Error;
use crate::marker::ErrorMarker;

pub(crate) type ResponseFn<C> = dyn Fn(&mut C, &Error) -> Result<()> + Send + Sync;

/// Starts building an [`ErrorMapping`] for the given markers.
///
/// Anything convertible into an [`ErrorMarker`] is accepted, such as an
/// [`ErrorKind`](crate::ErrorKind) or a [`ValidationErrors`](crate::ValidationErrors)
/// value. A mapping without any markers never matches.
///
/// # Examples
///
/// ```
/// use errmap::{ErrorMapping, ErrorMarker};
///
/// #[derive(Debug, PartialEq, thiserror::Error)]
/// #[error("not found")]
/// struct NotFound;
///
/// struct Context {
///     body: Option<String>,
/// }
///
/// let mapping: ErrorMapping<Context> =
///     errmap::map([ErrorMarker::new(NotFound)]).to_response(|context: &mut Context, error| {
///         context.body = Some(error.to_string());
///         Ok(())
///     });
/// assert_eq!(mapping.markers().len(), 1);
/// ```
pub fn map<I>(markers: I) -> MappedErrors
where
    I: IntoIterator,
    I::Item: Into<ErrorMarker>,
{
    MappedErrors::new(markers)
}

/// Marker errors waiting for a response producer.
///
/// Returned by [`map`]; call [`MappedErrors::to_response`] to get a finished
/// [`ErrorMapping`].
#[derive(Debug, Clone)]
#[must_use = "a mapping without a response producer does nothing"]
pub struct MappedErrors {
    markers: Vec<ErrorMarker>,
}

impl MappedErrors {
    /// Creates a new `MappedErrors` from the given markers.
    ///
    /// See [`map`].
    pub fn new<I>(markers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ErrorMarker>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Attaches the response producer, finishing the mapping.
    ///
    /// The producer receives the request context and the recorded error that
    /// matched one of the markers.
    pub fn to_response<C, F>(self, producer: F) -> ErrorMapping<C>
    where
        F: Fn(&mut C, &Error) -> Result<()> + Send + Sync + 'static,
    {
        ErrorMapping {
            markers: self.markers,
            producer: Arc::new(producer),
        }
    }
}

/// Associates a list of marker errors with a response producer.
///
/// An `ErrorMapping` is immutable. Cloning it is cheap and shares the
/// producer.
pub struct ErrorMapping<C> {
    markers: Vec<ErrorMarker>,
    producer: Arc<ResponseFn<C>>,
}

impl<C> ErrorMapping<C> {
    /// The markers of this mapping, in the order they are checked.
    #[must_use]
    pub fn markers(&self) -> &[ErrorMarker] {
        &self.markers
    }

    /// Returns the position of the first marker matching `error`, if any.
    #[must_use]
    pub fn matching_marker(&self, error: &Error) -> Option<usize> {
        self.markers.iter().position(|marker| marker.matches(error))
    }

    /// Returns `true` if any marker of this mapping matches `error`.
    #[must_use]
    pub fn matches(&self, error: &Error) -> bool {
        self.matching_marker(error).is_some()
    }

    pub(crate) fn produce(&self, context: &mut C, error: &Error) -> Result<()> {
        (self.producer)(context, error)
    }
}

impl<C> Clone for ErrorMapping<C> {
    fn clone(&self) -> Self {
        Self {
            markers: self.markers.clone(),
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<C> Debug for ErrorMapping<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorMapping")
            .field("markers", &self.markers)
            .field("producer", &"..")
            .finish()
    }
}
