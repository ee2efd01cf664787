//! Markers that decide whether a recorded error belongs to a mapping.

use std::any::type_name;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::sync::Arc;

use derive_more::with_trait::Debug;

use crate::error::{Error, ErrorKind, ValidationErrors};

/// A marker error used to decide whether a recorded [`Error`] belongs to an
/// [`ErrorMapping`](crate::ErrorMapping).
///
/// There are two shapes of markers:
///
/// * chain markers ([`ErrorMarker::new`] and [`ErrorMarker::of_type`]) are
///   compared against every error in the recorded error's
///   [chain](Error::chain), so they match even if the error was wrapped with
///   context or joined with other errors;
/// * kind markers ([`ErrorMarker::kind`]) match when the recorded error
///   itself has the given [`ErrorKind`]. They exist for errors that cannot
///   be meaningfully compared by value, such as [`ValidationErrors`].
///
/// # Examples
///
/// ```
/// use errmap::{Error, ErrorKind, ErrorMarker, ValidationErrors};
///
/// #[derive(Debug, PartialEq, thiserror::Error)]
/// enum AppError {
///     #[error("not found")]
///     NotFound,
///     #[error("conflict")]
///     Conflict,
/// }
///
/// let marker = ErrorMarker::new(AppError::NotFound);
/// assert!(marker.matches(&Error::wrap(AppError::NotFound, "loading user")));
/// assert!(!marker.matches(&Error::new(AppError::Conflict)));
///
/// let marker = ErrorMarker::kind(ErrorKind::Validation);
/// assert!(marker.matches(&Error::from(ValidationErrors::new())));
/// ```
#[derive(Debug, Clone)]
pub struct ErrorMarker {
    description: Cow<'static, str>,
    #[debug(skip)]
    matcher: Matcher,
}

#[derive(Clone)]
enum Matcher {
    Chain(Arc<dyn Fn(&(dyn StdError + 'static)) -> bool + Send + Sync>),
    Kind(ErrorKind),
}

impl ErrorMarker {
    /// Creates a marker matching errors equal to `value`.
    ///
    /// The marker matches if any error in the recorded error's chain has the
    /// same type as `value` and compares equal to it.
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: StdError + PartialEq + Send + Sync + 'static,
    {
        Self {
            description: Cow::Owned(format!("{value:?}")),
            matcher: Matcher::Chain(Arc::new(move |error: &(dyn StdError + 'static)| {
                error.downcast_ref::<T>().is_some_and(|error| *error == value)
            })),
        }
    }

    /// Creates a marker matching any error of type `T`.
    ///
    /// The marker matches if any error in the recorded error's chain is of
    /// type `T`, regardless of its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use errmap::{Error, ErrorMarker};
    ///
    /// let marker = ErrorMarker::of_type::<std::io::Error>();
    /// assert!(marker.matches(&Error::wrap(std::io::Error::other("disk full"), "saving")));
    /// ```
    #[must_use]
    pub fn of_type<T>() -> Self
    where
        T: StdError + 'static,
    {
        Self {
            description: Cow::Borrowed(type_name::<T>()),
            matcher: Matcher::Chain(Arc::new(|error: &(dyn StdError + 'static)| {
                error.is::<T>()
            })),
        }
    }

    /// Creates a marker matching errors of the given structural kind.
    ///
    /// Unlike the other markers, only the recorded error itself is checked:
    /// a [`ValidationErrors`] wrapped with a context message does not match.
    #[must_use]
    pub fn kind(kind: ErrorKind) -> Self {
        Self {
            description: Cow::Owned(format!("kind {kind:?}")),
            matcher: Matcher::Kind(kind),
        }
    }

    /// Returns `true` if `error` matches this marker.
    #[must_use]
    pub fn matches(&self, error: &Error) -> bool {
        match &self.matcher {
            Matcher::Chain(matches) => error.chain().any(|error| matches(error)),
            Matcher::Kind(kind) => error.kind() == Some(*kind),
        }
    }

    /// A short description of what this marker matches, used in logs.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl From<ErrorKind> for ErrorMarker {
    fn from(kind: ErrorKind) -> Self {
        Self::kind(kind)
    }
}

impl From<ValidationErrors> for ErrorMarker {
    fn from(_: ValidationErrors) -> Self {
        Self::kind(ErrorKind::Validation)
    }
}
