use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{Debug, Display};
use std::sync::Arc;

use crate::error::validation::ValidationErrors;

/// An error recorded while handling a request.
///
/// `Error` is cheap to clone: clones share the same underlying error. This
/// allows a context to hand out the last recorded error while still being
/// borrowed mutably by a response producer.
///
/// # Examples
///
/// ```
/// use errmap::Error;
///
/// #[derive(Debug, PartialEq, thiserror::Error)]
/// #[error("user not found")]
/// struct UserNotFound;
///
/// let error = Error::wrap(UserNotFound, "loading profile");
/// assert_eq!(error.to_string(), "loading profile: user not found");
/// assert!(error.is::<UserNotFound>());
/// ```
#[derive(Clone)]
pub struct Error {
    repr: Arc<ErrorRepr>,
}

#[derive(Debug)]
enum ErrorRepr {
    Single {
        inner: Box<dyn StdError + Send + Sync>,
        kind: Option<ErrorKind>,
    },
    Context {
        context: Cow<'static, str>,
        source: Error,
    },
    Joined(Vec<Error>),
}

impl Error {
    /// Creates a new error from a custom error message or error type.
    ///
    /// If `error` already is an [`Error`], it is returned as is instead of
    /// being wrapped again.
    ///
    /// # Examples
    ///
    /// ```
    /// use errmap::Error;
    ///
    /// let error = Error::new("something went wrong");
    /// let error = Error::new(std::io::Error::other("disk full"));
    /// ```
    #[must_use]
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        let error: Box<dyn StdError + Send + Sync> = error.into();
        match error.downcast::<Self>() {
            Ok(error) => *error,
            Err(inner) => {
                let kind = ErrorKind::of(&*inner);
                Self::from_repr(ErrorRepr::Single { inner, kind })
            }
        }
    }

    /// Wraps an error with a context message.
    ///
    /// The resulting error displays as `"{context}: {error}"` and keeps
    /// `error` as its cause, so markers matching `error` also match the
    /// wrapped error.
    ///
    /// # Examples
    ///
    /// ```
    /// use errmap::Error;
    ///
    /// let error = Error::wrap("connection reset", "fetching user");
    /// assert_eq!(error.to_string(), "fetching user: connection reset");
    /// ```
    #[must_use]
    pub fn wrap<E, C>(error: E, context: C) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
        C: Into<Cow<'static, str>>,
    {
        Self::new(error).context(context)
    }

    /// Adds a context message on top of this error.
    ///
    /// See [`Error::wrap`].
    #[must_use]
    pub fn context<C>(self, context: C) -> Self
    where
        C: Into<Cow<'static, str>>,
    {
        Self::from_repr(ErrorRepr::Context {
            context: context.into(),
            source: self,
        })
    }

    /// Joins several errors into one.
    ///
    /// Every joined error is a cause of the resulting error, and they are
    /// displayed one per line.
    ///
    /// # Examples
    ///
    /// ```
    /// use errmap::Error;
    ///
    /// let error = Error::join([Error::new("first"), Error::new("second")]);
    /// assert_eq!(error.to_string(), "first\nsecond");
    /// assert_eq!(error.chain().count(), 3);
    /// ```
    #[must_use]
    pub fn join<I>(errors: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::from_repr(ErrorRepr::Joined(errors.into_iter().collect()))
    }

    /// Returns an iterator over this error and all its causes.
    ///
    /// The tree of causes is walked depth-first: wrapped errors are followed
    /// through their [`source`](StdError::source), and every member of a
    /// joined error is visited in order. Errors created with [`Error::new`]
    /// are transparent, so the iterator yields the error they wrap instead.
    pub fn chain(&self) -> Chain<'_> {
        Chain { stack: vec![self] }
    }

    /// Returns `true` if any error in the [chain](Error::chain) is of type
    /// `T`.
    #[must_use]
    pub fn is<T>(&self) -> bool
    where
        T: StdError + 'static,
    {
        self.downcast_ref::<T>().is_some()
    }

    /// Returns the first error of type `T` in the [chain](Error::chain).
    #[must_use]
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        self.chain().find_map(|error| error.downcast_ref::<T>())
    }

    /// Returns the structural kind of this error, if it has one.
    ///
    /// Only the error itself is considered, not its causes: wrapping a
    /// [`ValidationErrors`] with a context message yields an error without a
    /// kind.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match &*self.repr {
            ErrorRepr::Single { kind, .. } => *kind,
            ErrorRepr::Context { .. } | ErrorRepr::Joined(_) => None,
        }
    }

    fn from_repr(repr: ErrorRepr) -> Self {
        Self {
            repr: Arc::new(repr),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.repr, f)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &*self.repr {
            ErrorRepr::Single { inner, .. } => Display::fmt(inner, f),
            ErrorRepr::Context { context, source } => write!(f, "{context}: {source}"),
            ErrorRepr::Joined(errors) => {
                for (index, error) in errors.iter().enumerate() {
                    if index > 0 {
                        f.write_str("\n")?;
                    }
                    Display::fmt(error, f)?;
                }
                Ok(())
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &*self.repr {
            ErrorRepr::Single { inner, .. } => inner.source(),
            ErrorRepr::Context { source, .. } => Some(source),
            // `source` can only expose one cause; use `Error::chain` to see all of them
            ErrorRepr::Joined(_) => None,
        }
    }
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for Error {
    fn from(error: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self::new(error)
    }
}

/// Structural kinds of errors that are matched by kind rather than by value.
///
/// Some errors carry data that makes comparing them to a marker value
/// meaningless: two [`ValidationErrors`] are "the same error" for the purpose
/// of picking a response even if they list different fields. Such errors are
/// tagged with a kind when an [`Error`] is created from them, and
/// [`ErrorMarker::kind`](crate::ErrorMarker::kind) matches on that tag.
///
/// The set of kinds is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The error is a [`ValidationErrors`].
    Validation,
}

impl ErrorKind {
    fn of(error: &(dyn StdError + Send + Sync + 'static)) -> Option<Self> {
        if error.is::<ValidationErrors>() {
            Some(Self::Validation)
        } else {
            None
        }
    }
}

/// Iterator over an [`Error`] and its causes.
///
/// Returned by [`Error::chain`].
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    stack: Vec<&'a (dyn StdError + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let mut error = self.stack.pop()?;
        while let Some(ErrorRepr::Single { inner, .. }) = repr_of(error) {
            error = &**inner;
        }

        match repr_of(error) {
            Some(ErrorRepr::Context { source, .. }) => self.stack.push(source),
            Some(ErrorRepr::Joined(errors)) => self.stack.extend(
                errors
                    .iter()
                    .rev()
                    .map(|error| -> &(dyn StdError + 'static) { error }),
            ),
            Some(ErrorRepr::Single { .. }) | None => self.stack.extend(error.source()),
        }

        Some(error)
    }
}

fn repr_of<'a>(error: &'a (dyn StdError + 'static)) -> Option<&'a ErrorRepr> {
    error.downcast_ref::<Error>().map(|error| &*error.repr)
}

/// Implements `From<$error_ty>` for [`Error`] through [`Error::new`].
#[macro_export]
macro_rules! impl_into_errmap_error {
    ($error_ty:ty) => {
        impl From<$error_ty> for $crate::Error {
            fn from(err: $error_ty) -> Self {
                $crate::Error::new(err)
            }
        }
    };
}
pub use impl_into_errmap_error;

impl_into_errmap_error!(ValidationErrors);
impl_into_errmap_error!(crate::error::ConfigError);
impl_into_errmap_error!(crate::error::NoResponse);
