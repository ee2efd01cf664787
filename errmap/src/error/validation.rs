use std::borrow::Cow;

use derive_more::with_trait::Display;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("`{field}`: {message}")]
pub struct FieldError {
    field: Cow<'static, str>,
    message: Cow<'static, str>,
}

impl FieldError {
    /// Creates a new `FieldError` for the given field name and message.
    ///
    /// # Examples
    ///
    /// ```
    /// use errmap::FieldError;
    ///
    /// let error = FieldError::new("email", "must contain an `@`");
    /// assert_eq!(error.field(), "email");
    /// ```
    #[must_use]
    pub fn new<F, M>(field: F, message: M) -> Self
    where
        F: Into<Cow<'static, str>>,
        M: Into<Cow<'static, str>>,
    {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The name of the field that failed validation.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// A human-readable description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A collection of field validation failures.
///
/// `ValidationErrors` is tagged with [`ErrorKind::Validation`] when turned
/// into an [`Error`](crate::Error), so it is matched with
/// [`ErrorMarker::kind`](crate::ErrorMarker::kind) no matter which fields
/// failed.
///
/// [`ErrorKind::Validation`]: crate::ErrorKind::Validation
///
/// # Examples
///
/// ```
/// use errmap::{Error, ErrorKind, ValidationErrors};
///
/// let mut errors = ValidationErrors::new();
/// errors.push("name", "must not be empty");
///
/// let error = Error::from(errors);
/// assert_eq!(error.kind(), Some(ErrorKind::Validation));
/// assert_eq!(error.to_string(), "validation failed: `name`: must not be empty");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates an empty `ValidationErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a failure for the given field.
    pub fn push<F, M>(&mut self, field: F, message: M)
    where
        F: Into<Cow<'static, str>>,
        M: Into<Cow<'static, str>>,
    {
        self.errors.push(FieldError::new(field, message));
    }

    /// Returns `true` if no field failed validation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The number of fields that failed validation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates over the failures in the order they were added.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("validation failed")?;
        for (index, error) in self.errors.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl FromIterator<FieldError> for ValidationErrors {
    fn from_iter<T: IntoIterator<Item = FieldError>>(iter: T) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
