//! The request context used by the HTTP middleware.
//!
//! [`HttpContext`] is what response producers receive when the error handler
//! runs as part of an [`ErrorHandlerLayer`](crate::middleware::ErrorHandlerLayer).
//! It holds the request method and URI, the errors recorded while the
//! request was handled, and the response, once one is written.

use std::error::Error as StdError;
use std::fmt::Debug;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method, StatusCode, Uri};
use http_body_util::Full;

use crate::context::ResponseState;
use crate::error::{Error, NoResponse, impl_into_errmap_error};

const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
#[cfg(feature = "json")]
const JSON_CONTENT_TYPE: &str = "application/json";

impl_into_errmap_error!(http::Error);
#[cfg(feature = "json")]
impl_into_errmap_error!(serde_json::Error);

/// A per-request context for HTTP responses with body type `B`.
///
/// # Examples
///
/// ```
/// use errmap::response::HttpContext;
/// use http::{Method, StatusCode};
///
/// let mut context: HttpContext = HttpContext::new(Method::GET, "/users/1".parse()?);
/// context.record_error("user not found");
/// context.text(StatusCode::NOT_FOUND, "not found")?;
///
/// let response = context.into_result()?;
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct HttpContext<B = Full<Bytes>> {
    method: Method,
    uri: Uri,
    errors: Vec<Error>,
    response: Option<http::Response<B>>,
}

impl<B> HttpContext<B> {
    /// Creates a context for a request with the given method and URI.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            errors: Vec::new(),
            response: None,
        }
    }

    /// Creates a context for the given request, copying its method and URI.
    #[must_use]
    pub fn for_request<T>(request: &http::Request<T>) -> Self {
        Self::new(request.method().clone(), request.uri().clone())
    }

    /// The method of the request being handled.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The URI of the request being handled.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Records an error for this request.
    pub fn record_error<E>(&mut self, error: E)
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        self.errors.push(Error::new(error));
    }

    /// All errors recorded for this request, oldest first.
    #[must_use]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Writes the response, replacing any response written before.
    pub fn set_response(&mut self, response: http::Response<B>) {
        self.response = Some(response);
    }

    /// The response written so far, if any.
    #[must_use]
    pub fn response(&self) -> Option<&http::Response<B>> {
        self.response.as_ref()
    }

    /// Consumes the context, returning the written response.
    ///
    /// # Errors
    ///
    /// If no response was written, returns the last recorded error, or
    /// [`NoResponse`] if no error was recorded either.
    pub fn into_result(mut self) -> crate::Result<http::Response<B>> {
        match (self.response, self.errors.pop()) {
            (Some(response), _) => Ok(response),
            (None, Some(error)) => Err(error),
            (None, None) => Err(NoResponse.into()),
        }
    }
}

impl<B: From<Bytes>> HttpContext<B> {
    /// Writes a plain text response with the given status code.
    ///
    /// # Errors
    ///
    /// Returns an error if the response could not be built.
    pub fn text<T: Into<String>>(&mut self, status: StatusCode, body: T) -> crate::Result<()> {
        self.write_body(status, TEXT_CONTENT_TYPE, Bytes::from(body.into()))
    }

    /// Writes a JSON response with the given status code.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` could not be serialized or the response
    /// could not be built.
    ///
    /// # Examples
    ///
    /// ```
    /// use errmap::response::HttpContext;
    /// use http::{Method, StatusCode};
    ///
    /// let mut context: HttpContext = HttpContext::new(Method::GET, "/".parse()?);
    /// context.json(
    ///     StatusCode::BAD_REQUEST,
    ///     &serde_json::json!({"error": "bad request"}),
    /// )?;
    ///
    /// let response = context.into_result()?;
    /// assert_eq!(response.headers()["content-type"], "application/json");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[cfg(feature = "json")]
    pub fn json<T>(&mut self, status: StatusCode, value: &T) -> crate::Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        let body = serde_json::to_vec(value)?;
        self.write_body(status, JSON_CONTENT_TYPE, Bytes::from(body))
    }

    fn write_body(
        &mut self,
        status: StatusCode,
        content_type: &'static str,
        body: Bytes,
    ) -> crate::Result<()> {
        let response = http::Response::builder()
            .status(status)
            .header(CONTENT_TYPE, HeaderValue::from_static(content_type))
            .body(B::from(body))?;
        self.set_response(response);
        Ok(())
    }
}

impl<B> ResponseState for HttpContext<B> {
    fn last_error(&self) -> Option<Error> {
        self.errors.last().cloned()
    }

    fn is_written(&self) -> bool {
        self.response.is_some()
    }
}

impl<B> Debug for HttpContext<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpContext")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("errors", &self.errors)
            .field(
                "response",
                &self.response.as_ref().map(http::Response::status),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    fn context() -> HttpContext {
        HttpContext::new(Method::POST, Uri::from_static("/users"))
    }

    async fn body_of(response: http::Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn for_request_copies_method_and_uri() {
        let request = http::Request::builder()
            .method(Method::DELETE)
            .uri("/users/7")
            .body(())
            .unwrap();

        let context: HttpContext = HttpContext::for_request(&request);

        assert_eq!(*context.method(), Method::DELETE);
        assert_eq!(context.uri(), "/users/7");
    }

    #[test]
    fn response_state() {
        let mut context = context();
        assert!(context.last_error().is_none());
        assert!(!context.is_written());

        context.record_error("first");
        context.record_error("second");
        context.set_response(http::Response::new(Full::from("ok")));

        assert_eq!(context.last_error().unwrap().to_string(), "second");
        assert_eq!(context.errors().len(), 2);
        assert!(context.is_written());
    }

    #[tokio::test]
    async fn text_response() {
        let mut context = context();

        context.text(StatusCode::CONFLICT, "already exists").unwrap();

        let response = context.into_result().unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response.headers()[CONTENT_TYPE], TEXT_CONTENT_TYPE);
        assert_eq!(body_of(response).await, "already exists");
    }

    #[cfg(feature = "json")]
    #[tokio::test]
    async fn json_response() {
        #[derive(serde::Serialize)]
        struct ErrorBody<'a> {
            error: &'a str,
        }

        let mut context = context();

        context
            .json(StatusCode::BAD_REQUEST, &ErrorBody { error: "invalid" })
            .unwrap();

        let response = context.into_result().unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(body_of(response).await, r#"{"error":"invalid"}"#);
    }

    #[test]
    fn into_result_returns_last_error_without_response() {
        let mut context = context();
        context.record_error("first");
        context.record_error("second");

        let error = context.into_result().unwrap_err();

        assert_eq!(error.to_string(), "second");
    }

    #[test]
    fn into_result_without_response_or_error() {
        let error = context().into_result().unwrap_err();

        assert!(error.is::<NoResponse>());
    }
}
