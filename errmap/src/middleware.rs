//! Middleware running an [`ErrorHandler`] after a `tower` service.
//!
//! [`ErrorHandlerLayer`] wraps any service taking an [`http::Request`] and
//! returning an [`http::Response`]. When the inner service fails, its error is
//! recorded in an [`HttpContext`] and the error handler gets to produce a
//! response for it.

use std::error::Error as StdError;
use std::fmt::Debug;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::Full;
use tower::Service;
use tracing::trace;

use crate::Error;
use crate::handler::ErrorHandler;
use crate::response::HttpContext;

/// Layer applying [`ErrorHandlerService`] to a service.
///
/// # Examples
///
/// ```
/// use errmap::middleware::ErrorHandlerLayer;
/// use errmap::response::HttpContext;
/// use errmap::{ErrorHandler, ErrorHandlerConfig};
/// use http::StatusCode;
///
/// let mut config = ErrorHandlerConfig::new();
/// config.default_response(|context: &mut HttpContext| {
///     context.text(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
/// });
///
/// let _layer = ErrorHandlerLayer::new(ErrorHandler::new(config)?);
/// # Ok::<(), errmap::ConfigError>(())
/// ```
pub struct ErrorHandlerLayer<B = Full<Bytes>> {
    handler: ErrorHandler<HttpContext<B>>,
}

impl<B> ErrorHandlerLayer<B> {
    /// Creates a new [`ErrorHandlerLayer`] using the given error handler.
    #[must_use]
    pub fn new(handler: ErrorHandler<HttpContext<B>>) -> Self {
        Self { handler }
    }
}

impl<B> Clone for ErrorHandlerLayer<B> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

impl<B> Debug for ErrorHandlerLayer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandlerLayer")
            .field("handler", &self.handler)
            .finish()
    }
}

impl<S, B> tower::Layer<S> for ErrorHandlerLayer<B> {
    type Service = ErrorHandlerService<S, B>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorHandlerService {
            inner,
            handler: self.handler.clone(),
        }
    }
}

/// Service running an [`ErrorHandler`] on the errors of the inner service.
///
/// * If the inner service returns a response, it is passed through as is.
/// * If the inner service fails, its error is recorded and the error handler
///   picks a response producer for it. The produced response is returned.
/// * If no response was produced for the error (for instance because the
///   matching producer does not write one), the error is returned unchanged.
///
/// Used by [`ErrorHandlerLayer`].
pub struct ErrorHandlerService<S, B = Full<Bytes>> {
    inner: S,
    handler: ErrorHandler<HttpContext<B>>,
}

impl<S: Clone, B> Clone for ErrorHandlerService<S, B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<S: Debug, B> Debug for ErrorHandlerService<S, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandlerService")
            .field("inner", &self.inner)
            .field("handler", &self.handler)
            .finish()
    }
}

impl<S, ReqBody, B> Service<http::Request<ReqBody>> for ErrorHandlerService<S, B>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<B>>,
    S::Error: Into<Box<dyn StdError + Send + Sync + 'static>>,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = http::Response<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = crate::Result<Self::Response>> + Send>>;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Error::new)
    }

    fn call(&mut self, request: http::Request<ReqBody>) -> Self::Future {
        let mut context = HttpContext::for_request(&request);
        let handler = self.handler.clone();
        let future = self.inner.call(request);

        Box::pin(async move {
            match future.await {
                Ok(response) => context.set_response(response),
                Err(error) => {
                    context.record_error(error);
                    trace!(
                        method = %context.method(),
                        uri = %context.uri(),
                        "Request handler returned an error"
                    );
                }
            }

            handler.respond(&mut context)?;
            context.into_result()
        })
    }
}
