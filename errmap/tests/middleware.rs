use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use errmap::middleware::ErrorHandlerLayer;
use errmap::response::HttpContext;
use errmap::{Error, ErrorHandler, ErrorHandlerConfig, ErrorKind, ErrorMarker, ValidationErrors};
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use tower::{Layer, Service, ServiceExt, service_fn};

#[derive(Debug, PartialEq, thiserror::Error)]
enum AppError {
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error("unmapped")]
    Unmapped,
}

fn layer() -> ErrorHandlerLayer {
    let mut config = ErrorHandlerConfig::new();
    config
        .error_mappings([
            errmap::map([ErrorMarker::new(AppError::NotFound)]).to_response(
                |context: &mut HttpContext, error: &Error| {
                    context.text(StatusCode::NOT_FOUND, error.to_string())
                },
            ),
            errmap::map([ErrorMarker::new(AppError::Conflict)])
                .to_response(|_: &mut HttpContext, _: &Error| Ok(())),
            errmap::map([ErrorKind::Validation]).to_response(
                |context: &mut HttpContext, error: &Error| {
                    context.json(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        &serde_json::json!({ "error": error.to_string() }),
                    )
                },
            ),
        ])
        .default_response(|context: &mut HttpContext| {
            context.text(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        });

    ErrorHandlerLayer::new(ErrorHandler::new(config).unwrap())
}

async fn body_of(response: Response<Full<Bytes>>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request() -> Request<()> {
    Request::builder().uri("/users/1").body(()).unwrap()
}

#[tokio::test]
async fn passes_successful_response_through() {
    let service = layer().layer(service_fn(|_: Request<()>| async {
        Ok::<_, Error>(Response::new(Full::from("hello")))
    }));

    let response = service.oneshot(request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_of(response).await, "hello");
}

#[tokio::test]
async fn maps_error_to_response() {
    let service = layer().layer(service_fn(|_: Request<()>| async {
        Err::<Response<Full<Bytes>>, _>(Error::wrap(AppError::NotFound, "loading user"))
    }));

    let response = service.oneshot(request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_of(response).await, "loading user: not found");
}

#[tokio::test]
async fn unmapped_error_uses_default_response() {
    let service = layer().layer(service_fn(|_: Request<()>| async {
        Err::<Response<Full<Bytes>>, _>(AppError::Unmapped)
    }));

    let response = service.oneshot(request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_of(response).await, "internal server error");
}

#[tokio::test]
async fn validation_errors_use_json_response() {
    let service = layer().layer(service_fn(|_: Request<()>| async {
        let mut errors = ValidationErrors::new();
        errors.push("email", "must contain an `@`");
        Err::<Response<Full<Bytes>>, _>(Error::from(errors))
    }));

    let response = service.oneshot(request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_of(response).await,
        r#"{"error":"validation failed: `email`: must contain an `@`"}"#
    );
}

#[tokio::test]
async fn error_without_produced_response_is_returned() {
    let service = layer().layer(service_fn(|_: Request<()>| async {
        Err::<Response<Full<Bytes>>, _>(AppError::Conflict)
    }));

    let error = service.oneshot(request()).await.unwrap_err();

    assert_eq!(error.downcast_ref::<AppError>(), Some(&AppError::Conflict));
}

#[tokio::test]
async fn producer_error_is_returned() {
    let mut config = ErrorHandlerConfig::new();
    config.default_response(|_: &mut HttpContext| Err(Error::new("default producer failed")));
    let layer = ErrorHandlerLayer::new(ErrorHandler::new(config).unwrap());
    let service = layer.layer(service_fn(|_: Request<()>| async {
        Err::<Response<Full<Bytes>>, _>(AppError::Unmapped)
    }));

    let error = service.oneshot(request()).await.unwrap_err();

    assert_eq!(error.to_string(), "default producer failed");
}

#[tokio::test]
async fn producers_see_request_method_and_uri() {
    let mut config = ErrorHandlerConfig::new();
    config.default_response(|context: &mut HttpContext| {
        let body = format!("{} {}", context.method(), context.uri());
        context.text(StatusCode::INTERNAL_SERVER_ERROR, body)
    });
    let layer = ErrorHandlerLayer::new(ErrorHandler::new(config).unwrap());
    let service = layer.layer(service_fn(|_: Request<()>| async {
        Err::<Response<Full<Bytes>>, _>(AppError::Unmapped)
    }));

    let request = Request::builder()
        .method("DELETE")
        .uri("/users/7")
        .body(())
        .unwrap();
    let response = service.oneshot(request).await.unwrap();

    assert_eq!(body_of(response).await, "DELETE /users/7");
}

#[tokio::test]
async fn layer_is_shared_between_services() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut config = ErrorHandlerConfig::new();
    config.default_response(move |context: &mut HttpContext| {
        counter.fetch_add(1, Ordering::SeqCst);
        context.text(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    });
    let layer = ErrorHandlerLayer::new(ErrorHandler::new(config).unwrap());

    let mut service = layer.layer(service_fn(|_: Request<()>| async {
        Err::<Response<Full<Bytes>>, _>(AppError::Unmapped)
    }));
    for _ in 0..3 {
        let response = service.ready().await.unwrap().call(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn infallible_inner_service() {
    let service = layer().layer(service_fn(|_: Request<()>| async {
        Ok::<_, Infallible>(Response::new(Full::from("ok")))
    }));

    let response = service.oneshot(request()).await.unwrap();

    assert_eq!(body_of(response).await, "ok");
}
