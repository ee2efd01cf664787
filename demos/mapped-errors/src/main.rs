use bytes::Bytes;
use errmap::middleware::ErrorHandlerLayer;
use errmap::response::HttpContext;
use errmap::{Error, ErrorHandler, ErrorHandlerConfig, ErrorMarker};
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use serde_json::json;
use tower::{Layer, ServiceExt, service_fn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("custom error")]
struct CustomError;

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("error")]
struct PlainError;

async fn route(request: Request<()>) -> errmap::Result<Response<Full<Bytes>>> {
    match request.uri().path() {
        "/ping" => Err(Error::new(CustomError)),
        "/pong" => Err(Error::wrap(PlainError, "handling pong")),
        "/hello" => Ok(Response::new(Full::from("hello"))),
        _ => Err(Error::new("no such page")),
    }
}

fn error_handler() -> Result<ErrorHandler<HttpContext>, errmap::ConfigError> {
    let mut config = ErrorHandlerConfig::new();
    config
        .error_mappings([
            errmap::map([ErrorMarker::of_type::<CustomError>()]).to_response(
                |context: &mut HttpContext, _: &Error| {
                    context.json(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        &json!({"error": "internal application error"}),
                    )
                },
            ),
            errmap::map([ErrorMarker::new(PlainError)]).to_response(
                |context: &mut HttpContext, _: &Error| {
                    context.json(StatusCode::BAD_REQUEST, &json!({"error": "bad request"}))
                },
            ),
        ])
        .default_response(|context: &mut HttpContext| {
            context.json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({"error": "internal server error"}),
            )
        });

    ErrorHandler::new(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("errmap=debug"))
        .init();

    let service = ErrorHandlerLayer::new(error_handler()?).layer(service_fn(route));

    for path in ["/ping", "/pong", "/hello", "/missing"] {
        let request = Request::builder().uri(path).body(())?;
        let response = service.clone().oneshot(request).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        println!("GET {path} -> {status} {}", String::from_utf8_lossy(&body));
    }

    Ok(())
}
