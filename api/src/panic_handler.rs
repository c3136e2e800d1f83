use std::any::Any;

use axum::{
    body::Body,
    http::{header, Response, StatusCode},
};
use dms_http_errors::ErrorResponseData;
use tracing::{event, Level};

fn panic_message(err: &(dyn Any + Send + 'static)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    }
}

pub fn handle_panic(production: bool, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = panic_message(err.as_ref());
    event!(Level::ERROR, %message, "Request handler panicked");

    let body = if production {
        ErrorResponseData::new("internal_server_error", "Server error")
    } else {
        ErrorResponseData::new("panic", message)
    };

    let body = serde_json::to_string(&body)
        .unwrap_or_else(|_| r##"{"error":{"kind":"panic","message":""}}"##.to_string());

    let mut res = Response::new(Body::from(body));
    *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    res
}
