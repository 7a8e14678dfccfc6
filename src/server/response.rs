//! Response builders. None of them can fail; a body that cannot be serialized becomes a 500.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_DISPOSITION, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use tracing::error;

pub(crate) type Body = Full<Bytes>;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";
const PDF: &str = "application/pdf";

fn with_body(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response<Body> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

pub(super) fn json<T: Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(body) => with_body(status, JSON, body),
        Err(e) => {
            error!("Unable to serialize a response body: {e}");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// `{"error": message}`
pub(super) fn error_json(status: StatusCode, message: &str) -> Response<Body> {
    let body = json!({ "error": message }).to_string();
    with_body(status, JSON, body)
}

pub(super) fn text(status: StatusCode, message: impl Into<String>) -> Response<Body> {
    with_body(status, TEXT, message.into())
}

pub(super) fn method_not_allowed() -> Response<Body> {
    let mut response = error_json(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET"));
    response
}

/// A PDF offered as a download named `filename`.
pub(super) fn pdf_attachment(bytes: Vec<u8>, filename: &str) -> Response<Body> {
    let mut response = with_body(StatusCode::OK, PDF, bytes);
    match HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
        Ok(value) => {
            response.headers_mut().insert(CONTENT_DISPOSITION, value);
        }
        Err(e) => error!("Unable to use '{filename}' as a download name: {e}"),
    }
    response
}
