//! Response builders shared by the route handlers
//!
//! Every response carries a permissive CORS origin header, matching the
//! preflight answer.

use bytes::Bytes;
use http_body_util::Full;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

use crate::types::RewardsError;

pub type HttpResponse = Response<Full<Bytes>>;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: &'static str,
}

fn base(status: StatusCode) -> Builder {
    Response::builder()
        .status(status)
        .header("Access-Control-Allow-Origin", "*")
}

/// Finish a builder, degrading to a bare 500 if a header value was invalid
fn finish(builder: Builder, body: impl Into<Bytes>) -> HttpResponse {
    builder.body(Full::new(body.into())).unwrap_or_else(|e| {
        error!("Failed to build response: {}", e);
        let mut fallback = Response::new(Full::new(Bytes::from_static(br#"{"error":"Internal error"}"#)));
        *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}

pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> HttpResponse {
    json_response_with(status, value, &[])
}

/// JSON response with extra headers
pub fn json_response_with<T: Serialize>(
    status: StatusCode,
    value: &T,
    headers: &[(&str, &str)],
) -> HttpResponse {
    let body = match serde_json::to_vec(value) {
        Ok(body) => body,
        Err(e) => return error_response(&RewardsError::Internal(format!("Serialization failed: {}", e))),
    };

    let mut builder = base(status).header("Content-Type", "application/json");
    if !headers.iter().any(|(name, _)| name.eq_ignore_ascii_case("Cache-Control")) {
        builder = builder.header("Cache-Control", "no-cache");
    }
    let builder = headers
        .iter()
        .fold(builder, |b, (name, value)| b.header(*name, *value));

    finish(builder, body)
}

pub fn error_response(err: &RewardsError) -> HttpResponse {
    let body = serde_json::to_vec(&ApiError {
        error: err.public_message(),
        code: err.code(),
    })
    .unwrap_or_default();

    finish(
        base(err.status_code())
            .header("Content-Type", "application/json")
            .header("Cache-Control", "no-cache"),
        body,
    )
}

/// Downloadable CSV
pub fn csv_response(body: String, filename: &str) -> HttpResponse {
    finish(
        base(StatusCode::OK)
            .header("Content-Type", "text/csv; charset=utf-8")
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", filename),
            )
            .header("Cache-Control", "no-cache"),
        body,
    )
}

pub fn not_modified(etag: &str) -> HttpResponse {
    finish(base(StatusCode::NOT_MODIFIED).header("ETag", etag), Bytes::new())
}

pub fn preflight_response() -> HttpResponse {
    finish(
        base(StatusCode::OK)
            .header("Access-Control-Allow-Headers", "Authorization, Content-Type, If-None-Match")
            .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
            .header("Access-Control-Max-Age", "86400"),
        Bytes::new(),
    )
}

pub fn not_found_response(path: &str) -> HttpResponse {
    error_response(&RewardsError::NotFound(path.to_string()))
}
