//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};

/// Cache-control for short-lived listing data (CRM objects).
pub const CACHE_LISTING: &str = "s-maxage=300, stale-while-revalidate=3600";

/// Cache-control for slow-moving reference data (content API, static sets).
pub const CACHE_REFERENCE: &str = "s-maxage=3600, stale-while-revalidate=86400";

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Response<Body>> {
    let body = serde_json::to_string(data)?;
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("failed to build response"))
}

/// JSON response carrying a cache-control hint for the CDN.
pub fn cached_json_response<T: Serialize>(
    status: u16,
    cache_control: &str,
    data: &T,
) -> Result<Response<Body>> {
    let body = serde_json::to_string(data)?;
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .header("cache-control", cache_control)
        .body(Body::from(body))
        .expect("failed to build response"))
}

/// Convert any pipeline error into its JSON error response.
///
/// The envelope is always `{"success": false, "error": ...}`; upstream
/// failures additionally carry `meta` (HTTP status and status text) plus the
/// raw text (parse failures) or decoded body (logical failures) for
/// diagnosis.
pub fn error_response(err: &Error) -> Response<Body> {
    let payload = match err {
        Error::UpstreamTransport { detail } => json!({
            "success": false,
            "error": err.to_string(),
            "meta": { "status": Value::Null, "statusText": detail },
        }),
        Error::UpstreamParse { status, status_text, raw } => json!({
            "success": false,
            "error": err.to_string(),
            "meta": { "status": status, "statusText": status_text },
            "raw": raw,
        }),
        Error::UpstreamLogical { status, status_text, body } => json!({
            "success": false,
            "error": err.to_string(),
            "meta": { "status": status, "statusText": status_text },
            "body": body,
        }),
        _ => json!({ "success": false, "error": err.to_string() }),
    };

    Response::builder()
        .status(err.status_code())
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("failed to build response")
}
