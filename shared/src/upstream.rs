//! Shared client for calling third-party REST upstreams.
//!
//! Every handler talks to its upstream through [`UpstreamClient`] rather than
//! redefining an ad hoc fetch helper per endpoint. A call never raises for
//! upstream misbehavior: transport failures, HTTP error statuses, and
//! non-JSON bodies are all encoded in [`UpstreamResult`] for the caller to
//! inspect.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

pub use reqwest::Method;

/// Default per-request timeout, matching the CRM upstream.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Outcome of a single upstream call.
///
/// `ok` is true only when the transport succeeded, the body parsed as JSON,
/// and the HTTP status was in the 2xx range. `parse_failed` implies
/// `body.is_none()` and `raw_text` holding the original response text.
#[derive(Debug)]
pub struct UpstreamResult {
    pub ok: bool,
    /// Absent when the failure happened before any HTTP status was received
    /// (timeout, connect error, truncated body).
    pub http_status: Option<u16>,
    pub status_text: String,
    pub body: Option<Value>,
    pub parse_failed: bool,
    pub raw_text: Option<String>,
}

impl UpstreamResult {
    fn transport_failure(detail: String) -> Self {
        Self {
            ok: false,
            http_status: None,
            status_text: detail,
            body: None,
            parse_failed: false,
            raw_text: None,
        }
    }

    /// Build a result from a received status line and body text.
    pub(crate) fn from_http_parts(status: reqwest::StatusCode, text: String) -> Self {
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        match serde_json::from_str::<Value>(&text) {
            Ok(body) => Self {
                ok: status.is_success(),
                http_status: Some(status.as_u16()),
                status_text,
                body: Some(body),
                parse_failed: false,
                raw_text: None,
            },
            Err(_) => Self {
                ok: false,
                http_status: Some(status.as_u16()),
                status_text,
                body: None,
                parse_failed: true,
                raw_text: Some(text),
            },
        }
    }
}

/// HTTP client bound to one upstream base URL and auth scheme.
///
/// Construct once per process in `AppState`; the credential is injected here
/// at startup, never read from the environment mid-request.
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, bearer_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            bearer_token,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Issue one call against the upstream.
    ///
    /// `path` is joined onto the base URL and may already carry a query
    /// string. A JSON body, when given, is sent with
    /// `Content-Type: application/json`.
    pub async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> UpstreamResult {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "calling upstream");

        let mut request = self.http.request(method, &url).timeout(self.timeout);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return UpstreamResult::transport_failure(describe_transport_error(&e)),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return UpstreamResult::transport_failure(describe_transport_error(&e)),
        };

        UpstreamResult::from_http_parts(status, text)
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    }
}
