//! Error types for Deen Portal Lambda functions.

use serde_json::Value;
use thiserror::Error;

use crate::upstream::UpstreamResult;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Deen Portal Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid process configuration (e.g. the CRM credential)
    #[error("{0}")]
    Config(String),

    /// Caller-supplied input is missing or invalid
    #[error("{0}")]
    ClientInput(String),

    /// A referenced upstream entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// HTTP method not supported by the handler
    #[error("{0}")]
    MethodNotAllowed(String),

    /// Timeout or network failure before any HTTP status was received
    #[error("Upstream request failed: {detail}")]
    UpstreamTransport { detail: String },

    /// Upstream responded, but the body was not valid JSON
    #[error("Upstream parse error")]
    UpstreamParse {
        status: u16,
        status_text: String,
        raw: String,
    },

    /// Upstream responded with parseable JSON but a non-success status
    #[error("Upstream failure")]
    UpstreamLogical {
        status: u16,
        status_text: String,
        body: Option<Value>,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::ClientInput(_) => 400,
            Error::NotFound(_) => 404,
            Error::MethodNotAllowed(_) => 405,
            Error::UpstreamTransport { .. }
            | Error::UpstreamParse { .. }
            | Error::UpstreamLogical { .. } => 502,
            Error::Config(_) | Error::Serialization(_) => 500,
        }
    }

    /// Classify a failed upstream call into its error class.
    pub fn from_upstream(result: UpstreamResult) -> Self {
        match result.http_status {
            None => Error::UpstreamTransport {
                detail: result.status_text,
            },
            Some(status) if result.parse_failed => Error::UpstreamParse {
                status,
                status_text: result.status_text,
                raw: result.raw_text.unwrap_or_default(),
            },
            Some(status) => Error::UpstreamLogical {
                status,
                status_text: result.status_text,
                body: result.body,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(Error::Config("Missing HUBSPOT_PAT env var".into()).status_code(), 500);
        assert_eq!(Error::ClientInput("Missing email".into()).status_code(), 400);
        assert_eq!(Error::NotFound("Contact not found by email".into()).status_code(), 404);
        assert_eq!(Error::MethodNotAllowed("Only POST supported".into()).status_code(), 405);
        assert_eq!(
            Error::UpstreamTransport { detail: "request timed out".into() }.status_code(),
            502
        );
    }

    #[test]
    fn transport_failures_classify_without_a_status() {
        let result = UpstreamResult {
            ok: false,
            http_status: None,
            status_text: "request timed out".into(),
            body: None,
            parse_failed: false,
            raw_text: None,
        };

        match Error::from_upstream(result) {
            Error::UpstreamTransport { detail } => assert_eq!(detail, "request timed out"),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn parse_failures_keep_the_raw_body() {
        let result = UpstreamResult {
            ok: false,
            http_status: Some(200),
            status_text: "OK".into(),
            body: None,
            parse_failed: true,
            raw_text: Some("<html>rate limited</html>".into()),
        };

        match Error::from_upstream(result) {
            Error::UpstreamParse { status, raw, .. } => {
                assert_eq!(status, 200);
                assert_eq!(raw, "<html>rate limited</html>");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
