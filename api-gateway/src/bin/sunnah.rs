//! Sunnah Sample Lambda - Serves a curated hadith sample.
//!
//! Endpoints:
//! - GET /api/sunnah - List the sample, optionally filtered by `collection`

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use serde::Serialize;
use serde_json::json;
use shared::http::{self, CACHE_REFERENCE};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// One hadith in the curated sample.
#[derive(Debug, Clone, Serialize)]
struct HadithRecord {
    collection: &'static str,
    book: u32,
    hadith: u32,
    narrator: &'static str,
    text: &'static str,
}

const SAMPLE: &[HadithRecord] = &[
    HadithRecord {
        collection: "Bukhari",
        book: 1,
        hadith: 1,
        narrator: "Umar ibn Al-Khattab (RA)",
        text: "Actions are but by intentions...",
    },
    HadithRecord {
        collection: "Muslim",
        book: 8,
        hadith: 2564,
        narrator: "Abu Huraira (RA)",
        text: "A strong believer is better and more beloved to Allah...",
    },
];

fn list_hadith(collection: Option<&str>) -> Vec<HadithRecord> {
    SAMPLE
        .iter()
        .filter(|h| match collection {
            Some(name) => h.collection.eq_ignore_ascii_case(name),
            None => true,
        })
        .cloned()
        .collect()
}

async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let outcome = match event.method().as_str() {
        "GET" => {
            let params = event.query_string_parameters();
            let items = list_hadith(params.first("collection"));
            http::cached_json_response(
                200,
                CACHE_REFERENCE,
                &json!({ "success": true, "count": items.len(), "items": items }),
            )
        }
        _ => Err(shared::Error::MethodNotAllowed(
            "Only GET supported".to_string(),
        )),
    };

    match outcome {
        Ok(response) => Ok(response),
        Err(e) => {
            error!("sunnah handler failed: {e}");
            Ok(http::error_response(&e))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_filter_is_case_insensitive_equality() {
        let items = list_hadith(Some("bukhari"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].collection, "Bukhari");

        // Substring does not match; the filter is whole-name equality.
        assert!(list_hadith(Some("bukh")).is_empty());
    }

    #[test]
    fn no_filter_returns_the_whole_sample() {
        assert_eq!(list_hadith(None).len(), SAMPLE.len());
    }
}
