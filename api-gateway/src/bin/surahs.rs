//! Surah Index Lambda - Proxies the AlQuran Cloud chapter listing.
//!
//! Endpoints:
//! - GET /api/quran/surahs - List all 114 surahs with translated names

use std::sync::Arc;
use std::time::Duration;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Serialize;
use serde_json::{json, Value};
use shared::http::{self, CACHE_REFERENCE};
use shared::{Config, Method, UpstreamClient};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// One surah, reshaped from the upstream chapter record.
#[derive(Debug, Serialize)]
struct SurahSummary {
    /// Absent when the upstream record is malformed; never defaulted, so a
    /// bad record stays visible instead of masquerading as surah 0.
    number: Option<i64>,
    name: Option<String>,
    #[serde(rename = "nameShort")]
    name_short: Option<String>,
    #[serde(rename = "revelationType")]
    revelation_type: Option<String>,
    ayahs: Option<i64>,
}

impl SurahSummary {
    fn from_upstream(record: &Value) -> Self {
        Self {
            number: record["number"].as_i64(),
            name: record["englishName"].as_str().map(str::to_string),
            name_short: record["englishNameTranslation"].as_str().map(str::to_string),
            revelation_type: record["revelationType"].as_str().map(str::to_string),
            ayahs: record["numberOfAyahs"].as_i64(),
        }
    }
}

/// Application state
struct AppState {
    quran: UpstreamClient,
}

impl AppState {
    fn new() -> Self {
        let quran = UpstreamClient::new(Config::quran_base_from_env(), None)
            .with_timeout(Duration::from_secs(15));
        Self { quran }
    }
}

async fn list_surahs(state: &AppState) -> Result<Response<Body>, shared::Error> {
    let result = state.quran.call(Method::GET, "/v1/surah", None).await;
    if !result.ok {
        return Err(shared::Error::from_upstream(result));
    }

    // Transport and parse both succeeded; the payload still carries its own
    // status field.
    let body = result.body.unwrap_or(Value::Null);
    if body["status"] != "OK" {
        return Err(shared::Error::UpstreamLogical {
            status: result.http_status.unwrap_or_default(),
            status_text: result.status_text,
            body: Some(body),
        });
    }

    let surahs: Vec<SurahSummary> = body["data"]
        .as_array()
        .map(|records| records.iter().map(SurahSummary::from_upstream).collect())
        .unwrap_or_default();

    info!(count = surahs.len(), "listed surahs");

    http::cached_json_response(
        200,
        CACHE_REFERENCE,
        &json!({ "success": true, "count": surahs.len(), "surahs": surahs }),
    )
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let outcome = match event.method().as_str() {
        "GET" => list_surahs(&state).await,
        _ => Err(shared::Error::MethodNotAllowed(
            "Only GET supported".to_string(),
        )),
    };

    match outcome {
        Ok(response) => Ok(response),
        Err(e) => {
            error!("surahs handler failed: {e}");
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

    let state = Arc::new(AppState::new());

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_the_upstream_chapter_record() {
        let record = json!({
            "number": 1,
            "englishName": "Al-Faatiha",
            "englishNameTranslation": "The Opening",
            "revelationType": "Meccan",
            "numberOfAyahs": 7
        });

        let surah = SurahSummary::from_upstream(&record);
        assert_eq!(surah.number, Some(1));
        assert_eq!(surah.name.as_deref(), Some("Al-Faatiha"));
        assert_eq!(surah.name_short.as_deref(), Some("The Opening"));
        assert_eq!(surah.revelation_type.as_deref(), Some("Meccan"));
        assert_eq!(surah.ayahs, Some(7));
    }

    #[test]
    fn malformed_record_leaves_every_field_absent() {
        let surah = SurahSummary::from_upstream(&json!({}));
        assert_eq!(surah.number, None);
        assert_eq!(surah.name, None);
        assert_eq!(surah.ayahs, None);
    }
}
