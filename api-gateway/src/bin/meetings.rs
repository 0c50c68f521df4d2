//! Meetings Lambda - Lists and creates CRM meeting records.
//!
//! Endpoints:
//! - GET /api/work/meetings - Walk every page of the meetings object,
//!   project and filter (`meeting` substring, `languages` comma list)
//! - POST /api/work/meetings - Create a meeting from query or body fields

use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use serde_json::{json, Map, Value};
use shared::fields::{DEFAULT_MEETING_PROPS, MEETINGS_OBJECT_PATH};
use shared::http::{self, CACHE_LISTING};
use shared::shape::{apply_filters, project_meeting, split_filter_values};
use shared::{config, list_all, reconcile, Config, CrmObjectPager, Method, UpstreamClient};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    /// Absent when the credential was not configured at startup; every
    /// request then fails fast with a 500.
    crm: Option<UpstreamClient>,
}

impl AppState {
    fn new() -> Self {
        let crm = Config::from_env()
            .ok()
            .map(|config| UpstreamClient::new(config.hubspot_base, Some(config.hubspot_token)));
        Self { crm }
    }

    fn crm(&self) -> Result<&UpstreamClient, shared::Error> {
        self.crm
            .as_ref()
            .ok_or_else(|| shared::Error::Config(config::MISSING_HUBSPOT_PAT.to_string()))
    }
}

async fn list_meetings(state: &AppState, event: &Request) -> Result<Response<Body>, shared::Error> {
    let crm = state.crm()?;
    let params = event.query_string_parameters();

    let properties = params
        .first("properties")
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_MEETING_PROPS.join(","));
    let base_path = format!(
        "{}?limit=100&properties={}",
        MEETINGS_OBJECT_PATH,
        urlencoding::encode(&properties)
    );

    let pager = CrmObjectPager::new(crm, base_path);
    let listing = list_all(&pager).await?;

    let records: Vec<_> = listing.records.iter().map(project_meeting).collect();

    let meeting_filter = params.first("meeting").map(str::trim).filter(|s| !s.is_empty());
    let language_filters = params
        .first("languages")
        .map(split_filter_values)
        .unwrap_or_default();
    let items = apply_filters(records, meeting_filter, &language_filters);

    info!(count = items.len(), truncated = listing.truncated, "listed meetings");

    let mut payload = json!({ "success": true, "count": items.len(), "items": items });
    if listing.truncated {
        payload["truncated"] = json!(true);
    }

    http::cached_json_response(200, CACHE_LISTING, &payload)
}

async fn create_meeting(state: &AppState, event: &Request) -> Result<Response<Body>, shared::Error> {
    let crm = state.crm()?;
    let params = event.query_string_parameters();

    // Meeting and language are accepted from the query string or the JSON
    // body; a malformed body is treated as empty rather than rejected.
    let body: Value =
        serde_json::from_slice(event.body()).unwrap_or_else(|_| json!({}));
    let empty = Map::new();
    let fields = body.as_object().unwrap_or(&empty);

    let clean = |s: &str| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };
    let meeting = params
        .first("meeting")
        .and_then(clean)
        .or_else(|| reconcile::resolve(fields, &["meeting"], false));
    let language = params
        .first("language")
        .or_else(|| params.first("languages"))
        .and_then(clean)
        .or_else(|| reconcile::resolve(fields, &["language", "languages"], false));

    if meeting.is_none() && language.is_none() {
        return Err(shared::Error::ClientInput(
            "Provide at least one of: meeting or language".to_string(),
        ));
    }

    let mut properties = Map::new();
    if let Some(meeting) = meeting {
        properties.insert("meeting".to_string(), Value::String(meeting));
    }
    if let Some(language) = language {
        properties.insert("languages".to_string(), Value::String(language));
    }

    let create_body = json!({ "properties": properties });
    let result = crm
        .call(Method::POST, MEETINGS_OBJECT_PATH, Some(&create_body))
        .await;
    if !result.ok {
        return Err(shared::Error::from_upstream(result));
    }

    let created = result.body.unwrap_or(Value::Null);
    info!(id = created["id"].as_str().unwrap_or(""), "created meeting");

    http::json_response(
        201,
        &json!({
            "success": true,
            "created": {
                "id": created["id"],
                "properties": created.get("properties").cloned().unwrap_or_else(|| json!({})),
            }
        }),
    )
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let outcome = match event.method().as_str() {
        "GET" => list_meetings(&state, &event).await,
        "POST" => create_meeting(&state, &event).await,
        _ => Err(shared::Error::MethodNotAllowed(
            "Only GET and POST supported".to_string(),
        )),
    };

    match outcome {
        Ok(response) => Ok(response),
        Err(e) => {
            error!("meetings handler failed: {e}");
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
