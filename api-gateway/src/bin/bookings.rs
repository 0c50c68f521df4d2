//! Bookings Lambda - Applies intake-form submissions to CRM contacts.
//!
//! Endpoints:
//! - POST /api/work/bookings - Resolve the contact (by id or email search)
//!   and update it with the reconciled form fields

use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde_json::{json, Map, Value};
use shared::fields::{CONTACT_FIELDS, EMAIL_KEYS};
use shared::http;
use shared::{config, reconcile, Config, Method, UpstreamClient};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const CONTACTS_PATH: &str = "/crm/v3/objects/contacts";

/// Application state
struct AppState {
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

/// Select the field map to reconcile against. Form platforms wrap fields in
/// an `inputs` object; direct callers send them at the top level. A present
/// but non-object `inputs` value counts as an empty map rather than falling
/// back to the top-level keys.
fn booking_inputs<'a>(payload: &'a Value, empty: &'a Map<String, Value>) -> &'a Map<String, Value> {
    match payload.get("inputs") {
        Some(inputs) => inputs.as_object().unwrap_or(empty),
        None => payload.as_object().unwrap_or(empty),
    }
}

/// Reconcile the contact email from the inputs, falling back to
/// `contact.email`; absence is a client error.
fn resolve_email(payload: &Value, inputs: &Map<String, Value>) -> Result<String, shared::Error> {
    reconcile::resolve(inputs, EMAIL_KEYS, false)
        .or_else(|| payload.pointer("/contact/email").and_then(reconcile::value_to_text))
        .ok_or_else(|| shared::Error::ClientInput("Missing email".to_string()))
}

/// Contact id supplied directly by the caller, if any.
fn resolve_contact_id(payload: &Value) -> Option<String> {
    payload
        .get("contactId")
        .and_then(reconcile::value_to_text)
        .or_else(|| payload.pointer("/contact/id").and_then(reconcile::value_to_text))
}

/// Find the contact id for `email`, or fail with 404 when no contact
/// matches.
async fn search_contact_by_email(
    crm: &UpstreamClient,
    email: &str,
) -> Result<String, shared::Error> {
    let search_body = json!({
        "filterGroups": [
            { "filters": [{ "propertyName": "email", "operator": "EQ", "value": email }] }
        ],
        "limit": 1
    });

    let result = crm
        .call(
            Method::POST,
            &format!("{CONTACTS_PATH}/search"),
            Some(&search_body),
        )
        .await;
    if !result.ok {
        return Err(shared::Error::from_upstream(result));
    }

    let body = result.body.unwrap_or(Value::Null);
    body.pointer("/results/0/id")
        .and_then(reconcile::value_to_text)
        .ok_or_else(|| shared::Error::NotFound("Contact not found by email".to_string()))
}

async fn update_contact(state: &AppState, event: &Request) -> Result<Response<Body>, shared::Error> {
    let crm = state.crm()?;

    // A malformed body is treated as empty; the missing-email check below
    // then rejects it with a 400.
    let payload: Value = serde_json::from_slice(event.body()).unwrap_or_else(|_| json!({}));

    let empty = Map::new();
    let inputs = booking_inputs(&payload, &empty);

    let email = resolve_email(&payload, inputs)?;

    let contact_id = match resolve_contact_id(&payload) {
        Some(id) => id,
        None => search_contact_by_email(crm, &email).await?,
    };

    let mut properties = Map::new();
    for field in CONTACT_FIELDS {
        if let Some(value) = reconcile::resolve(inputs, field.candidates, field.exclude_pending) {
            properties.insert(field.property.to_string(), Value::String(value));
        }
    }

    let field_count = properties.len();
    let properties = Value::Object(properties);
    let update_body = json!({ "properties": &properties });
    let result = crm
        .call(
            Method::PATCH,
            &format!("{CONTACTS_PATH}/{}", urlencoding::encode(&contact_id)),
            Some(&update_body),
        )
        .await;
    if !result.ok {
        return Err(shared::Error::from_upstream(result));
    }

    info!(contact_id = contact_id.as_str(), fields = field_count, "updated contact");

    http::json_response(
        200,
        &json!({
            "success": true,
            "contactId": contact_id,
            "properties": properties,
        }),
    )
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let outcome = match event.method().as_str() {
        "POST" => update_contact(&state, &event).await,
        _ => Err(shared::Error::MethodNotAllowed(
            "Only POST supported".to_string(),
        )),
    };

    match outcome {
        Ok(response) => Ok(response),
        Err(e) => {
            error!("bookings handler failed: {e}");
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
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn spawn_raw_server(response: &'static [u8]) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn payload_without_email_or_contact_id_is_a_400() {
        let payload = json!({ "inputs": { "Agent age:": "34" } });
        let empty = Map::new();
        let inputs = booking_inputs(&payload, &empty);

        assert_eq!(resolve_contact_id(&payload), None);
        let err = resolve_email(&payload, inputs).unwrap_err();
        match &err {
            shared::Error::ClientInput(message) => assert_eq!(message, "Missing email"),
            other => panic!("expected client input error, got {other:?}"),
        }
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn email_resolves_from_alternate_keys_or_contact_fallback() {
        let payload = json!({ "inputs": { "Email:": " user@example.com " } });
        let empty = Map::new();
        let email = resolve_email(&payload, booking_inputs(&payload, &empty)).unwrap();
        assert_eq!(email, "user@example.com");

        let payload = json!({ "contact": { "email": "other@example.com", "id": 42 } });
        let email = resolve_email(&payload, booking_inputs(&payload, &empty)).unwrap();
        assert_eq!(email, "other@example.com");
        assert_eq!(resolve_contact_id(&payload).as_deref(), Some("42"));
    }

    #[test]
    fn non_object_inputs_value_hides_top_level_keys() {
        let payload = json!({ "inputs": "oops", "email": "user@example.com" });
        let empty = Map::new();
        let inputs = booking_inputs(&payload, &empty);

        assert!(inputs.is_empty());
        assert!(resolve_email(&payload, inputs).is_err());
    }

    #[tokio::test]
    async fn contact_search_with_zero_results_is_a_404() {
        let base = spawn_raw_server(
            b"HTTP/1.1 200 OK\r\ncontent-length: 24\r\nconnection: close\r\n\r\n{\"total\":0,\"results\":[]}",
        )
        .await;

        let crm = UpstreamClient::new(base, Some("token".to_string()));
        let err = search_contact_by_email(&crm, "user@example.com")
            .await
            .unwrap_err();

        match &err {
            shared::Error::NotFound(message) => assert_eq!(message, "Contact not found by email"),
            other => panic!("expected not-found error, got {other:?}"),
        }
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn contact_search_returns_the_first_matching_id() {
        let base = spawn_raw_server(
            b"HTTP/1.1 200 OK\r\ncontent-length: 26\r\nconnection: close\r\n\r\n{\"results\":[{\"id\":\"301\"}]}",
        )
        .await;

        let crm = UpstreamClient::new(base, Some("token".to_string()));
        let id = search_contact_by_email(&crm, "user@example.com").await.unwrap();
        assert_eq!(id, "301");
    }
}
