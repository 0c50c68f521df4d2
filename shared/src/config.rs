//! Configuration management for Lambda functions.

use std::env;

use crate::error::{Error, Result};

/// Error message surfaced when the CRM credential is absent.
pub const MISSING_HUBSPOT_PAT: &str = "Missing HUBSPOT_PAT env var";

const DEFAULT_HUBSPOT_BASE: &str = "https://api.hubapi.com";
const DEFAULT_QURAN_BASE: &str = "https://api.alquran.cloud";

/// Application configuration loaded from environment variables.
///
/// Loaded once at process startup and injected into the upstream clients;
/// never read ad hoc mid-request.
#[derive(Debug, Clone)]
pub struct Config {
    /// CRM private-app bearer token
    pub hubspot_token: String,
    /// CRM base URL
    pub hubspot_base: String,
    /// Quran content API base URL
    pub quran_base: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let hubspot_token =
            env::var("HUBSPOT_PAT").map_err(|_| Error::Config(MISSING_HUBSPOT_PAT.to_string()))?;

        Ok(Self {
            hubspot_token,
            hubspot_base: env::var("HUBSPOT_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_HUBSPOT_BASE.to_string()),
            quran_base: env::var("QURAN_API_BASE")
                .unwrap_or_else(|_| DEFAULT_QURAN_BASE.to_string()),
        })
    }

    /// Base URL for the content API, for handlers that do not need the CRM
    /// credential at all.
    pub fn quran_base_from_env() -> String {
        env::var("QURAN_API_BASE").unwrap_or_else(|_| DEFAULT_QURAN_BASE.to_string())
    }
}
