//! Client configuration: base URL plus the static header set.

use std::fmt;

use tracing::warn;
use url::Url;

use crate::error::ApiError;

pub const BASE_URL_VAR: &str = "IC_BASE_URL";
pub const API_KEY_VAR: &str = "IC_API_KEY";

/// Base URL and headers shared by every request a `RequestRouter` issues.
///
/// Immutable once built. The raw base URL string is kept alongside the
/// parsed form because `RequestRouter::get` detects absolute URLs by a
/// plain string-prefix check against it.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    parsed: Url,
    headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Configuration for an IC instance, authenticating with `api_key`.
    ///
    /// `base_url` is the REST API root, for example
    /// `https://ic-playground.eclecticiq.com/api/beta`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ApiError> {
        Self::with_headers(
            base_url,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), format!("Bearer {api_key}")),
                ("Accept".to_string(), "application/json".to_string()),
            ],
        )
    }

    /// Configuration with an explicit header list, sent in the given order.
    pub fn with_headers(base_url: &str, headers: Vec<(String, String)>) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|e| ApiError::invalid_url(base_url, e))?;
        if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
            return Err(ApiError::invalid_url(base_url, "base URL needs a scheme and a host"));
        }
        Ok(Self {
            base_url: base_url.to_string(),
            parsed,
            headers,
        })
    }

    /// Read `IC_BASE_URL` and `IC_API_KEY` from the environment, loading a
    /// `.env` file first when one exists.
    pub fn from_env() -> Result<Self, ApiError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!(error = %e, "ignoring unreadable .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup(BASE_URL_VAR).ok_or(ApiError::MissingConfig(BASE_URL_VAR))?;
        let api_key = lookup(API_KEY_VAR).ok_or(ApiError::MissingConfig(API_KEY_VAR))?;
        Self::new(&base_url, &api_key)
    }

    /// The base URL exactly as configured.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn parsed_base_url(&self) -> &Url {
        &self.parsed
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("headers", &headers)
            .finish()
    }
}
