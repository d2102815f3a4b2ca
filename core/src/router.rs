//! Request routing against a configured IC base URL.
//!
//! # Design
//! `RequestRouter` holds an immutable `ClientConfig` and a transport, and
//! carries no other state between calls. Each verb is split into a
//! `build_*` method that turns a path (plus query or payload) into an
//! `HttpRequest`, and `parse_json`, which decodes any `HttpResponse` body.
//! The verb methods (`get`, `post`, ...) just chain build, execute, parse.
//!
//! Path handling is not uniform across verbs. `get` accepts either a path
//! relative to the base URL or a full URL that already starts with it (as
//! found in `self`/`next` links); `post`, `patch` and `delete` always treat
//! their path as relative. Response status codes are never inspected.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

/// Synchronous client for the IC REST API.
#[derive(Debug, Clone)]
pub struct RequestRouter<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl RequestRouter<UreqTransport> {
    /// Router for `base_url` authenticating with `api_key`, using the
    /// default ureq transport.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ApiError> {
        Ok(Self::with_transport(ClientConfig::new(base_url, api_key)?, UreqTransport::new()))
    }
}

impl<T: Transport> RequestRouter<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET `path` and decode the JSON body.
    ///
    /// `params` becomes the query string of a relative path. It is ignored
    /// when `path` already starts with the base URL; the query of such a
    /// URL is sent untouched.
    pub fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.send(self.build_get(path, params)?)
    }

    /// POST `payload` as JSON to `path` and decode the JSON body.
    pub fn post<P: Serialize + ?Sized>(&self, path: &str, payload: &P) -> Result<Value, ApiError> {
        self.send(self.build_post(path, payload)?)
    }

    /// PATCH `payload` as JSON to `path` and decode the JSON body.
    pub fn patch<P: Serialize + ?Sized>(&self, path: &str, payload: &P) -> Result<Value, ApiError> {
        self.send(self.build_patch(path, payload)?)
    }

    /// DELETE `path` and decode the JSON body.
    pub fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send(self.build_delete(path)?)
    }

    /// Fetch a resource link, rewritten to point at the configured host.
    ///
    /// The link's query is dropped and its scheme, host and port replaced by
    /// the base URL's, so links issued behind a proxy or for another
    /// environment are fetched from this one.
    pub fn resolve(&self, path: &str) -> Result<Value, ApiError> {
        self.send(self.build_resolve(path)?)
    }

    pub fn build_get(&self, path: &str, params: &[(&str, &str)]) -> Result<HttpRequest, ApiError> {
        let url = if path.starts_with(self.config.base_url()) {
            Url::parse(path).map_err(|e| ApiError::invalid_url(path, e))?
        } else {
            let mut url = self.join(path);
            set_query(&mut url, params);
            url
        };
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn build_post<P: Serialize + ?Sized>(&self, path: &str, payload: &P) -> Result<HttpRequest, ApiError> {
        let body = encode(payload)?;
        Ok(self.request(HttpMethod::Post, self.join(path), Some(body)))
    }

    pub fn build_patch<P: Serialize + ?Sized>(&self, path: &str, payload: &P) -> Result<HttpRequest, ApiError> {
        let body = encode(payload)?;
        Ok(self.request(HttpMethod::Patch, self.join(path), Some(body)))
    }

    pub fn build_delete(&self, path: &str) -> Result<HttpRequest, ApiError> {
        Ok(self.request(HttpMethod::Delete, self.join(path), None))
    }

    pub fn build_resolve(&self, path: &str) -> Result<HttpRequest, ApiError> {
        let url = self.rebase(path)?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    /// Decode a response body as JSON, whatever the status code.
    ///
    /// Bytes that are not UTF-8 are a `DecodeError` like any other non-JSON
    /// body.
    pub fn parse_json(&self, response: HttpResponse) -> Result<Value, ApiError> {
        serde_json::from_slice(&response.body).map_err(|e| {
            warn!(status = response.status, error = %e, "response body is not JSON");
            ApiError::DecodeError(e.to_string())
        })
    }

    fn send(&self, request: HttpRequest) -> Result<Value, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(&request)?;
        debug!(status = response.status, bytes = response.body.len(), "received response");
        self.parse_json(response)
    }

    fn request(&self, method: HttpMethod, url: Url, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            url: url.into(),
            headers: self.config.headers().to_vec(),
            body,
        }
    }

    /// Append a relative path to the base URL's path.
    fn join(&self, path: &str) -> Url {
        let mut url = self.config.parsed_base_url().clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        if path.starts_with('/') {
            url.set_path(&format!("{base_path}{path}"));
        } else {
            url.set_path(&format!("{base_path}/{path}"));
        }
        url
    }

    fn rebase(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.config.parsed_base_url();
        let mut url = match Url::parse(path) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let origin_relative = if path.starts_with('/') {
                    path.to_string()
                } else {
                    format!("/{path}")
                };
                base.join(&origin_relative).map_err(|e| ApiError::invalid_url(path, e))?
            }
            Err(e) => return Err(ApiError::invalid_url(path, e)),
        };

        url.set_scheme(base.scheme())
            .map_err(|()| ApiError::invalid_url(path, format!("cannot switch scheme to {}", base.scheme())))?;
        url.set_host(base.host_str())
            .map_err(|e| ApiError::invalid_url(path, e))?;
        url.set_port(base.port())
            .map_err(|()| ApiError::invalid_url(path, "cannot set port"))?;
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }
}

/// Replace the query string with `params`; no params means no `?` at all.
fn set_query(url: &mut Url, params: &[(&str, &str)]) {
    if params.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(params);
    }
}

fn encode<P: Serialize + ?Sized>(payload: &P) -> Result<String, ApiError> {
    serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))
}
