//! HTTP client for the entity-search gateway.
//!
//! The platform connection itself lives in a separate bridge service;
//! this client talks to its REST surface. All responses deserialize into
//! the defaulting records from [`super::records`].

use crate::error::SurfaceError;
use crate::surface::{EntitySearch, MessagePage, RawEntity, RawMessage};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// REST client for the entity-search bridge service.
pub struct HttpGateway {
    base_url: String,
    timeout_seconds: u64,
    http: reqwest::Client,
}

impl HttpGateway {
    /// Create a gateway client against the given base URL.
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_seconds,
            http,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> SurfaceError {
        if e.is_timeout() {
            SurfaceError::Timeout(self.timeout_seconds)
        } else if e.is_connect() {
            SurfaceError::Unavailable(format!("cannot connect to gateway at {}", self.base_url))
        } else {
            SurfaceError::Unavailable(e.to_string())
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SurfaceError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("gateway request: {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SurfaceError::Protocol(format!(
                "gateway returned {} for {}: {}",
                status, path, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SurfaceError::Protocol(format!("malformed gateway response: {}", e)))
    }
}

#[async_trait]
impl EntitySearch for HttpGateway {
    async fn search_entities(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RawEntity>, SurfaceError> {
        self.get_json(
            "/entities/search",
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn search_contacts(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RawEntity>, SurfaceError> {
        self.get_json(
            "/contacts/search",
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn search_messages(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<MessagePage, SurfaceError> {
        self.get_json(
            "/messages/search",
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn resolve_handle(&self, handle: &str) -> Result<Option<RawEntity>, SurfaceError> {
        let url = format!("{}/entities/resolve", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("handle", handle)])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SurfaceError::Protocol(format!(
                "gateway returned {} resolving @{}: {}",
                status, handle, body
            )));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| SurfaceError::Protocol(format!("malformed gateway response: {}", e)))
    }

    async fn recent_messages(
        &self,
        entity_ref: &str,
        limit: usize,
    ) -> Result<Vec<RawMessage>, SurfaceError> {
        self.get_json(
            &format!("/entities/{}/messages", entity_ref),
            &[("limit", limit.to_string())],
        )
        .await
    }

    async fn similar_entities(
        &self,
        entity_id: &str,
        limit: usize,
    ) -> Result<Vec<RawEntity>, SurfaceError> {
        self.get_json(
            &format!("/entities/{}/similar", entity_id),
            &[("limit", limit.to_string())],
        )
        .await
    }
}
