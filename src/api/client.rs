use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{
    Category, CategoryId, ErrorBody, Event, EventId, Participant, ResultEntry, SaveReceipt,
    StoredResult,
};
use crate::error::ConsoleError;

/// REST boundary of the results store and its directories.
///
/// The session only talks to this trait, so tests can swap in an
/// in-memory store.
#[async_trait]
pub trait ResultsApi: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, ConsoleError>;

    async fn list_events(&self, category: Option<CategoryId>) -> Result<Vec<Event>, ConsoleError>;

    async fn list_participants(
        &self,
        category: Option<CategoryId>,
        event: Option<EventId>,
    ) -> Result<Vec<Participant>, ConsoleError>;

    async fn save_results(&self, batch: &[ResultEntry]) -> Result<SaveReceipt, ConsoleError>;

    async fn list_results(
        &self,
        category: Option<CategoryId>,
        event: Option<EventId>,
    ) -> Result<Vec<StoredResult>, ConsoleError>;
}

/// HTTP implementation of [`ResultsApi`] backed by reqwest
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

/// Create a client for the store at `base_url`
pub fn create_client(base_url: &str, timeout: Duration) -> Result<ApiClient> {
    let mut base = base_url.trim().to_string();
    // Url::join drops the last path segment unless the base ends with '/'
    if !base.ends_with('/') {
        base.push('/');
    }
    let base_url = Url::parse(&base).with_context(|| format!("Invalid API URL: {}", base_url))?;

    let http = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("podium/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")?;

    Ok(ApiClient { http, base_url })
}

impl ApiClient {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        url: Url,
    ) -> Result<Vec<T>, ConsoleError> {
        debug!(%url, "GET {}", resource);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ConsoleError::fetch(resource, describe_transport_error(&e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ConsoleError::fetch(resource, describe_transport_error(&e)))?;

        decode_list(resource, status, &body)
    }
}

#[async_trait]
impl ResultsApi for ApiClient {
    async fn list_categories(&self) -> Result<Vec<Category>, ConsoleError> {
        let url = endpoint_url(&self.base_url, "categories/", &[])
            .map_err(|e| ConsoleError::fetch("categories", e))?;
        self.get_list("categories", url).await
    }

    async fn list_events(&self, category: Option<CategoryId>) -> Result<Vec<Event>, ConsoleError> {
        let url = endpoint_url(&self.base_url, "events/", &[("category_id", category)])
            .map_err(|e| ConsoleError::fetch("events", e))?;
        self.get_list("events", url).await
    }

    async fn list_participants(
        &self,
        category: Option<CategoryId>,
        event: Option<EventId>,
    ) -> Result<Vec<Participant>, ConsoleError> {
        let url = endpoint_url(
            &self.base_url,
            "participants/",
            &[("category_id", category), ("event_id", event)],
        )
        .map_err(|e| ConsoleError::fetch("participants", e))?;
        self.get_list("participants", url).await
    }

    async fn save_results(&self, batch: &[ResultEntry]) -> Result<SaveReceipt, ConsoleError> {
        let url = endpoint_url(&self.base_url, "results/", &[])
            .map_err(ConsoleError::Persistence)?;
        debug!(%url, entries = batch.len(), "POST results");

        let response = self
            .http
            .post(url)
            .json(batch)
            .send()
            .await
            .map_err(|e| ConsoleError::Persistence(describe_transport_error(&e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ConsoleError::Persistence(describe_transport_error(&e)))?;

        decode_save(status, &body, batch.len())
    }

    async fn list_results(
        &self,
        category: Option<CategoryId>,
        event: Option<EventId>,
    ) -> Result<Vec<StoredResult>, ConsoleError> {
        let url = endpoint_url(
            &self.base_url,
            "results/",
            &[("event_id", event), ("category_id", category)],
        )
        .map_err(|e| ConsoleError::fetch("results", e))?;
        self.get_list("results", url).await
    }
}

/// Build `base/path?key=value...`, skipping unset filters
pub fn endpoint_url(
    base: &Url,
    path: &str,
    params: &[(&str, Option<i64>)],
) -> Result<Url, String> {
    let mut url = base.join(path).map_err(|e| e.to_string())?;
    let present: Vec<(&str, i64)> = params
        .iter()
        .filter_map(|(key, value)| value.map(|v| (*key, v)))
        .collect();
    if !present.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in present {
            pairs.append_pair(key, &value.to_string());
        }
    }
    Ok(url)
}

/// Decode a list response, mapping failures to `ConsoleError::Fetch`
pub fn decode_list<T: DeserializeOwned>(
    resource: &'static str,
    status: StatusCode,
    body: &[u8],
) -> Result<Vec<T>, ConsoleError> {
    if !status.is_success() {
        return Err(ConsoleError::fetch(resource, error_detail(status, body)));
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ConsoleError::fetch(resource, format!("malformed response: {}", e)))?;

    if !value.is_array() {
        return Err(ConsoleError::fetch(
            resource,
            format!("expected an array but received {}", json_kind(&value)),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| ConsoleError::fetch(resource, format!("malformed response: {}", e)))
}

/// Decode a save response. A success status with an unrecognised body still
/// counts as saved.
pub fn decode_save(
    status: StatusCode,
    body: &[u8],
    submitted: usize,
) -> Result<SaveReceipt, ConsoleError> {
    if !status.is_success() {
        return Err(ConsoleError::Persistence(error_detail(status, body)));
    }

    match serde_json::from_slice::<SaveReceipt>(body) {
        Ok(receipt) => Ok(receipt),
        Err(e) => {
            warn!("Unrecognised save response ({}); assuming {} rows saved", e, submitted);
            Ok(SaveReceipt::Summary {
                message: None,
                count: submitted,
            })
        }
    }
}

fn error_detail(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(err) => err.message(),
        Err(_) => match status.canonical_reason() {
            Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
            None => format!("HTTP {}", status.as_u16()),
        },
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        match e.url() {
            Some(url) => format!("could not connect to {}", url),
            None => "could not connect to the results server".to_string(),
        }
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8000/").unwrap()
    }

    #[test]
    fn test_endpoint_url_without_filters() {
        let url = endpoint_url(&base(), "categories/", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/categories/");
    }

    #[test]
    fn test_endpoint_url_skips_unset_filters() {
        let url = endpoint_url(
            &base(),
            "participants/",
            &[("category_id", Some(2)), ("event_id", None)],
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/participants/?category_id=2");
    }

    #[test]
    fn test_endpoint_url_with_both_filters() {
        let url = endpoint_url(
            &base(),
            "participants/",
            &[("category_id", Some(2)), ("event_id", Some(7))],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/participants/?category_id=2&event_id=7"
        );
    }

    #[test]
    fn test_create_client_keeps_base_path() {
        let client = create_client("http://example.test/api", Duration::from_secs(5)).unwrap();
        let url = endpoint_url(client.base_url(), "events/", &[]).unwrap();
        assert_eq!(url.as_str(), "http://example.test/api/events/");
    }

    #[test]
    fn test_create_client_rejects_garbage() {
        assert!(create_client("not a url", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_decode_list_success() {
        let body = br#"[{"id": 1, "name": "Sub Junior", "min_age": 5, "max_age": 9, "description": ""}]"#;
        let categories: Vec<Category> = decode_list("categories", StatusCode::OK, body).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Sub Junior");
    }

    #[test]
    fn test_decode_list_non_array_is_fetch_error() {
        let body = br#"{"id": 1}"#;
        let err = decode_list::<Category>("categories", StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, ConsoleError::Fetch { .. }));
        assert!(err.to_string().contains("expected an array but received an object"));
    }

    #[test]
    fn test_decode_list_error_status_uses_detail() {
        let body = br#"{"detail": "database is locked"}"#;
        let err = decode_list::<Participant>("participants", StatusCode::INTERNAL_SERVER_ERROR, body)
            .unwrap_err();
        assert_eq!(err.to_string(), "Error fetching participants: database is locked");
    }

    #[test]
    fn test_decode_list_error_status_without_body() {
        let err = decode_list::<Event>("events", StatusCode::BAD_GATEWAY, b"").unwrap_err();
        assert_eq!(err.to_string(), "Error fetching events: HTTP 502 Bad Gateway");
    }

    #[test]
    fn test_decode_list_malformed_json() {
        let err = decode_list::<Event>("events", StatusCode::OK, b"<html>").unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }

    #[test]
    fn test_decode_save_rejected_carries_detail() {
        let body = br#"{"detail": "Error saving results: FOREIGN KEY constraint failed"}"#;
        let err = decode_save(StatusCode::BAD_REQUEST, body, 2).unwrap_err();
        assert!(matches!(err, ConsoleError::Persistence(_)));
        assert!(err.to_string().contains("FOREIGN KEY constraint failed"));
    }

    #[test]
    fn test_decode_save_unrecognised_body_counts_submitted() {
        let receipt = decode_save(StatusCode::OK, b"\"ok\"", 3).unwrap();
        assert_eq!(receipt.saved_count(), 3);
    }
}
