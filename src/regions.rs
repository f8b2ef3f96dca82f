use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::config::Settings;
use crate::models::{ApiError, RegionsPage, RegionsQuery, RegionsResponse};

#[derive(Debug, Error)]
pub enum RegionsError {
    #[error("http client: {0}")]
    Client(String),
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("expected status 200, got {status}: {body}")]
    Upstream { status: StatusCode, body: String },
    #[error("invalid json from upstream: {0}")]
    BadJson(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

#[derive(Clone, Debug)]
pub struct RegionsClient {
    pub http: Client,
    pub settings: Settings,
}

impl RegionsClient {
    pub fn new(settings: Settings) -> Result<Self, RegionsError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(settings.http_timeout_ms))
            .build()
            .map_err(|e| RegionsError::Client(e.to_string()))?;
        Ok(Self { http, settings })
    }

    /// One GET against the endpoint. Anything but 200 is an error, validation
    /// failures included since the service reports them in-body.
    pub async fn fetch(&self, query: &RegionsQuery) -> Result<RegionsResponse, RegionsError> {
        tracing::debug!(url = %self.settings.base_url, ?query, "GET regions");

        let resp = self
            .http
            .get(&self.settings.base_url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if status != StatusCode::OK {
            let body = String::from_utf8_lossy(&bytes).to_string();
            return Err(RegionsError::Upstream { status, body });
        }
        parse_body(&bytes)
    }

    /// Walks `page = 1..` for the given filters until a short page, an error
    /// response or `max_pages`. The error response, if any, is the last entry.
    pub async fn fetch_pages(
        &self,
        query: &RegionsQuery,
        max_pages: u32,
    ) -> Result<Vec<RegionsResponse>, RegionsError> {
        let page_size = query.requested_page_size().unwrap_or(self.settings.default_page_size);
        let mut responses = Vec::new();

        for page in 1..=max_pages {
            let params = query.clone().page(page);
            let resp = self.fetch(&params).await?;
            let done = match &resp {
                RegionsResponse::Page(p) => p.items.len() < page_size,
                RegionsResponse::Error(e) => {
                    tracing::debug!(page, reason = e.message(), "page walk stopped on error response");
                    true
                }
            };
            responses.push(resp);
            if done {
                break;
            }
        }

        Ok(responses)
    }
}

/// Classifies a 200 body: `{error: {message}}` or `{total, items}`.
pub fn parse_body(bytes: &[u8]) -> Result<RegionsResponse, RegionsError> {
    let val: Value = serde_json::from_slice(bytes)?;
    classify(val)
}

pub fn classify(val: Value) -> Result<RegionsResponse, RegionsError> {
    let Some(obj) = val.as_object() else {
        return Err(RegionsError::UnexpectedShape(format!("expected a json object, got {val}")));
    };

    if obj.get("error").and_then(|e| e.get("message")).is_some_and(Value::is_string) {
        let err: ApiError = serde_json::from_value(val)?;
        return Ok(RegionsResponse::Error(err));
    }
    if obj.contains_key("total") && obj.contains_key("items") {
        let page: RegionsPage = serde_json::from_value(val)?;
        return Ok(RegionsResponse::Page(page));
    }

    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    Err(RegionsError::UnexpectedShape(format!(
        "neither `total`/`items` nor `error.message` present (keys: {})",
        keys.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_error_body() {
        let body = r#"{"error":{"id":"x","message":"Параметр 'page' должен быть больше 0"}}"#;
        match parse_body(body.as_bytes()).unwrap() {
            RegionsResponse::Error(e) => assert_eq!(e.message(), "Параметр 'page' должен быть больше 0"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn classifies_listing_body() {
        let body = r#"{"total":1,"items":[{"id":1,"name":"Алматы","code":"almaty","country":{"name":"Казахстан","code":"kz"}}]}"#;
        match parse_body(body.as_bytes()).unwrap() {
            RegionsResponse::Page(p) => {
                assert_eq!(p.total, 1);
                assert_eq!(p.items[0].name, "Алматы");
            }
            other => panic!("expected listing, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_json_and_unknown_shapes() {
        assert!(matches!(parse_body(b"<html>"), Err(RegionsError::BadJson(_))));
        assert!(matches!(parse_body(b"[1,2]"), Err(RegionsError::UnexpectedShape(_))));
        assert!(matches!(parse_body(br#"{"total":3}"#), Err(RegionsError::UnexpectedShape(_))));
        assert!(matches!(parse_body(br#"{"error":{"code":1}}"#), Err(RegionsError::UnexpectedShape(_))));
    }

    #[test]
    fn malformed_items_are_bad_json() {
        let body = br#"{"total":1,"items":[{"name":"no country"}]}"#;
        assert!(matches!(parse_body(body), Err(RegionsError::BadJson(_))));
    }
}
