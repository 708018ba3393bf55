//! Clients for the TAGO (national public transit) open data services.
//!
//! All TAGO services share the `response.header` / `response.body.items.item`
//! envelope, where `item` is a list, a single object, or absent (and `items`
//! is sometimes an empty string) depending on the number of results.

pub mod bus;
pub mod route_cache;
pub mod subway;

pub use bus::TagoBusClient;
pub use route_cache::{RouteCache, RouteInfo};
pub use subway::{upcoming_departures, TagoSubwayClient};

use dashboard_core::DashboardError;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const BASE_URL: &str = "http://apis.data.go.kr/1613000";
const REQUEST_TIMEOUT_SECS: u64 = 8;
const RESULT_OK: &str = "00";

#[derive(Clone)]
struct TagoHttp {
    service_key: String,
    client: Client,
    base_url: String,
}

impl TagoHttp {
    fn new(service_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            service_key,
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    /// GET `{base}/{service}/{operation}` and return the envelope's items.
    async fn get_items(
        &self,
        service: &str,
        operation: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Value>, DashboardError> {
        if self.service_key.is_empty() {
            return Err(DashboardError::Config("TAGO service key missing".to_string()));
        }

        let url = format!("{}/{}/{}", self.base_url, service, operation);
        tracing::debug!("TAGO request: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("serviceKey", self.service_key.as_str()),
                ("_type", "json"),
            ])
            .query(params)
            .send()
            .await
            .map_err(|e| DashboardError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DashboardError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DashboardError::Parse(e.to_string()))?;

        if let Some(code) = result_code(&body) {
            if code != RESULT_OK {
                let msg = result_message(&body);
                tracing::warn!("TAGO {} result code {}: {}", operation, code, msg);
            }
        }

        Ok(envelope_items(&body))
    }
}

fn result_code(body: &Value) -> Option<&str> {
    body.pointer("/response/header/resultCode").and_then(|v| v.as_str())
}

fn result_message(body: &Value) -> &str {
    body.pointer("/response/header/resultMsg")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
}

/// Normalize `response.body.items.item` into a list.
fn envelope_items(body: &Value) -> Vec<Value> {
    match body.pointer("/response/body/items/item") {
        Some(Value::Array(items)) => items.clone(),
        Some(item @ Value::Object(_)) => vec![item.clone()],
        _ => Vec::new(),
    }
}

/// First present key among `keys`, as text (TAGO mixes numbers and strings).
fn text_field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match item.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn number_field(item: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| match item.get(*k)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn int_field(item: &Value, keys: &[&str]) -> Option<i64> {
    number_field(item, keys).map(|v| v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_list() {
        let body = json!({ "response": { "body": { "items": { "item": [{ "a": 1 }, { "a": 2 }] } } } });
        assert_eq!(envelope_items(&body).len(), 2);
    }

    #[test]
    fn test_envelope_single_object() {
        let body = json!({ "response": { "body": { "items": { "item": { "a": 1 } } } } });
        assert_eq!(envelope_items(&body), vec![json!({ "a": 1 })]);
    }

    #[test]
    fn test_envelope_empty_string_items() {
        let body = json!({ "response": { "header": { "resultCode": "00" }, "body": { "items": "" } } });
        assert!(envelope_items(&body).is_empty());
        assert_eq!(result_code(&body), Some("00"));
    }

    #[test]
    fn test_result_message() {
        let body = json!({ "response": { "header": { "resultCode": "30", "resultMsg": "SERVICE KEY IS NOT REGISTERED ERROR." } } });
        assert_eq!(result_code(&body), Some("30"));
        assert_eq!(result_message(&body), "SERVICE KEY IS NOT REGISTERED ERROR.");
        assert_eq!(result_message(&json!({})), "");
    }

    #[test]
    fn test_fields_accept_mixed_types() {
        let item = json!({ "routeno": 1001, "nodeId": "BSB123", "gpslati": "35.1", "arrtime": 125 });
        assert_eq!(text_field(&item, &["routeno"]), Some("1001".to_string()));
        assert_eq!(text_field(&item, &["nodeid", "nodeId"]), Some("BSB123".to_string()));
        assert_eq!(number_field(&item, &["gpslati"]), Some(35.1));
        assert_eq!(int_field(&item, &["arrtime"]), Some(125));
        assert_eq!(text_field(&item, &["missing"]), None);
    }
}
