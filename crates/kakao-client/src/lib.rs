//! Kakao REST API clients: mobility directions (taxi estimate) and local search.

pub mod local;
pub mod mobility;

pub use local::{rerank_places, KakaoLocalClient};
pub use mobility::KakaoMobilityClient;

use dashboard_core::DashboardError;
use reqwest::Client;
use std::time::Duration;

/// Shared transport: `Authorization: KakaoAK <key>` on every request.
#[derive(Clone)]
struct KakaoHttp {
    api_key: String,
    client: Client,
}

impl KakaoHttp {
    fn new(api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { api_key, client }
    }

    fn ensure_key(&self) -> Result<(), DashboardError> {
        if self.api_key.is_empty() {
            return Err(DashboardError::Config("No Kakao API key".to_string()));
        }
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, DashboardError> {
        self.ensure_key()?;

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("KakaoAK {}", self.api_key))
            .query(query)
            .send()
            .await
            .map_err(|e| DashboardError::Api(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Kakao API HTTP {}: {}", status, body);
            return Err(DashboardError::Api(format!("HTTP {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| DashboardError::Parse(e.to_string()))
    }
}
