use crate::domain::model::{CityQuery, CoordinateQuery, Schedule};
use crate::domain::ports::ScheduleClient;
use crate::utils::error::{ResolveError, Result};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.aladhan.com/v1";

/// `ScheduleClient` backed by the Aladhan timings API.
pub struct AladhanClient {
    client: Client,
    base_url: String,
}

impl AladhanClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_schedule(&self, url: &str, params: &[(&str, String)]) -> Result<Schedule> {
        tracing::debug!("📡 Requesting schedule: {} {:?}", url, params);
        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        let body = response.text().await?;

        if !status.is_success() {
            // An error wrapped in the API's JSON envelope means the request itself was rejected.
            let api_answered = serde_json::from_str::<serde_json::Value>(&body)
                .map(|v| v.is_object())
                .unwrap_or(false);
            return Err(ResolveError::UnexpectedStatus {
                status: status.as_u16(),
                api_answered,
            });
        }

        let json: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            ResolveError::invalid_schedule(format!("response is not valid JSON: {}", e))
        })?;

        Schedule::from_response(&json)
    }
}

#[async_trait::async_trait]
impl ScheduleClient for AladhanClient {
    async fn fetch_by_coordinates(&self, query: &CoordinateQuery) -> Result<Schedule> {
        let params = [
            ("latitude", query.coordinates.latitude().to_string()),
            ("longitude", query.coordinates.longitude().to_string()),
            ("method", query.method.to_string()),
        ];
        self.get_schedule(&self.endpoint("timings"), &params).await
    }

    async fn fetch_by_city(&self, query: &CityQuery) -> Result<Schedule> {
        let params = [
            ("city", query.city.clone()),
            ("country", query.country.clone()),
            ("method", query.method.to_string()),
        ];
        self.get_schedule(&self.endpoint("timingsByCity"), &params).await
    }
}
