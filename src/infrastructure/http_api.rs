// HTTP client for the network cell analyzer admin API
use crate::application::analyzer_api::{AnalyzerApi, LoginResponse};
use crate::application::error::ApiError;
use crate::application::session::Session;
use crate::domain::activity::{ActivityTrend, Granularity};
use crate::domain::device::{CellReport, Device, DeviceKey, DeviceStatistics};
use crate::domain::filters::DateRange;
use crate::domain::summary::{NetworkStats, SignalStats};
use crate::domain::timestamp::REPORT_TIMESTAMP_FORMAT;
use crate::infrastructure::config::CategorySettings;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Serialize)]
struct Submission<'a> {
    #[serde(flatten)]
    report: &'a CellReport,
    timestamp: String,
}

#[derive(Clone)]
pub struct HttpAnalyzerApi {
    client: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
    categories: CategorySettings,
}

impl HttpAnalyzerApi {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>, categories: CategorySettings) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            categories,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Every request goes through here: attach the bearer token, and on 403
    /// expire the session before reporting the failure.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            self.session.expire();
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string));
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        tracing::debug!("GET {} {:?}", path, query);
        let request = self.client.get(self.url(path)).query(query);
        let response = self.send(request).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        tracing::debug!("POST {}", path);
        let request = self.client.post(self.url(path)).json(body);
        let response = self.send(request).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get_typed<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError> {
        let payload = self.get_json(path, query).await?;
        serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn percentage_summary(&self, path: &str, range: &DateRange, categories: &[String]) -> NetworkStats {
        let query = [("start_date", range.start.as_str()), ("end_date", range.end.as_str())];
        match self.get_json(path, &query).await {
            Ok(payload) => NetworkStats::from_payload(&payload, categories),
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", path, e);
                NetworkStats::defaults(categories)
            }
        }
    }

    async fn numeric_summary(&self, path: &str, range: &DateRange) -> SignalStats {
        let categories = &self.categories.network_types;
        let query = [("start_date", range.start.as_str()), ("end_date", range.end.as_str())];
        match self.get_json(path, &query).await {
            Ok(payload) => SignalStats::from_payload(&payload, categories),
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", path, e);
                SignalStats::defaults(categories)
            }
        }
    }

    /// Every listed element is kept, one row each; an element that is not an
    /// object becomes a blank row.
    async fn device_list(&self, path: &str) -> Vec<Device> {
        match self.get_json(path, &[]).await {
            Ok(Value::Array(items)) => items
                .into_iter()
                .map(|item| {
                    serde_json::from_value::<Device>(item).unwrap_or_else(|e| {
                        tracing::warn!("Malformed device from {}: {}", path, e);
                        Device::default()
                    })
                })
                .collect(),
            Ok(other) => {
                tracing::warn!("Expected a device array from {}, got {}", path, other);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", path, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl AnalyzerApi for HttpAnalyzerApi {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let payload = self
            .post_json("/admin/login", &json!({ "username": username, "password": password }))
            .await?;
        let response: LoginResponse =
            serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;

        if let Some(token) = &response.admin_token {
            self.session.sign_in(token.clone());
        }
        Ok(response)
    }

    async fn connected_devices_count(&self) -> u64 {
        match self.get_json("/admin/connected_devices_count", &[]).await {
            Ok(payload) => payload
                .get("connected_devices")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            Err(e) => {
                tracing::warn!("Error fetching connected devices count: {}", e);
                0
            }
        }
    }

    async fn previously_connected_devices(&self) -> Vec<Device> {
        self.device_list("/admin/previously_connected_devices").await
    }

    async fn currently_connected_devices(&self) -> Vec<Device> {
        self.device_list("/admin/currently_connected_devices").await
    }

    async fn network_type_summary(&self, range: &DateRange) -> NetworkStats {
        self.percentage_summary("/admin/network_type_summary", range, &self.categories.network_types)
            .await
    }

    async fn operator_summary(&self, range: &DateRange) -> NetworkStats {
        self.percentage_summary("/admin/operator_summary", range, &self.categories.operators)
            .await
    }

    async fn signal_power_summary(&self, range: &DateRange) -> SignalStats {
        self.numeric_summary("/admin/signal_power_summary", range).await
    }

    async fn sinr_summary(&self, range: &DateRange) -> SignalStats {
        self.numeric_summary("/admin/sinr_summary", range).await
    }

    async fn device_activity_trend(
        &self,
        range: &DateRange,
        granularity: Granularity,
    ) -> Result<ActivityTrend, ApiError> {
        let query = [
            ("start_date", range.start.as_str()),
            ("end_date", range.end.as_str()),
            ("interval", granularity.as_str()),
        ];
        self.get_typed("/admin/device_activity_trend", &query).await
    }

    async fn device_statistics(&self, key: &DeviceKey) -> Result<DeviceStatistics, ApiError> {
        let query = [
            ("username", key.username.as_str()),
            ("device_id", key.device_id.as_str()),
        ];
        self.get_typed("/admin/device_statistics", &query).await
    }

    async fn submit_cell_data(&self, report: &CellReport) -> Result<Value, ApiError> {
        let submission = Submission {
            report,
            timestamp: chrono::Local::now().format(REPORT_TIMESTAMP_FORMAT).to_string(),
        };
        self.post_json("/submit_data", &submission).await
    }
}
