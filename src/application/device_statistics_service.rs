// Device statistics service - Single-device detail page
use crate::application::analyzer_api::AnalyzerApi;
use crate::domain::device::{DeviceKey, DeviceStatistics};
use serde::Deserialize;
use std::sync::Arc;

pub const MISSING_IDENTIFIERS: &str = "Username and Device ID are required";
const FETCH_FAILED: &str = "Failed to fetch device statistics";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceStatisticsView {
    pub statistics: Option<DeviceStatistics>,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct DeviceStatisticsService {
    api: Arc<dyn AnalyzerApi>,
}

impl DeviceStatisticsService {
    pub fn new(api: Arc<dyn AnalyzerApi>) -> Self {
        Self { api }
    }

    /// Load the page for a navigation query string. One fetch, no retry.
    pub async fn load(&self, query: &str) -> DeviceStatisticsView {
        let Some(key) = parse_device_query(query) else {
            return DeviceStatisticsView {
                statistics: None,
                error: Some(MISSING_IDENTIFIERS.to_string()),
            };
        };

        self.load_key(&key).await
    }

    pub async fn load_key(&self, key: &DeviceKey) -> DeviceStatisticsView {
        match self.api.device_statistics(key).await {
            Ok(statistics) => DeviceStatisticsView {
                statistics: Some(statistics),
                error: None,
            },
            Err(e) => {
                tracing::warn!(
                    "Device statistics for {}/{} failed: {}",
                    key.username,
                    key.device_id,
                    e
                );
                DeviceStatisticsView {
                    statistics: None,
                    error: Some(e.server_message().unwrap_or(FETCH_FAILED).to_string()),
                }
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DeviceQuery {
    username: Option<String>,
    device_id: Option<String>,
}

/// Read `username` and `device_id` from a query string. Empty values count
/// as missing.
pub fn parse_device_query(query: &str) -> Option<DeviceKey> {
    let query: DeviceQuery = serde_urlencoded::from_str(query.trim_start_matches('?'))
        .map_err(|e| tracing::warn!("Invalid device query '{}': {}", query, e))
        .ok()?;

    let username = query.username.filter(|v| !v.is_empty())?;
    let device_id = query.device_id.filter(|v| !v.is_empty())?;
    Some(DeviceKey::new(username, device_id))
}
