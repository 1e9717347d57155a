// API seam for the network cell analyzer service
use crate::application::error::ApiError;
use crate::domain::activity::{ActivityTrend, Granularity};
use crate::domain::device::{CellReport, Device, DeviceKey, DeviceStatistics};
use crate::domain::filters::DateRange;
use crate::domain::summary::{NetworkStats, SignalStats};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub admin_token: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Summary getters and device lists never fail: they fall back to defaults.
/// The remaining calls propagate errors for the caller to display.
#[async_trait]
pub trait AnalyzerApi: Send + Sync {
    /// Stores the returned token in the session on success.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError>;

    async fn connected_devices_count(&self) -> u64;

    async fn previously_connected_devices(&self) -> Vec<Device>;

    async fn currently_connected_devices(&self) -> Vec<Device>;

    async fn network_type_summary(&self, range: &DateRange) -> NetworkStats;

    async fn operator_summary(&self, range: &DateRange) -> NetworkStats;

    async fn signal_power_summary(&self, range: &DateRange) -> SignalStats;

    async fn sinr_summary(&self, range: &DateRange) -> SignalStats;

    async fn device_activity_trend(
        &self,
        range: &DateRange,
        granularity: Granularity,
    ) -> Result<ActivityTrend, ApiError>;

    async fn device_statistics(&self, key: &DeviceKey) -> Result<DeviceStatistics, ApiError>;

    async fn submit_cell_data(&self, report: &CellReport) -> Result<serde_json::Value, ApiError>;
}
