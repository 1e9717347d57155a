// Test doubles for the application layer
use crate::application::analyzer_api::{AnalyzerApi, LoginResponse};
use crate::application::clock::Clock;
use crate::application::error::ApiError;
use crate::application::navigation::{Navigator, Route};
use crate::application::session::{Session, TokenStore};
use crate::domain::activity::{ActivityTrend, Granularity};
use crate::domain::device::{CellReport, Device, DeviceKey, DeviceStatistics};
use crate::domain::filters::DateRange;
use crate::domain::summary::{NetworkStats, SignalStats, DEFAULT_NETWORK_TYPES};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn network_types() -> Vec<String> {
    DEFAULT_NETWORK_TYPES.iter().map(|s| s.to_string()).collect()
}

pub fn device(username: &str, device_id: &str) -> Device {
    Device {
        username: username.to_string(),
        device_id: device_id.to_string(),
        ip: Some("192.168.1.10".to_string()),
        mac: Some("aa:bb:cc:dd:ee:ff".to_string()),
        last_seen: None,
    }
}

pub fn statistics(username: &str, device_id: &str, last_seen: Option<&str>) -> DeviceStatistics {
    DeviceStatistics {
        username: username.to_string(),
        device_id: device_id.to_string(),
        records_count: 12,
        average_signal_power: Some(-90.5),
        average_sinr: Some(11.25),
        connected_network_types: vec!["3G".to_string(), "4G".to_string()],
        last_seen: last_seen.map(str::to_string),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login(String),
    ConnectedCount,
    PreviouslyConnected,
    CurrentlyConnected,
    NetworkType(DateRange),
    Operator(DateRange),
    SignalPower(DateRange),
    Sinr(DateRange),
    Trend(DateRange, Granularity),
    DeviceStatistics(DeviceKey),
    Submit(String),
}

pub struct FakeApi {
    session: Option<Arc<Session>>,
    devices: Mutex<Vec<Device>>,
    statistics: Mutex<HashMap<DeviceKey, DeviceStatistics>>,
    trend: Mutex<Result<ActivityTrend, ApiError>>,
    login: Mutex<Result<LoginResponse, ApiError>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            session: None,
            devices: Mutex::new(Vec::new()),
            statistics: Mutex::new(HashMap::new()),
            trend: Mutex::new(Ok(ActivityTrend {
                timestamps: vec!["2025-04-11T10:00:00Z".to_string()],
                counts: vec![1],
            })),
            login: Mutex::new(Ok(LoginResponse {
                admin_token: Some("fresh-token".to_string()),
                extra: Default::default(),
            })),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn set_devices(&self, devices: Vec<Device>) {
        *self.devices.lock().unwrap() = devices;
    }

    pub fn set_statistics(&self, stats: DeviceStatistics) {
        let key = DeviceKey::new(stats.username.clone(), stats.device_id.clone());
        self.statistics.lock().unwrap().insert(key, stats);
    }

    pub fn set_trend(&self, trend: Result<ActivityTrend, ApiError>) {
        *self.trend.lock().unwrap() = trend;
    }

    pub fn set_login(&self, login: Result<LoginResponse, ApiError>) {
        *self.login.lock().unwrap() = login;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AnalyzerApi for FakeApi {
    async fn login(&self, username: &str, _password: &str) -> Result<LoginResponse, ApiError> {
        self.record(Call::Login(username.to_string()));
        let response = self.login.lock().unwrap().clone()?;
        if let (Some(session), Some(token)) = (&self.session, &response.admin_token) {
            session.sign_in(token.clone());
        }
        Ok(response)
    }

    async fn connected_devices_count(&self) -> u64 {
        self.record(Call::ConnectedCount);
        self.devices.lock().unwrap().len() as u64
    }

    async fn previously_connected_devices(&self) -> Vec<Device> {
        self.record(Call::PreviouslyConnected);
        self.devices.lock().unwrap().clone()
    }

    async fn currently_connected_devices(&self) -> Vec<Device> {
        self.record(Call::CurrentlyConnected);
        self.devices.lock().unwrap().clone()
    }

    async fn network_type_summary(&self, range: &DateRange) -> NetworkStats {
        self.record(Call::NetworkType(range.clone()));
        NetworkStats::from_payload(&json!({"4G": "100.00%"}), &network_types())
    }

    async fn operator_summary(&self, range: &DateRange) -> NetworkStats {
        self.record(Call::Operator(range.clone()));
        NetworkStats::from_payload(&json!({"Alfa": "60.00%", "Touch": "40.00%"}), &[])
    }

    async fn signal_power_summary(&self, range: &DateRange) -> SignalStats {
        self.record(Call::SignalPower(range.clone()));
        SignalStats::from_payload(&json!({"4G": -95.0}), &network_types())
    }

    async fn sinr_summary(&self, range: &DateRange) -> SignalStats {
        self.record(Call::Sinr(range.clone()));
        SignalStats::from_payload(&json!({"4G": 12.0}), &network_types())
    }

    async fn device_activity_trend(
        &self,
        range: &DateRange,
        granularity: Granularity,
    ) -> Result<ActivityTrend, ApiError> {
        self.record(Call::Trend(range.clone(), granularity));
        self.trend.lock().unwrap().clone()
    }

    async fn device_statistics(&self, key: &DeviceKey) -> Result<DeviceStatistics, ApiError> {
        self.record(Call::DeviceStatistics(key.clone()));
        self.statistics
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(ApiError::Server {
                status: 404,
                message: Some("Device not found".to_string()),
            })
    }

    async fn submit_cell_data(&self, report: &CellReport) -> Result<serde_json::Value, ApiError> {
        self.record(Call::Submit(report.device_id.clone()));
        Ok(json!({"message": "Data submitted successfully"}))
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token: Mutex::new(token.map(str::to_string)),
        }
    }

    pub fn current(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> anyhow::Result<Option<String>> {
        Ok(self.current())
    }

    fn save(&self, token: Option<&str>) -> anyhow::Result<()> {
        *self.token.lock().unwrap() = token.map(str::to_string);
        Ok(())
    }
}
