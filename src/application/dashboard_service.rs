// Dashboard service - Polling orchestration and derived connectivity
use crate::application::analyzer_api::AnalyzerApi;
use crate::application::clock::Clock;
use crate::application::error::ApiError;
use crate::application::session::Session;
use crate::domain::activity::{ActivityTrend, Granularity};
use crate::domain::connectivity::{status_from_statistics, ConnectionStatus};
use crate::domain::device::{Device, DeviceKey, DeviceStatistics};
use crate::domain::filters::DashboardFilters;
use crate::domain::summary::{NetworkStats, SignalStats};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

pub const NETWORK_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const CONNECTIVITY_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub network_interval: Duration,
    pub connectivity_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            network_interval: NETWORK_POLL_INTERVAL,
            connectivity_interval: CONNECTIVITY_CHECK_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedDevice {
    pub device: Device,
    pub status: ConnectionStatus,
}

/// Everything the dashboard renders, published as one value.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub device_count: usize,
    pub previously_connected: Vec<Device>,
    pub currently_connected: Vec<ConnectedDevice>,
    pub network_stats: Option<NetworkStats>,
    pub operator_stats: Option<NetworkStats>,
    pub signal_stats: Option<SignalStats>,
    pub sinr_stats: Option<SignalStats>,
    pub activity: Option<ActivityTrend>,
    pub device_stats: HashMap<DeviceKey, DeviceStatistics>,
    pub error: Option<String>,
    pub loading: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Devices from `devices` that are connected at `now`, first occurrence per key.
pub fn connected_devices(
    devices: &[Device],
    stats: &HashMap<DeviceKey, DeviceStatistics>,
    now: DateTime<Utc>,
) -> Vec<ConnectedDevice> {
    let mut seen = HashSet::new();
    devices
        .iter()
        .filter_map(|device| {
            let key = device.key();
            let status = status_from_statistics(stats.get(&key), now);
            if status.is_connected() && seen.insert(key) {
                Some(ConnectedDevice {
                    device: device.clone(),
                    status,
                })
            } else {
                None
            }
        })
        .collect()
}

struct PollResults {
    devices: Vec<Device>,
    network_stats: NetworkStats,
    signal_stats: SignalStats,
    sinr_stats: SignalStats,
    operator_stats: NetworkStats,
    activity: ActivityTrend,
}

#[derive(Clone)]
pub struct DashboardService {
    api: Arc<dyn AnalyzerApi>,
    session: Arc<Session>,
    clock: Arc<dyn Clock>,
    settings: PollSettings,
    filters: Arc<watch::Sender<DashboardFilters>>,
    state: Arc<watch::Sender<DashboardSnapshot>>,
}

impl DashboardService {
    pub fn new(
        api: Arc<dyn AnalyzerApi>,
        session: Arc<Session>,
        clock: Arc<dyn Clock>,
        settings: PollSettings,
        filters: DashboardFilters,
    ) -> Self {
        let (filters, _) = watch::channel(filters);
        let (state, _) = watch::channel(DashboardSnapshot::default());

        Self {
            api,
            session,
            clock,
            settings,
            filters: Arc::new(filters),
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.state.borrow().clone()
    }

    pub fn filters(&self) -> DashboardFilters {
        self.filters.borrow().clone()
    }

    /// Takes effect on the next poll tick.
    pub fn set_date_range(
        &self,
        start_date: NaiveDate,
        start_time: NaiveTime,
        end_date: NaiveDate,
        end_time: NaiveTime,
    ) {
        self.filters.send_modify(|f| {
            f.start_date = start_date;
            f.start_time = start_time;
            f.end_date = end_date;
            f.end_time = end_time;
        });
    }

    /// Replace the date range and poll right away.
    pub async fn apply_date_range(
        &self,
        start_date: NaiveDate,
        start_time: NaiveTime,
        end_date: NaiveDate,
        end_time: NaiveTime,
    ) {
        self.set_date_range(start_date, start_time, end_date, end_time);
        self.poll_once().await;
    }

    /// Switch granularity and re-fetch only the activity trend.
    pub async fn set_granularity(&self, granularity: Granularity) {
        self.filters.send_modify(|f| f.granularity = granularity);

        let range = self.filters.borrow().range();
        let activity = match self.api.device_activity_trend(&range, granularity).await {
            Ok(trend) => Some(trend),
            Err(e) => {
                tracing::warn!("Error fetching activity trend: {}", e);
                None
            }
        };
        self.state.send_modify(|s| s.activity = activity);
    }

    /// One network poll cycle with the filters current at call time.
    pub async fn poll_once(&self) {
        let started = self.clock.now();
        self.state.send_modify(|s| {
            s.error = None;
            s.loading = true;
            s.last_updated = Some(started);
        });

        match self.fetch_cycle().await {
            Ok(results) => {
                let devices = results.devices.clone();
                let now = self.clock.now();
                self.state.send_modify(|s| {
                    s.device_count = results.devices.len();
                    s.currently_connected = connected_devices(&results.devices, &s.device_stats, now);
                    s.previously_connected = results.devices;
                    s.network_stats = Some(results.network_stats);
                    s.signal_stats = Some(results.signal_stats);
                    s.sinr_stats = Some(results.sinr_stats);
                    s.operator_stats = Some(results.operator_stats);
                    s.activity = Some(results.activity);
                    s.loading = false;
                });

                self.refresh_device_statistics(&devices).await;
            }
            Err(e) => {
                tracing::error!("Dashboard poll failed: {}", e);
                self.state.send_modify(|s| {
                    s.error = Some(e.to_string());
                    s.loading = false;
                });

                if matches!(e, ApiError::MissingToken) {
                    self.session.require_login();
                } else if e.is_forbidden() {
                    // The client already cleared the token; this is a no-op then.
                    self.session.expire();
                }
            }
        }
    }

    async fn fetch_cycle(&self) -> Result<PollResults, ApiError> {
        if !self.session.is_authenticated() {
            return Err(ApiError::MissingToken);
        }

        let filters = self.filters();
        let range = filters.range();
        tracing::debug!(
            "Polling dashboard: start={}, end={}, interval={}",
            range.start,
            range.end,
            filters.granularity
        );

        let (devices, network_stats, signal_stats, sinr_stats, operator_stats) = futures::join!(
            self.api.previously_connected_devices(),
            self.api.network_type_summary(&range),
            self.api.signal_power_summary(&range),
            self.api.sinr_summary(&range),
            self.api.operator_summary(&range),
        );

        let activity = self
            .api
            .device_activity_trend(&range, filters.granularity)
            .await?;

        Ok(PollResults {
            devices,
            network_stats,
            signal_stats,
            sinr_stats,
            operator_stats,
            activity,
        })
    }

    /// Fetch statistics for every listed device concurrently. Each completion
    /// overwrites its cache slot and re-derives the connected table.
    async fn refresh_device_statistics(&self, devices: &[Device]) {
        let keys: HashSet<DeviceKey> = devices
            .iter()
            .map(Device::key)
            .filter(|key| !key.username.is_empty() && !key.device_id.is_empty())
            .collect();

        let fetches = keys.into_iter().map(|key| async move {
            match self.api.device_statistics(&key).await {
                Ok(stats) => {
                    let now = self.clock.now();
                    self.state.send_modify(|s| {
                        s.device_stats.insert(key, stats);
                        s.currently_connected =
                            connected_devices(&s.previously_connected, &s.device_stats, now);
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "Error fetching statistics for {}/{}: {}",
                        key.username,
                        key.device_id,
                        e
                    );
                }
            }
        });

        futures::future::join_all(fetches).await;
    }

    /// Re-derive the connected table from cached statistics. No network I/O.
    pub fn recheck_connectivity(&self) {
        let now = self.clock.now();
        self.state.send_if_modified(|s| {
            let connected = connected_devices(&s.previously_connected, &s.device_stats, now);
            if connected == s.currently_connected {
                return false;
            }
            s.currently_connected = connected;
            true
        });
    }

    /// Manual refresh: one re-check and one poll cycle, timers untouched.
    pub async fn refresh(&self) {
        self.recheck_connectivity();
        self.poll_once().await;
    }

    /// Start both periodic tasks. Dropping the handle stops them.
    pub fn start(&self) -> DashboardHandle {
        tracing::info!(
            "Starting dashboard polling: network every {:?}, connectivity every {:?}",
            self.settings.network_interval,
            self.settings.connectivity_interval
        );

        let service = self.clone();
        let poller = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(service.settings.network_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Ticks do not wait for earlier cycles; overlapping cycles each apply
            // their own results when they finish.
            let mut cycles = JoinSet::new();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let service = service.clone();
                        cycles.spawn(async move { service.poll_once().await });
                    }
                    Some(finished) = cycles.join_next(), if !cycles.is_empty() => {
                        if let Err(e) = finished {
                            tracing::error!("Poll cycle task failed: {:?}", e);
                        }
                    }
                }
            }
        });

        let service = self.clone();
        let connectivity = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(service.settings.connectivity_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                service.recheck_connectivity();
            }
        });

        DashboardHandle {
            poller,
            connectivity,
        }
    }
}

pub struct DashboardHandle {
    poller: JoinHandle<()>,
    connectivity: JoinHandle<()>,
}

impl Drop for DashboardHandle {
    fn drop(&mut self) {
        self.poller.abort();
        self.connectivity.abort();
        tracing::debug!("Dashboard polling stopped");
    }
}
