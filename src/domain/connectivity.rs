// Connectivity derivation from last-seen timestamps
use chrono::{DateTime, TimeDelta, Utc};

use super::device::DeviceStatistics;

/// A device counts as connected while its last report is at most this old.
pub const CONNECTIVITY_WINDOW: TimeDelta = TimeDelta::minutes(5);

const WINDOW_MINUTES: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected { minutes_remaining: i64 },
    Disconnected,
    NeverConnected,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }

    pub fn label(&self) -> String {
        match self {
            ConnectionStatus::Connected { minutes_remaining } => {
                format!("{} minutes remaining", minutes_remaining)
            }
            ConnectionStatus::Disconnected => "Disconnected".to_string(),
            ConnectionStatus::NeverConnected => "Never connected".to_string(),
        }
    }
}

/// Inclusive at the boundary: exactly five minutes is still connected.
pub fn is_connected(last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_seen {
        Some(last_seen) => now - last_seen <= CONNECTIVITY_WINDOW,
        None => false,
    }
}

pub fn connection_status(last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ConnectionStatus {
    let Some(last_seen) = last_seen else {
        return ConnectionStatus::NeverConnected;
    };

    if is_connected(Some(last_seen), now) {
        let elapsed_minutes = (now - last_seen).num_milliseconds() as f64 / 60_000.0;
        ConnectionStatus::Connected {
            minutes_remaining: (WINDOW_MINUTES - elapsed_minutes).floor() as i64,
        }
    } else {
        ConnectionStatus::Disconnected
    }
}

/// Status for a device given whatever statistics have been fetched for it.
///
/// No statistics or no `last_seen` means the device never reported; a
/// `last_seen` that cannot be parsed counts as disconnected.
pub fn status_from_statistics(stats: Option<&DeviceStatistics>, now: DateTime<Utc>) -> ConnectionStatus {
    let Some(raw) = stats.and_then(|s| s.last_seen.as_deref()) else {
        return ConnectionStatus::NeverConnected;
    };

    match stats.and_then(DeviceStatistics::last_seen_at) {
        Some(last_seen) => connection_status(Some(last_seen), now),
        None => {
            tracing::debug!("Unparseable last_seen timestamp: {}", raw);
            ConnectionStatus::Disconnected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 11, 12, 0, 0).unwrap()
    }

    fn stats(last_seen: Option<&str>) -> DeviceStatistics {
        DeviceStatistics {
            username: "bob".to_string(),
            device_id: "d1".to_string(),
            records_count: 3,
            average_signal_power: Some(-85.0),
            average_sinr: Some(12.0),
            connected_network_types: vec!["4G".to_string()],
            last_seen: last_seen.map(str::to_string),
        }
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let now = now();
        assert!(is_connected(Some(now - TimeDelta::milliseconds(300_000)), now));
        assert!(!is_connected(Some(now - TimeDelta::milliseconds(300_001)), now));
        assert!(!is_connected(None, now));
    }

    #[test]
    fn test_remaining_minutes_are_floored() {
        let now = now();
        assert_eq!(
            connection_status(Some(now - TimeDelta::minutes(3)), now),
            ConnectionStatus::Connected { minutes_remaining: 2 }
        );
        assert_eq!(
            connection_status(Some(now - TimeDelta::seconds(150)), now),
            ConnectionStatus::Connected { minutes_remaining: 2 }
        );
        assert_eq!(
            connection_status(Some(now - TimeDelta::minutes(5)), now),
            ConnectionStatus::Connected { minutes_remaining: 0 }
        );
        assert_eq!(
            connection_status(Some(now - TimeDelta::minutes(6)), now),
            ConnectionStatus::Disconnected
        );
        assert_eq!(connection_status(None, now), ConnectionStatus::NeverConnected);
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            ConnectionStatus::Connected { minutes_remaining: 2 }.label(),
            "2 minutes remaining"
        );
        assert_eq!(ConnectionStatus::Disconnected.label(), "Disconnected");
        assert_eq!(ConnectionStatus::NeverConnected.label(), "Never connected");
    }

    #[test]
    fn test_status_from_statistics() {
        let now = now();
        assert_eq!(status_from_statistics(None, now), ConnectionStatus::NeverConnected);
        assert_eq!(
            status_from_statistics(Some(&stats(None)), now),
            ConnectionStatus::NeverConnected
        );
        assert_eq!(
            status_from_statistics(Some(&stats(Some("not a date"))), now),
            ConnectionStatus::Disconnected
        );
        assert_eq!(
            status_from_statistics(Some(&stats(Some("2025-04-11T11:57:00Z"))), now),
            ConnectionStatus::Connected { minutes_remaining: 2 }
        );
    }
}
