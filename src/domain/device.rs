// Device domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::timestamp::parse_timestamp;

/// Identity of a reporting device. IP and MAC are attributes, not identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceKey {
    pub username: String,
    pub device_id: String,
}

impl DeviceKey {
    pub fn new(username: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            device_id: device_id.into(),
        }
    }
}

/// Device row as listed by the server. Fields are read leniently so every
/// listed element is kept: missing fields are empty and numbers become text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub device_id: String,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub mac: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_seen: Option<String>,
}

fn lenient_optional<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional(deserializer)?.unwrap_or_default())
}

impl Device {
    pub fn key(&self) -> DeviceKey {
        DeviceKey::new(self.username.clone(), self.device_id.clone())
    }
}

/// Per-device aggregate returned by `/admin/device_statistics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatistics {
    pub username: String,
    pub device_id: String,
    #[serde(default)]
    pub records_count: u64,
    #[serde(default)]
    pub average_signal_power: Option<f64>,
    #[serde(default)]
    pub average_sinr: Option<f64>,
    #[serde(default)]
    pub connected_network_types: Vec<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
}

impl DeviceStatistics {
    pub fn last_seen_at(&self) -> Option<DateTime<Utc>> {
        self.last_seen.as_deref().and_then(parse_timestamp)
    }
}

/// Cell measurement submitted by a device to `/submit_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellReport {
    pub operator: String,
    pub signal_power: f64,
    pub sinr: f64,
    pub network_type: String,
    pub frequency_band: String,
    pub cell_id: String,
    pub device_mac: String,
    pub device_ip: String,
    pub device_id: String,
}
