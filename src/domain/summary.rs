// Summary report models and client-side completion of category keys
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_NETWORK_TYPES: [&str; 3] = ["2G", "3G", "4G"];
pub const DEFAULT_OPERATORS: [&str; 2] = ["Alfa", "Touch"];

pub const ZERO_PERCENT: &str = "0.00%";

/// Category label to percentage string, e.g. `"2G" => "50.00%"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats(pub BTreeMap<String, String>);

/// Category label to a numeric reading in dBm or dB.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalStats(pub BTreeMap<String, f64>);

impl NetworkStats {
    pub fn defaults(categories: &[String]) -> Self {
        Self(
            categories
                .iter()
                .map(|c| (c.clone(), ZERO_PERCENT.to_string()))
                .collect(),
        )
    }

    /// Build from an untrusted payload, keeping present keys and filling every
    /// expected category with `"0.00%"`.
    pub fn from_payload(payload: &Value, categories: &[String]) -> Self {
        let Some(object) = payload.as_object() else {
            tracing::warn!("Invalid percentage summary payload: {}", payload);
            return Self::defaults(categories);
        };

        let mut stats: BTreeMap<String, String> = object
            .iter()
            .map(|(key, value)| (key.clone(), percentage_text(value)))
            .collect();

        for category in categories {
            stats
                .entry(category.clone())
                .or_insert_with(|| ZERO_PERCENT.to_string());
        }

        Self(stats)
    }

    /// Numeric chart values; unparseable percentages become zero.
    pub fn chart_values(&self) -> Vec<(String, f64)> {
        self.0
            .iter()
            .map(|(name, value)| {
                let numeric = value.trim().trim_end_matches('%').trim().parse::<f64>();
                (name.clone(), numeric.ok().filter(|v| v.is_finite()).unwrap_or(0.0))
            })
            .collect()
    }
}

impl SignalStats {
    pub fn defaults(categories: &[String]) -> Self {
        Self(categories.iter().map(|c| (c.clone(), 0.0)).collect())
    }

    /// Build from an untrusted payload, replacing missing or non-numeric
    /// values with `0`.
    pub fn from_payload(payload: &Value, categories: &[String]) -> Self {
        let Some(object) = payload.as_object() else {
            tracing::warn!("Invalid numeric summary payload: {}", payload);
            return Self::defaults(categories);
        };

        let mut stats: BTreeMap<String, f64> = object
            .iter()
            .map(|(key, value)| (key.clone(), value.as_f64().unwrap_or(0.0)))
            .collect();

        for category in categories {
            stats.entry(category.clone()).or_insert(0.0);
        }

        Self(stats)
    }
}

fn percentage_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number
            .as_f64()
            .map(format_percentage)
            .unwrap_or_else(|| ZERO_PERCENT.to_string()),
        _ => ZERO_PERCENT.to_string(),
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

pub fn format_signal_power(value: f64) -> String {
    format!("{:.2} dBm", value)
}

pub fn format_sinr(value: f64) -> String {
    format!("{:.2} dB", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn network_types() -> Vec<String> {
        DEFAULT_NETWORK_TYPES.iter().map(|s| s.to_string()).collect()
    }

    fn operators() -> Vec<String> {
        DEFAULT_OPERATORS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partial_network_summary_is_completed() {
        let stats = NetworkStats::from_payload(&json!({"2G": "10.00%"}), &network_types());

        let expected: BTreeMap<String, String> = [("2G", "10.00%"), ("3G", "0.00%"), ("4G", "0.00%")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(stats.0, expected);
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        let stats = NetworkStats::from_payload(&json!({"5G": "1.50%", "Alfa": 40}), &operators());
        assert_eq!(stats.0.get("5G").unwrap(), "1.50%");
        assert_eq!(stats.0.get("Alfa").unwrap(), "40.00%");
        assert_eq!(stats.0.get("Touch").unwrap(), ZERO_PERCENT);
    }

    #[test]
    fn test_non_object_payload_yields_defaults() {
        assert_eq!(
            NetworkStats::from_payload(&json!(["2G"]), &network_types()),
            NetworkStats::defaults(&network_types())
        );
        assert_eq!(
            SignalStats::from_payload(&Value::Null, &network_types()),
            SignalStats::defaults(&network_types())
        );
    }

    #[test]
    fn test_signal_summary_zeroes_missing_and_non_numeric() {
        let stats = SignalStats::from_payload(&json!({"2G": -85.5, "3G": "n/a"}), &network_types());
        assert_eq!(stats.0.get("2G"), Some(&-85.5));
        assert_eq!(stats.0.get("3G"), Some(&0.0));
        assert_eq!(stats.0.get("4G"), Some(&0.0));
    }

    #[test]
    fn test_chart_values_strip_percent_sign() {
        let stats = NetworkStats::from_payload(&json!({"2G": "12.50%", "3G": "bogus"}), &network_types());
        let values = stats.chart_values();
        assert_eq!(
            values,
            vec![
                ("2G".to_string(), 12.5),
                ("3G".to_string(), 0.0),
                ("4G".to_string(), 0.0)
            ]
        );
    }

    #[test]
    fn test_formatters() {
        assert_eq!(format_percentage(12.346), "12.35%");
        assert_eq!(format_signal_power(-85.5), "-85.50 dBm");
        assert_eq!(format_sinr(7.0), "7.00 dB");
    }
}
