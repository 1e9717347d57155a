// Device activity trend and client-side regrouping by granularity
use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::timestamp::parse_timestamp;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Minute,
    #[default]
    Hour,
    Day,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Minute => "minute",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Month => "month",
        }
    }

    /// Bucket label format. Labels sort lexicographically in time order.
    fn bucket_format(&self) -> &'static str {
        match self {
            Granularity::Minute => "%Y-%m-%d %H:%M",
            Granularity::Hour => "%Y-%m-%d %H:00",
            Granularity::Day => "%Y-%m-%d",
            Granularity::Month => "%Y-%m",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown granularity '{0}', expected minute, hour, day or month")]
pub struct ParseGranularityError(String);

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minute" => Ok(Granularity::Minute),
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            "month" => Ok(Granularity::Month),
            _ => Err(ParseGranularityError(s.to_string())),
        }
    }
}

/// Parallel arrays as returned by `/admin/device_activity_trend`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityTrend {
    #[serde(default)]
    pub timestamps: Vec<String>,
    #[serde(default)]
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityBucket {
    pub label: String,
    pub count: u64,
}

impl ActivityTrend {
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Sum counts into buckets labelled in `tz` at the given granularity,
    /// oldest first. Unparseable timestamps are skipped.
    pub fn group_by<Tz>(&self, granularity: Granularity, tz: &Tz) -> Vec<ActivityBucket>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let mut buckets: BTreeMap<String, u64> = BTreeMap::new();

        for (raw, count) in self.timestamps.iter().zip(&self.counts) {
            let Some(at) = parse_timestamp(raw) else {
                tracing::warn!("Skipping activity sample with bad timestamp: {}", raw);
                continue;
            };
            let label = at
                .with_timezone(tz)
                .format(granularity.bucket_format())
                .to_string();
            let total = buckets.entry(label).or_insert(0);
            *total = total.saturating_add(*count);
        }

        buckets
            .into_iter()
            .map(|(label, count)| ActivityBucket { label, count })
            .collect()
    }
}
