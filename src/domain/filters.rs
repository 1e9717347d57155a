// Dashboard filter state and backend date-range formatting
use chrono::{Months, NaiveDate, NaiveTime};

use super::activity::Granularity;

/// Date bounds as sent to the backend, local `YYYY-MM-DDTHH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardFilters {
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub granularity: Granularity,
}

impl DashboardFilters {
    /// Last three months up to the end of `today`, hourly buckets.
    pub fn default_for(today: NaiveDate) -> Self {
        Self {
            start_date: today.checked_sub_months(Months::new(3)).unwrap_or(today),
            start_time: NaiveTime::MIN,
            end_date: today,
            end_time: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
            granularity: Granularity::default(),
        }
    }

    /// Start seconds are pinned to `:00` and end seconds to `:59`.
    pub fn range(&self) -> DateRange {
        DateRange {
            start: format!(
                "{}T{}:00",
                self.start_date.format("%Y-%m-%d"),
                self.start_time.format("%H:%M")
            ),
            end: format!(
                "{}T{}:59",
                self.end_date.format("%Y-%m-%d"),
                self.end_time.format("%H:%M")
            ),
        }
    }
}
