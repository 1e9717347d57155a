// Plain-text rendering of the dashboard and device pages
use crate::application::dashboard_service::DashboardSnapshot;
use crate::application::device_statistics_service::DeviceStatisticsView;
use crate::domain::device::Device;
use crate::domain::filters::DashboardFilters;
use crate::domain::summary::{
    format_percentage, format_signal_power, format_sinr, NetworkStats, SignalStats,
};
use chrono::TimeZone;
use std::fmt;

const BLANK: &str = "-";
const BAR_WIDTH: f64 = 20.0;

/// The whole dashboard page. Activity buckets and timestamps are shown in `tz`.
pub struct DashboardView<'a, Tz: TimeZone> {
    pub snapshot: &'a DashboardSnapshot,
    pub filters: &'a DashboardFilters,
    pub tz: &'a Tz,
}

impl<Tz> fmt::Display for DashboardView<'_, Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot;
        let range = self.filters.range();

        writeln!(f, "Network Cell Analyzer")?;
        writeln!(
            f,
            "Range {} .. {}   Granularity {}",
            range.start, range.end, self.filters.granularity
        )?;
        if let Some(updated) = snapshot.last_updated {
            writeln!(
                f,
                "Last updated {}",
                updated.with_timezone(self.tz).format("%Y-%m-%d %H:%M:%S")
            )?;
        }
        if snapshot.loading {
            writeln!(f, "Loading...")?;
        }
        if let Some(error) = &snapshot.error {
            writeln!(f, "Error: {}", error)?;
        }

        writeln!(f)?;
        writeln!(f, "Connected devices: {}", snapshot.device_count)?;

        percentage_panel(f, "Operators", snapshot.operator_stats.as_ref())?;
        percentage_panel(f, "Network types", snapshot.network_stats.as_ref())?;
        signal_panel(f, "Signal power", snapshot.signal_stats.as_ref(), format_signal_power)?;
        signal_panel(f, "SINR", snapshot.sinr_stats.as_ref(), format_sinr)?;

        writeln!(f)?;
        writeln!(f, "Device activity ({})", self.filters.granularity)?;
        match &snapshot.activity {
            Some(trend) if !trend.is_empty() => {
                for bucket in trend.group_by(self.filters.granularity, self.tz) {
                    writeln!(f, "  {:<17} {}", bucket.label, bucket.count)?;
                }
            }
            _ => writeln!(f, "  No activity data")?,
        }

        writeln!(f)?;
        writeln!(f, "Currently connected")?;
        if snapshot.currently_connected.is_empty() {
            writeln!(f, "  No devices currently connected")?;
        } else {
            device_header(f, "Status")?;
            for connected in &snapshot.currently_connected {
                device_row(f, &connected.device, &connected.status.label())?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Previously connected")?;
        if snapshot.previously_connected.is_empty() {
            writeln!(f, "  No devices")?;
        } else {
            device_header(f, "Last seen")?;
            for device in &snapshot.previously_connected {
                let last_seen = snapshot
                    .device_stats
                    .get(&device.key())
                    .and_then(|s| s.last_seen.clone())
                    .or_else(|| device.last_seen.clone())
                    .unwrap_or_else(|| BLANK.to_string());
                device_row(f, device, &last_seen)?;
            }
        }

        Ok(())
    }
}

fn percentage_panel(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    stats: Option<&NetworkStats>,
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", title)?;
    let Some(stats) = stats else {
        return writeln!(f, "  {}", BLANK);
    };
    for (name, value) in stats.chart_values() {
        let bar = "#".repeat((value.clamp(0.0, 100.0) / 100.0 * BAR_WIDTH).round() as usize);
        writeln!(f, "  {:<8} {:>8} {}", name, format_percentage(value), bar)?;
    }
    Ok(())
}

fn signal_panel(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    stats: Option<&SignalStats>,
    format: fn(f64) -> String,
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", title)?;
    let Some(stats) = stats else {
        return writeln!(f, "  {}", BLANK);
    };
    for (name, value) in &stats.0 {
        writeln!(f, "  {:<8} {:>12}", name, format(*value))?;
    }
    Ok(())
}

fn device_header(f: &mut fmt::Formatter<'_>, last_column: &str) -> fmt::Result {
    writeln!(
        f,
        "  {:<16} {:<20} {:<15} {:<17} {}",
        "Username", "Device ID", "IP", "MAC", last_column
    )
}

fn device_row(f: &mut fmt::Formatter<'_>, device: &Device, last_column: &str) -> fmt::Result {
    writeln!(
        f,
        "  {:<16} {:<20} {:<15} {:<17} {}",
        device.username,
        device.device_id,
        device.ip.as_deref().unwrap_or(BLANK),
        device.mac.as_deref().unwrap_or(BLANK),
        last_column
    )
}

pub struct DeviceStatisticsPage<'a>(pub &'a DeviceStatisticsView);

impl fmt::Display for DeviceStatisticsPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Device Statistics")?;
        if let Some(error) = &self.0.error {
            return writeln!(f, "Error: {}", error);
        }
        let Some(stats) = &self.0.statistics else {
            return writeln!(f, "Loading...");
        };

        let network_types = if stats.connected_network_types.is_empty() {
            BLANK.to_string()
        } else {
            stats.connected_network_types.join(", ")
        };

        writeln!(f, "  Username:              {}", stats.username)?;
        writeln!(f, "  Device ID:             {}", stats.device_id)?;
        writeln!(f, "  Records:               {}", stats.records_count)?;
        writeln!(
            f,
            "  Average signal power:  {}",
            stats
                .average_signal_power
                .map(format_signal_power)
                .unwrap_or_else(|| BLANK.to_string())
        )?;
        writeln!(
            f,
            "  Average SINR:          {}",
            stats
                .average_sinr
                .map(format_sinr)
                .unwrap_or_else(|| BLANK.to_string())
        )?;
        writeln!(f, "  Network types:         {}", network_types)?;
        writeln!(
            f,
            "  Last seen:             {}",
            stats.last_seen.as_deref().unwrap_or(BLANK)
        )
    }
}

/// Server-side view of who is connected, used by the `devices` command.
pub struct DeviceListing<'a> {
    pub count: u64,
    pub devices: &'a [Device],
}

impl fmt::Display for DeviceListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Connected devices: {}", self.count)?;
        if self.devices.is_empty() {
            return writeln!(f, "  No devices currently connected");
        }
        device_header(f, "Last seen")?;
        for device in self.devices {
            device_row(f, device, device.last_seen.as_deref().unwrap_or(BLANK))?;
        }
        Ok(())
    }
}
