// Page routes and the navigation capability handed to services
use crate::domain::device::DeviceKey;

const DEVICE_STATISTICS_PATH: &str = "/device-statistics";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    /// Carries the raw query string, read by the device statistics page.
    DeviceStatistics { query: String },
}

impl Route {
    pub fn device_statistics(key: &DeviceKey) -> Self {
        Route::DeviceStatistics {
            query: format!(
                "username={}&device_id={}",
                urlencoding::encode(&key.username),
                urlencoding::encode(&key.device_id)
            ),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::DeviceStatistics { query } => format!("{}?{}", DEVICE_STATISTICS_PATH, query),
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}
