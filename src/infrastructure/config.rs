use crate::application::dashboard_service::PollSettings;
use crate::domain::summary::{DEFAULT_NETWORK_TYPES, DEFAULT_OPERATORS};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://network-cell-analyzer-backend-production.up.railway.app";
pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";
const DEFAULT_TOKEN_PATH: &str = ".cell-analyzer/session.toml";
const ENV_PREFIX: &str = "CELL_ANALYZER";

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub api: ApiSettings,
    pub polling: PollingSettings,
    pub categories: CategorySettings,
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    pub network_interval_secs: u64,
    pub connectivity_interval_secs: u64,
}

impl PollingSettings {
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            network_interval: Duration::from_secs(self.network_interval_secs.max(1)),
            connectivity_interval: Duration::from_secs(self.connectivity_interval_secs.max(1)),
        }
    }
}

/// Category keys the summary panels always show, even when the server omits them.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CategorySettings {
    pub network_types: Vec<String>,
    pub operators: Vec<String>,
}

impl Default for CategorySettings {
    fn default() -> Self {
        Self {
            network_types: DEFAULT_NETWORK_TYPES.iter().map(|s| s.to_string()).collect(),
            operators: DEFAULT_OPERATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub token_path: PathBuf,
}

/// Built-in defaults, then the optional TOML file, then
/// `CELL_ANALYZER__SECTION__KEY` environment variables.
pub fn load_dashboard_config(path: &Path) -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("polling.network_interval_secs", 10_i64)?
        .set_default("polling.connectivity_interval_secs", 60_i64)?
        .set_default("categories.network_types", DEFAULT_NETWORK_TYPES.to_vec())?
        .set_default("categories.operators", DEFAULT_OPERATORS.to_vec())?
        .set_default("session.token_path", DEFAULT_TOKEN_PATH)?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("categories.network_types")
                .with_list_parse_key("categories.operators"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
