// Main entry point - Dependency injection and command dispatch
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::analyzer_api::AnalyzerApi;
use crate::application::clock::SystemClock;
use crate::application::dashboard_service::DashboardService;
use crate::application::device_statistics_service::DeviceStatisticsService;
use crate::application::login_service::LoginService;
use crate::application::session::Session;
use crate::domain::device::{CellReport, DeviceKey};
use crate::domain::filters::DashboardFilters;
use crate::infrastructure::config::{load_dashboard_config, DEFAULT_CONFIG_PATH};
use crate::infrastructure::http_api::HttpAnalyzerApi;
use crate::infrastructure::token_store::FileTokenStore;
use crate::presentation::app::{App, ChannelNavigator};
use crate::presentation::render::{DeviceListing, DeviceStatisticsPage};

#[derive(Parser)]
#[command(name = "cell-analyzer-dashboard")]
#[command(about = "Admin dashboard for the network cell analyzer backend", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive dashboard (login first if needed)
    Run,
    /// Log in and store the admin token
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// Show statistics for one device
    Device {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        device_id: String,
    },
    /// List devices the server currently considers connected
    Devices,
    /// Submit one cell measurement
    Submit {
        #[arg(long)]
        operator: String,

        /// Signal power in dBm
        #[arg(long, allow_negative_numbers = true)]
        signal_power: f64,

        /// SINR in dB
        #[arg(long, allow_negative_numbers = true)]
        sinr: f64,

        #[arg(long)]
        network_type: String,

        #[arg(long)]
        frequency_band: String,

        #[arg(long)]
        cell_id: String,

        #[arg(long)]
        device_mac: String,

        #[arg(long)]
        device_ip: String,

        #[arg(long)]
        device_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is the page.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = load_dashboard_config(&cli.config)?;
    tracing::debug!("Using API at {}", config.api.base_url);

    // Session and API client (infrastructure layer)
    let (navigator, routes) = ChannelNavigator::channel();
    let store = Arc::new(FileTokenStore::new(config.session.token_path.clone()));
    let session = Arc::new(Session::new(store, Arc::new(navigator)));
    let api = Arc::new(HttpAnalyzerApi::new(
        config.api.base_url.clone(),
        session.clone(),
        config.categories.clone(),
    ));

    match cli.command {
        Commands::Run => {
            let today = chrono::Local::now().date_naive();
            let app = App {
                session: session.clone(),
                login: LoginService::new(api.clone(), session.clone()),
                dashboard: DashboardService::new(
                    api.clone(),
                    session.clone(),
                    Arc::new(SystemClock),
                    config.polling.poll_settings(),
                    DashboardFilters::default_for(today),
                ),
                device_statistics: DeviceStatisticsService::new(api.clone()),
                routes,
            };
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            app.run(stdin).await?;
        }
        Commands::Login { username, password } => {
            let login = LoginService::new(api.clone(), session.clone());
            login.submit(&username, &password).await?;
            println!("Logged in as {}", username);
        }
        Commands::Device {
            username,
            device_id,
        } => {
            let service = DeviceStatisticsService::new(api.clone());
            let view = service.load_key(&DeviceKey::new(username, device_id)).await;
            print!("{}", DeviceStatisticsPage(&view));
        }
        Commands::Devices => {
            let (count, devices) = futures::join!(
                api.connected_devices_count(),
                api.currently_connected_devices()
            );
            print!(
                "{}",
                DeviceListing {
                    count,
                    devices: &devices
                }
            );
        }
        Commands::Submit {
            operator,
            signal_power,
            sinr,
            network_type,
            frequency_band,
            cell_id,
            device_mac,
            device_ip,
            device_id,
        } => {
            let report = CellReport {
                operator,
                signal_power,
                sinr,
                network_type,
                frequency_band,
                cell_id,
                device_mac,
                device_ip,
                device_id,
            };
            let response = api.submit_cell_data(&report).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
