//! Hearth HTTP Server Binary
//!
//! Loads configuration, starts the forecast loop and serves the REST API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin hearth-server
//!
//! HEARTH_CONFIG=/etc/hearth/hearth.toml PORT=8123 cargo run --bin hearth-server
//! ```
//!
//! # Environment Variables
//!
//! - `HEARTH_CONFIG`: Path to the TOML config file
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use hearth::config::{AppConfig, WeatherSettings};
use hearth::http::{create_router, AppState};
use hearth::weather::{
    ForecastLoop, ForecastRefresher, ForecastSelector, HourlySchedule, SensorStateRegistry,
    WeatherSensor, YrClient,
};
use hearth::zwave::{JsonFileStore, SnapshotNetwork};

fn start_forecast_loop(
    settings: &WeatherSettings,
    registry: Arc<SensorStateRegistry>,
) -> anyhow::Result<Option<ForecastLoop>> {
    let Some(coordinates) = settings.coordinates() else {
        error!("Latitude or longitude not set in config; weather sensors disabled");
        return Ok(None);
    };

    let client = YrClient::new(settings.api_url.clone(), coordinates)?;
    let sensors = settings
        .monitored_conditions
        .iter()
        .map(|sensor_type| WeatherSensor::new(settings.name.clone(), *sensor_type))
        .collect();
    let refresher = ForecastRefresher::new(
        Arc::new(client),
        ForecastSelector::new(settings.forecast),
        sensors,
        registry,
    );

    Ok(Some(ForecastLoop::spawn(refresher, HourlySchedule::random())))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Hearth HTTP Server");

    let config = AppConfig::from_default_location()?;

    let store = Arc::new(JsonFileStore::new(config.zwave.device_config_path.clone()));
    info!(path = %store.path().display(), "Device config store ready");

    let registry = Arc::new(SensorStateRegistry::new());
    let mut state = AppState::new(store).with_sensors(registry.clone());

    if let Some(snapshot) = &config.zwave.network_snapshot {
        let network =
            SnapshotNetwork::load(snapshot, config.zwave.network_config_path.clone()).await?;
        state = state.with_network(Arc::new(network));
    }

    let forecast = start_forecast_loop(&config.weather, registry)?;

    let app = create_router(state);

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    if let Some(forecast) = forecast {
        forecast.shutdown().await;
    }

    Ok(())
}
