use anyhow::{Context, Result};
use std::sync::Arc;
use weather_dashboard::api::AppState;
use weather_dashboard::{
    DashboardConfig, DashboardSession, OpenMeteoClient, StaticGeoProvider, logging, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = DashboardConfig::load()?;
    logging::init(&config.logging)?;

    tracing::info!(
        "Starting weather dashboard v{} (forecast API: {})",
        weather_dashboard::VERSION,
        config.weather.base_url
    );

    let geo = StaticGeoProvider::load(config.locations.dataset_path.as_deref())
        .context("Failed to load location dataset")?;
    let client = OpenMeteoClient::new(&config.weather)?;

    let session = Arc::new(DashboardSession::new(Arc::new(client)));
    let state = AppState::new(session, Arc::new(geo));

    web::run(&config, state).await
}
