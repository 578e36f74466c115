use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use skybar_agent::{PipelineCoordinator, TextRenderer};
use skybar_weather::{Location, NominatimGeocoder, OpenMeteoProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    skybar_core::init()?;

    let (config, _validation) =
        skybar_core::Config::load_validated().context("Failed to load configuration")?;

    let provider = Arc::new(
        OpenMeteoProvider::new(config.weather.temperature_unit, config.weather.forecast_days)
            .context("Failed to build the weather provider")?,
    );
    let geocoder =
        Arc::new(NominatimGeocoder::new().context("Failed to build the reverse geocoder")?);

    let (agent, task) = PipelineCoordinator::spawn(
        provider,
        geocoder,
        Box::new(TextRenderer::new()),
        config.location.distance_filter_meters,
    );

    tracing::info!("Skybar agent started");

    // Give the runtime a beat before seeding the first position; after
    // that the hourly schedule keeps the pipeline alive
    tokio::time::sleep(Duration::from_secs(1)).await;
    agent.submit_location(Location::new(
        config.location.latitude,
        config.location.longitude,
    ));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    tracing::info!("Shutting down");
    task.abort();

    Ok(())
}
