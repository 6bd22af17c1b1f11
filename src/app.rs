use tracing_subscriber::EnvFilter;

use crate::domain::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::GatewayConfig;
use crate::interfaces::http::start_server;

pub async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = GatewayConfig::load()?;
    let state = bootstrap::setup(&config)?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        prediction_service = %config.prediction_service_url,
        "Starting spectral gateway"
    );

    start_server(state, &config.host, config.port)?.await?;

    tracing::info!("Spectral gateway stopped");
    Ok(())
}
