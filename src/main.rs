use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use xds_core::MockServerConfig;

/// Main entry point for the XDS mock registry
///
/// Serves the ITI-41 Provide and Register endpoint over HTTP.
///
/// # Environment Variables
/// - `XDS_REST_ADDR`: listen address (default: "0.0.0.0:3000")
/// - `XDS_VALIDATION_MODE`: `lenient` (default) or `strict`
/// - `XDS_TRANSACTION_LOG_DIR`: directory for daily transaction logs (optional)
/// - `XDS_DOCUMENT_STORE_DIR`: directory for received documents (optional)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, binding or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("xds=info".parse()?).add_directive("api_rest=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MockServerConfig::from_env()?;
    let rest_addr = config.rest_addr().to_owned();

    tracing::info!("++ Starting XDS mock registry on {}", rest_addr);
    tracing::info!("-- Validation mode: {:?}", config.validation_mode());

    let app = router(AppState::from_config(&config)?);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
