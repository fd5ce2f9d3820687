use halma::prelude::*;
use halma::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        code_length = config.registry.code_length,
        "starting halma server"
    );

    let server = HalmaServerBuilder::from_config(config).build().await?;
    let registry = server.registry();

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
            let _ = registry.shutdown().await;
        }
    }

    Ok(())
}
