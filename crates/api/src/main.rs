//! Kavenegar SMS Relay - Main Entry Point

use alerting::describe_metrics;
use anyhow::Context;
use api::{init_logging, run_server, AppConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("config error")?;
    init_logging(config.log_format).context("failed to set tracing subscriber")?;

    info!("=== kavenegar-sms v{} ===", env!("CARGO_PKG_VERSION"));

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;
    describe_metrics();

    run_server(config, Some(metrics)).await?;

    Ok(())
}
