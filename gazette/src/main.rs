use anyhow::Result;
use clap::Parser as _;
use tracing_subscriber::EnvFilter;

use gazette::config::{IngestConfig, LogFormat};

fn init_tracing(format: LogFormat) {
    let subscriber = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );

    match format {
        LogFormat::Plain => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = IngestConfig::parse();
    init_tracing(config.log_format);

    tracing::debug!(?config, "Loaded configuration");

    let summary = config.pipeline()?.run().await?;

    if !summary.is_complete() {
        anyhow::bail!(
            "{} of {} records could not be indexed",
            summary.failed.len(),
            summary.total
        );
    }

    Ok(())
}
