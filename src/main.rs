use clap::Parser;
use std::sync::Arc;
use tracing::info;
use visual_capture::{setup_logging, Cli, Config, Pipeline, SystemResolver};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    setup_logging(args.verbose)?;

    info!("Starting visual-capture v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args).await?;

    let pipeline = Pipeline::new(config, Arc::new(SystemResolver::new()))?;

    // In-matrix failures are logged and counted, never surfaced as an exit
    // code; only configuration and provisioning errors reach here.
    let summary = pipeline.run().await?;

    info!(
        "visual-capture finished: {} screenshots, {} recordings",
        summary.screenshots_captured, summary.recordings_completed
    );
    Ok(())
}

async fn load_config(args: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if let Some(config_path) = &args.config {
        let config_content = tokio::fs::read_to_string(config_path).await?;
        serde_json::from_str(&config_content)?
    } else {
        Config::default()
    };

    args.apply_overrides(&mut config);
    config.validate()?;

    info!("Capture target: {}", config.sitemap_url);
    info!(
        "Matrix: {} browsers x {} device categories",
        config.browsers.len(),
        config.devices.len()
    );
    info!("Recording duration: {:?}", config.recording.duration);

    Ok(config)
}
