mod boot;
mod greeting;

use anyhow::{Context, Result};
use logline::context;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let pipeline = logline::global().clone();
    boot::init_tracing(pipeline.clone());

    let mode = boot::output_mode_from_env()?;
    let config = pipeline.configure(mode);
    config
        .validate()
        .context("Logging configuration validation failed")?;

    info!(
        output_mode = mode.as_str(),
        min_severity = %config.min_severity,
        "Starting logline demo v{}",
        env!("CARGO_PKG_VERSION")
    );

    let logger = logline::get_logger("app.demo.main");
    logger.info("Application starting").emit()?;

    let greeting = greeting::hello_world(&logger)?;
    logger.info("Received greeting").field("greeting", &greeting).emit()?;

    let version = greeting::get_version(&logger)?;
    logger
        .info("Application version check complete")
        .field("version", version)
        .emit()?;

    // Concurrent requests, each in its own context scope
    let handles: Vec<_> = (1..=3)
        .map(|n| {
            let logger = logline::get_logger("app.demo.requests");
            tokio::spawn(context::scope(greeting::handle_request(logger, n)))
        })
        .collect();
    for handle in handles {
        handle.await.context("Request task failed")??;
    }

    let stats = pipeline.stats();
    logger
        .info("Application finished successfully")
        .field("emitted", stats.emitted)
        .field("filtered", stats.filtered)
        .emit()?;
    Ok(())
}
