//! Demo workload: a couple of plain calls and a few scoped "requests".

use std::time::{Duration, Instant};

use logline::{context, LogResult, Logger};

pub const GREETING: &str = "Hello from the logline demo!";

pub fn hello_world(logger: &Logger) -> LogResult<String> {
    logger.info("hello_world function called").emit()?;
    let result = GREETING.to_string();
    logger
        .info("hello_world function returning result")
        .field("result", &result)
        .emit()?;
    Ok(result)
}

pub fn get_version(logger: &Logger) -> LogResult<&'static str> {
    logger.info("get_version function called").emit()?;
    let version = env!("CARGO_PKG_VERSION");
    logger.info("Version retrieved").field("version", version).emit()?;
    Ok(version)
}

/// Simulated request handler. Call it inside `context::scope` so the
/// correlation id it binds stays with this request.
pub async fn handle_request(logger: Logger, request_no: u32) -> LogResult<u16> {
    let started = Instant::now();
    context::bind([
        ("correlation_id", format!("req-{:04}-{}", request_no, std::process::id())),
        ("user_id", format!("user-{}", request_no)),
    ]);

    logger.debug("Request received").emit()?;
    tokio::time::sleep(Duration::from_millis(10 * u64::from(request_no))).await;

    let status_code: u16 = if request_no % 3 == 0 { 503 } else { 200 };
    let duration_ms = started.elapsed().as_millis() as u64;

    if status_code >= 500 {
        logger
            .error("Upstream unavailable")
            .field("status_code", status_code)
            .field("duration_ms", duration_ms)
            .field("error", "connection refused")
            .emit()?;
    } else {
        logger
            .info("Request completed")
            .field("status_code", status_code)
            .field("duration_ms", duration_ms)
            .field("response_size_bytes", 512 * request_no)
            .emit()?;
    }
    Ok(status_code)
}
