use anyhow::Result;
use tokio::signal;

/// Resolves on the first of Ctrl+C or SIGTERM and reports which one arrived.
///
/// # Errors
/// Fails when a signal handler cannot be installed.
pub async fn wait_for_shutdown() -> Result<&'static str> {
    let name = tokio::select! {
        res = signal::ctrl_c() => res.map(|()| "SIGINT")?,
        res = sigterm() => res?,
    };
    tracing::info!(signal = name, "shutdown requested; draining in-flight requests");
    Ok(name)
}

#[cfg(unix)]
async fn sigterm() -> Result<&'static str> {
    signal::unix::signal(signal::unix::SignalKind::terminate())?
        .recv()
        .await;
    Ok("SIGTERM")
}

#[cfg(not(unix))]
async fn sigterm() -> Result<&'static str> {
    std::future::pending().await
}
