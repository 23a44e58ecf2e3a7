//! Command implementations

pub mod enter;
pub mod list;
pub mod run;

/// Resolves on the first Ctrl-C.
///
/// If the signal handler cannot be installed this never resolves, so the
/// session is simply not interruptible.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
