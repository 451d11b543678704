use monitor_logging::{monitor_info, monitor_warn};
use tokio::signal;

/// Resolves on Ctrl+C, or SIGTERM on unix.
///
/// A handler that cannot be installed never fires; the other still does.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            monitor_warn!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                monitor_warn!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => monitor_info!("received Ctrl+C"),
        _ = terminate => monitor_info!("received SIGTERM"),
    }
}
