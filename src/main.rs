use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use streamx_alert::config;
use streamx_alert::models::{DispatchReport, DispatchStatus, StateChangeEvent};
use streamx_alert::services::AlertDispatcher;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    if config.sender.is_none() {
        log::warn!("SMTP_HOST not set, email alerts are disabled");
    }

    log::info!(
        "Starting StreamX alert dispatcher (cool-down {:?})",
        config.alert.cooldown
    );

    let dispatcher = AlertDispatcher::builder(config.alert)
        .sender(config.sender)
        .build()
        .map_err(|e| {
            log::error!("Dispatcher setup error: {}", e);
            std::io::Error::other(e.to_string())
        })?;
    let dispatcher = Arc::new(dispatcher);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("Shutdown signal received, finishing in-flight alerts...");
                break;
            }
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                if line.trim().is_empty() {
                    continue;
                }

                let event: StateChangeEvent = match serde_json::from_str(&line) {
                    Ok(event) => event,
                    Err(e) => {
                        log::warn!("Skipping malformed event line: {}", e);
                        continue;
                    }
                };

                let dispatcher = dispatcher.clone();
                in_flight.spawn(async move {
                    match dispatcher.dispatch_now(&event).await {
                        Ok(report) => log_report(&report),
                        Err(e) => log::error!("Alert dispatch aborted: {}", e),
                    }
                });
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    log::error!("Alert task panicked: {}", e);
                }
            }
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            log::error!("Alert task panicked: {}", e);
        }
    }

    log::info!("Alert dispatcher stopped");
    Ok(())
}

fn log_report(report: &DispatchReport) {
    if report.status != DispatchStatus::Attempted {
        return;
    }

    log::info!(
        "Alert for entity_id={} done: {} sent, {} failed, throttle {:?}",
        report.entity_id,
        report.sent_count(),
        report.failed_count(),
        report.throttle
    );
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                // Wait forever if signal handler fails
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
