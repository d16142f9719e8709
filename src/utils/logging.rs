//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the EventBoard application.

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration.
///
/// The returned guard must stay alive for the duration of the process,
/// otherwise buffered file output is lost.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "eventboard.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event lifecycle actions with structured data
pub fn log_event_action(event_id: i64, action: &str, user_id: Option<i64>) {
    info!(
        event_id = event_id,
        action = action,
        user_id = user_id,
        "Event action performed"
    );
}

/// Log participation request actions
pub fn log_request_action(request_id: i64, event_id: i64, action: &str, user_id: i64) {
    info!(
        request_id = request_id,
        event_id = event_id,
        action = action,
        user_id = user_id,
        "Participation request action performed"
    );
}

/// Log admin moderation actions
pub fn log_admin_action(action: &str, target: Option<&str>) {
    warn!(
        action = action,
        target = target,
        "Admin action performed"
    );
}
