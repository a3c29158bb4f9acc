//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { base_dir, files } => {
                info!(base_dir = %base_dir, files, "Starting build");
            }
            ProgressEvent::PhaseStarted { phase } => {
                debug!(phase = %phase, "Starting phase");
            }
            ProgressEvent::PhaseComplete { phase, duration } => {
                info!(
                    phase = %phase,
                    duration_ms = duration.as_millis(),
                    "Phase complete"
                );
            }
            ProgressEvent::Completed {
                packages,
                external_packages,
                total_time,
            } => {
                info!(
                    packages,
                    external_packages,
                    total_time_ms = total_time.as_millis(),
                    "Build order complete"
                );
            }
            ProgressEvent::Failed { phase, error } => {
                warn!(phase = %phase, error = %error, "Build failed");
            }
        }
    }
}
