//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while a build runs
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Build started
    Started { base_dir: String, files: usize },

    /// A pipeline phase started
    PhaseStarted { phase: String },

    /// A pipeline phase completed
    PhaseComplete { phase: String, duration: Duration },

    /// Build completed with a full order
    Completed {
        packages: usize,
        external_packages: usize,
        total_time: Duration,
    },

    /// Build failed
    Failed { phase: String, error: String },
}

/// Trait for handling progress events during a build
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {
        // Intentionally empty
    }
}
