use super::context::PipelineContext;
use super::phase_trait::{BuildPhase, BuildState};
use super::phases::{AssemblePhase, BuildOrderPhase, ExternalPhase, ExtractPhase, GraphPhase};
use crate::error::BuildError;
use crate::model::Application;
use crate::progress::{ProgressEvent, ProgressHandler};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runs the build phases in order over one [`BuildState`]
///
/// The first failing phase aborts the build; no partial application is
/// returned.
pub struct PipelineOrchestrator {
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl PipelineOrchestrator {
    pub fn new(progress_handler: Option<Arc<dyn ProgressHandler>>) -> Self {
        Self { progress_handler }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }

    pub fn execute(
        &self,
        context: &PipelineContext,
        base_dir: &Path,
        filenames: &[String],
    ) -> Result<Application, BuildError> {
        let start = Instant::now();
        info!(
            "Starting build of {} file(s) under {}",
            filenames.len(),
            base_dir.display()
        );
        self.emit(ProgressEvent::Started {
            base_dir: base_dir.display().to_string(),
            files: filenames.len(),
        });

        let mut state = BuildState::new(base_dir, filenames.to_vec());

        let phases: Vec<Box<dyn BuildPhase>> = vec![
            Box::new(ExtractPhase),
            Box::new(AssemblePhase),
            Box::new(ExternalPhase),
            Box::new(GraphPhase),
            Box::new(BuildOrderPhase),
        ];

        for phase in phases {
            let phase_name = phase.name();
            self.emit(ProgressEvent::PhaseStarted {
                phase: phase_name.to_string(),
            });

            let phase_start = Instant::now();
            if let Err(e) = phase.execute(context, &mut state) {
                self.emit(ProgressEvent::Failed {
                    phase: phase_name.to_string(),
                    error: e.to_string(),
                });
                return Err(e);
            }

            self.emit(ProgressEvent::PhaseComplete {
                phase: phase_name.to_string(),
                duration: phase_start.elapsed(),
            });
            debug!("Phase {} complete", phase_name);
        }

        let app = state.app;
        let external_packages = app.packages().filter(|p| p.is_external()).count();
        info!(
            "Build complete: {} package(s), {} external",
            app.len(),
            external_packages
        );
        self.emit(ProgressEvent::Completed {
            packages: app.len(),
            external_packages,
            total_time: start.elapsed(),
        });

        Ok(app)
    }
}
