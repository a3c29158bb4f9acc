use super::context::PipelineContext;
use crate::error::BuildError;
use crate::model::{Application, File};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Mutable state threaded through the phases of one build
#[derive(Debug)]
pub struct BuildState {
    pub base_dir: PathBuf,
    pub filenames: Vec<String>,
    /// Extracted files keyed by slash-separated directory (`.` for top level)
    pub dir_files: BTreeMap<String, Vec<File>>,
    pub app: Application,
}

impl BuildState {
    pub fn new(base_dir: impl Into<PathBuf>, filenames: Vec<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            filenames,
            dir_files: BTreeMap::new(),
            app: Application::new(),
        }
    }
}

pub trait BuildPhase: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute(&self, context: &PipelineContext, state: &mut BuildState) -> Result<(), BuildError>;
}
