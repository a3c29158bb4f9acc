//! Pipeline context for managing collaborators

use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::config::BuilderConfig;
use crate::error::BuildError;
use crate::frontend::{BuildContext, Frontend, GoFrontend};
use crate::fs::{FileSystem, RealFileSystem};
use crate::oracle::{
    CachedStdlib, GopathWorkspace, GorootStdlib, RandomSuffix, StandardLibrary, StaticStdlib,
    SuffixSource, Workspace,
};
use crate::validation::ImportValidator;

/// Collaborators and settings shared by every phase of a build
///
/// Holds nothing build-specific; the same context can drive many builds, and
/// the standard library memo inside it is shared between them.
pub struct PipelineContext {
    pub file_system: Arc<dyn FileSystem>,

    pub frontend: Arc<dyn Frontend>,

    pub stdlib: Arc<dyn StandardLibrary>,

    /// `None` disables external resolution
    pub workspace: Option<Arc<dyn Workspace>>,

    /// Numbers the synthetic top-level import path
    pub suffix_source: Arc<dyn SuffixSource>,

    pub import_validator: Arc<ImportValidator>,

    pub config: BuilderConfig,

    /// Platform and tags deciding which files take part
    pub build_context: Arc<BuildContext>,

    /// Compiled `config.exclude_files`
    pub exclusion: Option<Regex>,
}

impl PipelineContext {
    /// Create a context over explicit collaborators
    ///
    /// Validates `config`. A configured workspace root becomes a
    /// [`GopathWorkspace`] read through `file_system` and `frontend`.
    pub fn new(
        file_system: Arc<dyn FileSystem>,
        frontend: Arc<dyn Frontend>,
        stdlib: Arc<dyn StandardLibrary>,
        config: BuilderConfig,
    ) -> Result<Self, BuildError> {
        config.validate()?;
        let exclusion = config.exclusion_regex()?;
        let build_context = Arc::new(BuildContext::from_config(&config));

        let workspace = config.workspace_root.as_ref().map(|root| {
            debug!(root = %root.display(), "External resolution enabled");
            Arc::new(GopathWorkspace::new(
                root,
                Arc::clone(&file_system),
                Arc::clone(&frontend),
                Arc::clone(&build_context),
            )) as Arc<dyn Workspace>
        });

        Ok(Self {
            file_system,
            frontend,
            stdlib,
            workspace,
            suffix_source: Arc::new(RandomSuffix),
            import_validator: Arc::new(ImportValidator::new()),
            config,
            build_context,
            exclusion,
        })
    }

    /// Create a context on the real file system with the default frontend
    ///
    /// The standard library comes from `stdlib_root` when set, otherwise from
    /// the built-in package list; either way lookups are memoized.
    pub fn from_config(config: BuilderConfig) -> Result<Self, BuildError> {
        let file_system: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());

        let stdlib: Arc<dyn StandardLibrary> = match &config.stdlib_root {
            Some(root) => Arc::new(CachedStdlib::new(GorootStdlib::new(
                root.clone(),
                Arc::clone(&file_system),
            ))),
            None => Arc::new(CachedStdlib::new(StaticStdlib::go_defaults())),
        };

        Self::new(file_system, Arc::new(GoFrontend::new()), stdlib, config)
    }

    pub fn with_workspace(mut self, workspace: Option<Arc<dyn Workspace>>) -> Self {
        self.workspace = workspace;
        self
    }

    pub fn with_suffix_source(mut self, suffix_source: Arc<dyn SuffixSource>) -> Self {
        self.suffix_source = suffix_source;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::oracle::FixedSuffix;

    fn mock_context(config: BuilderConfig) -> Result<PipelineContext, BuildError> {
        PipelineContext::new(
            Arc::new(MockFileSystem::new()),
            Arc::new(GoFrontend),
            Arc::new(StaticStdlib::go_defaults()),
            config,
        )
    }

    #[test]
    fn test_context_without_workspace() {
        let ctx = mock_context(BuilderConfig::empty()).unwrap();
        assert!(ctx.workspace.is_none());
        assert!(ctx.exclusion.is_none());
        assert!(ctx.stdlib.is_standard("fmt"));
        assert!(ctx.build_context.matches_tag("appengine"));
    }

    #[test]
    fn test_context_carries_target_platform() {
        let mut config = BuilderConfig::empty();
        config.goos = "windows".into();
        config.goarch = "386".into();
        config.build_tags.insert("purego".into());

        let ctx = mock_context(config).unwrap();
        assert_eq!(ctx.build_context.goos(), "windows");
        assert!(ctx.build_context.matches_file_name("term_windows_386.go"));
        assert!(!ctx.build_context.matches_file_name("term_linux.go"));
        assert!(ctx.build_context.matches_tag("purego"));
    }

    #[test]
    fn test_context_with_workspace_and_exclusion() {
        let mut config = BuilderConfig::empty();
        config.workspace_root = Some("/mock/gopath".into());
        config.exclude_files = Some("_gen\\.go$".into());

        let ctx = mock_context(config).unwrap();
        assert!(ctx.workspace.is_some());
        assert!(ctx.exclusion.as_ref().unwrap().is_match("lib/x_gen.go"));
    }

    #[test]
    fn test_context_rejects_invalid_config() {
        let mut config = BuilderConfig::empty();
        config.exclude_files = Some("[".into());
        let err = mock_context(config).err().unwrap();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_builder_overrides() {
        let ctx = mock_context(BuilderConfig::empty())
            .unwrap()
            .with_suffix_source(Arc::new(FixedSuffix::new(12)));
        assert_eq!(ctx.suffix_source.next_suffix(), 12);
    }
}
