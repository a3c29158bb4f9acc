use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_IMPORT_PATH_LEN: usize = 1024;

/// Import paths that would let a package bypass the language's safety boundary
pub const FORBIDDEN_IMPORT_PATHS: &[&str] = &["syscall", "unsafe"];

pub trait ImportPathRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, path: &str) -> Result<()>;
}

pub struct NonEmptyRule;

impl ImportPathRule for NonEmptyRule {
    fn name(&self) -> &'static str {
        "NonEmpty"
    }

    fn validate(&self, path: &str) -> Result<()> {
        if path.is_empty() {
            anyhow::bail!("Import path cannot be empty");
        }
        Ok(())
    }
}

pub struct MaxLengthRule;

impl ImportPathRule for MaxLengthRule {
    fn name(&self) -> &'static str {
        "MaxLength"
    }

    fn validate(&self, path: &str) -> Result<()> {
        if path.len() > MAX_IMPORT_PATH_LEN {
            anyhow::bail!(
                "Import path is {} bytes, limit is {}",
                path.len(),
                MAX_IMPORT_PATH_LEN
            );
        }
        Ok(())
    }
}

pub struct RelativePathRule;

impl ImportPathRule for RelativePathRule {
    fn name(&self) -> &'static str {
        "RelativePath"
    }

    fn validate(&self, path: &str) -> Result<()> {
        if path.starts_with('/') || std::path::Path::new(path).is_absolute() {
            anyhow::bail!("Import path cannot be absolute");
        }
        if path.contains("..") {
            anyhow::bail!("Import path cannot contain '..'");
        }
        Ok(())
    }
}

pub struct CharsetRule;

impl CharsetRule {
    fn pattern() -> &'static Regex {
        static LEGAL: OnceLock<Regex> = OnceLock::new();
        LEGAL.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_\-./~]+$").expect("import path pattern"))
    }
}

impl ImportPathRule for CharsetRule {
    fn name(&self) -> &'static str {
        "Charset"
    }

    fn validate(&self, path: &str) -> Result<()> {
        if !Self::pattern().is_match(path) {
            anyhow::bail!("Import path may only contain letters, digits and _-./~");
        }
        Ok(())
    }
}

pub struct ForbiddenPathRule;

impl ImportPathRule for ForbiddenPathRule {
    fn name(&self) -> &'static str {
        "ForbiddenPath"
    }

    fn validate(&self, path: &str) -> Result<()> {
        if FORBIDDEN_IMPORT_PATHS.contains(&path) {
            anyhow::bail!("Import of {:?} is not allowed", path);
        }
        Ok(())
    }
}
