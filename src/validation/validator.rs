use crate::validation::rules::{
    CharsetRule, ForbiddenPathRule, ImportPathRule, MaxLengthRule, NonEmptyRule, RelativePathRule,
};
use anyhow::Result;

/// Runs every import-path rule, failing on the first one violated
pub struct ImportValidator {
    rules: Vec<Box<dyn ImportPathRule>>,
}

impl ImportValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Box<dyn ImportPathRule>>) -> Self {
        Self { rules }
    }

    pub fn validate(&self, path: &str) -> Result<()> {
        for rule in &self.rules {
            if let Err(e) = rule.validate(path) {
                anyhow::bail!("[{}] {}", rule.name(), e);
            }
        }
        Ok(())
    }
}

impl Default for ImportValidator {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(NonEmptyRule),
                Box::new(MaxLengthRule),
                Box::new(RelativePathRule),
                Box::new(CharsetRule),
                Box::new(ForbiddenPathRule),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_accepts_legal_paths() {
        let validator = ImportValidator::new();
        assert!(validator.validate("fmt").is_ok());
        assert!(validator.validate("github.com/user/repo/v2").is_ok());
    }

    #[test]
    fn test_validator_reports_first_failing_rule() {
        let validator = ImportValidator::new();

        let err = validator.validate("").unwrap_err();
        assert_eq!(err.to_string(), "[NonEmpty] Import path cannot be empty");

        let err = validator.validate("/abs/../x").unwrap_err();
        assert!(err.to_string().starts_with("[RelativePath]"));

        let err = validator.validate("unsafe").unwrap_err();
        assert!(err.to_string().starts_with("[ForbiddenPath]"));
    }

    #[test]
    fn test_custom_rules() {
        struct NoVendor;
        impl ImportPathRule for NoVendor {
            fn name(&self) -> &'static str {
                "NoVendor"
            }
            fn validate(&self, path: &str) -> Result<()> {
                if path.starts_with("vendor/") {
                    anyhow::bail!("vendored import");
                }
                Ok(())
            }
        }

        let validator = ImportValidator::with_rules(vec![Box::new(NoVendor)]);
        assert!(validator.validate("unsafe").is_ok());
        assert!(validator.validate("vendor/x").is_err());
    }
}
