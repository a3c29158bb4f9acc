use crate::config::LiteralExemptions;
use crate::error::LiteralViolation;
use crate::frontend::{unquote, walk_source_file, CompositeLit, ImportSpec, SourceFile, TypeExpr, Visitor};
use crate::oracle::StandardLibrary;
use std::collections::HashMap;

/// Flags positional composite literals of standard-library types
///
/// Tracks the local name of every standard import in the file (the explicit
/// alias, otherwise the last path component; dot imports are not tracked) and
/// checks each `alias.Type{...}` literal against it. Violations accumulate.
pub struct LiteralChecker<'a> {
    file: &'a str,
    stdlib: &'a dyn StandardLibrary,
    exemptions: &'a LiteralExemptions,
    aliases: HashMap<String, String>,
    violations: Vec<LiteralViolation>,
}

impl<'a> LiteralChecker<'a> {
    pub fn new(
        file: &'a str,
        stdlib: &'a dyn StandardLibrary,
        exemptions: &'a LiteralExemptions,
    ) -> Self {
        Self {
            file,
            stdlib,
            exemptions,
            aliases: HashMap::new(),
            violations: Vec::new(),
        }
    }

    pub fn into_violations(self) -> Vec<LiteralViolation> {
        self.violations
    }
}

impl Visitor for LiteralChecker<'_> {
    fn visit_import(&mut self, spec: &ImportSpec) {
        let Some(path) = unquote(&spec.path_literal) else {
            return;
        };
        if !self.stdlib.is_standard(&path) {
            return;
        }
        let local = match spec.name.as_deref() {
            Some(".") => return,
            Some(name) => name.to_string(),
            None => path.rsplit('/').next().unwrap_or(&path).to_string(),
        };
        self.aliases.insert(local, path);
    }

    fn visit_composite_lit(&mut self, lit: &CompositeLit) {
        let TypeExpr::Selector { package, name } = &lit.ty else {
            return;
        };
        let Some(import_path) = self.aliases.get(package) else {
            return;
        };
        if self.exemptions.contains(import_path, name) || lit.all_keyed() {
            return;
        }
        self.violations.push(LiteralViolation {
            file: self.file.to_string(),
            position: lit.position,
            import_path: import_path.clone(),
            type_name: name.clone(),
        });
    }
}

/// Every untagged standard-library literal in `file`, in source order
pub fn check_literals(
    file: &SourceFile,
    stdlib: &dyn StandardLibrary,
    exemptions: &LiteralExemptions,
) -> Vec<LiteralViolation> {
    let mut checker = LiteralChecker::new(&file.name, stdlib, exemptions);
    walk_source_file(&mut checker, file);
    checker.into_violations()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{Frontend, GoFrontend, Position};
    use crate::oracle::StaticStdlib;

    fn check(src: &str, exemptions: &LiteralExemptions) -> Vec<LiteralViolation> {
        let file = GoFrontend.parse("app/a.go", src).unwrap();
        let stdlib = StaticStdlib::new(["net/http", "image", "appengine", "sync"]);
        check_literals(&file, &stdlib, exemptions)
    }

    #[test]
    fn test_positional_std_literal_flagged() {
        let violations = check(
            r#"package app

import "net/http"

var c = http.Cookie{"name", "value"}
var ok = http.Cookie{Name: "name", Value: "value"}
"#,
            &LiteralExemptions::empty(),
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].import_path, "net/http");
        assert_eq!(violations[0].type_name, "Cookie");
        assert_eq!(violations[0].position, Position::new(5, 9));
        assert_eq!(violations[0].file, "app/a.go");
    }

    #[test]
    fn test_all_violations_collected() {
        let violations = check(
            r#"package app

import (
	h "net/http"
	"image"
)

func f() {
	_ = h.Cookie{"a"}
	_ = []image.Point{image.Point{1, 2}, {3, 4}}
}
"#,
            &LiteralExemptions::empty(),
        );
        let found: Vec<String> = violations
            .iter()
            .map(|v| format!("{}.{}@{}", v.import_path, v.type_name, v.position.line))
            .collect();
        assert_eq!(found, vec!["net/http.Cookie@9", "image.Point@10"]);
    }

    #[test]
    fn test_non_std_and_dot_imports_ignored() {
        let violations = check(
            r#"package app

import (
	"example.com/geo"
	. "image"
	local "app/util"
)

var a = geo.Point{1, 2}
var b = Point{1, 2}
var c = local.Pair{1, 2}
var d = image.Point{1, 2}
"#,
            &LiteralExemptions::empty(),
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_exemptions() {
        let src = r#"package app

import "appengine"

var e = appengine.MultiError{nil, nil}
"#;
        assert!(check(src, &LiteralExemptions::with_defaults()).is_empty());
        assert_eq!(check(src, &LiteralExemptions::empty()).len(), 1);
    }

    #[test]
    fn test_keyed_literal_never_flagged() {
        let mut exemptions = LiteralExemptions::empty();
        exemptions.insert("sync.Mutex");
        let src = "package app\nimport \"sync\"\nvar m = sync.Mutex{}\nvar w = sync.WaitGroup{}\n";
        assert!(check(src, &exemptions).is_empty());
        assert!(check(src, &LiteralExemptions::empty()).is_empty());
    }
}
