//! Build constraint evaluation
//!
//! A file takes part in a build only when its name and its constraint lines
//! match the [`BuildContext`]. Names follow the `_GOOS`, `_GOARCH` and
//! `_GOOS_GOARCH` suffix rule. Constraint lines are either one `//go:build`
//! boolean expression or any number of `// +build` lines, which must all hold.

use crate::config::BuilderConfig;
use std::collections::BTreeSet;
use thiserror::Error;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// Newest `go1.N` release tag the context satisfies
const LATEST_RELEASE: u32 = 22;

const COMPILER: &str = "gc";

pub const DEFAULT_BUILD_TAG: &str = "appengine";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parsing {line:?}: {message}")]
pub struct ConstraintError {
    pub line: String,
    pub message: String,
}

pub fn is_known_os(goos: &str) -> bool {
    KNOWN_OS.contains(&goos)
}

pub fn is_known_arch(goarch: &str) -> bool {
    KNOWN_ARCH.contains(&goarch)
}

/// Tags may hold letters, digits, `_` and `.`
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty() && tag.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

/// GOOS name of the machine running the build
pub fn host_goos() -> String {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
    .to_string()
}

/// GOARCH name of the machine running the build
pub fn host_goarch() -> String {
    let little = cfg!(target_endian = "little");
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "wasm32" => "wasm",
        "powerpc" => "ppc",
        "powerpc64" if little => "ppc64le",
        "powerpc64" => "ppc64",
        "mips" if little => "mipsle",
        "mips64" if little => "mips64le",
        other => other,
    }
    .to_string()
}

/// Target platform and tags files are selected against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    goos: String,
    goarch: String,
    /// Build tags plus release tags
    tags: BTreeSet<String>,
}

impl BuildContext {
    pub fn new(
        goos: impl Into<String>,
        goarch: impl Into<String>,
        build_tags: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut tags: BTreeSet<String> = build_tags.into_iter().collect();
        tags.extend((1..=LATEST_RELEASE).map(|minor| format!("go1.{}", minor)));
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
            tags,
        }
    }

    /// Host platform with only the default build tag
    pub fn host() -> Self {
        Self::new(host_goos(), host_goarch(), [DEFAULT_BUILD_TAG.to_string()])
    }

    pub fn from_config(config: &BuilderConfig) -> Self {
        Self::new(
            config.goos.clone(),
            config.goarch.clone(),
            config.build_tags.iter().cloned(),
        )
    }

    pub fn goos(&self) -> &str {
        &self.goos
    }

    pub fn goarch(&self) -> &str {
        &self.goarch
    }

    pub fn matches_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch || tag == COMPILER {
            return true;
        }
        match (self.goos.as_str(), tag) {
            ("android", "linux") | ("illumos", "solaris") | ("ios", "darwin") => return true,
            (os, "unix") if UNIX_OS.contains(&os) => return true,
            _ => {}
        }
        self.tags.contains(tag)
    }

    /// Applies the `name_GOOS_GOARCH.go` suffix rule
    ///
    /// Only known platform names count, so `windows.go` or `x_foo.go`
    /// always match.
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = file_name.split_once('.').map_or(file_name, |(stem, _)| stem);
        let Some((_, suffix)) = stem.split_once('_') else {
            return true;
        };
        let mut parts: Vec<&str> = suffix.split('_').collect();
        if parts.last() == Some(&"test") {
            parts.pop();
        }

        match parts.as_slice() {
            [.., os, arch] if is_known_os(os) && is_known_arch(arch) => {
                self.matches_tag(os) && self.matches_tag(arch)
            }
            [.., last] if is_known_os(last) || is_known_arch(last) => self.matches_tag(last),
            _ => true,
        }
    }

    /// Evaluates the constraint lines found above a package clause
    ///
    /// A `//go:build` line takes precedence and `// +build` lines are then
    /// ignored. Lines whose prefix is not followed by a space are not
    /// constraints.
    pub fn matches_constraints(&self, lines: &[String]) -> Result<bool, ConstraintError> {
        let mut go_build = None;
        let mut plus_build = Vec::new();
        for line in lines {
            if let Some(expr) = constraint_body(line, "//go:build") {
                if go_build.replace((line, expr)).is_some() {
                    return Err(ConstraintError {
                        line: line.clone(),
                        message: "multiple //go:build comments".to_string(),
                    });
                }
            } else if let Some(expr) = constraint_body(line, "// +build") {
                plus_build.push((line, expr));
            }
        }

        if let Some((line, expr)) = go_build {
            return self.eval_expr(expr).map_err(|message| ConstraintError {
                line: line.clone(),
                message,
            });
        }

        let mut result = true;
        for (line, expr) in plus_build {
            let matched = self.eval_plus_build(expr).map_err(|message| ConstraintError {
                line: line.clone(),
                message,
            })?;
            result &= matched;
        }
        Ok(result)
    }

    fn eval_expr(&self, expr: &str) -> Result<bool, String> {
        let tokens = lex_expr(expr)?;
        if tokens.is_empty() {
            return Err("empty expression".to_string());
        }
        let mut parser = ExprParser {
            tokens,
            pos: 0,
            context: self,
        };
        let value = parser.or()?;
        match parser.tokens.get(parser.pos) {
            None => Ok(value),
            Some(token) => Err(format!("unexpected {}", token)),
        }
    }

    /// Space-separated options are alternatives, comma-separated terms
    /// within an option must all hold
    fn eval_plus_build(&self, expr: &str) -> Result<bool, String> {
        let mut any = false;
        let mut seen = false;
        for option in expr.split_whitespace() {
            seen = true;
            let mut all = true;
            for term in option.split(',') {
                let (negated, tag) = match term.strip_prefix('!') {
                    Some(rest) => (true, rest),
                    None => (false, term),
                };
                if !is_valid_tag(tag) {
                    return Err(format!("invalid term {:?}", term));
                }
                all &= self.matches_tag(tag) != negated;
            }
            any |= all;
        }
        Ok(any || !seen)
    }
}

fn constraint_body<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExprToken<'a> {
    Tag(&'a str),
    Not,
    And,
    Or,
    Open,
    Close,
}

impl std::fmt::Display for ExprToken<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprToken::Tag(tag) => write!(f, "tag {:?}", tag),
            ExprToken::Not => write!(f, "'!'"),
            ExprToken::And => write!(f, "'&&'"),
            ExprToken::Or => write!(f, "'||'"),
            ExprToken::Open => write!(f, "'('"),
            ExprToken::Close => write!(f, "')'"),
        }
    }
}

fn lex_expr(expr: &str) -> Result<Vec<ExprToken<'_>>, String> {
    let mut tokens = Vec::new();
    let mut rest = expr;
    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
            continue;
        }
        let (token, len) = match c {
            '!' => (ExprToken::Not, 1),
            '(' => (ExprToken::Open, 1),
            ')' => (ExprToken::Close, 1),
            '&' if rest.starts_with("&&") => (ExprToken::And, 2),
            '|' if rest.starts_with("||") => (ExprToken::Or, 2),
            c if c.is_alphanumeric() || c == '_' || c == '.' => {
                let len = rest
                    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                    .unwrap_or(rest.len());
                (ExprToken::Tag(&rest[..len]), len)
            }
            other => return Err(format!("invalid syntax at {:?}", other)),
        };
        tokens.push(token);
        rest = &rest[len..];
    }
    Ok(tokens)
}

/// `or := and ('||' and)*`, `and := not ('&&' not)*`,
/// `not := '!' not | '(' or ')' | tag`
struct ExprParser<'a, 'c> {
    tokens: Vec<ExprToken<'a>>,
    pos: usize,
    context: &'c BuildContext,
}

impl ExprParser<'_, '_> {
    fn peek_is(&self, token: &ExprToken<'_>) -> bool {
        self.tokens.get(self.pos) == Some(token)
    }

    fn or(&mut self) -> Result<bool, String> {
        let mut value = self.and()?;
        while self.peek_is(&ExprToken::Or) {
            self.pos += 1;
            let rhs = self.and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and(&mut self) -> Result<bool, String> {
        let mut value = self.not()?;
        while self.peek_is(&ExprToken::And) {
            self.pos += 1;
            let rhs = self.not()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn not(&mut self) -> Result<bool, String> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| "unexpected end of expression".to_string())?;
        self.pos += 1;
        match token {
            ExprToken::Not => {
                if self.peek_is(&ExprToken::Not) {
                    return Err("double negation not allowed".to_string());
                }
                Ok(!self.not()?)
            }
            ExprToken::Open => {
                let value = self.or()?;
                if !self.peek_is(&ExprToken::Close) {
                    return Err("missing ')'".to_string());
                }
                self.pos += 1;
                Ok(value)
            }
            ExprToken::Tag(tag) => Ok(self.context.matches_tag(tag)),
            other => Err(format!("unexpected {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn linux() -> BuildContext {
        BuildContext::new("linux", "amd64", ["appengine".to_string()])
    }

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[parameterized(
        plain = { "main.go", true },
        own_os = { "signal_linux.go", true },
        other_os = { "signal_windows.go", false },
        own_arch = { "asm_amd64.go", true },
        other_arch = { "asm_arm64.go", false },
        os_and_arch = { "sys_linux_amd64.go", true },
        os_other_arch = { "sys_linux_386.go", false },
        unknown_suffix = { "handler_admin.go", true },
        bare_os_name = { "windows.go", true },
        test_suffix = { "x_darwin_test.go", false },
    )]
    fn test_file_name_suffix(name: &str, expected: bool) {
        assert_eq!(linux().matches_file_name(name), expected);
    }

    #[parameterized(
        ignore = { "//go:build ignore", false },
        appengine = { "//go:build appengine", true },
        not_appengine = { "//go:build !appengine", false },
        or_with_os = { "//go:build ignore || linux", true },
        and_with_os = { "//go:build linux && !cgo", true },
        grouped = { "//go:build (darwin || windows) && amd64", false },
        unix = { "//go:build unix", true },
        compiler = { "//go:build gc && !gccgo", true },
        release = { "//go:build go1.18", true },
        future_release = { "//go:build go1.99", false },
    )]
    fn test_go_build_expressions(line: &str, expected: bool) {
        assert_eq!(linux().matches_constraints(&lines(&[line])).unwrap(), expected);
    }

    #[parameterized(
        ignore = { &["// +build ignore"], false },
        not_appengine = { &["// +build !appengine"], false },
        options_or = { &["// +build windows linux"], true },
        terms_and = { &["// +build linux,386"], false },
        lines_and = { &["// +build linux", "// +build !amd64"], false },
        no_lines = { &[], true },
    )]
    fn test_plus_build_lines(src: &[&str], expected: bool) {
        assert_eq!(linux().matches_constraints(&lines(src)).unwrap(), expected);
    }

    #[test]
    fn test_go_build_line_overrides_plus_build() {
        let src = lines(&["//go:build linux", "// +build ignore"]);
        assert!(linux().matches_constraints(&src).unwrap());
    }

    #[test]
    fn test_platform_aliases() {
        let android = BuildContext::new("android", "arm64", Vec::new());
        assert!(android.matches_tag("linux"));
        assert!(android.matches_file_name("fd_linux.go"));
        assert!(!android.matches_tag("appengine"));

        let windows = BuildContext::new("windows", "amd64", Vec::new());
        assert!(!windows.matches_tag("unix"));
    }

    #[test]
    fn test_lines_without_space_are_not_constraints() {
        let src = lines(&["//go:buildignore", "// +buildignore"]);
        assert!(linux().matches_constraints(&src).unwrap());
    }

    #[parameterized(
        dangling_or = { "//go:build linux ||" },
        single_amp = { "//go:build linux & amd64" },
        unclosed = { "//go:build (linux" },
        double_not = { "//go:build !!linux" },
        empty = { "//go:build" },
    )]
    fn test_malformed_expression(line: &str) {
        let err = linux().matches_constraints(&lines(&[line])).unwrap_err();
        assert_eq!(err.line, line);
    }

    #[test]
    fn test_multiple_go_build_lines_rejected() {
        let src = lines(&["//go:build linux", "//go:build amd64"]);
        let err = linux().matches_constraints(&src).unwrap_err();
        assert_eq!(err.message, "multiple //go:build comments");
    }

    #[test]
    fn test_host_names_are_known() {
        let host = BuildContext::host();
        assert!(host.matches_tag("appengine"));
        assert!(host.matches_tag(&host_goos()));
        assert!(is_valid_tag("go1.21"));
        assert!(!is_valid_tag("a-b"));
    }
}
