//! Path matching for ignore-list rules.
//!
//! A rule is one of two kinds:
//!
//! - **Directory prefix**: `dir/*` matches `dir` itself and everything
//!   beneath it, at any depth.
//! - **Glob**: matched against the whole relative path. `*` matches any run
//!   of characters *including* `/`, `?` matches one character, and `[abc]`,
//!   `[a-z]`, `[!abc]` are character classes. `**` is the same as `*`.
//!   There is no brace expansion and no backslash escaping.
//!
//! Leading and trailing `/` are trimmed from every rule, so `/vendor/*/`
//! and `vendor/*` are the same rule. Matching is case-sensitive.
//!
//! A rule that is not a well-formed glob (for example `[unclosed`) is
//! compared literally against the path.

use glob::MatchOptions;

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A single compiled ignore rule.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    kind: PatternKind,
}

#[derive(Debug, Clone)]
enum PatternKind {
    DirPrefix(String),
    Glob(glob::Pattern),
    Literal(String),
}

impl Pattern {
    /// Compile a rule as written in the ignore file.
    pub fn new(rule: &str) -> Self {
        let trimmed = rule.trim_matches('/');

        let kind = if let Some(dir) = trimmed.strip_suffix("/*") {
            PatternKind::DirPrefix(dir.to_owned())
        } else {
            let collapsed = collapse_stars(trimmed);
            match glob::Pattern::new(&collapsed) {
                Ok(pattern) => PatternKind::Glob(pattern),
                Err(e) => {
                    tracing::debug!(rule, error = %e, "rule is not a valid glob, matching literally");
                    PatternKind::Literal(trimmed.to_owned())
                }
            }
        };

        Self {
            raw: rule.to_owned(),
            kind,
        }
    }

    /// The rule exactly as it was given to [`Pattern::new`].
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Test a relative path against this rule.
    ///
    /// A leading `/` on `path` is ignored.
    pub fn matches(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        match &self.kind {
            PatternKind::DirPrefix(dir) => {
                path == dir
                    || path
                        .strip_prefix(dir.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            PatternKind::Glob(pattern) => pattern.matches_with(path, GLOB_OPTIONS),
            PatternKind::Literal(literal) => path == literal,
        }
    }
}

/// Returns `true` if any rule in `patterns` matches `path`.
///
/// Evaluation stops at the first match. An empty list never matches.
pub fn matches(path: &str, patterns: &[Pattern]) -> bool {
    patterns.iter().any(|pattern| pattern.matches(path))
}

/// `**` carries no recursive meaning here since `*` already crosses `/`.
fn collapse_stars(rule: &str) -> String {
    let mut out = String::with_capacity(rule.len());
    let mut prev_star = false;
    for c in rule.chars() {
        if c == '*' && prev_star {
            continue;
        }
        prev_star = c == '*';
        out.push(c);
    }
    out
}
