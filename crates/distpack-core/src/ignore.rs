use std::path::Path;

use crate::patterns::{self, Pattern};

/// Exclude rules plus `!`-prefixed include overrides from an ignore file.
///
/// A path is pruned when it matches an exclude rule and no include rule.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    pub excludes: Vec<Pattern>,
    pub includes: Vec<Pattern>,
}

impl PatternSet {
    /// Load from an ignore file, or return an empty set if it does not exist.
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no ignore file, nothing will be pruned");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::IgnoreFileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let set = Self::parse(&content);
        tracing::debug!(
            path = %path.display(),
            excludes = set.excludes.len(),
            includes = set.includes.len(),
            "loaded ignore file"
        );
        Ok(set)
    }

    /// Parse ignore-file text.
    ///
    /// Blank lines and lines starting with `#` are skipped; every other line
    /// is trimmed. Lines starting with `!` become include overrides.
    pub fn parse(content: &str) -> Self {
        let mut set = Self::default();
        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.strip_prefix('!') {
                Some(rule) => set.includes.push(Pattern::new(rule)),
                None => set.excludes.push(Pattern::new(line)),
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.excludes.is_empty() && self.includes.is_empty()
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        patterns::matches(path, &self.excludes)
    }

    pub fn is_included(&self, path: &str) -> bool {
        patterns::matches(path, &self.includes)
    }

    /// Excluded and not re-included.
    pub fn should_remove(&self, path: &str) -> bool {
        self.is_excluded(path) && !self.is_included(path)
    }
}
