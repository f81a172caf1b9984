use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use distpack_core::PatternSet;
use serde::Serialize;
use walkdir::WalkDir;

use crate::relative_path;

/// What a prune pass removed, and what it could not.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PruneReport {
    /// Relative paths removed, deepest first.
    pub removed: Vec<String>,
    pub warnings: Vec<PruneWarning>,
}

/// A path that matched the ignore list but could not be removed.
///
/// Never fatal: the pass keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneWarning {
    pub path: String,
    pub message: String,
}

impl fmt::Display for PruneWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to remove {} ({})", self.path, self.message)
    }
}

/// Removes every entry under `root` that `patterns` excludes and does not
/// re-include.
///
/// Entries are visited children before parents, so a directory is judged
/// only after everything inside it has been judged (and possibly removed).
/// An excluded directory that still holds re-included entries is emptied of
/// everything else but kept. Directories left empty are kept unless they
/// match an exclude rule themselves.
pub fn prune(root: &Path, patterns: &PatternSet) -> PruneReport {
    let mut report = PruneReport::default();
    let removals = decide(root, patterns, &mut report.warnings);

    for removal in removals {
        let result = if removal.is_dir {
            std::fs::remove_dir_all(&removal.path)
        } else {
            std::fs::remove_file(&removal.path)
        };
        report.record(removal.rel, result);
    }

    if !patterns.excludes.is_empty() {
        tracing::info!(
            removed = report.removed.len(),
            warnings = report.warnings.len(),
            "pruned working copy"
        );
    }
    report
}

/// Lists the entries [`prune`] would remove, in the order it removes them,
/// without touching the tree.
pub fn plan(root: &Path, patterns: &PatternSet) -> Vec<String> {
    let mut warnings = Vec::new();
    let paths = decide(root, patterns, &mut warnings)
        .into_iter()
        .map(|removal| removal.rel)
        .collect();
    for warning in &warnings {
        tracing::warn!(path = %warning.path, error = %warning.message, "skipping unreadable entry");
    }
    paths
}

impl PruneReport {
    fn record(&mut self, rel: String, result: std::io::Result<()>) {
        match result {
            Ok(()) => {
                tracing::debug!(path = %rel, "removed");
                self.removed.push(rel);
            }
            Err(e) => {
                tracing::warn!(path = %rel, error = %e, "failed to remove");
                self.warnings.push(PruneWarning {
                    path: rel,
                    message: e.to_string(),
                });
            }
        }
    }
}

struct Removal {
    path: PathBuf,
    rel: String,
    is_dir: bool,
}

/// Walks `root` children first and returns every entry to remove, deepest
/// first. Unreadable entries become warnings.
fn decide(root: &Path, patterns: &PatternSet, warnings: &mut Vec<PruneWarning>) -> Vec<Removal> {
    let mut removals = Vec::new();
    if patterns.excludes.is_empty() {
        return removals;
    }

    let mut decider = Decider {
        root,
        patterns,
        held: HashMap::new(),
    };
    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .and_then(|p| relative_path(root, p))
                    .unwrap_or_else(|| root.display().to_string());
                tracing::warn!(%path, error = %e, "skipping unreadable entry");
                warnings.push(PruneWarning {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };
        let Some(rel) = relative_path(root, entry.path()) else {
            continue;
        };
        let is_dir = entry.file_type().is_dir();
        if decider.removes(entry.path(), &rel, is_dir) {
            removals.push(Removal {
                path: entry.path().to_path_buf(),
                rel,
                is_dir,
            });
        }
    }
    removals
}

/// The single removal rule shared by [`prune`] and [`plan`].
struct Decider<'a> {
    root: &'a Path,
    patterns: &'a PatternSet,
    /// `holds_included` results per directory.
    held: HashMap<PathBuf, bool>,
}

impl Decider<'_> {
    /// An entry goes when it is not re-included, does not hold re-included
    /// entries, and is either excluded itself or lies inside an excluded
    /// directory that is being kept only for its re-included entries.
    fn removes(&mut self, path: &Path, rel: &str, is_dir: bool) -> bool {
        if self.patterns.is_included(rel) {
            return false;
        }
        if !self.patterns.is_excluded(rel) && !self.inside_spared_dir(path) {
            return false;
        }
        !(is_dir && self.holds_included(path))
    }

    fn inside_spared_dir(&mut self, path: &Path) -> bool {
        let mut ancestor = path.parent();
        while let Some(dir) = ancestor {
            if dir == self.root || !dir.starts_with(self.root) {
                break;
            }
            if relative_path(self.root, dir).is_some_and(|rel| self.patterns.should_remove(&rel))
                && self.holds_included(dir)
            {
                return true;
            }
            ancestor = dir.parent();
        }
        false
    }

    /// Whether anything below `dir` is re-included. Unreadable subtrees count
    /// as holding something, so they are never deleted wholesale.
    fn holds_included(&mut self, dir: &Path) -> bool {
        if self.patterns.includes.is_empty() {
            return false;
        }
        if let Some(&held) = self.held.get(dir) {
            return held;
        }

        let mut held = false;
        for entry in WalkDir::new(dir).min_depth(1) {
            match entry {
                Ok(entry) => {
                    if relative_path(self.root, entry.path())
                        .is_some_and(|rel| self.patterns.is_included(&rel))
                    {
                        held = true;
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(dir = %dir.display(), error = %e, "cannot inspect directory");
                    held = true;
                    break;
                }
            }
        }
        self.held.insert(dir.to_path_buf(), held);
        held
    }
}
