//! Release pipeline, pruning, and archiving for distpack.
//!
//! # Release pipeline
//!
//! ```text
//! distpack release <destination> <filename>
//!   1. Copy       ── project dir → <destination>/distpack_build_XXXX/<project>/
//!   2. Composer   ── composer install --no-dev --optimize-autoloader --quiet
//!   3. npm        ── npm ci
//!   4. Assets     ── npm run build
//!   5. Prune      ── .distignore excludes minus `!` includes, deepest first
//!   6. Archive    ── working copy → <destination>/<filename>.zip
//! ```
//!
//! The temporary directory is removed whether the run succeeds or fails.
//! A failing step ends the run before the archive step, so a failed release
//! never leaves a zip behind.

pub mod archive;
pub mod mirror;
pub mod pipeline;
pub mod prune;

pub use archive::{ArchiveError, ArchiveSummary};
pub use mirror::MirrorError;
pub use pipeline::{
    PipelineError, ReleaseOutcome, ReleasePipeline, RunState, SetupError, Step, StepError,
    StepReport,
};
pub use prune::{PruneReport, PruneWarning};

use std::path::{Component, Path};

/// `path` relative to `root`, joined with `/` regardless of platform.
pub(crate) fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let Ok(rel) = path.strip_prefix(root) else {
        return None;
    };
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::relative_path;
    use std::path::Path;

    #[test]
    fn relative_path_uses_forward_slashes() {
        let root = Path::new("/tmp/work/theme");
        let path = root.join("assets").join("js").join("app.js");
        assert_eq!(
            relative_path(root, &path).as_deref(),
            Some("assets/js/app.js")
        );
    }

    #[test]
    fn relative_path_of_root_is_none() {
        let root = Path::new("/tmp/work/theme");
        assert_eq!(relative_path(root, root), None);
        assert_eq!(relative_path(root, Path::new("/elsewhere")), None);
    }
}
