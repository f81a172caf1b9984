use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Copies the project tree at `source` into `target`, parents first.
///
/// Directories and files are recreated with the same relative layout.
/// Symlinks are recreated as symlinks on Unix. Paths in `skip` (and
/// everything under them) are left out; the release destination is passed
/// here when it lives inside the project being copied.
///
/// Returns the number of files copied.
pub fn mirror(source: &Path, target: &Path, skip: &[PathBuf]) -> Result<u64, MirrorError> {
    std::fs::create_dir_all(target).map_err(|e| MirrorError::Create {
        path: target.to_path_buf(),
        source: e,
    })?;

    let mut copied = 0u64;
    let walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !skip.iter().any(|p| p == entry.path()));

    for entry in walker {
        let entry = entry.map_err(|e| MirrorError::Walk {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| source.to_path_buf()),
            source: e,
        })?;
        let Ok(rel) = entry.path().strip_prefix(source) else {
            continue;
        };
        let dst = target.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&dst).map_err(|e| MirrorError::Create {
                path: dst.clone(),
                source: e,
            })?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &dst).map_err(|e| MirrorError::CopyFile {
                path: entry.path().to_path_buf(),
                source: e,
            })?;
        } else {
            std::fs::copy(entry.path(), &dst).map_err(|e| MirrorError::CopyFile {
                path: entry.path().to_path_buf(),
                source: e,
            })?;
            copied += 1;
        }
    }

    tracing::debug!(
        from = %source.display(),
        to = %target.display(),
        files = copied,
        "mirrored project tree"
    );
    Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    let link = std::fs::read_link(src)?;
    std::os::unix::fs::symlink(link, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    if src.is_dir() {
        std::fs::create_dir_all(dst)
    } else {
        std::fs::copy(src, dst).map(|_| ())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("failed to create directory {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read project tree at {path}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("failed to copy {path}")]
    CopyFile {
        path: PathBuf,
        source: std::io::Error,
    },
}
