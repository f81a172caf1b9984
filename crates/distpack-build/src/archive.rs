use std::fs::{File, Metadata};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::relative_path;

/// Counts of what went into an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
    /// Dangling symlinks left out of the archive.
    pub skipped: usize,
}

/// Writes every file and directory under `source_dir` into a new zip at
/// `destination`, overwriting any existing file.
///
/// Entries are written parents first with `/`-separated paths relative to
/// `source_dir`. Every directory gets an explicit entry so empty ones
/// survive extraction. File contents are read through symlinks where the
/// target resolves.
///
/// On error the partially written file is deleted.
pub fn build(source_dir: &Path, destination: &Path) -> Result<ArchiveSummary, ArchiveError> {
    let file = File::create(destination).map_err(|e| ArchiveError::Create {
        path: destination.to_path_buf(),
        source: e,
    })?;

    match write_entries(source_dir, file) {
        Ok(summary) => {
            tracing::info!(
                path = %destination.display(),
                files = summary.files,
                directories = summary.directories,
                bytes = summary.bytes,
                "archive written"
            );
            Ok(summary)
        }
        Err(e) => {
            if let Err(remove_err) = std::fs::remove_file(destination) {
                tracing::warn!(
                    path = %destination.display(),
                    error = %remove_err,
                    "failed to remove partial archive"
                );
            }
            Err(e)
        }
    }
}

fn write_entries(source_dir: &Path, file: File) -> Result<ArchiveSummary, ArchiveError> {
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut summary = ArchiveSummary::default();

    for entry in WalkDir::new(source_dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ArchiveError::Walk {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source_dir.to_path_buf()),
            source: e,
        })?;
        let Some(name) = relative_path(source_dir, entry.path()) else {
            continue;
        };

        // `Path::is_dir` follows symlinks; linked directories become empty
        // directory entries rather than being walked.
        if entry.file_type().is_dir() || entry.path().is_dir() {
            zip.add_directory(name.as_str(), options)
                .map_err(|e| ArchiveError::AddEntry {
                    name: name.clone(),
                    source: e,
                })?;
            summary.directories += 1;
            continue;
        }

        let real_path = match std::fs::canonicalize(entry.path()) {
            Ok(real) => real,
            Err(e) if entry.file_type().is_symlink() => {
                tracing::warn!(path = %name, error = %e, "skipping dangling symlink");
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::debug!(path = %name, error = %e, "could not resolve real path");
                entry.path().to_path_buf()
            }
        };

        let mut src = File::open(&real_path).map_err(|e| ArchiveError::ReadFile {
            path: real_path.clone(),
            source: e,
        })?;
        zip.start_file(name.as_str(), file_options(options, &src))
            .map_err(|e| ArchiveError::AddEntry {
                name: name.clone(),
                source: e,
            })?;
        let written = std::io::copy(&mut src, &mut zip).map_err(|e| ArchiveError::WriteFile {
            name: name.clone(),
            source: e,
        })?;

        summary.files += 1;
        summary.bytes += written;
    }

    let mut file = zip.finish().map_err(|e| ArchiveError::Finish { source: e })?;
    file.flush()
        .map_err(|e| ArchiveError::Flush { source: e })?;
    Ok(summary)
}

fn file_options(options: SimpleFileOptions, src: &File) -> SimpleFileOptions {
    match src.metadata() {
        Ok(meta) => with_permissions(options.large_file(needs_zip64(meta.len())), &meta),
        Err(e) => {
            tracing::debug!(error = %e, "could not read file metadata, using defaults");
            options
        }
    }
}

/// Entries at or above the 32-bit size limit must be written as ZIP64.
fn needs_zip64(len: u64) -> bool {
    len >= u64::from(u32::MAX)
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, meta: &Metadata) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;

    options.unix_permissions(meta.permissions().mode())
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _meta: &Metadata) -> SimpleFileOptions {
    options
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to create zip archive at {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read tree at {path}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to add {name} to zip archive")]
    AddEntry {
        name: String,
        source: zip::result::ZipError,
    },
    #[error("failed to write {name} into zip archive")]
    WriteFile {
        name: String,
        source: std::io::Error,
    },
    #[error("failed to finalize zip archive")]
    Finish { source: zip::result::ZipError },
    #[error("failed to flush zip archive")]
    Flush { source: std::io::Error },
}
