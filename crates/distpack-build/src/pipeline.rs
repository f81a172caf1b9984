use std::path::{Path, PathBuf};
use std::time::Instant;

use distpack_core::{DistpackConfig, PatternSet, ToolCommand};
use distpack_tools::{RealExecutor, ToolError, ToolExecutor};
use serde::Serialize;

use crate::archive::{self, ArchiveError, ArchiveSummary};
use crate::mirror::{self, MirrorError};
use crate::prune::{self, PruneReport, PruneWarning};

/// Extension every release archive carries.
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// One named unit of release work.
///
/// Steps run in the order [`ReleasePipeline::steps`] returns them; each
/// acts on the working copy left behind by the steps before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    CopyFiles,
    InstallComposer(ToolCommand),
    InstallNpm(ToolCommand),
    CompileAssets(ToolCommand),
    RemoveUnneeded { ignore_file: String },
    CreateArchive,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CopyFiles => "Copying project files",
            Self::InstallComposer(_) => "Installing Composer dependencies",
            Self::InstallNpm(_) => "Installing npm dependencies",
            Self::CompileAssets(_) => "Compiling assets",
            Self::RemoveUnneeded { .. } => "Removing unneeded files",
            Self::CreateArchive => "Creating zip file",
        }
    }

    async fn run<E: ToolExecutor>(
        &self,
        run: &mut PipelineRun,
        executor: &E,
    ) -> Result<(), StepError> {
        match self {
            Self::CopyFiles => {
                mirror::mirror(&run.source_dir, &run.work_dir, &run.skip)?;
            }
            Self::InstallComposer(command)
            | Self::InstallNpm(command)
            | Self::CompileAssets(command) => {
                let output = executor.exec(command, &run.work_dir).await?;
                tracing::debug!(%command, %output, "tool finished");
            }
            Self::RemoveUnneeded { ignore_file } => {
                let patterns = PatternSet::load(&run.work_dir.join(ignore_file))?;
                run.prune = prune::prune(&run.work_dir, &patterns);
            }
            Self::CreateArchive => {
                run.archive = archive::build(&run.work_dir, &run.archive_path)?;
            }
        }
        Ok(())
    }
}

/// Where a run is in its step list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Initializing,
    Running(usize),
    Succeeded,
    Failed(usize),
}

/// A step that finished successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub label: &'static str,
    pub duration_ms: u64,
}

/// Result of a successful release.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseOutcome {
    pub archive_path: PathBuf,
    pub steps: Vec<StepReport>,
    pub removed: Vec<String>,
    pub warnings: Vec<PruneWarning>,
    pub archive: ArchiveSummary,
}

/// State owned by one release run. Dropped when the run ends.
struct PipelineRun {
    source_dir: PathBuf,
    work_dir: PathBuf,
    archive_path: PathBuf,
    /// Output paths that sit inside the source tree.
    skip: Vec<PathBuf>,
    state: RunState,
    completed: Vec<StepReport>,
    prune: PruneReport,
    archive: ArchiveSummary,
}

impl PipelineRun {
    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }
}

/// Builds a release archive from a project directory, parameterized over the
/// tool executor for testability.
pub struct ReleasePipeline<E: ToolExecutor = RealExecutor> {
    config: DistpackConfig,
    executor: E,
}

impl ReleasePipeline<RealExecutor> {
    pub fn new(config: DistpackConfig) -> Self {
        Self {
            config,
            executor: RealExecutor,
        }
    }
}

impl<E: ToolExecutor> ReleasePipeline<E> {
    pub fn with_executor(config: DistpackConfig, executor: E) -> Self {
        Self { config, executor }
    }

    /// The ordered step list for this configuration. Disabled tools are left out.
    pub fn steps(&self) -> Vec<Step> {
        let tools = &self.config.tools;
        let mut steps = vec![Step::CopyFiles];
        if tools.composer.enabled {
            steps.push(Step::InstallComposer(tools.composer.clone()));
        }
        if tools.npm_install.enabled {
            steps.push(Step::InstallNpm(tools.npm_install.clone()));
        }
        if tools.build.enabled {
            steps.push(Step::CompileAssets(tools.build.clone()));
        }
        steps.push(Step::RemoveUnneeded {
            ignore_file: self.config.release.ignore_file.clone(),
        });
        steps.push(Step::CreateArchive);
        steps
    }

    /// Run the full release: copy → composer → npm → assets → prune → zip.
    ///
    /// The temporary working directory under `destination_dir` is removed on
    /// every outcome. Failing to remove it is logged, not returned.
    pub async fn run(
        &self,
        source_dir: &Path,
        destination_dir: &Path,
        archive_filename: &str,
    ) -> Result<ReleaseOutcome, PipelineError> {
        let source_dir = std::fs::canonicalize(source_dir).map_err(|e| SetupError::SourceDir {
            path: source_dir.to_path_buf(),
            source: e,
        })?;
        let project_name = source_dir
            .file_name()
            .ok_or_else(|| SetupError::SourceName(source_dir.clone()))?
            .to_owned();

        let archive_filename = archive_file_name(archive_filename)?;

        std::fs::create_dir_all(destination_dir).map_err(|e| SetupError::Destination {
            path: destination_dir.to_path_buf(),
            source: e,
        })?;
        let destination_dir =
            std::fs::canonicalize(destination_dir).map_err(|e| SetupError::Destination {
                path: destination_dir.to_path_buf(),
                source: e,
            })?;

        let temp_dir = tempfile::Builder::new()
            .prefix(&self.config.release.temp_prefix)
            .tempdir_in(&destination_dir)
            .map_err(|e| SetupError::TempDir {
                path: destination_dir.clone(),
                source: e,
            })?;

        // Never copy the release output back into the working copy.
        let skip: Vec<PathBuf> = [destination_dir.clone(), temp_dir.path().to_path_buf()]
            .into_iter()
            .filter(|p| p.starts_with(&source_dir) && *p != source_dir)
            .collect();
        let mut run = PipelineRun {
            work_dir: temp_dir.path().join(&project_name),
            archive_path: destination_dir.join(&archive_filename),
            source_dir,
            skip,
            state: RunState::Initializing,
            completed: Vec::new(),
            prune: PruneReport::default(),
            archive: ArchiveSummary::default(),
        };
        tracing::info!(
            source = %run.source_dir.display(),
            work_dir = %run.work_dir.display(),
            archive = %run.archive_path.display(),
            "starting release"
        );

        let result = self.execute(&mut run).await;

        let temp_path = temp_dir.path().to_path_buf();
        if let Err(e) = temp_dir.close() {
            tracing::warn!(path = %temp_path.display(), error = %e, "failed to remove working directory");
        }

        result?;
        Ok(ReleaseOutcome {
            archive_path: run.archive_path,
            steps: run.completed,
            removed: run.prune.removed,
            warnings: run.prune.warnings,
            archive: run.archive,
        })
    }

    async fn execute(&self, run: &mut PipelineRun) -> Result<(), PipelineError> {
        for (index, step) in self.steps().iter().enumerate() {
            run.transition(RunState::Running(index));
            let label = step.label();
            tracing::info!(step = index + 1, "{label}");

            let started = Instant::now();
            if let Err(source) = step.run(run, &self.executor).await {
                run.transition(RunState::Failed(index));
                tracing::error!(step = index + 1, error = %source, "{label} failed");
                return Err(PipelineError::Step {
                    index,
                    label,
                    completed: std::mem::take(&mut run.completed),
                    source,
                });
            }

            run.completed.push(StepReport {
                index,
                label,
                duration_ms: elapsed_ms(started),
            });
        }
        run.transition(RunState::Succeeded);
        Ok(())
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    let elapsed = started.elapsed();
    elapsed
        .as_secs()
        .saturating_mul(1000)
        .saturating_add(u64::from(elapsed.subsec_millis()))
}

/// `filename` with the archive extension appended if it is missing.
///
/// The name is otherwise used exactly as given. A blank name, or one that is
/// only the extension, is rejected.
pub fn archive_file_name(filename: &str) -> Result<String, SetupError> {
    if filename.trim().is_empty() || filename == ARCHIVE_EXTENSION {
        return Err(SetupError::EmptyFilename);
    }
    if filename.ends_with(ARCHIVE_EXTENSION) {
        Ok(filename.to_owned())
    } else {
        Ok(format!("{filename}{ARCHIVE_EXTENSION}"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("project directory {path} is not accessible")]
    SourceDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("project directory {0} has no name to use for the working copy")]
    SourceName(PathBuf),
    #[error("archive filename must not be empty")]
    EmptyFilename,
    #[error("failed to prepare destination directory {path}")]
    Destination {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create working directory in {path}")]
    TempDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    IgnoreFile(#[from] distpack_core::Error),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("{label} failed")]
    Step {
        index: usize,
        label: &'static str,
        /// Steps that finished before the failure.
        completed: Vec<StepReport>,
        source: StepError,
    },
}

impl PipelineError {
    /// Label of the step that failed, if the run got past setup.
    pub fn failed_step(&self) -> Option<&'static str> {
        match self {
            Self::Setup(_) => None,
            Self::Step { label, .. } => Some(*label),
        }
    }

    /// Steps that completed before the failure.
    pub fn completed(&self) -> &[StepReport] {
        match self {
            Self::Setup(_) => &[],
            Self::Step { completed, .. } => completed,
        }
    }
}
