use std::path::Path;

use distpack_build::{PipelineError, ReleaseOutcome, ReleasePipeline, StepReport};
use distpack_core::DistpackConfig;

/// Run the release pipeline and report each step.
pub async fn release(
    project_dir: &Path,
    destination: &Path,
    filename: &str,
    json: bool,
) -> anyhow::Result<()> {
    let config = DistpackConfig::load(project_dir)?;
    let pipeline = ReleasePipeline::new(config);

    if !json {
        println!("Building release from {}", project_dir.display());
        println!();
    }

    match pipeline.run(project_dir, destination, filename).await {
        Ok(outcome) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_success(&outcome);
            }
            Ok(())
        }
        Err(err) => {
            if json {
                let report = serde_json::json!({
                    "status": "failed",
                    "failed_step": err.failed_step(),
                    "completed": err.completed(),
                    "error": error_chain(&err),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_steps(err.completed());
                if let Some(label) = err.failed_step() {
                    println!("  ✗ {label}");
                }
                println!();
            }
            Err(err.into())
        }
    }
}

fn print_steps(steps: &[StepReport]) {
    for step in steps {
        println!("  ✓ {} ({} ms)", step.label, step.duration_ms);
    }
}

fn print_success(outcome: &ReleaseOutcome) {
    print_steps(&outcome.steps);
    println!();

    if !outcome.removed.is_empty() {
        println!("Removed {} path(s) listed in the ignore file", outcome.removed.len());
    }
    for warning in &outcome.warnings {
        println!("Warning: {warning}");
    }

    println!(
        "Zip file created at {} ({} files, {} directories)",
        outcome.archive_path.display(),
        outcome.archive.files,
        outcome.archive.directories,
    );
    println!("Release build completed!");
}

/// Full error chain as a single message, for JSON output.
fn error_chain(err: &PipelineError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
