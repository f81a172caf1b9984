use std::path::Path;
use std::process::Stdio;

use distpack_core::ToolCommand;

use crate::error::ToolError;

/// Abstraction over external tool execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ToolExecutor: Send + Sync {
    /// Run `command` inside `working_dir` and capture its combined output.
    ///
    /// A non-zero exit status is an error carrying that output.
    async fn exec(&self, command: &ToolCommand, working_dir: &Path) -> Result<String, ToolError>;
}

/// Spawns real processes via tokio.
pub struct RealExecutor;

impl ToolExecutor for RealExecutor {
    async fn exec(&self, command: &ToolCommand, working_dir: &Path) -> Result<String, ToolError> {
        tracing::debug!(%command, dir = %working_dir.display(), "spawning tool");

        let output = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ToolError::Spawn {
                command: command.to_string(),
                source: e,
            })?;

        let combined = combine_output(&output.stdout, &output.stderr);

        if output.status.success() {
            Ok(combined)
        } else {
            Err(ToolError::Failed {
                command: command.to_string(),
                status: output.status.to_string(),
                output: combined,
            })
        }
    }
}

fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() {
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&String::from_utf8_lossy(stderr));
    }
    combined.trim_end().to_owned()
}
