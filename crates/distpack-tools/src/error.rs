#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to start `{command}`; is it installed and on PATH?")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}:\n{output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },
}

impl ToolError {
    /// Captured stdout + stderr of a failed run, if the tool got that far.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Failed { output, .. } => Some(output),
            Self::Spawn { .. } => None,
        }
    }
}
