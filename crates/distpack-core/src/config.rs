use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the optional per-project configuration file.
pub const CONFIG_FILE_NAME: &str = "distpack.toml";

/// distpack.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistpackConfig {
    #[serde(default)]
    pub release: ReleaseConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Ignore-declaration file, relative to the project root
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
    /// Prefix of the temporary working directory created under the destination
    #[serde(default = "default_temp_prefix")]
    pub temp_prefix: String,
}

/// External build tools run against the working copy, in pipeline order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// PHP dependency install (production mode)
    #[serde(default = "default_composer")]
    pub composer: ToolCommand,
    /// JS dependency clean install
    #[serde(default = "default_npm_install")]
    pub npm_install: ToolCommand,
    /// Asset compilation
    #[serde(default = "default_build")]
    pub build: ToolCommand,
}

/// A single external command: program, arguments, and whether it runs at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl ToolCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_owned(),
            args: args.into_iter().map(Into::into).collect(),
            enabled: true,
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            ignore_file: default_ignore_file(),
            temp_prefix: default_temp_prefix(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            composer: default_composer(),
            npm_install: default_npm_install(),
            build: default_build(),
        }
    }
}

impl DistpackConfig {
    /// Load from distpack.toml in the given directory, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            let config = toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path.clone(),
                source: e,
            })?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

fn default_ignore_file() -> String {
    ".distignore".to_owned()
}

fn default_temp_prefix() -> String {
    "distpack_build_".to_owned()
}

fn default_enabled() -> bool {
    true
}

fn default_composer() -> ToolCommand {
    ToolCommand::new(
        "composer",
        ["install", "--no-dev", "--optimize-autoloader", "--quiet"],
    )
}

fn default_npm_install() -> ToolCommand {
    ToolCommand::new("npm", ["ci"])
}

fn default_build() -> ToolCommand {
    ToolCommand::new("npm", ["run", "build"])
}
