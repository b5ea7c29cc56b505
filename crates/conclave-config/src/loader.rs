//! Configuration loader with multi-source merging.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::ConclaveConfig;

/// Name of the per-project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "conclave.toml";

/// Configuration loader with builder pattern.
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    /// Creates a loader rooted at the current directory.
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "CONCLAVE".to_string(),
        }
    }

    /// Sets the project directory to look for `conclave.toml` in.
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Sets the environment variable prefix (default: "CONCLAVE").
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Loads configuration from all sources with proper precedence:
    /// defaults, then the project file, then environment variables.
    pub fn load(self) -> Result<ConclaveConfig> {
        let mut builder = config::Config::builder();

        // 1. Built-in defaults
        let defaults = ConclaveConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. Project config (conclave.toml)
        let project_file = self.project_dir.join(PROJECT_CONFIG_FILE);
        if project_file.exists() {
            builder = builder.add_source(
                config::File::from(project_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 3. Environment variables (CONCLAVE_*)
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .separator("_")
                .try_parsing(true),
        );

        let merged = builder.build().context("Failed to build configuration")?;
        merged
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Loads configuration or falls back to defaults.
    pub fn load_or_default(self) -> ConclaveConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
