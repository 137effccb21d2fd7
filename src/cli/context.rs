use std::path::{Path, PathBuf};

use crate::config::app_config::AppConfig;
use crate::core::errors::Result;

/// Everything a command needs to run: the loaded configuration with
/// command-line overrides applied, and the output flags.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: AppConfig,
    pub verbose: bool,
    pub quiet: bool,
}

impl RunContext {
    /// Load the configuration and apply the `--storage` override.
    pub fn load(
        config_path: Option<&Path>,
        storage: Option<PathBuf>,
        verbose: bool,
        quiet: bool,
    ) -> Result<Self> {
        let mut config = AppConfig::load(config_path)?;
        if let Some(root) = storage {
            config.storage.root = root;
        }
        Ok(Self {
            config,
            verbose,
            quiet,
        })
    }

    /// Root directory of the key store.
    pub fn storage_root(&self) -> &Path {
        &self.config.storage.root
    }
}
