//! Configuration resolution for the CLI.

use crate::error::{CliError, Result};
use docsift_extractor::BatchConfig;
use docsift_llm::ApiSettings;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Run configuration looked for when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "docsift.toml";

/// Legacy JSON configuration holding only `prompt`.
pub const LEGACY_CONFIG_FILE: &str = "config.json";

/// Pick the run configuration file.
///
/// An explicit path is used as is. Otherwise `docsift.toml` in `dir` is
/// preferred, then `config.json`.
pub fn resolve_config_path(explicit: Option<&Path>, dir: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(CliError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(path.to_path_buf());
    }

    [DEFAULT_CONFIG_FILE, LEGACY_CONFIG_FILE]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| {
            CliError::Config(format!(
                "No {} or {} found in {}; create one with a `prompt` entry",
                DEFAULT_CONFIG_FILE,
                LEGACY_CONFIG_FILE,
                dir.display()
            ))
        })
}

/// Load and validate the run configuration, applying an input override.
pub fn load_batch_config(explicit: Option<&Path>, input: Option<PathBuf>) -> Result<BatchConfig> {
    let path = resolve_config_path(explicit, Path::new("."))?;
    debug!("Loading run configuration from {}", path.display());

    let mut config = BatchConfig::load(&path)?;
    if let Some(dir) = input {
        config.input_dir = dir;
    }
    Ok(config)
}

/// Load API settings from `env_file`, or from `.env` and the process
/// environment.
pub fn load_api_settings(env_file: Option<&Path>) -> Result<ApiSettings> {
    let settings = match env_file {
        Some(path) => ApiSettings::from_env_file(path)?,
        None => ApiSettings::from_env()?,
    };
    debug!(
        "Using endpoint {} with model {}",
        settings.completions_url(),
        settings.default_model
    );
    Ok(settings)
}
