//! Pipeline configuration management.
//!
//! Configuration is an optional YAML file holding default tone parameters
//! and batch naming rules. Nothing is cached globally: callers load a
//! [`PipelineConfigHandle`] once and pass the values they need down.

mod defaults;


pub use defaults::{PipelineDefaults, DEFAULT_EDIT_TAG, DEFAULT_OUTPUT_DIR_NAME};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CodecError;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "NEGFIX_CONFIG";

/// Canonical list of candidate config file names we search for on disk.
pub const CONFIG_FILENAMES: &[&str] = &["negfix.yml", "negfix.yaml"];

/// Loaded configuration, the file it came from and any problems found on the way.
#[derive(Debug, Clone)]
pub struct PipelineConfigHandle {
    pub config: PipelineConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl PipelineConfigHandle {
    fn with_config(config: PipelineConfig, source: Option<PathBuf>, warnings: Vec<String>) -> Self {
        Self {
            config,
            source,
            warnings,
        }
    }

    /// Report the config source and warnings through `tracing`.
    pub fn log_usage(&self) {
        match &self.source {
            Some(source) => info!(path = %source.display(), "loaded pipeline config"),
            None => info!("using built-in pipeline defaults"),
        }
        for warning in &self.warnings {
            warn!("config: {}", warning);
        }
    }
}

/// Complete configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub defaults: PipelineDefaults,
}

impl PipelineConfig {
    fn sanitize(mut self) -> Self {
        self.defaults.sanitize();
        self
    }

    /// Serialize to the YAML layout accepted by [`load_pipeline_config`].
    pub fn to_yaml(&self) -> Result<String, String> {
        serde_yaml::to_string(self).map_err(|e| format!("Failed to serialize config: {}", e))
    }
}

/// Load configuration from disk, optionally forcing a specific path.
///
/// An explicit `custom_path` must exist and parse. Otherwise the first
/// candidate that exists and parses wins; unreadable or malformed files are
/// recorded as warnings and the search continues.
pub fn load_pipeline_config(
    custom_path: Option<&Path>,
) -> Result<PipelineConfigHandle, CodecError> {
    if let Some(path) = custom_path {
        return load_config_file(path);
    }

    let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let cwd = std::env::current_dir().ok();
    let candidates = config_candidates(
        None,
        env_path.as_deref(),
        cwd.as_deref(),
        dirs::config_dir().as_deref(),
    );
    Ok(load_from_candidates(&candidates))
}

/// Load a single config file, failing if it is missing or malformed.
pub fn load_config_file(path: &Path) -> Result<PipelineConfigHandle, CodecError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        CodecError::Config(format!(
            "Failed to read pipeline config {}: {}",
            path.display(),
            e
        ))
    })?;
    let config = parse_config(&contents).map_err(|e| {
        CodecError::Config(format!(
            "Failed to parse pipeline config {}: {}",
            path.display(),
            e
        ))
    })?;
    let source = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    Ok(PipelineConfigHandle::with_config(config, Some(source), Vec::new()))
}

/// Try each candidate path in order.
pub fn load_from_candidates(candidates: &[PathBuf]) -> PipelineConfigHandle {
    let mut warnings = Vec::new();

    for candidate in candidates {
        if !candidate.is_file() {
            continue;
        }

        match fs::read_to_string(candidate) {
            Ok(contents) => match parse_config(&contents) {
                Ok(config) => {
                    let source =
                        fs::canonicalize(candidate).unwrap_or_else(|_| candidate.clone());
                    return PipelineConfigHandle::with_config(config, Some(source), warnings);
                }
                Err(err) => warnings.push(format!(
                    "Failed to parse pipeline config {}: {}",
                    candidate.display(),
                    err
                )),
            },
            Err(err) => warnings.push(format!(
                "Failed to read pipeline config {}: {}",
                candidate.display(),
                err
            )),
        }
    }

    warnings.push("No pipeline config found; using built-in defaults.".to_string());
    PipelineConfigHandle::with_config(PipelineConfig::default(), None, warnings)
}

/// Parse YAML config text. An empty document yields the defaults.
pub fn parse_config(contents: &str) -> Result<PipelineConfig, String> {
    if contents.trim().is_empty() {
        return Ok(PipelineConfig::default());
    }
    serde_yaml::from_str::<PipelineConfig>(contents)
        .map(PipelineConfig::sanitize)
        .map_err(|e| e.to_string())
}

/// Build the ordered list of config file candidates.
pub fn config_candidates(
    custom_path: Option<&Path>,
    env_path: Option<&Path>,
    cwd: Option<&Path>,
    config_dir: Option<&Path>,
) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = custom_path {
        candidates.push(path.to_path_buf());
    }

    if let Some(path) = env_path {
        candidates.push(path.to_path_buf());
    }

    if let Some(cwd) = cwd {
        for name in CONFIG_FILENAMES {
            candidates.push(cwd.join("config").join(name));
            candidates.push(cwd.join(name));
        }
    }

    if let Some(dir) = config_dir {
        for name in CONFIG_FILENAMES {
            candidates.push(dir.join("negfix").join(name));
        }
    }

    candidates
}

/// Default location used by `negfix init`
pub fn default_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("negfix").join(CONFIG_FILENAMES[0]))
}
