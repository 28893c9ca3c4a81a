//! Configuration loading and management
//!
//! Handles parsing of the optional `config.toml` (platform config dir, or
//! `--config` / `WORKLOG_CONFIG`).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::report::ReportFormat;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Work log used when neither `--file` nor `WORK_LOG` is set
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Report configuration
    #[serde(default)]
    pub report: ReportConfig,

    /// Monthly document configuration
    #[serde(default)]
    pub document: DocumentConfig,
}

/// Report-related configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Daily report format when `--format` is not given
    #[serde(default)]
    pub format: ReportFormat,
}

/// Document generation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    /// Typesetting engine executable
    #[serde(default = "default_engine")]
    pub engine: String,

    /// Arguments passed before the output directory and source file
    #[serde(default = "default_engine_args")]
    pub engine_args: Vec<String>,

    /// Where finished documents are placed (defaults to the system temp dir)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_engine() -> String {
    "pdflatex".to_string()
}

fn default_engine_args() -> Vec<String> {
    vec![
        "-halt-on-error".to_string(),
        "-output-format=pdf".to_string(),
    ]
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            engine_args: default_engine_args(),
            output_dir: None,
        }
    }
}

impl DocumentConfig {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.engine.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "document.engine cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` (or the platform default), falling back to defaults
    /// when the file is missing or invalid.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Self::default(),
        };
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// `<config dir>/worklog/config.toml` for the current platform
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "worklog").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.document.validate()?;
        Ok(())
    }
}
