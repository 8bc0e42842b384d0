//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where the detector and classifier model files live.
    pub models_dir: PathBuf,

    /// Default recognition parameters.
    pub recognition: RecognitionDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default recognition parameters.
///
/// These mirror the tunable fields of the recognizer config without pulling
/// the algorithm crates into common; the CLI maps them across at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionDefaults {
    /// Window capacity in frames.
    pub window_capacity: usize,

    /// Number of oldest frames evicted in one batch once the window
    /// exceeds capacity.
    pub eviction_stride: usize,

    /// Minimum target-class probability for a confident match.
    pub target_threshold: f32,

    /// Minimum negative-class probability to call the frame subject-less.
    pub negative_threshold: f32,

    /// Minimum best-class probability before falling back to the
    /// low-confidence sentinel.
    pub fallback_threshold: f32,

    /// Target frame rate for synthetic/replayed sources.
    pub fps: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "matchpose=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            models_dir: dirs_default_models(),
            recognition: RecognitionDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RecognitionDefaults {
    fn default() -> Self {
        Self {
            window_capacity: 90,
            eviction_stride: 10,
            target_threshold: 0.8,
            negative_threshold: 0.8,
            fallback_threshold: 0.6,
            fps: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("matchpose").join("config.json")
}

/// Default models directory.
fn dirs_default_models() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("matchpose").join("models")
}
