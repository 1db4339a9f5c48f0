//! Assistant configuration and project layout.
//!
//! Read from `.agility/config.toml`; every field has a default, so an empty
//! or missing file is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FeedbackError, Result};

/// Top-level configuration from `.agility/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Completion model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Ticket event log settings
    #[serde(default)]
    pub events: EventsConfig,
}

/// Completion model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Chat model name sent with every request
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Base URL of the chat-completions API (without `/chat/completions`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            temperature: default_temperature(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Ticket event log settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// JSONL file receiving ticket lifecycle events. Relative paths resolve
    /// against the project root. Unset disables the log.
    pub log: Option<PathBuf>,
}

// Serde default functions
fn default_model_name() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl AssistantConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| FeedbackError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| FeedbackError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Try to load config, returning default if the file doesn't exist.
    ///
    /// A file that exists but fails to parse is logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable config");
                Self::default()
            }
        }
    }
}

/// Paths of the `.agility/` directory for a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgilityPaths {
    pub project_root: PathBuf,
    pub agility_dir: PathBuf,
    pub config_file: PathBuf,
    pub default_event_log: PathBuf,
}

impl AgilityPaths {
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        let project_root = project_root.as_ref().to_path_buf();
        let agility_dir = project_root.join(".agility");
        Self {
            config_file: agility_dir.join("config.toml"),
            default_event_log: agility_dir.join("events.jsonl"),
            agility_dir,
            project_root,
        }
    }

    /// Resolve the configured event log against the project root.
    pub fn event_log(&self, config: &EventsConfig) -> Option<PathBuf> {
        config.log.as_ref().map(|log| {
            if log.is_absolute() {
                log.clone()
            } else {
                self.project_root.join(log)
            }
        })
    }
}
