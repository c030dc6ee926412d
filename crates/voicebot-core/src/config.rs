use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VoicebotError};

/// Top-level configuration for the voicebot session.
///
/// Loaded from `~/.voicebot/config.toml` by default. Each section corresponds
/// to one component of the session controller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoicebotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl VoicebotConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VoicebotConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VoicebotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Directory that receives reports and exports.
    pub output_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            output_dir: "~/.voicebot/output".to_string(),
        }
    }
}

/// Speech capture and synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// BCP-47 tag used for capture, synthesis and dispatch.
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en-IN".to_string(),
            rate: 0.9,
            pitch: 1.0,
            volume: 0.8,
        }
    }
}

/// Remote chat service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Chat endpoint URL. `None` means every turn uses the local fallback.
    pub endpoint: Option<String>,
    /// Client-side timeout for one remote call.
    pub timeout_secs: u64,
    /// Maximum accepted message length in characters.
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: Some("http://localhost:8000/chat".to_string()),
            timeout_secs: 8,
            max_message_length: 2000,
        }
    }
}

/// Notification feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Maximum notifications kept; older ones are evicted.
    pub retention: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { retention: 50 }
    }
}

/// Metrics refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub refresh_interval_secs: u64,
    pub metrics_url: Option<String>,
    pub customers_url: Option<String>,
    pub inventory_url: Option<String>,
    /// Seed for mock data and metric deltas.
    pub seed: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            metrics_url: None,
            customers_url: None,
            inventory_url: None,
            seed: 42,
        }
    }
}

/// Report compilation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Rows in the ranked customer table.
    pub top_customers: usize,
    pub file_prefix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_customers: 10,
            file_prefix: "voicebot".to_string(),
        }
    }
}

/// Local HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 3040 }
    }
}
