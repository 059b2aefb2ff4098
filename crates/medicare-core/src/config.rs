use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MedicareError, Result};
use crate::types::{Language, OperationKind};

/// Top-level configuration for the Medicare client.
///
/// Loaded from `~/.medicare/config.toml` by default. Every section falls
/// back to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicareConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl MedicareConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MedicareConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No config file at {}; using defaults", path.display());
            return Self::default();
        }
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
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        let base = self.backend.base_url.trim();
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(MedicareError::Config(format!(
                "backend.base_url must be an http(s) URL, got: {}",
                self.backend.base_url
            )));
        }
        if !(1..=100).contains(&self.capture.jpeg_quality) {
            return Err(MedicareError::Config(format!(
                "capture.jpeg_quality must be within 1..=100, got: {}",
                self.capture.jpeg_quality
            )));
        }
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(MedicareError::Config(
                "capture.width and capture.height must be non-zero".to_string(),
            ));
        }
        if self.notifications.toast_duration_ms == 0 || self.notifications.copy_ack_duration_ms == 0
        {
            return Err(MedicareError::Config(
                "notification durations must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// General client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Language selected at startup.
    pub language: Language,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            language: Language::En,
        }
    }
}

/// Remote service endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Scheme and host of the analysis service.
    pub base_url: String,
    pub chat_path: String,
    pub analyze_path: String,
    pub research_path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://medicare-backend-yk58.onrender.com".to_string(),
            chat_path: "/api/chat".to_string(),
            analyze_path: "/api/analyze".to_string(),
            research_path: "/api/research".to_string(),
        }
    }
}

impl BackendConfig {
    /// Full URL for one remote operation.
    pub fn endpoint(&self, kind: OperationKind) -> String {
        let path = match kind {
            OperationKind::Chat => &self.chat_path,
            OperationKind::Analysis => &self.analyze_path,
            OperationKind::Search => &self.research_path,
        };
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Transient notification timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// How long a toast stays visible.
    pub toast_duration_ms: u64,
    /// How long a copy target shows its "copied" acknowledgement.
    pub copy_ack_duration_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            toast_duration_ms: 3000,
            copy_ack_duration_ms: 2000,
        }
    }
}

impl NotificationConfig {
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn copy_ack_duration(&self) -> Duration {
        Duration::from_millis(self.copy_ack_duration_ms)
    }
}

/// Which physical camera to request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Rear camera, pointed away from the user.
    #[default]
    Environment,
    /// Front camera.
    User,
}

/// Camera capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub facing: Facing,
    /// Requested preview width in pixels.
    pub width: u32,
    /// Requested preview height in pixels.
    pub height: u32,
    /// JPEG quality for snapshots (1-100).
    pub jpeg_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            width: 1280,
            height: 720,
            jpeg_quality: 85,
        }
    }
}

/// Analysis upload limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Largest file accepted for upload, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}
