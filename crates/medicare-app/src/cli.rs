//! CLI argument definitions for the Medicare terminal client.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use medicare_capture::{CameraBackend, MockCaptureDevice, NullCaptureDevice, StillImageDevice};
use medicare_core::config::MedicareConfig;
use medicare_core::error::{MedicareError, Result};
use medicare_core::types::Language;

/// Medicare AI - chat, document analysis and medical research from the terminal.
#[derive(Parser, Debug)]
#[command(name = "medicare", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:8000.
    #[arg(long = "backend-url")]
    pub backend_url: Option<String>,

    /// Start-up language (en, fr).
    #[arg(long = "language")]
    pub language: Option<Language>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Camera backend.
    #[arg(long = "camera", value_enum, default_value_t = CameraKind::Mock)]
    pub camera: CameraKind,

    /// Image served by `--camera still`.
    #[arg(long = "still-image")]
    pub still_image: Option<PathBuf>,

    /// Clipboard backend.
    #[arg(long = "clipboard", value_enum, default_value_t = ClipboardKind::System)]
    pub clipboard: ClipboardKind,

    /// Write the effective configuration to the config path and exit.
    #[arg(long = "save-config")]
    pub save_config: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraKind {
    /// No camera; every request is denied.
    None,
    /// Synthetic frames.
    Mock,
    /// Frames from `--still-image`.
    Still,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipboardKind {
    System,
    Memory,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MEDICARE_CONFIG env var > ~/.medicare/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("MEDICARE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config: &MedicareConfig) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config.general.log_level.clone())
    }

    /// Apply overrides on top of the loaded configuration.
    ///
    /// The backend URL follows --backend-url > MEDICARE_BACKEND_URL > file.
    pub fn apply(&self, config: &mut MedicareConfig) {
        let env_url = std::env::var("MEDICARE_BACKEND_URL").ok();
        if let Some(url) = self.backend_url.clone().or(env_url) {
            config.backend.base_url = url;
        }
        if let Some(language) = self.language {
            config.general.language = language;
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }

    /// Build the selected camera backend.
    pub fn camera_backend(&self) -> Result<CameraBackend> {
        match self.camera {
            CameraKind::None => Ok(CameraBackend::Null(NullCaptureDevice)),
            CameraKind::Mock => Ok(CameraBackend::Mock(MockCaptureDevice::new())),
            CameraKind::Still => match self.still_image {
                Some(ref path) => Ok(CameraBackend::Still(StillImageDevice::new(path))),
                None => Err(MedicareError::Config(
                    "--camera still requires --still-image <path>".to_string(),
                )),
            },
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".medicare").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".medicare").join("config.toml");
    }
    PathBuf::from("config.toml")
}
