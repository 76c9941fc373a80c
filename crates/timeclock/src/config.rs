//! Configuration management for timeclock.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::camera::{Facing, ImageRef, SnapshotEncoding, StreamRequest, DEFAULT_JPEG_QUALITY};
use crate::employee::{Employee, EmployeeId};
use crate::error::{Error, Result, ValidationError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "timeclock";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "TIMECLOCK_";

/// Default delay between capture and logging, in milliseconds.
pub const DEFAULT_PROCESSING_DELAY_MS: u64 = 1200;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `TIMECLOCK_`, `__` between levels)
/// 2. TOML config file at `~/.config/timeclock/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera configuration.
    pub camera: CameraConfig,
    /// Clock action configuration.
    pub clock: ClockConfig,
    /// Employee registry configuration.
    pub registry: RegistryConfig,
}

/// Where frames come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraSource {
    /// Generated test pattern.
    #[default]
    TestPattern,
    /// An image file refreshed by an external grabber.
    StillImage,
}

/// Camera-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Frame source.
    pub source: CameraSource,
    /// Image file for the `still_image` source.
    pub image_path: Option<PathBuf>,
    /// Preferred camera direction.
    pub facing: Facing,
    /// Preferred frame width.
    pub width: u32,
    /// Preferred frame height.
    pub height: u32,
    /// Mirror snapshots to match the preview.
    pub mirror: bool,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
}

/// Clock action configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Pause between capture and the log entry appearing.
    pub processing_delay_ms: u64,
}

/// Registry-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Employees registered at startup.
    pub seed_employees: Vec<SeedEmployee>,
}

/// An employee profile listed in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEmployee {
    /// National ID.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Profile photo URL.
    pub photo_url: String,
}

impl SeedEmployee {
    /// Validate the seed and turn it into an [`Employee`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed ID or blank name.
    pub fn to_employee(&self) -> std::result::Result<Employee, ValidationError> {
        Employee::new(
            EmployeeId::parse(self.id.as_str())?,
            self.first_name.as_str(),
            self.last_name.as_str(),
            ImageRef::from_url(self.photo_url.as_str()),
        )
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source: CameraSource::TestPattern,
            image_path: None,
            facing: Facing::User,
            width: 640,
            height: 480,
            mirror: true,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            processing_delay_ms: DEFAULT_PROCESSING_DELAY_MS,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            seed_employees: default_seed_employees(),
        }
    }
}

/// Demo profiles available on a fresh kiosk.
#[must_use]
pub fn default_seed_employees() -> Vec<SeedEmployee> {
    vec![
        SeedEmployee {
            id: "1234567890123".to_string(),
            first_name: "Alex".to_string(),
            last_name: "Hartman".to_string(),
            photo_url: "https://picsum.photos/id/237/200/200".to_string(),
        },
        SeedEmployee {
            id: "9876543210987".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            photo_url: "https://picsum.photos/id/1027/200/200".to_string(),
        },
    ]
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `TIMECLOCK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.camera.jpeg_quality) {
            return Err(Error::config_validation(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.camera.jpeg_quality
            )));
        }

        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(Error::config_validation(
                "camera width and height must be greater than 0",
            ));
        }

        if self.camera.source == CameraSource::StillImage && self.camera.image_path.is_none() {
            return Err(Error::config_validation(
                "image_path is required for the still_image camera source",
            ));
        }

        let mut seen = HashSet::new();
        for seed in &self.registry.seed_employees {
            seed.to_employee().map_err(|err| {
                Error::config_validation(format!("seed employee '{}': {err}", seed.id))
            })?;
            if !seen.insert(seed.id.as_str()) {
                return Err(Error::config_validation(format!(
                    "seed employee ID {} is listed twice",
                    seed.id
                )));
            }
        }

        Ok(())
    }

    /// The stream to request from the camera.
    #[must_use]
    pub fn stream_request(&self) -> StreamRequest {
        StreamRequest {
            facing: self.camera.facing,
            width: self.camera.width,
            height: self.camera.height,
        }
    }

    /// How snapshots are encoded.
    #[must_use]
    pub fn snapshot_encoding(&self) -> SnapshotEncoding {
        SnapshotEncoding {
            mirror: self.camera.mirror,
            jpeg_quality: self.camera.jpeg_quality,
        }
    }

    /// Get the processing delay as a Duration.
    #[must_use]
    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.clock.processing_delay_ms)
    }
}
