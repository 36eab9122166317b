use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    video::VideoParams,
};

/// Main configuration for the Minicam-Compiler
///
/// Every knob the original tool kept as a top-of-script constant lives here
/// and is passed explicitly into each stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Clip staging settings
    pub staging: StagingConfig,

    /// Output video settings
    pub video: VideoConfig,

    /// Optional playback-speed conversion stage
    pub speed: SpeedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            staging: StagingConfig::default(),
            video: VideoConfig::default(),
            speed: SpeedConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|_| ConfigError::ParseFailed {
            path: path.display().to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.staging.validate()?;
        self.video.validate()?;
        self.speed.validate()?;
        Ok(())
    }

    /// Output parameters with the speed stage applied.
    ///
    /// Speed conversion re-times playback by scaling the declared output
    /// frame rate; frame content is untouched.
    pub fn effective_params(&self) -> VideoParams {
        let mut params = self.video.params.clone();
        if self.speed.enabled {
            params.fps *= self.speed.factor;
        }
        params
    }
}

/// Clip staging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Whether the rename/copy stage runs; when false the compiled folder
    /// must already hold staged clips from a previous run
    pub enabled: bool,

    /// Clip file extension without a leading dot
    pub extension: String,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            extension: "avi".to_string(),
        }
    }
}

impl StagingConfig {
    fn validate(&self) -> Result<()> {
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(ConfigError::InvalidValue {
                key: "staging.extension".to_string(),
                value: self.extension.clone(),
            }
            .into());
        }
        Ok(())
    }
}

/// Output video configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Output video parameters
    pub params: VideoParams,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            params: VideoParams::default(),
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        self.params.validate()
    }
}

/// Optional playback-speed conversion stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedConfig {
    /// Explicitly enables the stage; disabled runs ignore `factor`
    pub enabled: bool,

    /// Playback-rate multiplier (2.0 = twice as fast)
    pub factor: f64,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            factor: 1.0,
        }
    }
}

impl SpeedConfig {
    fn validate(&self) -> Result<()> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "speed.factor".to_string(),
                value: self.factor.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let original_config = Config::default();

        // Save and load
        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(
            original_config.staging.extension,
            loaded_config.staging.extension
        );
        assert_eq!(
            original_config.video.params.fps,
            loaded_config.video.params.fps
        );
        assert_eq!(
            original_config.video.params.resolution,
            loaded_config.video.params.resolution
        );
    }

    #[test]
    fn test_invalid_extension() {
        let mut config = Config::default();
        config.staging.extension = ".avi".to_string();
        assert!(config.validate().is_err());

        config.staging.extension = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_speed_factor() {
        let mut config = Config::default();
        config.speed.factor = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_effective_params_apply_speed_factor() {
        let mut config = Config::default();
        config.video.params.fps = 30.0;
        config.speed.enabled = true;
        config.speed.factor = 2.0;

        assert_eq!(config.effective_params().fps, 60.0);

        config.speed.enabled = false;
        assert_eq!(config.effective_params().fps, 30.0);
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempdir().unwrap();
        let err = Config::from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
