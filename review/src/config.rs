use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::{FusionMethod, FusionSettings, QcThresholds, UploadLimits};

use crate::error::{Result, ReviewError};

pub const DEFAULT_CONFIG_PATH: &str = "config/review.yaml";
const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub version: u32,
    pub fusion: FusionSettings,
    pub qc: QcThresholds,
    pub upload: UploadLimits,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            fusion: FusionSettings::default(),
            qc: QcThresholds::default(),
            upload: UploadLimits::default(),
        }
    }
}

impl ReviewConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ReviewError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ReviewConfig =
            serde_yaml::from_str(&config_str).map_err(|source| ReviewError::ConfigFile {
                path: path.to_path_buf(),
                source,
            })?;

        if config.version != CONFIG_VERSION {
            return Err(ReviewError::ConfigVersion(config.version));
        }
        config.fusion.validate()?;
        Ok(config)
    }

    /// Resolution order: explicit path (flag or `SKIN_DX_CONFIG`), then
    /// [`DEFAULT_CONFIG_PATH`] if it exists, then built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            log::info!("Loading config from {}", path.display());
            return Self::load(path);
        }

        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            log::info!("Loading config from {}", default_path.display());
            return Self::load(&default_path);
        }

        log::debug!("No config file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Settings for one fusion run, with command-line values taking
    /// precedence over the file.
    pub fn fusion_settings(
        &self,
        method: Option<FusionMethod>,
        quality_threshold: Option<f64>,
    ) -> Result<FusionSettings> {
        let settings = FusionSettings::new(
            method.unwrap_or(self.fusion.method),
            quality_threshold.unwrap_or(self.fusion.quality_threshold),
        )?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = write_config(
            "version: 1\nfusion:\n  method: majority\nqc:\n  blur:\n    max: 120.0\n",
        );
        let config = ReviewConfig::load(file.path()).unwrap();

        assert_eq!(config.fusion.method, FusionMethod::Majority);
        assert_eq!(config.fusion.quality_threshold, 0.7);
        assert_eq!(config.qc.blur.max, 120.0);
        assert_eq!(config.qc.blur.optimal_min, 200.0);
        assert_eq!(config.qc.brightness, QcThresholds::default().brightness);
        assert_eq!(config.upload, UploadLimits::default());
    }

    #[test]
    fn rejects_unknown_version() {
        let file = write_config("version: 2\n");
        assert!(matches!(
            ReviewConfig::load(file.path()),
            Err(ReviewError::ConfigVersion(2))
        ));
    }

    #[test]
    fn rejects_out_of_range_threshold_in_file() {
        let file = write_config("fusion:\n  quality_threshold: 1.2\n");
        assert!(matches!(
            ReviewConfig::load(file.path()),
            Err(ReviewError::Settings(_))
        ));
    }

    #[test]
    fn malformed_yaml_reports_path() {
        let file = write_config("fusion: [not, a, map\n");
        let err = ReviewConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ReviewError::ConfigFile { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        assert!(matches!(
            ReviewConfig::resolve(Some(missing.as_path())),
            Err(ReviewError::Read { .. })
        ));
    }

    #[test]
    fn command_line_overrides_file_settings() {
        let config = ReviewConfig::default();
        let settings = config
            .fusion_settings(Some(FusionMethod::Average), Some(0.2))
            .unwrap();
        assert_eq!(settings.method, FusionMethod::Average);
        assert_eq!(settings.quality_threshold, 0.2);

        let settings = config.fusion_settings(None, None).unwrap();
        assert_eq!(settings, FusionSettings::default());

        assert!(config.fusion_settings(None, Some(-0.1)).is_err());
    }
}
