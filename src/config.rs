//! Pipeline switches and imputation settings.
//!
//! The configuration is a plain value handed to
//! [`DatasetPipeline`](crate::processors::DatasetPipeline); stages never
//! read it from disk themselves. [`PipelineConfig::load`] layers a YAML file
//! and `ENERGY_PREP__*` environment variables on top of the defaults.

use crate::error::Result;
use crate::utils::constants::{CONFIG_ENV_PREFIX, DEFAULT_IMPUTER_MAX_ITER, DEFAULT_IMPUTER_TOLERANCE};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    /// Derive `relative_humidity`, `air_temp_f` and `feels_like_temp`
    pub include_feels_like: bool,

    /// Rebuild the hourly weather timeline and impute missing readings
    pub impute_weather_data: bool,

    /// Convert weather timestamps from UTC to each site's local time
    pub localize_timestamps: bool,

    #[validate(nested)]
    pub imputation: ImputationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ImputationSettings {
    #[validate(range(min = 1))]
    pub max_iter: usize,

    #[validate(range(min = 0.0))]
    pub tolerance: f64,
}

impl Default for ImputationSettings {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_IMPUTER_MAX_ITER,
            tolerance: DEFAULT_IMPUTER_TOLERANCE,
        }
    }
}

impl PipelineConfig {
    /// Every optional stage enabled.
    pub fn all_stages() -> Self {
        Self {
            include_feels_like: true,
            impute_weather_data: true,
            localize_timestamps: true,
            imputation: ImputationSettings::default(),
        }
    }

    pub fn with_feels_like(mut self, enabled: bool) -> Self {
        self.include_feels_like = enabled;
        self
    }

    pub fn with_imputation(mut self, enabled: bool) -> Self {
        self.impute_weather_data = enabled;
        self
    }

    pub fn with_localization(mut self, enabled: bool) -> Self {
        self.localize_timestamps = enabled;
        self
    }

    /// Load from a YAML file, then apply environment overrides.
    ///
    /// With `required = false` a missing file falls back to the defaults.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(Self::environment())
            .build()?;

        Self::finish(settings)
    }

    /// Parse a YAML document without touching the filesystem.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;

        Self::finish(settings)
    }

    fn environment() -> Environment {
        Environment::with_prefix(CONFIG_ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    fn finish(settings: Config) -> Result<Self> {
        let config: PipelineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// One-line description of the enabled stages.
    pub fn summary(&self) -> String {
        let flag = |enabled: bool| if enabled { "on" } else { "off" };
        format!(
            "feels_like={}, impute={} (max_iter={}, tol={}), localize={}",
            flag(self.include_feels_like),
            flag(self.impute_weather_data),
            self.imputation.max_iter,
            self.imputation.tolerance,
            flag(self.localize_timestamps)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_switches() -> Result<()> {
        let config = PipelineConfig::from_yaml_str(
            "include_feels_like: true\nimpute_weather_data: false\nlocalize_timestamps: true\n",
        )?;

        assert!(config.include_feels_like);
        assert!(!config.impute_weather_data);
        assert!(config.localize_timestamps);
        assert_eq!(config.imputation, ImputationSettings::default());
        Ok(())
    }

    #[test]
    fn test_missing_keys_default_to_off() -> Result<()> {
        let config = PipelineConfig::from_yaml_str("include_feels_like: true\n")?;
        assert_eq!(config, PipelineConfig::default().with_feels_like(true));
        Ok(())
    }

    #[test]
    fn test_nested_imputation_settings() -> Result<()> {
        let config = PipelineConfig::from_yaml_str(
            "impute_weather_data: true\nimputation:\n  max_iter: 5\n  tolerance: 0.01\n",
        )?;
        assert_eq!(config.imputation.max_iter, 5);
        assert!((config.imputation.tolerance - 0.01).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let result = PipelineConfig::from_yaml_str("imputation:\n  max_iter: 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile()?;
        writeln!(file, "include_feels_like: false")?;
        writeln!(file, "impute_weather_data: true")?;
        writeln!(file, "localize_timestamps: false")?;

        let config = PipelineConfig::load(file.path(), true)?;
        assert!(config.impute_weather_data);
        assert!(!config.include_feels_like);
        Ok(())
    }

    #[test]
    fn test_optional_file_may_be_absent() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = PipelineConfig::load(&dir.path().join("absent.yml"), false)?;
        assert!(!config.impute_weather_data);
        Ok(())
    }

    #[test]
    fn test_required_file_must_exist() {
        let file = NamedTempFile::new().unwrap();
        let missing = file.path().with_extension("missing.yml");
        assert!(PipelineConfig::load(&missing, true).is_err());
    }
}
