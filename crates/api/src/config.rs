//! Dashboard Configuration

use charts::ChartConfig;
use config::{Config, ConfigError, Environment, File, Source};
use feature_store::{StoreConfig, DEFAULT_BIN_COUNT};
use inference_engine::ForestConfig;
use serde::{Deserialize, Serialize};

/// Optional TOML file, relative to the working directory, without extension
pub const CONFIG_FILE: &str = "config/dashboard";
/// Prefix of environment overrides, e.g. `MAINTENANCE__BIND_ADDRESS`
pub const ENV_PREFIX: &str = "MAINTENANCE";

/// Dashboard server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Socket address to listen on
    pub bind_address: String,
    pub store: StoreConfig,
    pub forest: ForestConfig,
    pub chart: ChartConfig,
    /// Bins in the RUL histogram
    pub histogram_bins: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            store: StoreConfig::default(),
            forest: ForestConfig::default(),
            chart: ChartConfig::default(),
            histogram_bins: DEFAULT_BIN_COUNT,
        }
    }
}

impl DashboardConfig {
    /// Defaults, then `config/dashboard.toml` if present, then environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(File::with_name(CONFIG_FILE).required(false))
    }

    fn load_with<S>(file: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()?;

        if config.histogram_bins == 0 {
            return Err(ConfigError::Message("histogram_bins must be positive".to_string()));
        }
        if config.forest.n_trees == 0 {
            return Err(ConfigError::Message("forest.n_trees must be positive".to_string()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.forest.n_trees, 50);
        assert_eq!(config.forest.seed, 42);
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(
            config.store.data_path,
            PathBuf::from("data/processed/agri_features.csv")
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let toml = r#"
            bind_address = "127.0.0.1:9000"

            [forest]
            n_trees = 10
        "#;
        let config = DashboardConfig::load_with(File::from_str(toml, FileFormat::Toml)).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.forest.n_trees, 10);
        assert_eq!(config.forest.seed, 42);
        assert!(config.forest.balanced_class_weight);
        assert_eq!(config.histogram_bins, 30);
    }

    #[test]
    fn test_rejects_zero_bins() {
        let result = DashboardConfig::load_with(File::from_str("histogram_bins = 0", FileFormat::Toml));
        assert!(result.is_err());
    }
}
