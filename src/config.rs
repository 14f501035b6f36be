//! Interpreter Configuration
//!
//! Grid sizes, grid placement and parallelism used when building partial
//! dependence functions, with JSON persistence.
use crate::constants::{DEFAULT_GRID_SIZE, DEFAULT_PAIR_GRID_SIZE};
use crate::errors::PdpError;
use crate::grid::GridMethod;
use crate::utils::validate_min_parameter;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_grid_size() -> usize {
    DEFAULT_GRID_SIZE
}
fn default_pair_grid_size() -> usize {
    DEFAULT_PAIR_GRID_SIZE
}
fn default_parallel() -> bool {
    true
}

/// Configuration for an [`Interpreter`](crate::interpreter::Interpreter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdpConfig {
    /// Number of grid points for a continuous feature.
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    /// Number of grid points per continuous axis of a feature pair.
    #[serde(default = "default_pair_grid_size")]
    pub pair_grid_size: usize,
    /// Placement of continuous grid points.
    #[serde(default)]
    pub grid_method: GridMethod,
    /// Whether grid points are marginalized in parallel.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Number of threads for parallel marginalization, all available when `None`.
    #[serde(default)]
    pub num_threads: Option<usize>,
}

impl Default for PdpConfig {
    fn default() -> Self {
        PdpConfig {
            grid_size: DEFAULT_GRID_SIZE,
            pair_grid_size: DEFAULT_PAIR_GRID_SIZE,
            grid_method: GridMethod::Uniform,
            parallel: true,
            num_threads: None,
        }
    }
}

impl PdpConfig {
    pub fn validate(&self) -> Result<(), PdpError> {
        validate_min_parameter(self.grid_size, 2, "grid_size")?;
        validate_min_parameter(self.pair_grid_size, 2, "pair_grid_size")?;
        if let Some(n) = self.num_threads {
            validate_min_parameter(n, 1, "num_threads")?;
        }
        Ok(())
    }
}

/// IO
pub trait ConfigIO: Serialize + DeserializeOwned + Sized {
    /// Save as a json object to a file.
    ///
    /// * `path` - Path to save to.
    fn save_config<P: AsRef<Path>>(&self, path: P) -> Result<(), PdpError> {
        fs::write(path, self.json_dump()?).map_err(|e| PdpError::UnableToWrite(e.to_string()))
    }

    /// Dump as a json object
    fn json_dump(&self) -> Result<String, PdpError> {
        serde_json::to_string(self).map_err(|e| PdpError::UnableToWrite(e.to_string()))
    }

    /// Load from Json string
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, PdpError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| PdpError::UnableToRead(e.to_string()))
    }

    /// Load from a path to a json object.
    ///
    /// * `path` - Path to load from.
    fn load_config<P: AsRef<Path>>(path: P) -> Result<Self, PdpError> {
        let json_str = fs::read_to_string(path).map_err(|e| PdpError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ConfigIO for PdpConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = PdpConfig::default();
        assert_eq!(config.grid_size, 51);
        assert_eq!(config.pair_grid_size, 21);
        assert_eq!(config.grid_method, GridMethod::Uniform);
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate() {
        let config = PdpConfig {
            grid_size: 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PdpError::InvalidParameter(..))));
        let config = PdpConfig {
            num_threads: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json_defaults() {
        let config = PdpConfig::from_json(r#"{"grid_size": 11, "grid_method": "Quantile"}"#).unwrap();
        assert_eq!(config.grid_size, 11);
        assert_eq!(config.pair_grid_size, 21);
        assert_eq!(config.grid_method, GridMethod::Quantile);
        assert!(config.parallel);
        assert!(matches!(PdpConfig::from_json("{"), Err(PdpError::UnableToRead(_))));
    }

    #[test]
    fn test_config_io_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("pdp.json");
        let config = PdpConfig {
            grid_size: 7,
            num_threads: Some(2),
            ..Default::default()
        };
        config.save_config(&file_path).unwrap();
        let config2 = PdpConfig::load_config(&file_path).unwrap();
        assert_eq!(config, config2);
    }
}
