//! Service configuration for the chargecast prediction API
//!
//! Defaults can be overridden by environment variables:
//! - `CHARGECAST_ADDR`: bind address for the HTTP server
//! - `CHARGECAST_MODEL_DIR`: directory holding the prediction artifacts

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the serialized encoding mapping inside the model directory
pub const PREPROCESSOR_FILE: &str = "preprocessor.json";

/// File name of the serialized regression model inside the model directory
pub const MODEL_FILE: &str = "model.json";

/// Configuration for the inference service and its HTTP server
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Server bind address
    pub addr: SocketAddr,
    /// Directory holding the serialized model and preprocessor artifacts
    pub model_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 8000).into(),
            model_dir: PathBuf::from("models/trained"),
        }
    }
}

impl ServiceConfig {
    /// Build a configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = env::var("CHARGECAST_ADDR") {
            match addr.parse() {
                Ok(parsed) => {
                    debug!("Using bind address from CHARGECAST_ADDR: {}", parsed);
                    config.addr = parsed;
                }
                Err(e) => {
                    warn!("Ignoring invalid CHARGECAST_ADDR {:?}: {}", addr, e);
                }
            }
        }

        if let Ok(dir) = env::var("CHARGECAST_MODEL_DIR") {
            if !dir.is_empty() {
                debug!("Using model directory from CHARGECAST_MODEL_DIR: {}", dir);
                config.model_dir = PathBuf::from(dir);
            }
        }

        config
    }

    /// Replace the model directory
    pub fn with_model_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.model_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Path of the serialized encoding mapping artifact
    pub fn preprocessor_path(&self) -> PathBuf {
        self.model_dir.join(PREPROCESSOR_FILE)
    }

    /// Path of the serialized model artifact
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.addr.port(), 8000);
        assert_eq!(config.model_dir, PathBuf::from("models/trained"));
    }

    #[test]
    fn test_artifact_paths() {
        let config = ServiceConfig::default().with_model_dir("/tmp/artifacts");
        assert_eq!(
            config.preprocessor_path(),
            PathBuf::from("/tmp/artifacts/preprocessor.json")
        );
        assert_eq!(config.model_path(), PathBuf::from("/tmp/artifacts/model.json"));
    }
}
