//! Linear models stored as `{dir}/{SYMBOL}_model.json`.

use std::fs;
use std::path::PathBuf;

use crate::domain::error::StocklensError;
use crate::domain::model::LinearModel;
use crate::ports::config_port::ConfigPort;
use crate::ports::model_port::ModelPort;

pub const DEFAULT_MODELS_DIR: &str = "ml_models";

pub struct JsonModelAdapter {
    dir: PathBuf,
}

impl JsonModelAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let dir = config
            .get_string("models", "dir")
            .unwrap_or_else(|| DEFAULT_MODELS_DIR.to_string());
        Self::new(dir)
    }

    pub fn model_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}_model.json"))
    }
}

impl ModelPort for JsonModelAdapter {
    fn load(&self, symbol: &str) -> Result<LinearModel, StocklensError> {
        let path = self.model_path(symbol);
        if !path.exists() {
            return Err(StocklensError::ModelNotFound {
                symbol: symbol.to_string(),
            });
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| StocklensError::ModelInvalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn save(&self, model: &LinearModel) -> Result<(), StocklensError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.model_path(&model.symbol);
        let json = serde_json::to_string_pretty(model).map_err(|e| StocklensError::ModelInvalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_model() -> LinearModel {
        LinearModel {
            symbol: "IBM".into(),
            intercept: 150.0,
            slope: 0.1,
            samples: 42,
        }
    }

    #[test]
    fn missing_model_is_not_found() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonModelAdapter::new(dir.path());
        match adapter.load("IBM") {
            Err(StocklensError::ModelNotFound { symbol }) => assert_eq!(symbol, "IBM"),
            other => panic!("expected ModelNotFound, got {other:?}"),
        }
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonModelAdapter::new(dir.path().join("nested"));
        adapter.save(&sample_model()).unwrap();

        assert!(adapter.model_path("IBM").ends_with("IBM_model.json"));
        assert_eq!(adapter.load("IBM").unwrap(), sample_model());
    }

    #[test]
    fn corrupt_model_is_invalid() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonModelAdapter::new(dir.path());
        fs::write(adapter.model_path("IBM"), "not json").unwrap();
        assert!(matches!(
            adapter.load("IBM"),
            Err(StocklensError::ModelInvalid { .. })
        ));
    }
}
