//! # Simulator Settings
//!
//! Either-or loading: without a settings file everything runs on
//! defaults; with one, the file must parse and the engine config must
//! validate, otherwise the run aborts before any worker starts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shelf_engine::{EngineError, KitchenConfig};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Path to the orders JSON file replayed through the engine.
    pub orders_file: PathBuf,
    /// Engine configuration; any omitted field keeps its default.
    pub kitchen: KitchenConfig,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            orders_file: PathBuf::from("orders.json"),
            kitchen: KitchenConfig::default(),
        }
    }
}

impl SimSettings {
    /// Loads settings from a JSON file, or returns defaults when no path
    /// is given or the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        let Some(path) = path else {
            info!("no settings file given, using defaults");
            return Ok(Self::default());
        };
        if !path.exists() {
            info!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|err| {
            EngineError::ConfigInvalid(format!("cannot read {}: {err}", path.display()))
        })?;
        let settings: SimSettings = serde_json::from_str(&raw).map_err(|err| {
            EngineError::ConfigInvalid(format!("cannot parse {}: {err}", path.display()))
        })?;
        settings.kitchen.validate()?;
        info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }
}
