//! Editor Settings
//!
//! Session-wide configuration for the forge core. Settings are plain data and
//! deserialize from JSON with every field optional:
//!
//! ```rust,ignore
//! use forge::settings::ForgeSettings;
//!
//! let settings = ForgeSettings::from_json_str(r#"{ "grid": { "tile_size": 2.0 } }"#)?;
//! let registry = Registry::with_settings(settings)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ForgeError, Result};
use crate::grid::GridConfig;

/// LOD simplification tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifySettings {
    /// Ratios at or above this value restore the cached original geometry.
    pub restore_threshold: f32,
}

impl Default for SimplifySettings {
    fn default() -> Self {
        Self {
            restore_threshold: 0.99,
        }
    }
}

/// Top-level settings consumed by [`Registry`](crate::registry::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeSettings {
    pub grid: GridConfig,
    pub simplify: SimplifySettings,
}

impl ForgeSettings {
    /// Parses and validates settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        let threshold = self.simplify.restore_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ForgeError::InvalidArgument(format!(
                "restore_threshold must be in (0, 1], got {threshold}"
            )));
        }
        Ok(())
    }
}
