//! Driver configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dstar_nav::PlannerConfig;
use serde::{Deserialize, Serialize};

/// Driver configuration, loaded from .dstar/config.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Planner limits and replan policy
    pub planner: PlannerConfig,

    /// Print the rendered map after every toggle, not only the final one
    pub render_each_step: bool,
}

impl DriverConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Explicit path wins; otherwise .dstar/config.yaml under `root` if present
    pub fn resolve(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path = default_config_path(root);
        if default_path.exists() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }
}

fn default_config_path(root: &Path) -> PathBuf {
    root.join(".dstar/config.yaml")
}
