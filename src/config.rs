use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Dataset opened on start when nothing else is given.
pub const DEFAULT_DATA_PATH: &str = "mobile_addiction_data.csv";

/// Dashboard settings, read from an optional JSON file.
/// Missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    /// Rows shown in the data preview table.
    pub preview_rows: usize,
    /// Countries selected on load when the dataset has more than this many.
    pub default_country_limit: usize,
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            preview_rows: 200,
            default_country_limit: 10,
            window_size: [1280.0, 860.0],
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Defaults, overlaid by `path` when given.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{ "preview_rows": 50 }"#).unwrap();

        let cfg = DashboardConfig::resolve(Some(&path)).unwrap();
        assert_eq!(cfg.preview_rows, 50);
        assert_eq!(cfg.default_country_limit, 10);
        assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, "preview_rows = 50").unwrap();
        assert!(DashboardConfig::resolve(Some(&path)).is_err());
    }
}
