use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Repair settings, loaded from a TOML file or assembled from CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Filename of the metadata documents to repair (case-insensitive match).
    pub meta_filename: String,
    /// Extension that identifies a scanned-image reference.
    pub image_extension: String,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            meta_filename: "meta.xml".to_string(),
            image_extension: ".tif".to_string(),
        }
    }
}

impl RepairConfig {
    /// Load a config from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}

// ─── Tests ─────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RepairConfig::default();
        assert_eq!(config.meta_filename, "meta.xml");
        assert_eq!(config.image_extension, ".tif");
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("metsfix.toml");
        std::fs::write(&path, "image_extension = \".jpg\"\n").unwrap();

        let config = RepairConfig::load(&path).unwrap();
        assert_eq!(config.image_extension, ".jpg");
        assert_eq!(config.meta_filename, "meta.xml");
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("metsfix.toml");
        std::fs::write(&path, "meta_filename = [broken").unwrap();

        assert!(RepairConfig::load(&path).is_err());
    }
}
