//! # CLI Configuration
//!
//! Optional YAML file with one section per engine component. Every section
//! and every field inside it falls back to its default, so an empty file
//! (or no file) is a valid configuration.
//!
//! ```yaml
//! layout:
//!   nodeWidth: 200
//! conflicts:
//!   exclusive: [[local_custody, foreign_custody]]
//! schemaDir: schemas
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use droit_conflict::ConflictPolicy;
use droit_layout::LayoutConfig;

/// Environment variable consulted when `--config` is not given.
pub const CONFIG_ENV_VAR: &str = "DROIT_CONFIG";

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DroitConfig {
    /// Node dimensions and spacing for `droit layout`.
    pub layout: LayoutConfig,
    /// Obligation relations and resolution overrides for `droit cross-border`.
    pub conflicts: ConflictPolicy,
    /// Load rule schemas from this directory instead of the bundled copy.
    /// Relative paths are taken from the configuration file's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_dir: Option<PathBuf>,
}

impl DroitConfig {
    /// Load from `explicit`, else from `$DROIT_CONFIG`, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        };
        config
            .layout
            .validate()
            .with_context(|| format!("invalid layout section in {}", path.display()))?;
        if let (Some(dir), Some(base)) = (config.schema_dir.as_mut(), path.parent()) {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droit_conflict::{ConflictType, ResolutionStrategy};

    fn write(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("droit.yaml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = DroitConfig::from_file(&write(dir.path(), "")).unwrap();
        assert_eq!(config, DroitConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "layout:\n  nodeWidth: 220\nconflicts:\n  resolutions:\n    decision: home_jurisdiction\n",
        );
        let config = DroitConfig::from_file(&path).unwrap();
        assert_eq!(config.layout.node_width, 220.0);
        assert_eq!(config.layout.node_height, LayoutConfig::default().node_height);
        assert_eq!(
            config.conflicts.resolution_for(ConflictType::Decision),
            ResolutionStrategy::HomeJurisdiction
        );
    }

    #[test]
    fn schema_dir_is_relative_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = DroitConfig::from_file(&write(dir.path(), "schemaDir: schemas\n")).unwrap();
        assert_eq!(config.schema_dir, Some(dir.path().join("schemas")));
    }

    #[test]
    fn invalid_layout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "layout:\n  nodeWidth: 0\n");
        let err = DroitConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("nodeWidth"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = DroitConfig::from_file(Path::new("/nonexistent/droit.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/droit.yaml"));
    }
}
