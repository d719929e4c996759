//! TOML configuration file loading
//!
//! Supports `~/.config/swift-info/config.toml` (or the path in
//! `SWIFT_INFO_CONFIG`) as a persistent config source. All fields are
//! optional; the file is a partial overlay on top of defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::registry::InfoSection;
use crate::Result;

/// Env var overriding the config file location
pub const CONFIG_PATH_ENV: &str = "SWIFT_INFO_CONFIG";

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct InfoConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Info endpoint behavior
    #[serde(default)]
    pub info: InfoFileConfig,

    /// Backend nodes queried for extended info
    #[serde(default)]
    pub cluster: ClusterFileConfig,

    /// Publicly disclosed feature sections
    #[serde(default)]
    pub sections: BTreeMap<String, InfoSection>,

    /// Admin-only feature sections
    #[serde(default)]
    pub admin_sections: BTreeMap<String, InfoSection>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,
}

/// Info endpoint configuration
#[derive(Debug, Default, Deserialize)]
pub struct InfoFileConfig {
    /// Serve `/info` at all
    pub expose_info: Option<bool>,

    /// Sections never disclosed
    pub disallowed_sections: Option<Vec<String>>,

    /// Secret for signed admin requests
    pub admin_key: Option<String>,

    /// Version string backend nodes must report
    pub version: Option<String>,
}

/// Backend node configuration
#[derive(Debug, Default, Deserialize)]
pub struct ClusterFileConfig {
    pub account_nodes: Option<Vec<String>>,
    pub container_nodes: Option<Vec<String>>,
    pub object_nodes: Option<Vec<String>>,
    pub max_attempts: Option<u32>,
    pub connect_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `InfoConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file() -> InfoConfigFile {
    let Some(path) = config_file_path() else {
        return InfoConfigFile::default();
    };

    if !path.exists() {
        return InfoConfigFile::default();
    }

    match load_from_path(&path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config file");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            InfoConfigFile::default()
        }
    }
}

/// Read and parse a config file
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn load_from_path(path: &Path) -> Result<InfoConfigFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Return the config file path: `SWIFT_INFO_CONFIG` or `~/.config/swift-info/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }

    directories::BaseDirs::new().map(|d| d.config_dir().join("swift-info").join("config.toml"))
}
