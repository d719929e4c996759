//! Configuration management for the info gateway

pub mod file;

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::fetcher::MAX_EXTENDED_INFO_ATTEMPTS;
use crate::registry::SectionMap;
use crate::{Error, Result};

use self::file::InfoConfigFile;

/// Default API server port
pub const DEFAULT_PORT: u16 = 8080;

/// Default connect timeout for backend info calls
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Default read timeout for backend info calls
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(3);

/// Info gateway configuration
#[derive(Debug)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Info endpoint behavior
    pub info: InfoConfig,

    /// Backend nodes queried for extended info
    pub cluster: ClusterConfig,

    /// Publicly disclosed sections declared by the operator
    pub sections: SectionMap,

    /// Admin-only sections declared by the operator
    pub admin_sections: SectionMap,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

/// Info endpoint configuration
#[derive(Debug)]
pub struct InfoConfig {
    /// Serve `/info` at all; when false every request is forbidden
    pub expose_info: bool,

    /// Sections never disclosed, in first-seen order without duplicates
    pub disallowed_sections: Vec<String>,

    /// Secret for signed admin requests; absent or empty disables admin access
    pub admin_key: Option<SecretString>,

    /// Version string backend nodes must report for extended info
    pub version: String,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            expose_info: true,
            disallowed_sections: Vec::new(),
            admin_key: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Backend node configuration
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub account_nodes: Vec<Url>,
    pub container_nodes: Vec<Url>,
    pub object_nodes: Vec<Url>,

    /// Full rounds before extended info is declared unavailable
    pub max_attempts: u32,

    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            account_nodes: Vec::new(),
            container_nodes: Vec::new(),
            object_nodes: Vec::new(),
            max_attempts: MAX_EXTENDED_INFO_ATTEMPTS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl ClusterConfig {
    /// Whether every node class has at least one endpoint
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.account_nodes.is_empty()
            && !self.container_nodes.is_empty()
            && !self.object_nodes.is_empty()
    }
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if a configured node URL is invalid
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with environment lookups (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if a configured node URL is invalid
    pub fn from_sources(fc: InfoConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let server = ServerConfig {
            port: env("SWIFT_INFO_PORT")
                .or_else(|| env("PORT"))
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
        };

        let defaults = InfoConfig::default();
        let info = InfoConfig {
            expose_info: env("SWIFT_INFO_EXPOSE")
                .map(|v| is_truthy(&v))
                .or(fc.info.expose_info)
                .unwrap_or(defaults.expose_info),
            disallowed_sections: dedup_preserving_order(
                env("SWIFT_INFO_DISALLOWED_SECTIONS")
                    .map(|v| split_list(&v))
                    .or(fc.info.disallowed_sections)
                    .unwrap_or_default(),
            ),
            admin_key: env("SWIFT_INFO_ADMIN_KEY")
                .or(fc.info.admin_key)
                .filter(|k| !k.is_empty())
                .map(SecretString::from),
            version: env("SWIFT_INFO_VERSION")
                .or(fc.info.version)
                .unwrap_or(defaults.version),
        };

        let cluster_defaults = ClusterConfig::default();
        let cluster = ClusterConfig {
            account_nodes: parse_nodes(
                env("SWIFT_INFO_ACCOUNT_NODES")
                    .map(|v| split_list(&v))
                    .or(fc.cluster.account_nodes),
            )?,
            container_nodes: parse_nodes(
                env("SWIFT_INFO_CONTAINER_NODES")
                    .map(|v| split_list(&v))
                    .or(fc.cluster.container_nodes),
            )?,
            object_nodes: parse_nodes(
                env("SWIFT_INFO_OBJECT_NODES")
                    .map(|v| split_list(&v))
                    .or(fc.cluster.object_nodes),
            )?,
            max_attempts: fc
                .cluster
                .max_attempts
                .unwrap_or(cluster_defaults.max_attempts)
                .max(1),
            connect_timeout: fc
                .cluster
                .connect_timeout_ms
                .map_or(cluster_defaults.connect_timeout, Duration::from_millis),
            read_timeout: fc
                .cluster
                .read_timeout_ms
                .map_or(cluster_defaults.read_timeout, Duration::from_millis),
        };

        if !info.expose_info {
            tracing::info!("info disclosure disabled");
        }
        if info.admin_key.is_none() {
            tracing::debug!("no admin key configured, admin info disabled");
        }

        Ok(Self {
            server,
            info,
            cluster,
            sections: fc.sections,
            admin_sections: fc.admin_sections,
        })
    }
}

/// Interpret a config flag: `1`, `true`, `yes` and `on` (any case) are true
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn parse_nodes(raw: Option<Vec<String>>) -> Result<Vec<Url>> {
    raw.unwrap_or_default()
        .iter()
        .map(|s| {
            Url::parse(s).map_err(|e| Error::Config(format!("invalid node url {s:?}: {e}")))
        })
        .collect()
}
