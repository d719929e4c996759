//! Startup registration of feature info
//!
//! Runs before the registry snapshot is taken. The built-in `swift` section
//! goes first so operator-declared sections of the same name replace it.

use serde_json::json;

use crate::Config;
use crate::registry::{InfoRegistry, section};

/// Name of the built-in section describing the cluster software
pub const SWIFT_SECTION: &str = "swift";

/// Register built-in and operator-declared sections
pub fn register_all(registry: &mut InfoRegistry, config: &Config) {
    registry.register_public(
        SWIFT_SECTION,
        section(json!({ "version": config.info.version })),
    );

    for (name, info) in &config.sections {
        registry.register_public(name.clone(), info.clone());
    }

    for (name, info) in &config.admin_sections {
        registry.register_admin(name.clone(), info.clone());
    }

    tracing::info!(
        public = config.sections.len() + 1,
        admin = config.admin_sections.len(),
        "registered feature info"
    );
}

#[cfg(test)]
mod tests {
    use crate::config::file::InfoConfigFile;

    use super::*;

    fn config(toml_src: &str) -> Config {
        let fc: InfoConfigFile = toml::from_str(toml_src).unwrap();
        Config::from_sources(fc, |_| None).unwrap()
    }

    #[test]
    fn registers_builtin_and_declared_sections() {
        let config = config(
            r#"
[info]
version = "2.31.0"
[sections.tempurl]
methods = ["GET"]
[admin_sections.qux]
quux = "corge"
"#,
        );
        let mut registry = InfoRegistry::new();
        register_all(&mut registry, &config);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.public()[SWIFT_SECTION]["version"], "2.31.0");
        assert_eq!(snapshot.public()["tempurl"]["methods"][0], "GET");
        assert_eq!(snapshot.admin()["qux"]["quux"], "corge");
        assert!(!snapshot.public().contains_key("qux"));
    }

    #[test]
    fn declared_section_replaces_builtin() {
        let config = config(
            r#"
[sections.swift]
version = "custom"
max_file_size = 5368709122
"#,
        );
        let mut registry = InfoRegistry::new();
        register_all(&mut registry, &config);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.public()[SWIFT_SECTION]["version"], "custom");
        assert_eq!(snapshot.public()[SWIFT_SECTION]["max_file_size"], 5_368_709_122_u64);
    }
}
