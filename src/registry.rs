//! Feature info registration
//!
//! Feature modules disclose their configuration by registering an
//! [`InfoSection`] under their name, either publicly or admin-only.
//! Registration happens once at startup; request handlers only ever see
//! the immutable [`InfoSnapshot`] taken afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

/// One feature's disclosed configuration
pub type InfoSection = Map<String, Value>;

/// Feature name to section mapping
pub type SectionMap = BTreeMap<String, InfoSection>;

/// Startup-time registry of public and admin-only feature info
#[derive(Debug, Default, Clone)]
pub struct InfoRegistry {
    public: SectionMap,
    admin: SectionMap,
}

impl InfoRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `section` under `name`, replacing any previous section of
    /// that name in the same mapping
    pub fn register(&mut self, name: impl Into<String>, section: InfoSection, admin: bool) {
        let name = name.into();
        tracing::debug!(feature = %name, admin, keys = section.len(), "registered info section");

        if admin {
            self.admin.insert(name, section);
        } else {
            self.public.insert(name, section);
        }
    }

    /// Register a publicly disclosed section
    pub fn register_public(&mut self, name: impl Into<String>, section: InfoSection) {
        self.register(name, section, false);
    }

    /// Register an admin-only section
    pub fn register_admin(&mut self, name: impl Into<String>, section: InfoSection) {
        self.register(name, section, true);
    }

    /// Drop every registration (test isolation)
    pub fn reset(&mut self) {
        self.public.clear();
        self.admin.clear();
    }

    /// Freeze the current registrations for request handling
    #[must_use]
    pub fn snapshot(&self) -> Arc<InfoSnapshot> {
        Arc::new(InfoSnapshot {
            public: self.public.clone(),
            admin: self.admin.clone(),
        })
    }
}

/// Read-only view of the registry shared by all requests
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InfoSnapshot {
    public: SectionMap,
    admin: SectionMap,
}

impl InfoSnapshot {
    /// Publicly disclosed sections
    #[must_use]
    pub const fn public(&self) -> &SectionMap {
        &self.public
    }

    /// Admin-only sections
    #[must_use]
    pub const fn admin(&self) -> &SectionMap {
        &self.admin
    }
}

/// Build an [`InfoSection`] from a JSON object literal
///
/// Non-object values yield an empty section.
#[must_use]
pub fn section(value: Value) -> InfoSection {
    match value {
        Value::Object(map) => map,
        _ => InfoSection::new(),
    }
}
