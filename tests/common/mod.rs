//! Shared test utilities

#![allow(dead_code)]

use std::sync::Arc;

use httpmock::prelude::*;
use secrecy::SecretString;
use serde_json::{Value, json};
use swift_info_gateway::config::InfoConfig;
use swift_info_gateway::nodes::{HttpTransport, StaticNodeResolver, transport::NODE_INFO_PATH};
use swift_info_gateway::registry::section;
use swift_info_gateway::signature::{AdminKey, signed_query};
use swift_info_gateway::{ExtendedInfoFetcher, InfoController, InfoRegistry};
use url::Url;

pub const ADMIN_KEY: &str = "secret-admin-key";
pub const VERSION: &str = "2.31.0";

/// Registry with two public sections and one admin-only section
#[must_use]
pub fn test_registry() -> InfoRegistry {
    let mut registry = InfoRegistry::new();
    registry.register_public("swift", section(json!({"version": VERSION})));
    registry.register_public("tempurl", section(json!({"methods": ["GET", "HEAD", "PUT"]})));
    registry.register_public("bulk_delete", section(json!({"max_deletes_per_request": 10000})));
    registry.register_admin("tempurl", section(json!({"outgoing_remove_headers": []})));
    registry
}

/// Info config with admin access enabled
#[must_use]
pub fn test_info_config() -> InfoConfig {
    InfoConfig {
        admin_key: Some(SecretString::from(ADMIN_KEY.to_string())),
        version: VERSION.to_string(),
        ..InfoConfig::default()
    }
}

/// Controller over [`test_registry`] with `config`
#[must_use]
pub fn test_controller(config: &InfoConfig) -> InfoController {
    InfoController::new(test_registry().snapshot(), config)
}

/// Signed admin path for `method`, expiring `expires_in` seconds from now
#[must_use]
pub fn signed_info_uri(method: &str, path: &str, expires_in: i64) -> String {
    let key = AdminKey::new(ADMIN_KEY).expect("non-empty key");
    let expires = chrono::Utc::now().timestamp() + expires_in;
    format!("{path}?{}", signed_query(&key, method, path, expires))
}

/// One mock backend node serving `document` on its info path
pub struct MockNode {
    pub server: MockServer,
}

impl MockNode {
    /// Start a node answering every info request with `document`
    #[must_use]
    pub fn serving(document: Value) -> Self {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(NODE_INFO_PATH);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(document);
        });
        Self { server }
    }

    /// Start a node answering every info request with `status`
    #[must_use]
    pub fn failing(status: u16) -> Self {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(NODE_INFO_PATH);
            then.status(status);
        });
        Self { server }
    }

    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&self.server.base_url()).expect("mock server url")
    }
}

/// Info document a backend node reporting `version` would serve
#[must_use]
pub fn node_document(version: &str, name: &str, info: Value) -> Value {
    json!({"swift": {"version": version}, name: info})
}

/// Fetcher talking to one node per class over real HTTP
#[must_use]
pub fn http_fetcher(
    account: &MockNode,
    container: &MockNode,
    object: &MockNode,
) -> ExtendedInfoFetcher {
    let resolver = StaticNodeResolver::new(
        vec![account.base_url()],
        vec![container.base_url()],
        vec![object.base_url()],
    );
    let transport = HttpTransport::new(
        std::time::Duration::from_millis(500),
        std::time::Duration::from_secs(2),
    )
    .expect("http transport");
    ExtendedInfoFetcher::new(Arc::new(resolver), Arc::new(transport))
}
