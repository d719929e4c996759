//! Info request handling
//!
//! Each request runs one pass: method check, exposure check, optional admin
//! capability check, optional extended info fetch, then assembly and
//! filtering of the payload. Nothing is retried here; the fetcher owns its
//! own attempt budget.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use serde_json::{Map, Value};

use crate::config::{InfoConfig, is_truthy};
use crate::error::InfoError;
use crate::fetcher::ExtendedInfoFetcher;
use crate::registry::{InfoSnapshot, SectionMap};
use crate::signature::{Authorization, CapabilityValidator};

/// Query flag requesting live extended info from the cluster
pub const EXTENDED_PARAM: &str = "swiftinfo_extended";

/// Top-level key holding admin-only info
pub const ADMIN_SECTION: &str = "admin";

/// Key under [`ADMIN_SECTION`] listing what was withheld
pub const DISALLOWED_KEY: &str = "disallowed_sections";

/// Assembled response body
pub type InfoPayload = Map<String, Value>;

/// The parts of an HTTP request the controller looks at
#[derive(Debug, Clone, Copy)]
pub struct InfoRequest<'a> {
    pub method: &'a Method,
    /// Request path without query string
    pub path: &'a str,
    pub params: &'a HashMap<String, String>,
}

/// Whether the info endpoint serves `method`
#[must_use]
pub fn is_allowed_method(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

/// Orchestrates registry, capability validation and extended info
#[derive(Debug)]
pub struct InfoController {
    snapshot: Arc<InfoSnapshot>,
    expose_info: bool,
    disallowed: Vec<String>,
    validator: CapabilityValidator,
    version: String,
    fetcher: Option<ExtendedInfoFetcher>,
}

impl InfoController {
    /// Create a controller serving `snapshot`
    #[must_use]
    pub fn new(snapshot: Arc<InfoSnapshot>, config: &InfoConfig) -> Self {
        Self {
            snapshot,
            expose_info: config.expose_info,
            disallowed: config.disallowed_sections.clone(),
            validator: CapabilityValidator::new(config.admin_key.as_ref()),
            version: config.version.clone(),
            fetcher: None,
        }
    }

    /// Enable extended info through `fetcher`
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: ExtendedInfoFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Whether admin access is possible at all
    #[must_use]
    pub const fn admin_enabled(&self) -> bool {
        self.validator.is_enabled()
    }

    /// Handle one info request
    ///
    /// # Errors
    ///
    /// Returns the request-level [`InfoError`] that ends the request
    pub async fn handle(&self, request: &InfoRequest<'_>) -> Result<InfoPayload, InfoError> {
        if !is_allowed_method(request.method) {
            return Err(InfoError::MethodNotAllowed);
        }

        if !self.expose_info {
            tracing::debug!("info request refused, disclosure disabled");
            return Err(InfoError::Forbidden);
        }

        let include_admin = self.check_admin(request)?;

        let extended = if wants_extended(request.params) {
            Some(self.fetch_extended().await?)
        } else {
            None
        };

        Ok(self.assemble(include_admin, extended))
    }

    fn check_admin(&self, request: &InfoRequest<'_>) -> Result<bool, InfoError> {
        if !CapabilityValidator::is_admin_request(request.params) {
            return Ok(false);
        }

        match self
            .validator
            .validate(request.method.as_str(), request.path, request.params)
        {
            Authorization::Authorized => {
                tracing::info!(method = %request.method, "admin info access granted");
                Ok(true)
            }
            Authorization::Rejected(reason) => {
                tracing::warn!(method = %request.method, %reason, "admin info access rejected");
                Err(InfoError::Unauthorized)
            }
        }
    }

    async fn fetch_extended(&self) -> Result<SectionMap, InfoError> {
        let Some(fetcher) = &self.fetcher else {
            tracing::warn!("extended info requested but no cluster nodes are configured");
            return Err(InfoError::ExtendedInfoUnavailable);
        };

        fetcher.fetch(&self.version).await.map_err(|e| {
            tracing::error!(error = %e, "failed to gather extended info");
            InfoError::ExtendedInfoUnavailable
        })
    }

    /// Build the payload: public sections, extended sections, then the admin
    /// envelope, with disallowed sections removed
    fn assemble(&self, include_admin: bool, extended: Option<SectionMap>) -> InfoPayload {
        let mut payload = to_payload(self.snapshot.public());

        if let Some(sections) = extended {
            for (name, info) in sections {
                payload.insert(name, Value::Object(info));
            }
        }

        for name in &self.disallowed {
            payload.remove(name);
        }

        if include_admin {
            let mut admin = to_payload(self.snapshot.admin());
            for name in &self.disallowed {
                admin.remove(name);
            }
            if !self.disallowed.is_empty() {
                let listed = self.disallowed.iter().cloned().map(Value::String).collect();
                admin.insert(DISALLOWED_KEY.to_string(), Value::Array(listed));
            }
            payload.insert(ADMIN_SECTION.to_string(), Value::Object(admin));
        }

        payload
    }
}

fn wants_extended(params: &HashMap<String, String>) -> bool {
    params.get(EXTENDED_PARAM).is_some_and(|v| is_truthy(v))
}

fn to_payload(sections: &SectionMap) -> InfoPayload {
    sections
        .iter()
        .map(|(name, info)| (name.clone(), Value::Object(info.clone())))
        .collect()
}
