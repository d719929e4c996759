//! Extended info: live, cross-checked info from backend nodes
//!
//! One round asks a node of every class for its info document concurrently.
//! A round fails if any call fails, answers non-2xx, returns an unparsable
//! document or reports a version other than the local one. Failed rounds are
//! retried as a whole, without reusing anything from earlier rounds, until
//! the attempt budget shared by the whole fetch is spent.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::nodes::transport::node_info_url;
use crate::nodes::{InfoTransport, NodeClass, NodeResolver};
use crate::registry::{InfoSection, SectionMap};

/// Default number of full rounds before giving up
pub const MAX_EXTENDED_INFO_ATTEMPTS: u32 = 5;

/// Default upper bound on a single backend call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a single round failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("{class}: no endpoint: {reason}")]
    Resolve { class: NodeClass, reason: String },

    #[error("{class}: request failed: {reason}")]
    Transport { class: NodeClass, reason: String },

    #[error("{class}: timed out")]
    Timeout { class: NodeClass },

    #[error("{class}: status {status}")]
    Status { class: NodeClass, status: u16 },

    #[error("{class}: unparsable info document: {reason}")]
    Unparsable { class: NodeClass, reason: String },

    #[error("{class}: version {reported} does not match {expected}")]
    VersionMismatch {
        class: NodeClass,
        expected: String,
        reported: String,
    },
}

/// The attempt budget was exhausted
///
/// Callers treat this uniformly as "extended info unavailable"; `last` is
/// kept for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("extended info unavailable after {attempts} attempts (last: {last})")]
pub struct ExtraInfoError {
    pub attempts: u32,
    pub last: FetchFailure,
}

/// Info document served by a backend node
#[derive(Debug, Deserialize)]
struct NodeInfoDocument {
    swift: SwiftSection,
    #[serde(flatten)]
    sections: BTreeMap<String, InfoSection>,
}

#[derive(Debug, Deserialize)]
struct SwiftSection {
    version: String,
}

/// Fetches and merges extended info from one node of each class
#[derive(Clone)]
pub struct ExtendedInfoFetcher {
    resolver: Arc<dyn NodeResolver>,
    transport: Arc<dyn InfoTransport>,
    max_attempts: u32,
    call_timeout: Duration,
}

impl std::fmt::Debug for ExtendedInfoFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedInfoFetcher")
            .field("max_attempts", &self.max_attempts)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl ExtendedInfoFetcher {
    /// Create a fetcher with the default attempt budget and call timeout
    #[must_use]
    pub fn new(resolver: Arc<dyn NodeResolver>, transport: Arc<dyn InfoTransport>) -> Self {
        Self {
            resolver,
            transport,
            max_attempts: MAX_EXTENDED_INFO_ATTEMPTS,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Set the number of rounds (at least one)
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the upper bound on a single backend call
    #[must_use]
    pub const fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Fetch and merge all non-`swift` sections reported by the cluster
    ///
    /// Sections are merged account, then container, then object; a later
    /// class overwrites an earlier one on key collision.
    ///
    /// # Errors
    ///
    /// Returns [`ExtraInfoError`] once every round has failed
    pub async fn fetch(&self, local_version: &str) -> Result<SectionMap, ExtraInfoError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetch_round(local_version).await {
                Ok(merged) => {
                    tracing::debug!(attempt, sections = merged.len(), "extended info fetched");
                    return Ok(merged);
                }
                Err(failure) if attempt >= self.max_attempts => {
                    tracing::error!(
                        attempts = attempt,
                        error = %failure,
                        "extended info unavailable"
                    );
                    return Err(ExtraInfoError {
                        attempts: attempt,
                        last: failure,
                    });
                }
                Err(failure) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %failure,
                        "extended info round failed, retrying"
                    );
                }
            }
        }
    }

    async fn fetch_round(&self, local_version: &str) -> Result<SectionMap, FetchFailure> {
        let calls = NodeClass::ALL.map(|class| self.fetch_one(class, local_version));
        let results = futures::future::join_all(calls).await;

        let mut merged = SectionMap::new();
        for result in results {
            merged.extend(result?);
        }
        Ok(merged)
    }

    async fn fetch_one(
        &self,
        class: NodeClass,
        local_version: &str,
    ) -> Result<SectionMap, FetchFailure> {
        let url = self
            .resolver
            .resolve_endpoint(class)
            .and_then(|endpoint| node_info_url(&endpoint))
            .map_err(|e| FetchFailure::Resolve {
                class,
                reason: e.to_string(),
            })?;

        let response = tokio::time::timeout(self.call_timeout, self.transport.get(&url))
            .await
            .map_err(|_| FetchFailure::Timeout { class })?
            .map_err(|e| FetchFailure::Transport {
                class,
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(FetchFailure::Status {
                class,
                status: response.status,
            });
        }

        let document: NodeInfoDocument =
            serde_json::from_slice(&response.body).map_err(|e| FetchFailure::Unparsable {
                class,
                reason: e.to_string(),
            })?;

        if document.swift.version != local_version {
            return Err(FetchFailure::VersionMismatch {
                class,
                expected: local_version.to_string(),
                reported: document.swift.version,
            });
        }

        tracing::trace!(%class, %url, sections = document.sections.len(), "node info accepted");
        Ok(document.sections)
    }
}
