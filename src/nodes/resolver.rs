//! Choosing which backend node to ask

use rand::seq::SliceRandom;
use url::Url;

use super::NodeClass;
use crate::config::ClusterConfig;
use crate::{Error, Result};

/// Resolves one candidate endpoint for a node class
pub trait NodeResolver: Send + Sync {
    /// Pick an endpoint serving `class`
    ///
    /// # Errors
    ///
    /// Returns error if no endpoint is known for the class
    fn resolve_endpoint(&self, class: NodeClass) -> Result<Url>;
}

/// Resolver over fixed endpoint lists, picking uniformly at random
#[derive(Debug, Clone, Default)]
pub struct StaticNodeResolver {
    account: Vec<Url>,
    container: Vec<Url>,
    object: Vec<Url>,
}

impl StaticNodeResolver {
    /// Create a resolver from per-class endpoint lists
    #[must_use]
    pub const fn new(account: Vec<Url>, container: Vec<Url>, object: Vec<Url>) -> Self {
        Self {
            account,
            container,
            object,
        }
    }

    /// Build from cluster configuration
    #[must_use]
    pub fn from_config(config: &ClusterConfig) -> Self {
        Self::new(
            config.account_nodes.clone(),
            config.container_nodes.clone(),
            config.object_nodes.clone(),
        )
    }

    /// Endpoints known for `class`
    #[must_use]
    pub fn endpoints(&self, class: NodeClass) -> &[Url] {
        match class {
            NodeClass::Account => &self.account,
            NodeClass::Container => &self.container,
            NodeClass::Object => &self.object,
        }
    }
}

impl NodeResolver for StaticNodeResolver {
    fn resolve_endpoint(&self, class: NodeClass) -> Result<Url> {
        self.endpoints(class)
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| Error::NodeResolution(format!("no {class} nodes configured")))
    }
}
