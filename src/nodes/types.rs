//! Node class types

use std::fmt;

use serde::{Deserialize, Serialize};

/// A backend node population queried for extended info
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    Account,
    Container,
    Object,
}

impl NodeClass {
    /// All classes in merge order
    pub const ALL: [Self; 3] = [Self::Account, Self::Container, Self::Object];

    /// Lowercase class name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Container => "container",
            Self::Object => "object",
        }
    }

    /// Suffix producers of this class append to their section names
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Account => "-a",
            Self::Container => "-c",
            Self::Object => "-o",
        }
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
