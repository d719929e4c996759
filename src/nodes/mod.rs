//! Backend storage node access for extended info
//!
//! Three node classes each serve their own info document. The fetcher picks
//! one node per class through a [`NodeResolver`] and reads the document
//! through an [`InfoTransport`].

pub mod resolver;
pub mod transport;
pub mod types;

pub use resolver::{NodeResolver, StaticNodeResolver};
pub use transport::{HttpTransport, InfoTransport, RawResponse};
pub use types::NodeClass;
