//! Swift Info Gateway - cluster capability discovery endpoint
//!
//! Serves `GET /info` describing which optional features a storage cluster
//! runs and how they are configured:
//! - Feature registration into public and admin-only sections
//! - HMAC-signed, time-limited admin capabilities
//! - Live extended info cross-checked against every backend node class
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    HTTP (axum)                       │
//! │   trans id  │  CORS  │  method filter  │  /info      │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 InfoController                       │
//! │   InfoSnapshot  │  CapabilityValidator  │  filter    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              ExtendedInfoFetcher                     │
//! │      account  │  container  │  object nodes          │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod features;
pub mod fetcher;
pub mod nodes;
pub mod registry;
pub mod signature;

pub use config::Config;
pub use controller::{InfoController, InfoPayload, InfoRequest};
pub use error::{Error, InfoError, Result};
pub use fetcher::{ExtendedInfoFetcher, ExtraInfoError, FetchFailure, MAX_EXTENDED_INFO_ATTEMPTS};
pub use nodes::{InfoTransport, NodeClass, NodeResolver};
pub use registry::{InfoRegistry, InfoSection, InfoSnapshot, SectionMap};
pub use signature::{AdminKey, Authorization, CapabilityValidator, RejectReason};
