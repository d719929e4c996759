//! HTTP API server for the info gateway

pub mod health;
pub mod info;
pub mod middleware;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, Method, header},
    routing::any,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::controller::InfoController;

/// Path the info endpoint is served on
pub const INFO_PATH: &str = "/info";

/// `Allow` header value for the info endpoint
pub const ALLOW_HEADER_VALUE: &str = "GET, HEAD";

/// Response headers browsers may read on cross-origin requests
const EXPOSED_HEADERS: [HeaderName; 9] = [
    header::CACHE_CONTROL,
    header::CONTENT_LANGUAGE,
    header::CONTENT_TYPE,
    header::EXPIRES,
    header::LAST_MODIFIED,
    header::PRAGMA,
    header::ETAG,
    HeaderName::from_static("x-timestamp"),
    middleware::TRANS_ID_HEADER,
];

/// Build the router with all routes and cross-cutting layers
#[must_use]
pub fn router(controller: Arc<InfoController>) -> Router {
    let info = Router::new()
        .route(INFO_PATH, any(info::handle_info))
        .route_layer(axum::middleware::from_fn(middleware::allow_info_methods))
        .with_state(controller);

    // Mirror the caller's origin and let it read the exposed headers;
    // preflights are answered here without reaching the handler, and
    // `preflight_only` keeps plain OPTIONS calls from being mistaken for one
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::HEAD])
        .expose_headers(EXPOSED_HEADERS);

    info.merge(health::router())
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::preflight_only))
        .layer(axum::middleware::from_fn(middleware::trans_id))
        .layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    controller: Arc<InfoController>,
    port: u16,
}

impl ApiServer {
    /// Create a server for `controller` on `port`
    #[must_use]
    pub fn new(controller: InfoController, port: u16) -> Self {
        Self {
            controller: Arc::new(controller),
            port,
        }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(
            port = self.port,
            admin = self.controller.admin_enabled(),
            "info server listening"
        );

        axum::serve(listener, router(self.controller))
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
