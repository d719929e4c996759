//! Cross-cutting request middleware

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::Instrument;

use crate::controller::is_allowed_method;
use crate::error::InfoError;

/// Per-request transaction id header
pub const TRANS_ID_HEADER: HeaderName = HeaderName::from_static("x-trans-id");

/// Reject anything but GET and HEAD before it reaches the info handler
pub async fn allow_info_methods(req: Request, next: Next) -> Response {
    if is_allowed_method(req.method()) {
        return next.run(req).await;
    }

    tracing::debug!(method = %req.method(), path = %req.uri().path(), "method not allowed");
    InfoError::MethodNotAllowed.into_response()
}

/// Whether `req` is a CORS preflight rather than a plain OPTIONS call
fn is_preflight(req: &Request) -> bool {
    req.method() == Method::OPTIONS
        && req.headers().contains_key(header::ORIGIN)
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// Let only real preflights reach the CORS layer; any other OPTIONS is 405
pub async fn preflight_only(req: Request, next: Next) -> Response {
    if req.method() != Method::OPTIONS || is_preflight(&req) {
        return next.run(req).await;
    }

    tracing::debug!(path = %req.uri().path(), "plain OPTIONS rejected");
    InfoError::MethodNotAllowed.into_response()
}

/// Tag the request span and the response with a fresh transaction id
pub async fn trans_id(req: Request, next: Next) -> Response {
    let trans_id = format!("tx{}", uuid::Uuid::new_v4().simple());
    let span = tracing::info_span!("request", trans_id = %trans_id);

    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&trans_id) {
        response.headers_mut().insert(TRANS_ID_HEADER, value);
    }
    response
}
