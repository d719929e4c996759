//! Info endpoint handler

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

use crate::controller::{InfoController, InfoRequest};

/// Parse a raw query string; malformed pairs never fail the request
fn parse_query(uri: &Uri) -> HashMap<String, String> {
    uri.query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

/// Serve GET and HEAD `/info`
///
/// HEAD runs every check GET does and reports the same status and headers,
/// only without a body.
pub async fn handle_info(
    State(controller): State<Arc<InfoController>>,
    method: Method,
    uri: Uri,
) -> Response {
    let params = parse_query(&uri);
    let request = InfoRequest {
        method: &method,
        path: uri.path(),
        params: &params,
    };

    let payload = match controller.handle(&request).await {
        Ok(payload) => payload,
        Err(e) => return e.into_response(),
    };

    let body = match serde_json::to_vec(&payload) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize info payload");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(body.len())),
    ];

    if method == Method::HEAD {
        (StatusCode::OK, headers, Body::empty()).into_response()
    } else {
        (StatusCode::OK, headers, Body::from(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_pairs() {
        let uri: Uri = "/info?swiftinfo_sig=ab%2Fcd&swiftinfo_expires=12".parse().unwrap();
        let params = parse_query(&uri);
        assert_eq!(params["swiftinfo_sig"], "ab/cd");
        assert_eq!(params["swiftinfo_expires"], "12");
    }

    #[test]
    fn missing_or_odd_query_is_tolerated() {
        let plain: Uri = "/info".parse().unwrap();
        assert!(parse_query(&plain).is_empty());

        let odd: Uri = "/info?&&=x&flag".parse().unwrap();
        let params = parse_query(&odd);
        assert_eq!(params["flag"], "");
    }
}
