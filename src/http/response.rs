//! Response shaping.

use axum::http::{header, HeaderValue};
use axum::response::Response;

pub const APPLICATION_JSON: &str = "application/json";

/// Force `content-type: application/json`, whatever the status or body.
pub fn with_json_content_type(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(APPLICATION_JSON),
    );
    response
}
