//! ETags for versioned documents.
//!
//! Every invite and match view carries the store version it was read at;
//! the ETag is that version made HTTP-shaped so clients can poll with
//! `If-None-Match` and get `304 Not Modified` while nothing changed.

use actix_web::http::header::{ETAG, IF_NONE_MATCH};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;

/// Format: `"{kind}-{id}-v{version}"`, quotes included.
pub fn document_etag(kind: &str, id: &str, version: i64) -> String {
    format!(r#""{kind}-{id}-v{version}""#)
}

/// Whether the request's `If-None-Match` already names `etag` (or `*`).
pub fn matches_if_none_match(req: &HttpRequest, etag: &str) -> bool {
    let Some(raw) = req
        .headers()
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    raw.trim() == "*" || raw.split(',').map(str::trim).any(|candidate| candidate == etag)
}

/// 200 with the body and ETag, or 304 when the client is already current.
pub fn versioned_json<T: Serialize>(req: &HttpRequest, etag: String, body: &T) -> HttpResponse {
    if matches_if_none_match(req, &etag) {
        return HttpResponse::build(StatusCode::NOT_MODIFIED)
            .insert_header((ETAG, etag))
            .finish();
    }
    HttpResponse::Ok().insert_header((ETAG, etag)).json(body)
}
