use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::router::CredsState;

/// Ensure the inbound request carries the configured API key.
/// Accepts either:
/// - Header: `x-api-key: ...`
/// - Header: `Authorization: Bearer ...`
/// - Query string: `?key=...`
///
/// An empty configured key rejects everything.
pub fn ensure_authorized(
    expected: &str,
    headers: &HeaderMap,
    query: Option<&str>,
) -> Result<(), Response> {
    if !expected.is_empty() && presented_keys(headers, query).any(|k| key_matches(&k, expected)) {
        return Ok(());
    }

    Err((
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"code": "UNAUTHORIZED", "message": "invalid or missing key"}})),
    )
        .into_response())
}

fn presented_keys<'a>(
    headers: &'a HeaderMap,
    query: Option<&'a str>,
) -> impl Iterator<Item = String> + 'a {
    // 1) header: x-api-key
    let header_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // 2) header: Authorization: Bearer <key>
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| {
            let auth = auth.trim();
            auth.strip_prefix("Bearer ")
                .or_else(|| auth.strip_prefix("bearer "))
                .map(str::to_string)
        });

    // 3) query: key=...
    let from_query = query
        .into_iter()
        .flat_map(|qs| url::form_urlencoded::parse(qs.as_bytes()))
        .filter(|(k, _)| k == "key")
        .map(|(_, v)| v.into_owned());

    header_key.into_iter().chain(bearer).chain(from_query)
}

fn key_matches(presented: &str, expected: &str) -> bool {
    bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

#[derive(Debug, Clone, Copy)]
pub struct RequireKeyAuth;

impl FromRequestParts<CredsState> for RequireKeyAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CredsState,
    ) -> Result<Self, Self::Rejection> {
        ensure_authorized(&state.api_key, &parts.headers, parts.uri.query())?;
        Ok(Self)
    }
}
