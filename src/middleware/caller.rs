use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header naming the caller; seeds the generated username.
pub const DISPLAY_NAME_HEADER: &str = "x-display-name";

/// Caller display name, empty when the header is absent or not valid text.
#[derive(Debug, Clone, Default)]
pub struct CallerDisplayName(pub String);

impl<S> FromRequestParts<S> for CallerDisplayName
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let name = parts
            .headers
            .get(DISPLAY_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        Ok(Self(name))
    }
}
