use crate::error::CredsError;
use serde::Serialize;
use std::fmt;

/// Longest display-name prefix carried into a generated username.
pub const DISPLAY_NAME_MAX_CHARS: usize = 10;

/// Username/password pair created for exactly one issuance.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedCredential {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for GeneratedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Build `<hint>-<uuid>` and an independent password token.
pub fn generate(display_name: &str) -> Result<GeneratedCredential, CredsError> {
    let hint = truncate_hint(display_name);
    let username = format!("{hint}-{}", random_token()?);
    let password = random_token()?;
    Ok(GeneratedCredential { username, password })
}

/// First [`DISPLAY_NAME_MAX_CHARS`] characters of the hint.
pub fn truncate_hint(display_name: &str) -> &str {
    match display_name.char_indices().nth(DISPLAY_NAME_MAX_CHARS) {
        Some((idx, _)) => &display_name[..idx],
        None => display_name,
    }
}

/// 128-bit random token in hyphenated UUID form, drawn straight from the OS.
fn random_token() -> Result<String, CredsError> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes)?;
    let token = uuid::Builder::from_random_bytes(bytes).into_uuid();
    Ok(token.hyphenated().to_string())
}
