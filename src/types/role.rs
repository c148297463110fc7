use crate::error::CredsError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated role name: word characters, with `-` and `.` allowed between
/// the first and last character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    pub fn parse(raw: impl Into<String>) -> Result<Self, CredsError> {
        let raw = raw.into();
        let bytes = raw.as_bytes();
        let valid = match (bytes.first(), bytes.last()) {
            (Some(first), Some(last)) => {
                is_word(*first)
                    && is_word(*last)
                    && bytes.iter().all(|b| is_word(*b) || *b == b'-' || *b == b'.')
            }
            _ => false,
        };
        if !valid {
            return Err(CredsError::InvalidRequest(format!("invalid role name: {raw:?}")));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Operator policy: the SQL template run to provision one credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub name: RoleName,
    pub sql: String,
}

/// Body of `PUT /roles/{name}`.
#[derive(Debug, Deserialize)]
pub struct RoleBody {
    pub sql: String,
}

#[derive(Debug, Serialize)]
pub struct RoleList {
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_generic_names() {
        for ok in ["readonly", "a", "app_rw", "team-a.reporting", "v2"] {
            assert_eq!(RoleName::parse(ok).unwrap().as_str(), ok);
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["", "-lead", "trail.", "has space", "semi;colon", "quote'", "über"] {
            assert!(
                matches!(RoleName::parse(bad), Err(CredsError::InvalidRequest(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
