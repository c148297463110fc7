use super::role::RoleName;
use crate::error::CredsError;

/// One credential request, validated at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct IssuanceRequest {
    pub role: RoleName,
    /// Caller display name; only seeds the generated username.
    pub display_name: String,
}

impl IssuanceRequest {
    /// The display name may be empty; otherwise only ASCII letters, digits
    /// and `_` are accepted, so the hint can never carry quoting, statement
    /// or comment syntax into the rendered SQL.
    pub fn new(role: RoleName, display_name: impl Into<String>) -> Result<Self, CredsError> {
        let display_name = display_name.into();
        if !display_name.chars().all(is_hint_char) {
            return Err(CredsError::InvalidRequest(
                "display name may only contain ASCII letters, digits and '_'".to_string(),
            ));
        }
        Ok(Self { role, display_name })
    }
}

fn is_hint_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readonly() -> RoleName {
        RoleName::parse("readonly").unwrap()
    }

    #[test]
    fn display_name_with_quote_is_rejected() {
        assert!(IssuanceRequest::new(readonly(), "o'brien").is_err());
        assert!(IssuanceRequest::new(readonly(), "semi;colon").is_err());
        assert!(IssuanceRequest::new(readonly(), "token_ci").is_ok());
        assert!(IssuanceRequest::new(readonly(), "").is_ok());
    }

    #[test]
    fn display_name_cannot_open_a_comment() {
        for bad in ["t(a)--", "x-", "a/*b", "a*/", "a b", "token-ci", "naïve"] {
            let err = IssuanceRequest::new(readonly(), bad).unwrap_err();
            assert!(matches!(err, CredsError::InvalidRequest(_)), "{bad}");
        }
    }
}
