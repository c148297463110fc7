//! `{{placeholder}}` substitution for role SQL.
//!
//! Values are spliced in as raw text: role templates reference generated
//! names in DDL positions where bind parameters are not accepted. Every value
//! must therefore pass [`ensure_sql_safe`] before it is rendered.

use crate::error::CredsError;
use std::collections::HashMap;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Placeholder values for one issuance, keyed by placeholder name.
pub type TemplateValues<'a> = HashMap<&'a str, &'a str>;

/// Replace every `{{key}}` whose key is in `values`. Unknown placeholders and
/// unmatched delimiters are copied through; substituted text is not rescanned.
pub fn render(statement: &str, values: &TemplateValues<'_>) -> String {
    let mut out = String::with_capacity(statement.len());
    let mut rest = statement;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after_open[..end];
        match values.get(key) {
            Some(value) => {
                out.push_str(value);
                rest = &after_open[end + CLOSE.len()..];
            }
            None => {
                // Keep the opening delimiter and resume right after it so a
                // nested `{{known}}` is still found.
                out.push_str(OPEN);
                rest = after_open;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Sequences that open or close a comment and would swallow the rest of the
/// statement.
const COMMENT_MARKERS: [&str; 3] = ["--", "/*", "*/"];

/// Reject values that could break out of a quoted literal or identifier,
/// terminate the statement early or comment out what follows.
pub fn ensure_sql_safe(placeholder: &str, value: &str) -> Result<(), CredsError> {
    let safe = value.chars().all(is_sql_safe_char)
        && !COMMENT_MARKERS.iter().any(|marker| value.contains(marker));
    if safe {
        Ok(())
    } else {
        Err(CredsError::UnsafeValue {
            placeholder: placeholder.to_string(),
        })
    }
}

fn is_sql_safe_char(c: char) -> bool {
    !c.is_control() && !matches!(c, '\'' | '"' | '`' | ';' | '[' | ']' | '\\')
}
