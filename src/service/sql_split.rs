//! Splits a multi-statement SQL template into individually executable
//! statements.
//!
//! Works on template text before substitution. A `;` only terminates a
//! statement outside string literals and comments; comment text is dropped.
//! The splitter does not validate SQL: an unterminated string or comment at
//! end of input still yields the partial statement.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    SingleQuote,
    DoubleQuote,
    LineComment,
    BlockComment,
}

const TERMINATOR: char = ';';

/// Split `sql` into trimmed, non-empty statements in source order.
pub fn split_sql(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = ScanState::Normal;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            ScanState::Normal => match c {
                TERMINATOR => flush(&mut current, &mut statements),
                '\'' => {
                    current.push(c);
                    state = ScanState::SingleQuote;
                }
                '"' => {
                    current.push(c);
                    state = ScanState::DoubleQuote;
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = ScanState::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = ScanState::BlockComment;
                }
                _ => current.push(c),
            },
            ScanState::SingleQuote | ScanState::DoubleQuote => {
                current.push(c);
                let quote = if state == ScanState::SingleQuote { '\'' } else { '"' };
                if c == quote {
                    // A doubled quote is an escaped quote inside the literal.
                    if chars.peek() == Some(&quote) {
                        current.push(quote);
                        chars.next();
                    } else {
                        state = ScanState::Normal;
                    }
                }
            }
            ScanState::LineComment => {
                if c == '\n' {
                    current.push('\n');
                    state = ScanState::Normal;
                }
            }
            ScanState::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    current.push(' ');
                    state = ScanState::Normal;
                }
            }
        }
    }
    flush(&mut current, &mut statements);
    statements
}

fn flush(current: &mut String, statements: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_login_template_into_two_statements() {
        let sql = "CREATE LOGIN [{{name}}] WITH PASSWORD = '{{password}}'; GRANT SELECT TO [{{name}}];";
        assert_eq!(
            split_sql(sql),
            vec![
                "CREATE LOGIN [{{name}}] WITH PASSWORD = '{{password}}'",
                "GRANT SELECT TO [{{name}}]",
            ]
        );
    }

    #[test]
    fn trailing_statement_without_terminator_is_kept() {
        assert_eq!(split_sql("SELECT 1; SELECT 2"), vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn empty_and_blank_statements_are_dropped() {
        assert!(split_sql("").is_empty());
        assert!(split_sql(" ;\n; ;").is_empty());
        assert_eq!(split_sql(";;SELECT 1;;"), vec!["SELECT 1"]);
    }

    #[test]
    fn terminator_inside_single_quotes_does_not_split() {
        assert_eq!(
            split_sql("INSERT INTO t VALUES ('a;b'); SELECT 1"),
            vec!["INSERT INTO t VALUES ('a;b')", "SELECT 1"]
        );
    }

    #[test]
    fn terminator_inside_double_quotes_does_not_split() {
        assert_eq!(
            split_sql(r#"CREATE TABLE "odd;name" (id INT); DROP TABLE x"#),
            vec![r#"CREATE TABLE "odd;name" (id INT)"#, "DROP TABLE x"]
        );
    }

    #[test]
    fn doubled_quote_stays_inside_literal() {
        assert_eq!(
            split_sql("SELECT 'it''s; fine'; SELECT 2"),
            vec!["SELECT 'it''s; fine'", "SELECT 2"]
        );
        assert_eq!(
            split_sql(r#"SELECT "a"";b"; SELECT 2"#),
            vec![r#"SELECT "a"";b""#, "SELECT 2"]
        );
    }

    #[test]
    fn line_comments_are_removed_with_their_terminators() {
        let sql = "-- setup; nothing here\nCREATE USER x; -- trailing; note\nGRANT ALL TO x";
        assert_eq!(split_sql(sql), vec!["CREATE USER x", "GRANT ALL TO x"]);
    }

    #[test]
    fn block_comments_are_removed_and_do_not_merge_tokens() {
        assert_eq!(
            split_sql("SELECT/* a; b */1; /* only a comment; */"),
            vec!["SELECT 1"]
        );
        assert_eq!(
            split_sql("CREATE /*\n multi;\n line */ USER x"),
            vec!["CREATE   USER x"]
        );
    }

    #[test]
    fn comment_markers_inside_strings_are_literal() {
        assert_eq!(
            split_sql("SELECT '--not a comment;' ; SELECT '/* nor; this */'"),
            vec!["SELECT '--not a comment;'", "SELECT '/* nor; this */'"]
        );
    }

    #[test]
    fn single_dash_and_slash_are_plain_text() {
        assert_eq!(split_sql("SELECT 4-1/2; SELECT 3"), vec!["SELECT 4-1/2", "SELECT 3"]);
    }

    #[test]
    fn unterminated_states_emit_partial_statement() {
        assert_eq!(split_sql("SELECT 1; SELECT 'open; x"), vec!["SELECT 1", "SELECT 'open; x"]);
        assert_eq!(split_sql("SELECT 1; SELECT 2 /* open; x"), vec!["SELECT 1", "SELECT 2"]);
        assert_eq!(split_sql("SELECT 1 -- trailing"), vec!["SELECT 1"]);
    }

    #[test]
    fn statement_count_follows_terminators_outside_literals() {
        let sql = "A; B 'x;y'; C \"p;q\"; D -- e;f\n; E /* g;h */";
        let stmts = split_sql(sql);
        assert_eq!(stmts.len(), 5);
        assert_eq!(stmts[0], "A");
        assert_eq!(stmts[4], "E");
    }
}
