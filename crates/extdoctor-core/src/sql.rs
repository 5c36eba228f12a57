//! Minimal SQL helpers for deriving table lists from install scripts
//!
//! These are deliberately small: the splitter understands quoting and
//! comments well enough to find statement boundaries in the install and
//! update files extensions ship, and the extractor only looks for
//! `CREATE TABLE` statements naming a `#__`-prefixed table.

use regex::Regex;
use std::sync::LazyLock;

static CREATE_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)^\s*CREATE\s+(?:TEMPORARY\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?[`"\[]?([^`"\]\s(;]+)"#,
    )
    .expect("create table regex is valid")
});

/// Platform placeholder for the configured table prefix
pub const TABLE_PREFIX_PLACEHOLDER: &str = "#__";

/// Split a script into individual statements
///
/// Semicolons inside quotes, backtick identifiers or comments do not end a
/// statement. Comments are dropped from the output and empty statements are
/// skipped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' && q != '`' {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                // `--` only starts a comment when followed by whitespace or EOL
                match chars.peek() {
                    None | Some(' ') | Some('\t') | Some('\n') | Some('\r') => {
                        skip_line(&mut chars);
                    }
                    Some(_) => current.push_str("--"),
                }
            }
            // `#__` is the table prefix placeholder, not a comment
            '#' if chars.peek() != Some(&'_') => {
                skip_line(&mut chars);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
                current.push(' ');
            }
            ';' => {
                push_statement(&mut statements, &mut current);
            }
            _ => current.push(c),
        }
    }

    push_statement(&mut statements, &mut current);
    statements
}

/// Table names created by a script, without the `#__` prefix
///
/// Names are returned once each, in order of first appearance. Tables that
/// do not use the prefix placeholder are ignored since they cannot be mapped
/// to a live table.
pub fn create_table_names(sql: &str) -> Vec<String> {
    let mut tables: Vec<String> = Vec::new();

    for statement in split_statements(sql) {
        let Some(captures) = CREATE_TABLE_RE.captures(&statement) else {
            continue;
        };
        let Some(name) = captures
            .get(1)
            .and_then(|m| m.as_str().strip_prefix(TABLE_PREFIX_PLACEHOLDER))
        else {
            continue;
        };

        if !name.is_empty() && !tables.iter().any(|t| t == name) {
            tables.push(name.to_string());
        }
    }

    tables
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    for next in chars.by_ref() {
        if next == '\n' {
            break;
        }
    }
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let statement = current.trim();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
    current.clear();
}
