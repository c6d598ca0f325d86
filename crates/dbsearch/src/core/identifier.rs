//! Identifier, string literal and LIKE pattern escaping.
//!
//! Catalog and search statements are built as plain SQL text: the connectivity
//! layer takes no bind parameters, and identifiers cannot be parameterized in
//! any engine anyway. Everything caller- or catalog-supplied that ends up in a
//! statement goes through one of these functions.
//!
//! Escaping and quoting are separate steps. The `escape_*` functions only
//! rewrite the special characters; the `quote_*` functions also add the
//! surrounding delimiters. Dialects pick the combination matching their rules
//! (backticks for MySQL, brackets for SQL Server, double quotes elsewhere).

/// Default escape character for LIKE patterns.
pub const LIKE_ESCAPE: char = '\\';

/// Escape a double-quoted identifier body by doubling `"`.
pub fn escape_identifier(name: &str) -> String {
    name.replace('"', "\"\"")
}

/// Escape a string literal body by doubling `'`.
pub fn escape_string_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Escape `value` so LIKE treats every character literally.
///
/// The escape character itself is doubled and `%`, `_`, `[` are prefixed with
/// it. Works character by character, so an inserted escape is never escaped
/// again even when `escape` is one of the metacharacters.
pub fn escape_like_pattern(value: &str, escape: char) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if c == escape || matches!(c, '%' | '_' | '[') {
            out.push(escape);
        }
        out.push(c);
    }
    out
}

/// Quote an identifier with double quotes (ANSI, Oracle, PostgreSQL, SQLite).
///
/// # Examples
///
/// ```
/// use dbsearch::core::identifier::quote_double;
/// assert_eq!(quote_double("my\"table"), "\"my\"\"table\"");
/// ```
pub fn quote_double(name: &str) -> String {
    format!("\"{}\"", escape_identifier(name))
}

/// Quote a MySQL identifier using backticks.
///
/// Escapes backticks by doubling them and wraps in backticks.
pub fn quote_backtick(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a SQL Server identifier using brackets.
///
/// Only the closing bracket needs doubling.
pub fn quote_bracket(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Quote a standard SQL string literal.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", escape_string_literal(value))
}

/// Join already-quoted name components with dots.
pub fn qualify(parts: &[String]) -> String {
    parts.join(".")
}
