//! PostgreSQL identifier quoting and name validation.

use std::sync::OnceLock;

use regex::Regex;

/// Quote an identifier with PostgreSQL double-quote rules.
///
/// Embedded quotes are always doubled, so the result is a single identifier
/// whatever `name` contains.
pub fn quote_name(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Whether `name` may be used as a search configuration name.
///
/// Dictionary names end up inside a string literal in the generated SQL, so
/// only plain (optionally schema-qualified) identifiers are accepted.
pub fn is_valid_dictionary(name: &str) -> bool {
    static DICTIONARY: OnceLock<Regex> = OnceLock::new();
    DICTIONARY
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
                .expect("static regex")
        })
        .is_match(name)
}

/// Whether `name` is a plain identifier (table, column, model or lookup name).
pub fn is_valid_identifier(name: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("static regex"))
        .is_match(name)
}
