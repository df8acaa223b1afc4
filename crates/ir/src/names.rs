//! Identifier and type-expression normalizers.
//!
//! Wiki prose arrives in every spelling imaginable; downstream generators
//! need stable identifiers. All normalizers here are idempotent: feeding an
//! output back in returns it unchanged, which lets the extractor normalize
//! defensively without tracking what has already been cleaned.

use once_cell::sync::Lazy;
use regex::Regex;

static PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").unwrap());
static STRING_LEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+)\)").unwrap());
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-z]+)\[(.+)\]$").unwrap());
static ARRAY_OF_PLURAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^array_of(.+)s$").unwrap());
static ARRAY_OF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^array_of(.+)$").unwrap());
static OPTIONAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^optional(.+)$").unwrap());
static SUFFIX_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+)array$").unwrap());

/// Substitutions applied by [`varname`] after lowercasing.
const VAR_SUBS: &[(&str, &str)] = &[
    ("/", "_"),
    ("-", "minus"),
    ("+", "plus"),
    (".", "_"),
    (")", ""),
    (":", "_"),
    ("\u{2013}", ""),
    (" ", "_"),
];

/// Substitutions applied by [`classname`]; dashes and dots vanish instead
/// of being spelled out.
const CLASS_SUBS: &[(&str, &str)] = &[
    ("/", "_"),
    ("-", ""),
    ("+", ""),
    (".", ""),
    (")", ""),
    (":", ""),
    ("\u{2013}", ""),
    (" ", "_"),
];

/// Leaf spellings with a canonical token that plain PascalCasing would miss.
const CANONICAL_LEAVES: &[(&str, &str)] = &[("var_int", "Varint"), ("var_long", "Varlong"), ("uuid", "UUID")];

/// Normalizes a wiki label into a camelCase variable name.
pub fn varname(raw: &str) -> String {
    let snake = snake_varname(raw);
    camel_case(&snake)
}

/// Normalizes a wiki label into a PascalCase type/class name.
pub fn classname(raw: &str) -> String {
    let stripped = PARENS.replace_all(raw, "");
    let mut s = decamel(stripped.trim()).to_lowercase();
    prefix_leading_digit(&mut s);
    let s = substitute(&s, CLASS_SUBS);
    let s = s.replace("___", "_or_");
    pascal_case(&s)
}

/// Normalizes a wiki label into a SCREAMING_SNAKE constant name.
pub fn constname(raw: &str) -> String {
    let snake = snake_varname(raw);
    if snake == "typ" {
        "TYPE".to_string()
    } else {
        snake.to_uppercase()
    }
}

/// Pluralizes an already-normalized name.
pub fn pluralize(name: &str) -> String {
    let mut out = name.to_string();
    if out.ends_with('s') {
        out
    } else if out.ends_with('y') {
        out.pop();
        out.push_str("ies");
        out
    } else if out.ends_with('h') {
        out.push_str("es");
        out
    } else {
        out.push('s');
        out
    }
}

/// Normalizes a wiki type expression into a canonical type token.
///
/// Handles the wiki's array/optional dialects (`Array of X`, `Optional X`,
/// `X Array`, `Optional, varies`) and re-normalizes bracketed outputs so
/// the function is idempotent on its own results.
pub fn typename(raw: &str) -> String {
    let s = decamel(raw.trim()).to_lowercase().replace(' ', "_");
    let s = s.trim_matches('_').to_string();
    if s == "optional,_varies" {
        return "Optional[Any]".to_string();
    }
    if let Some(c) = BRACKETED.captures(&s) {
        return format!("{}[{}]", pascal_case(&c[1]), typename(&c[2]));
    }
    let s = s.replace("_enum", "").replace("enum", "");
    if let Some(c) = ARRAY_OF_PLURAL.captures(&s) {
        return format!("Array[{}]", typename(&c[1]));
    }
    if let Some(c) = ARRAY_OF.captures(&s) {
        return format!("Array[{}]", typename(&c[1]));
    }
    if let Some(c) = OPTIONAL.captures(&s) {
        return format!("Option[{}]", typename(&c[1]));
    }
    if let Some(c) = SUFFIX_ARRAY.captures(&s) {
        return format!("Array[{}]", type_leaf(&c[1]));
    }
    type_leaf(&s)
}

/// Splits a `String (N)` type into the bare type and its maximum length.
pub fn extract_type_and_length(raw: &str) -> (String, Option<u32>) {
    if raw.to_lowercase().contains("string") {
        if let Some(c) = STRING_LEN.captures(raw) {
            if let Ok(n) = c[1].parse::<u32>() {
                let bare = PARENS.replace_all(raw, "").trim().to_string();
                return (bare, Some(n));
            }
        }
    }
    (raw.to_string(), None)
}

fn snake_varname(raw: &str) -> String {
    let mut s = decamel(raw.trim()).to_lowercase();
    prefix_leading_digit(&mut s);
    let s = substitute(&s, VAR_SUBS);
    let s = s.replace("___", "_or_");
    if s == "type" {
        "typ".to_string()
    } else {
        s
    }
}

fn substitute(s: &str, table: &[(&str, &str)]) -> String {
    let mut out = s.to_string();
    for (from, to) in table {
        out = out.replace(from, to);
    }
    out
}

fn prefix_leading_digit(s: &mut String) {
    if s.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        s.insert(0, '_');
    }
}

/// Inserts an underscore at lower-to-upper case boundaries so camelCase
/// inputs round-trip through the lowercase stage unchanged.
fn decamel(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_breakable = false;
    for c in s.chars() {
        if c.is_ascii_uppercase() && prev_breakable {
            out.push('_');
        }
        prev_breakable = c.is_ascii_lowercase() || c.is_ascii_digit();
        out.push(c);
    }
    out
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn camel_case(snake: &str) -> String {
    let mut out = String::new();
    if snake.starts_with('_') {
        out.push('_');
    }
    for (i, part) in snake.split('_').filter(|p| !p.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(part);
        } else {
            out.push_str(&capitalize(part));
        }
    }
    out
}

fn pascal_case(snake: &str) -> String {
    let mut out = String::new();
    if snake.starts_with('_') {
        out.push('_');
    }
    for part in snake.split('_').filter(|p| !p.is_empty()) {
        out.push_str(&capitalize(part));
    }
    out
}

fn type_leaf(captured: &str) -> String {
    let cleaned = captured.replace(',', "");
    let cleaned = cleaned.trim_matches('_');
    for (from, to) in CANONICAL_LEAVES {
        if cleaned == *from {
            return to.to_string();
        }
    }
    pascal_case(cleaned)
}
