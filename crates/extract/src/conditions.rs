//! Presence-condition parsing for optional fields.
//!
//! When an `Option[...]` field is not guarded by a preceding boolean, its
//! notes usually spell the condition out in prose ("Only sent when Action
//! is 0", "Present if Flags does not equal 1", ...). The dialects are a
//! flat, ordered list; the first that matches renders a small textual
//! expression for the downstream generator.

use once_cell::sync::Lazy;
use regex::Regex;

use protodoc_ir::names::{constname, varname};
use protodoc_ir::{FieldId, Packet};

/// Phrases that anchor a condition inside the notes prose.
const ANCHOR_PHRASES: &[&str] = &["present if", "only if", "sent when"];

static IS_OR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?) is (.+?) or (.+)$").unwrap());
static NOT_EQUAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?) does not equal (.+)$").unwrap());
static MORE_THAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?) is more than (.+)$").unwrap());
static LESS_THAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?) is less than (.+)$").unwrap());
static IS_EQUAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?) is (.+)$").unwrap());

/// Parses the presence condition of an optional field from its notes.
///
/// `guard` is the closest preceding non-optional field; it resolves bare
/// subjects and gives string/enum context to the value side. Returns the
/// rendered expression, or `None` when no dialect matches.
pub(crate) fn parse_condition(
    packet: &Packet,
    guard: Option<FieldId>,
    comment: &str,
) -> Option<String> {
    let lower = comment.to_lowercase();
    let (phrase, at) = ANCHOR_PHRASES
        .iter()
        .filter_map(|p| lower.find(p).map(|i| (*p, i)))
        .min_by_key(|(_, i)| *i)?;
    let rest = &lower[at + phrase.len()..];
    let rest = rest[..end_of_sentence(rest)].trim();

    if let Some(c) = IS_OR.captures(rest) {
        let x = resolve_subject(packet, guard, &c[1])?;
        let v = resolve_value(packet, guard, &c[2])?;
        let w = resolve_value(packet, guard, &c[3])?;
        return Some(format!("{x} == {v} || {x} == {w}"));
    }

    if rest.contains("indicates it") {
        let g = guard?;
        let field = packet.field(g);
        let first = field.enumeration()?.entries.first()?;
        return Some(format!("{} & {} != 0", field.name, first.value));
    }

    for (re, op) in [
        (&NOT_EQUAL, "!="),
        (&MORE_THAN, ">"),
        (&LESS_THAN, "<"),
        (&IS_EQUAL, "=="),
    ] {
        if let Some(c) = re.captures(rest) {
            let x = resolve_subject(packet, guard, &c[1])?;
            let v = resolve_value(packet, guard, &c[2])?;
            return Some(format!("{x} {op} {v}"));
        }
    }
    None
}

fn end_of_sentence(s: &str) -> usize {
    s.find([';', '.']).unwrap_or(s.len())
}

/// Normalizes the subject words to a field name and resolves it in the
/// packet's dictionary, falling back to the guard field.
fn resolve_subject(packet: &Packet, guard: Option<FieldId>, words: &str) -> Option<String> {
    let candidate = varname(words.trim().trim_matches('"'));
    if let Some(id) = packet.field_by_name(&candidate) {
        return Some(packet.field(id).name.clone());
    }
    guard.map(|g| packet.field(g).name.clone())
}

/// Resolves the value side: an integer or boolean literal, a quoted string
/// (when the guard is string-typed), or a constant of the guard's enum.
fn resolve_value(packet: &Packet, guard: Option<FieldId>, words: &str) -> Option<String> {
    let raw = words.trim();
    if raw.parse::<i64>().is_ok() {
        return Some(raw.to_string());
    }
    if raw == "true" || raw == "false" {
        return Some(raw.to_string());
    }
    let guard_field = guard.map(|g| packet.field(g));
    let quoted = raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')));
    if quoted && guard_field.is_some_and(|f| f.typ.contains("String")) {
        return Some(format!("\"{}\"", &raw[1..raw.len() - 1]));
    }
    if let Some(e) = guard_field.and_then(|f| f.enumeration()) {
        let wanted = constname(raw);
        if e.entries.iter().any(|entry| entry.name == wanted) {
            return Some(wanted);
        }
    }
    None
}
