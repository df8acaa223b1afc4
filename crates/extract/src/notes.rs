//! Inline enum harvesting from notes text.
//!
//! The wiki describes small enums in about a dozen competing prose
//! dialects (`0: idle; 1: running`, `0x1: on fire`, `1 for north`, ...).
//! Each dialect is one entry in an ordered rule list: the first rule that
//! recognizes its opening marker wins and says how the remainder is
//! re-read. Supporting a new dialect means appending a rule.

use protodoc_ir::names::{classname, constname};
use protodoc_ir::{Enum, EnumEntry};

/// Outcome of probing one dialect against the notes text.
enum Marker {
    /// The dialect's opening marker is absent; try the next rule.
    Absent,
    /// The marker is present but judged a false positive (half-byte
    /// fields, `20 = full`, ...): the text is claimed and yields no enum.
    Suppressed,
    /// The marker matched: the entry list starts at `offset` within
    /// `text`, which is the notes with the dialect's separators rewritten
    /// to `value: name` form. Rewrites only touch the tail so the offset
    /// stays valid.
    List { offset: usize, text: String },
}

type MarkerRule = fn(&str) -> Marker;

/// Dialects in strict priority order; the first non-absent rule wins.
const MARKER_RULES: &[MarkerRule] = &[
    colon_list,
    bitflag_list,
    hex_eq_list,
    eq_spaced_list,
    eq_tight_list,
    one_for_list,
    compass_list,
    dash_list,
];

/// Parses an inline enum out of a field's notes text.
pub(crate) fn inline_enum(notes: &str, enum_name: &str) -> Option<Enum> {
    let hit = MARKER_RULES
        .iter()
        .map(|rule| rule(notes))
        .find(|m| !matches!(m, Marker::Absent))?;
    let Marker::List { offset, text } = hit else {
        return None;
    };
    let entries = parse_entries(&text[offset..]);
    if entries.is_empty() {
        return None;
    }
    Some(Enum {
        name: classname(enum_name),
        entries,
    })
}

/// `-1: x` / `0: x` / `0 : x`: already in canonical form.
fn colon_list(notes: &str) -> Marker {
    match ["-1:", "0:", "0 :"].iter().filter_map(|m| notes.find(m)).min() {
        Some(offset) => Marker::List {
            offset,
            text: notes.to_string(),
        },
        None => Marker::Absent,
    }
}

/// `0x1: a` with `0x2: b` present, a bitflag set in the same format.
fn bitflag_list(notes: &str) -> Marker {
    if !notes.contains("0x2:") {
        return Marker::Absent;
    }
    match notes.find("0x1:") {
        Some(offset) => Marker::List {
            offset,
            text: notes.to_string(),
        },
        None => Marker::Absent,
    }
}

/// `0xF0 = a`, unless the notes describe a half-byte split field.
fn hex_eq_list(notes: &str) -> Marker {
    let Some(offset) = notes.find("0xF0 =") else {
        return Marker::Absent;
    };
    let half_byte = (notes.contains("0x0F") && notes.matches('=').count() == 2)
        || notes.contains("4 most significant bits");
    if half_byte {
        return Marker::Suppressed;
    }
    Marker::List {
        offset,
        text: rewrite_tail(notes, offset, "=", ":"),
    }
}

/// `0 = a`, unless the `20 = full` false positive; starts at the
/// earliest of `0 =` and `1 =`.
fn eq_spaced_list(notes: &str) -> Marker {
    let Some(zero) = notes.find("0 =") else {
        return Marker::Absent;
    };
    if notes.contains("20 = full") {
        return Marker::Suppressed;
    }
    let offset = notes.find("1 =").map_or(zero, |o| o.min(zero));
    Marker::List {
        offset,
        text: rewrite_tail(notes, offset, "=", ":"),
    }
}

/// `0=a`, unless the `from y=0` false positive.
fn eq_tight_list(notes: &str) -> Marker {
    let Some(zero) = notes.find("0=") else {
        return Marker::Absent;
    };
    if notes.contains("from y=0") {
        return Marker::Suppressed;
    }
    let offset = notes.find("1=").map_or(zero, |o| o.min(zero));
    Marker::List {
        offset,
        text: rewrite_tail(notes, offset, "=", ":"),
    }
}

/// `1 for a`, unless it is the prose `1 for every`.
fn one_for_list(notes: &str) -> Marker {
    let Some(offset) = notes.find("1 for") else {
        return Marker::Absent;
    };
    if notes.contains("1 for every") {
        return Marker::Suppressed;
    }
    Marker::List {
        offset,
        text: rewrite_tail(notes, offset, " for", ":"),
    }
}

/// `North = ...` with commas: one hard-coded table on the wiki.
fn compass_list(notes: &str) -> Marker {
    if notes.contains("North =") && notes.contains(',') {
        Marker::List {
            offset: 0,
            text: "0: South, 1: West, 2: North, 3: East".to_string(),
        }
    } else {
        Marker::Absent
    }
}

/// `1 - a` with `0 - b` or `2 - c` present.
fn dash_list(notes: &str) -> Marker {
    if !notes.contains("0 -") && !notes.contains("2 -") {
        return Marker::Absent;
    }
    let Some(one) = notes.find("1 -") else {
        return Marker::Absent;
    };
    let offset = notes.find("0 -").map_or(one, |z| z.min(one));
    Marker::List {
        offset,
        text: rewrite_tail(notes, offset, " -", ":"),
    }
}

fn rewrite_tail(notes: &str, offset: usize, from: &str, to: &str) -> String {
    let mut out = notes[..offset].to_string();
    out.push_str(&notes[offset..].replace(from, to));
    out
}

/// Splits an entry list into `value: name` chunks.
///
/// A `;`-separated list wins unless a `,` appears before the first `;`, in
/// which case only the first `;`-segment holds the entries and they are
/// `,`-separated.
fn parse_entries(segment: &str) -> Vec<EnumEntry> {
    let chunks: Vec<&str> = match segment.find(';') {
        Some(semi) if segment[..semi].contains(',') => segment[..semi].split(',').collect(),
        Some(_) => segment.split(';').collect(),
        None => segment.split(',').collect(),
    };
    chunks
        .into_iter()
        .filter_map(|chunk| chunk.split_once(':'))
        .map(|(value, name)| normalize_entry(value, name, None))
        .collect()
}

/// Rewrites applied when a name is too long and has no splittable tail.
const SHORTEN_SUBS: &[(&str, &str)] = &[("the ", ""), ("The ", ""), ("of ", ""), ("Of ", "")];

const MAX_NAME_CHARS: usize = 29;

/// Builds one [`EnumEntry`] out of raw value/name text.
///
/// Shared by the inline dialects and the below-main tables: trims both
/// sides, untangles the parenthesized-swap spelling used by the equipment
/// slot table, moves parentheticals into the comment, shortens overlong
/// names, invents a name from the comment or value when none is left, and
/// finally constifies.
pub(crate) fn normalize_entry(
    value_raw: &str,
    name_raw: &str,
    base_comment: Option<String>,
) -> EnumEntry {
    let mut value = value_raw.trim().to_string();
    let mut name = name_raw.trim().to_string();
    let mut comment = base_comment.filter(|c| !c.trim().is_empty());

    if let Some((outer, inner)) = extract_parenthesized(&name) {
        let ranged_value = value.contains('-') || value.contains('\u{2013}');
        if ranged_value && inner.contains(':') {
            // Equipment-slot spelling: the real value/name pair sits inside
            // the parentheses, e.g. "0 – 8 (0: main hand)".
            let (v, n) = inner.split_once(':').expect("checked for ':'");
            value = v.trim().to_string();
            name = n.trim().to_string();
        } else {
            name = outer;
            push_comment(&mut comment, inner);
        }
    }

    if name.chars().count() > MAX_NAME_CHARS {
        if let Some((left, right)) = split_on_any(&name, &[" - ", ", ", ". "]) {
            name = left;
            push_comment(&mut comment, right);
        } else {
            let full = name.clone();
            name = truncate_chars(&shorten(&name), MAX_NAME_CHARS);
            push_comment(&mut comment, full);
        }
    }

    if name.is_empty() {
        name = comment
            .as_deref()
            .map(|c| c.replace('?', "").trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| format!("_{value}"));
    }

    EnumEntry {
        value,
        name: constname(&name),
        comment,
    }
}

/// Splits `before (inside) after` into `("before after", "inside")`.
fn extract_parenthesized(name: &str) -> Option<(String, String)> {
    let open = name.find('(')?;
    let close = name[open..].find(')').map(|c| open + c)?;
    let inner = name[open + 1..close].trim().to_string();
    let mut outer = name[..open].trim_end().to_string();
    let tail = name[close + 1..].trim_start();
    if !tail.is_empty() {
        outer.push(' ');
        outer.push_str(tail);
    }
    Some((outer, inner))
}

fn split_on_any(name: &str, separators: &[&str]) -> Option<(String, String)> {
    for sep in separators {
        if let Some((left, right)) = name.split_once(sep) {
            return Some((left.trim().to_string(), right.trim().to_string()));
        }
    }
    None
}

fn shorten(name: &str) -> String {
    if name.to_lowercase().contains("elder guardian") {
        return "elder guardian appearance".to_string();
    }
    let mut out = name.to_string();
    for (from, to) in SHORTEN_SUBS {
        out = out.replace(from, to);
    }
    out
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect::<String>().trim_end().to_string()
}

fn push_comment(comment: &mut Option<String>, text: String) {
    if text.is_empty() {
        return;
    }
    match comment {
        Some(c) => {
            c.push_str("; ");
            c.push_str(&text);
        }
        None => *comment = Some(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(e: &Enum) -> Vec<&str> {
        e.entries.iter().map(|x| x.name.as_str()).collect()
    }

    fn values(e: &Enum) -> Vec<&str> {
        e.entries.iter().map(|x| x.value.as_str()).collect()
    }

    #[test]
    fn semicolon_colon_list() {
        let e = inline_enum("0: idle; 1: running; 2: error", "state").unwrap();
        assert_eq!(e.name, "State");
        assert_eq!(values(&e), ["0", "1", "2"]);
        assert_eq!(names(&e), ["IDLE", "RUNNING", "ERROR"]);
    }

    #[test]
    fn comma_before_semicolon_limits_to_first_segment() {
        let e = inline_enum("0: add, 1: remove; see below for details", "action").unwrap();
        assert_eq!(names(&e), ["ADD", "REMOVE"]);
    }

    #[test]
    fn leading_prose_is_skipped() {
        let e = inline_enum("The current state. 0: ground, 1: air", "state").unwrap();
        assert_eq!(values(&e), ["0", "1"]);
    }

    #[test]
    fn negative_start_marker() {
        let e = inline_enum("-1: nothing, 0: something", "slot").unwrap();
        assert_eq!(values(&e), ["-1", "0"]);
    }

    #[test]
    fn bitflag_dialect() {
        let e =
            inline_enum("Bit mask. 0x1: on fire, 0x2: crouched, 0x8: sprinting", "flags").unwrap();
        assert_eq!(values(&e), ["0x1", "0x2", "0x8"]);
        assert_eq!(names(&e), ["ON_FIRE", "CROUCHED", "SPRINTING"]);
    }

    #[test]
    fn hex_eq_dialect() {
        let e = inline_enum("0xF0 = north, 0xB0 = south", "direction").unwrap();
        assert_eq!(values(&e), ["0xF0", "0xB0"]);
    }

    #[test]
    fn half_byte_field_is_not_an_enum() {
        assert!(inline_enum("0xF0 = type, 0x0F = direction", "meta").is_none());
        assert!(inline_enum("0xF0 = the 4 most significant bits, ...", "meta").is_none());
    }

    #[test]
    fn eq_dialects_rewrite_to_colons() {
        let e = inline_enum("0 = empty, 1 = occupied", "slot").unwrap();
        assert_eq!(names(&e), ["EMPTY", "OCCUPIED"]);
        let e = inline_enum("1=add, 2=remove", "action");
        assert!(e.is_none(), "no 0= marker, no list");
        let e = inline_enum("0=void, 1=stone", "block").unwrap();
        assert_eq!(names(&e), ["VOID", "STONE"]);
    }

    #[test]
    fn eq_false_positives_are_skipped() {
        assert!(inline_enum("0 = empty but 20 = full bar", "health").is_none());
        assert!(inline_enum("0=bedrock, counted from y=0 upwards", "height").is_none());
    }

    #[test]
    fn one_for_dialect() {
        let e = inline_enum("1 for levels, 2 for health", "reason").unwrap();
        assert_eq!(values(&e), ["1", "2"]);
        assert_eq!(names(&e), ["LEVELS", "HEALTH"]);
        assert!(inline_enum("1 for every block", "count").is_none());
    }

    #[test]
    fn compass_dialect_is_hard_coded() {
        let e = inline_enum("North = -z, South = +z, East = +x", "facing").unwrap();
        assert_eq!(values(&e), ["0", "1", "2", "3"]);
        assert_eq!(names(&e), ["SOUTH", "WEST", "NORTH", "EAST"]);
    }

    #[test]
    fn dash_dialect() {
        let e = inline_enum("0 - start, 1 - running, 2 - stop", "phase").unwrap();
        assert_eq!(values(&e), ["0", "1", "2"]);
        assert!(inline_enum("1 - something lonely", "x").is_none());
    }

    #[test]
    fn no_marker_means_no_enum() {
        assert!(inline_enum("The maximum number of players", "max").is_none());
    }

    #[test]
    fn entry_parenthetical_moves_to_comment() {
        let e = normalize_entry("3", "red (like blood)", None);
        assert_eq!(e.name, "RED");
        assert_eq!(e.comment.as_deref(), Some("like blood"));
    }

    #[test]
    fn entry_swap_rule_for_ranged_values() {
        let e = normalize_entry("0 \u{2013} 8", "hotbar (0: main hand)", None);
        assert_eq!(e.value, "0");
        assert_eq!(e.name, "MAIN_HAND");
    }

    #[test]
    fn overlong_names_split_at_separators() {
        let e = normalize_entry(
            "4",
            "Spawn a cloud of smoke particles - appears around the entity",
            None,
        );
        assert_eq!(e.name, "SPAWN_A_CLOUD_OF_SMOKE_PARTICLES");
        assert_eq!(e.comment.as_deref(), Some("appears around the entity"));
    }

    #[test]
    fn overlong_names_without_separator_are_shortened() {
        let e = normalize_entry(
            "10",
            "Play elder guardian mob appearance effect and sound",
            None,
        );
        assert_eq!(e.name, "ELDER_GUARDIAN_APPEARANCE");
        assert_eq!(
            e.comment.as_deref(),
            Some("Play elder guardian mob appearance effect and sound")
        );
    }

    #[test]
    fn empty_names_fall_back_to_comment_or_value() {
        let e = normalize_entry("7", "", Some("unused?".to_string()));
        assert_eq!(e.name, "UNUSED");
        let e = normalize_entry("7", "", None);
        assert_eq!(e.name, "_7");
    }
}
