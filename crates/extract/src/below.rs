//! The below-main resolver.
//!
//! Everything after a packet's main table (secondary tables, lists,
//! paragraphs) describes satellites of fields already parsed: the layout
//! of a sub-compound, the values of an enum, an attribute catalogue. This
//! pass classifies each element and links it to its *related field* using
//! the most recent piece of prose (`last_text`) and a few type hints. The
//! ordering is load-bearing: elements are observed strictly in document
//! order, and relatedness is resolved against the prose last seen.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use protodoc_html::{Fragment, HtmlList, Table};
use protodoc_ir::names::{classname, constname, varname};
use protodoc_ir::{Enum, EnumEntry, FieldId, Packet};

use crate::compound::{compound_columns, parse_compound};
use crate::context::LocalContext;
use crate::diag::Diagnostics;
use crate::notes::normalize_entry;

static INLINE_ENTRY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+:.+").unwrap());
static NUMERIC_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"number|offset|length|count").unwrap());

/// Prose suffixes that only announce the element that follows.
const PROSE_DECORATIONS: &[&str] = &["structure:", "structure :", "values:"];

/// Hard-coded prose corrections, checked in order; the wiki's bit-field
/// notices talk around the field they describe.
const PROSE_CORRECTIONS: &[(&str, &str)] = &[("bit field", "flags"), ("bit mask", "flags")];

/// Expected first-row labels of an attribute table.
const ATTRIBUTE_HEADERS: [&str; 5] = ["key", "default", "min", "max", "label"];

/// What a below-main table turned out to be.
enum TableShape {
    Compound {
        names_col: usize,
        types_col: usize,
        notes_col: Option<usize>,
    },
    Attribute,
    Enumeration,
}

/// Which relatedness filter applies to a satellite element.
#[derive(Clone, Copy, PartialEq)]
enum SatelliteKind {
    Enumeration,
    Compound,
}

/// Processes the section content following the main table.
pub(crate) fn resolve_below(packet: &mut Packet, tail: &[Fragment], diags: &mut Diagnostics) {
    let mut last_text: Option<String> = None;
    for fragment in tail {
        match fragment {
            Fragment::Text(t) => last_text = Some(clean_prose(t)),
            Fragment::Table(table) => {
                handle_table(packet, table, last_text.as_deref().unwrap_or(""), diags)
            }
            Fragment::List(list) => {
                handle_list(packet, list, last_text.as_deref().unwrap_or(""))
            }
            Fragment::Section(_) => {}
        }
    }
}

/// Normalizes a prose run into the lowercased key used for proximity
/// linking.
fn clean_prose(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    for (marker, replacement) in PROSE_CORRECTIONS {
        if lowered.contains(marker) {
            return (*replacement).to_string();
        }
    }
    let mut out = lowered;
    for decoration in PROSE_DECORATIONS {
        out = out.replace(decoration, "");
    }
    out.trim().to_string()
}

fn handle_table(packet: &mut Packet, table: &Table, last_text: &str, diags: &mut Diagnostics) {
    let headers = header_texts(table);
    match detect_shape(table) {
        TableShape::Compound {
            names_col,
            types_col,
            notes_col,
        } => {
            let Some(field) = related_field(packet, SatelliteKind::Compound, last_text, &headers)
            else {
                diags.error("sub-compound table has no related field; table discarded");
                return;
            };
            let compound_name = strip_one_layer(&packet.field(field).typ);
            let compound = packet.new_compound(compound_name);
            if !packet.set_field_compound(field, compound) {
                diags.warn(format!(
                    "field '{}' already has an attachment; sub-compound table discarded",
                    packet.field(field).name
                ));
                return;
            }
            let mut ctx = LocalContext::new(names_col, types_col, notes_col, table.row_count());
            parse_compound(
                &mut ctx,
                packet,
                table,
                1,
                compound,
                table.row_count().saturating_sub(1),
                diags,
            );
        }
        TableShape::Attribute => {
            let Some(field) = related_field(packet, SatelliteKind::Enumeration, last_text, &headers)
            else {
                diags.error("attribute table has no related field; table discarded");
                return;
            };
            parse_attribute_table(packet, table, field);
        }
        TableShape::Enumeration => {
            let Some(field) = related_field(packet, SatelliteKind::Enumeration, last_text, &headers)
            else {
                diags.error("enum table has no related field; table discarded");
                return;
            };
            parse_enum_table(packet, table, field, diags);
        }
    }
}

/// Attaches a list-shaped enum to a field the latest prose names.
fn handle_list(packet: &mut Packet, list: &HtmlList, last_text: &str) {
    if last_text.is_empty() {
        return;
    }
    let Some(field) = candidate_fields(packet, SatelliteKind::Enumeration)
        .into_iter()
        .find(|f| last_text.contains(&packet.field(*f).name.to_lowercase()))
    else {
        return;
    };
    let entries: Vec<EnumEntry> = list
        .text_items()
        .filter_map(|item| item.split_once(':'))
        .map(|(value, name)| normalize_entry(value, name, None))
        .collect();
    if entries.is_empty() {
        return;
    }
    let enum_name = classname(&packet.field(field).name);
    packet.attach_enum(
        field,
        Enum {
            name: enum_name,
            entries,
        },
    );
}

fn detect_shape(table: &Table) -> TableShape {
    if let Some((names_col, types_col, notes_col)) = compound_columns(table) {
        return TableShape::Compound {
            names_col,
            types_col,
            notes_col,
        };
    }
    if table.col_count() == ATTRIBUTE_HEADERS.len() {
        let matches = ATTRIBUTE_HEADERS.iter().enumerate().all(|(j, expected)| {
            table
                .text_at(0, j)
                .is_some_and(|t| t.to_lowercase() == *expected)
        });
        if matches {
            return TableShape::Attribute;
        }
    }
    TableShape::Enumeration
}

fn header_texts(table: &Table) -> Vec<String> {
    (0..table.col_count())
        .filter(|j| !table.is_ref(0, *j))
        .filter_map(|j| table.text_at(0, j).map(str::to_string))
        .collect()
}

/// Fields eligible to receive the satellite, most specific (longest) name
/// first; ties keep parse order.
fn candidate_fields(packet: &Packet, kind: SatelliteKind) -> Vec<FieldId> {
    packet
        .field_ids()
        .filter(|f| match kind {
            SatelliteKind::Enumeration => enum_compatible(packet, *f),
            SatelliteKind::Compound => packet.field(*f).compound().is_none(),
        })
        .sorted_by_key(|f| std::cmp::Reverse(packet.field(*f).name.len()))
        .collect()
}

/// A field can take an enum unless it already has one, its type cannot be
/// enumerated, or its comment marks it as a plain quantity.
fn enum_compatible(packet: &Packet, id: FieldId) -> bool {
    let field = packet.field(id);
    if field.enumeration().is_some() {
        return false;
    }
    if field.typ == "Boolean"
        || field.typ.starts_with("Array")
        || matches!(field.typ.as_str(), "Float" | "Double" | "Long")
    {
        return false;
    }
    if let Some(comment) = &field.comment {
        if NUMERIC_COMMENT.is_match(&comment.to_lowercase()) {
            return false;
        }
    }
    true
}

/// Stage-matched search for the field a satellite element describes.
fn related_field(
    packet: &Packet,
    kind: SatelliteKind,
    last_text: &str,
    headers: &[String],
) -> Option<FieldId> {
    let candidates = candidate_fields(packet, kind);
    let headers_lower: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let headers_norm: Vec<String> = headers.iter().map(|h| varname(h)).collect();

    // (i) the prose or a header names the field outright
    if let Some(f) = candidates.iter().find(|f| {
        let name = packet.field(**f).name.to_lowercase();
        (!last_text.is_empty() && last_text.contains(&name))
            || headers_norm.iter().any(|h| *h == packet.field(**f).name)
    }) {
        return Some(*f);
    }
    // (ii) the prose is a fragment of the field name
    if !last_text.is_empty() {
        if let Some(f) = candidates
            .iter()
            .find(|f| packet.field(**f).name.to_lowercase().contains(last_text))
        {
            return Some(*f);
        }
        // (iii) the prose names the field's type
        let collapsed = last_text.replace(' ', "");
        if !collapsed.is_empty() {
            if let Some(f) = candidates
                .iter()
                .find(|f| packet.field(**f).typ.to_lowercase().contains(&collapsed))
            {
                return Some(*f);
            }
        }
    }
    // (iv) enums only: a bare "type"/"id" header hints at the field
    if kind == SatelliteKind::Enumeration {
        for hint in ["type", "id"] {
            if headers_lower.iter().any(|h| h == hint) {
                if let Some(f) = candidates
                    .iter()
                    .find(|f| packet.field(**f).name.to_lowercase().contains(hint))
                {
                    return Some(*f);
                }
            }
        }
    }
    None
}

/// One `Array[...]` or `Option[...]` layer off a type, for naming the
/// sub-compound it describes.
fn strip_one_layer(typ: &str) -> String {
    typ.strip_prefix("Array[")
        .or_else(|| typ.strip_prefix("Option["))
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(typ)
        .to_string()
}

/// `[key, default, min, max, label]` rows become a constant catalogue.
fn parse_attribute_table(packet: &mut Packet, table: &Table, field: FieldId) {
    let mut entries = Vec::new();
    for i in 1..table.row_count() {
        if table.is_ref(i, 0) {
            continue;
        }
        let Some(anchor) = table.anchor_at(i, 0) else {
            continue;
        };
        if anchor.is_header {
            continue;
        }
        let Some(key) = anchor.text.clone() else {
            continue;
        };
        let default = table.text_at(i, 1).unwrap_or("?");
        let min = table.text_at(i, 2).unwrap_or("?");
        let max = table.text_at(i, 3).unwrap_or("?");
        let label = table.text_at(i, 4).unwrap_or("");
        entries.push(EnumEntry {
            value: key.clone(),
            name: constname(&key),
            comment: Some(format!("{label}; default {default}, min {min}, max {max}")),
        });
    }
    if entries.is_empty() {
        return;
    }
    let enum_name = classname(&packet.field(field).name);
    packet.attach_enum(
        field,
        Enum {
            name: enum_name,
            entries,
        },
    );
}

fn parse_enum_table(packet: &mut Packet, table: &Table, field: FieldId, diags: &mut Diagnostics) {
    let cols = table.col_count();
    if cols == 0 || table.row_count() < 2 {
        return;
    }

    let (values_col, names_col, comments_col, inline) = if cols == 1 {
        (0, 0, None, true)
    } else {
        let values_col = (0..cols)
            .find(|j| table.text_at(1, *j).is_some_and(starts_with_digit))
            .unwrap_or(0);
        let inline = table
            .text_at(1, values_col)
            .is_some_and(|t| INLINE_ENTRY.is_match(t));
        let field_name = packet.field(field).name.clone();
        let names_col = header_position(table, |h| varname(h) == field_name)
            .or_else(|| header_position(table, |h| h.to_lowercase().contains("name")))
            .unwrap_or(values_col + 1)
            .min(cols - 1);
        let comments_col = header_position(table, |h| h.to_lowercase() == "notes")
            .or(Some(names_col + 1))
            .filter(|c| *c < cols);
        (values_col, names_col, comments_col, inline)
    };

    if !inline
        && table
            .text_at(1, names_col)
            .is_some_and(starts_with_digit)
    {
        diags.error("enum table's first name starts with a digit; table discarded");
        return;
    }

    let mut entries = Vec::new();
    for i in 1..table.row_count() {
        if table.is_ref(i, names_col) {
            continue;
        }
        let Some(name_anchor) = table.anchor_at(i, names_col) else {
            continue;
        };
        if name_anchor.is_header {
            continue;
        }
        let comment = comments_col
            .and_then(|c| table.text_at(i, c))
            .map(str::to_string);
        let entry = if inline {
            let Some((value, name)) = table.text_at(i, values_col).and_then(|t| t.split_once(':'))
            else {
                continue;
            };
            normalize_entry(value, name, comment)
        } else {
            let Some(value) = table.text_at(i, values_col) else {
                continue;
            };
            let name = name_anchor.text.clone().unwrap_or_default();
            normalize_entry(value, &name, comment)
        };
        entries.push(entry);
    }
    if entries.is_empty() {
        return;
    }
    let enum_name = classname(&packet.field(field).name);
    packet.attach_enum(
        field,
        Enum {
            name: enum_name,
            entries,
        },
    );
}

/// First column whose header text satisfies the predicate.
fn header_position(table: &Table, pred: impl Fn(&str) -> bool) -> Option<usize> {
    (0..table.col_count()).find(|j| table.text_at(0, *j).is_some_and(|h| pred(h)))
}

fn starts_with_digit(text: &str) -> bool {
    let t = text.trim();
    let t = t.strip_prefix('-').unwrap_or(t);
    t.chars().next().is_some_and(|c| c.is_ascii_digit())
}
