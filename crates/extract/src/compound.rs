//! The compound parser: a row-by-row state machine over a materialized
//! table.
//!
//! Each row is classified as a switch case, a switch-discriminant header,
//! a nested compound (vertical rowspan), or a scalar field; everything
//! else is skipped. Recursion into nested grids shifts the column cursors
//! in the shared [`LocalContext`] and restores them on return, mirroring
//! the shifts exactly so later rows read from the right columns.

use once_cell::sync::Lazy;
use regex::Regex;

use protodoc_html::{Cell, Table};
use protodoc_ir::names::{classname, extract_type_and_length, pluralize, typename, varname};
use protodoc_ir::{CompoundId, Field, FieldId, Packet, Switch, SwitchCase};

use crate::conditions::parse_condition;
use crate::context::LocalContext;
use crate::diag::Diagnostics;
use crate::notes::inline_enum;

static CASE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s*:.+").unwrap());

/// Scans a table's first row for the compound header labels.
///
/// Returns `(names_col, types_col, notes_col)` when at least the name and
/// type columns are present; reference cells and unknown labels are
/// ignored. A table without these labels is not compound-shaped.
pub(crate) fn compound_columns(table: &Table) -> Option<(usize, usize, Option<usize>)> {
    let mut names = None;
    let mut types = None;
    let mut notes = None;
    for j in 0..table.col_count() {
        if table.is_ref(0, j) {
            continue;
        }
        let Some(text) = table.text_at(0, j) else {
            continue;
        };
        match text.to_lowercase().as_str() {
            "field name" if names.is_none() => names = Some(j),
            "field type" if types.is_none() => types = Some(j),
            "notes" if notes.is_none() => notes = Some(j),
            _ => {}
        }
    }
    match (names, types) {
        (Some(n), Some(t)) => Some((n, t, notes)),
        _ => None,
    }
}

/// Candidate names too generic to keep once a length pair is found.
const AMBIGUOUS_LENGTH_NAMES: &[&str] = &["length", "count", "size"];

/// A switch being collected; closed into the target compound when a
/// non-case row (or the end of the row range) is reached.
struct OpenSwitch {
    discriminant: FieldId,
    is_outward: bool,
    cases: Vec<SwitchCase>,
}

/// The short-lived window pairing an integer field with a following array.
#[derive(Default)]
struct LengthWindow {
    candidate: Option<FieldId>,
    ttl: u8,
}

impl LengthWindow {
    fn arm(&mut self, field: FieldId) {
        self.candidate = Some(field);
        self.ttl = 3;
    }

    /// Called on entering a new row.
    fn tick(&mut self) {
        if self.candidate.is_some() {
            self.ttl = self.ttl.saturating_sub(1);
            if self.ttl == 0 {
                self.candidate = None;
            }
        }
    }

    fn clear(&mut self) {
        self.candidate = None;
        self.ttl = 0;
    }
}

/// Parses `row_span` rows starting at `start_row` into `target`.
pub(crate) fn parse_compound(
    ctx: &mut LocalContext,
    packet: &mut Packet,
    table: &Table,
    start_row: usize,
    target: CompoundId,
    row_span: usize,
    diags: &mut Diagnostics,
) {
    let end = (start_row + row_span)
        .min(ctx.row_count)
        .min(table.row_count());
    let mut switch_field: Option<(FieldId, bool)> = None;
    let mut open_switch: Option<OpenSwitch> = None;
    let mut window = LengthWindow::default();

    let mut i = start_row;
    while i < end {
        window.tick();
        let mut advance = 1;
        'row: {
            let anchor = match table.cell(i, ctx.names_col) {
                Some(Cell::Anchor(a)) => a,
                // Absent, never populated, or covered by an already
                // processed span.
                _ => break 'row,
            };
            if anchor.is_deleted {
                break 'row;
            }
            let Some(name) = anchor.text.clone() else {
                break 'row;
            };
            let rows_here = anchor.rows.max(1);
            let is_header = anchor.is_header;
            let type_text = table.text_at(i, ctx.types_col).map(str::to_string);
            let notes_text = ctx
                .notes_col
                .and_then(|c| table.text_at(i, c))
                .map(str::to_string);

            // A case row is recognized before the no-field test: empty
            // cases are spelled "<n>: name" next to "no field" cells.
            if CASE_RE.is_match(&name) {
                advance = rows_here;
                let (value, label) = name.split_once(':').expect("matched the case pattern");
                if open_switch.is_none() {
                    match switch_field {
                        Some((discriminant, is_outward)) => {
                            open_switch = Some(OpenSwitch {
                                discriminant,
                                is_outward,
                                cases: Vec::new(),
                            });
                        }
                        None => {
                            diags.warn(format!(
                                "switch case '{}' without a prior discriminant header",
                                name.trim()
                            ));
                            break 'row;
                        }
                    }
                }
                let case_compound = packet.new_compound(classname(label));
                let saved_names = ctx.names_col;
                ctx.names_col += 1;
                // Cases keep the types column: switch columns share it.
                parse_compound(ctx, packet, table, i, case_compound, rows_here, diags);
                ctx.names_col = saved_names;
                open_switch
                    .as_mut()
                    .expect("opened above")
                    .cases
                    .push(SwitchCase {
                        value: value.trim().to_string(),
                        compound: case_compound,
                    });
                break 'row;
            }

            let no_field = name.to_lowercase().starts_with("no field")
                || type_text
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().starts_with("no field"));
            if no_field {
                break 'row;
            }

            if is_header {
                // A mid-table header names the discriminant of a switch
                // that opens on the next case row.
                let key = varname(&name);
                match packet.field_by_name(&key) {
                    Some(field) => {
                        let is_outward = packet.compound(target).field_named(&key) != Some(field);
                        switch_field = Some((field, is_outward));
                    }
                    None => diags.warn(format!(
                        "header cell references unknown field '{}'",
                        name.trim()
                    )),
                }
                break 'row;
            }

            if let Some(sw) = open_switch.take() {
                close_switch(packet, target, sw);
            }

            if rows_here > 1 {
                // Vertical rowspan: a nested compound.
                advance = rows_here;
                let compound_name = classname(&name);
                if type_text.as_deref().map(typename).as_deref() != Some("Array") {
                    diags.warn(format!(
                        "nested compound '{}' has type {:?} instead of Array",
                        compound_name, type_text
                    ));
                }
                let nested = packet.new_compound(compound_name.clone());
                let field = Field::new(
                    pluralize(&varname(&name)),
                    format!("Array[{compound_name}]"),
                    notes_text,
                );
                let field_id = packet.add_field(target, field);
                packet.set_field_compound(field_id, nested);

                let saved = (ctx.names_col, ctx.types_col);
                ctx.names_col += 1;
                ctx.types_col += 1;
                parse_compound(ctx, packet, table, i, nested, rows_here, diags);
                (ctx.names_col, ctx.types_col) = saved;

                try_pair_length(packet, target, &mut window, field_id);
                break 'row;
            }

            // Scalar field. A row without a type cell describes nothing.
            let Some(raw_type) = type_text else {
                break 'row;
            };
            let (bare_type, string_max_length) = extract_type_and_length(&raw_type);
            let mut field = Field::new(varname(&name), typename(&bare_type), notes_text.clone());
            field.string_max_length = string_max_length;
            let field_id = packet.add_field(target, field);

            if packet.field(field_id).is_array() {
                try_pair_length(packet, target, &mut window, field_id);
            }
            if packet.field(field_id).can_give_length() {
                window.arm(field_id);
            }
            if packet.field(field_id).is_optional() {
                resolve_optional(packet, target, field_id, diags);
            }
            if let Some(notes) = &notes_text {
                let owner_name = packet.field(field_id).name.clone();
                if let Some(harvested) = inline_enum(notes, &owner_name) {
                    packet.attach_enum(field_id, harvested);
                }
            }
        }
        i += advance;
    }

    if let Some(sw) = open_switch.take() {
        close_switch(packet, target, sw);
    }
}

fn close_switch(packet: &mut Packet, target: CompoundId, sw: OpenSwitch) {
    let name = packet.field(sw.discriminant).name.clone();
    packet.add_switch(
        target,
        Switch {
            name,
            discriminant: sw.discriminant,
            cases: sw.cases,
            is_outward: sw.is_outward,
        },
    );
}

/// Pairs an array field with the windowed length candidate, if the window
/// allows it, and renames over-generic candidates after their array.
fn try_pair_length(
    packet: &mut Packet,
    target: CompoundId,
    window: &mut LengthWindow,
    array: FieldId,
) {
    let Some(candidate) = window.candidate else {
        return;
    };
    let array_name = packet.field(array).name.clone();
    let candidate_name = packet.field(candidate).name.clone();
    let pair = window.ttl == 2 || (window.ttl == 1 && candidate_name.contains(&array_name));
    if !pair {
        return;
    }
    packet.link_length(array, candidate);
    if AMBIGUOUS_LENGTH_NAMES.contains(&candidate_name.as_str()) {
        packet.rename_field(candidate, target, format!("{array_name}Length"));
    }
    window.clear();
}

/// Wires an optional field to its guard: a preceding boolean directly,
/// otherwise a condition parsed from the notes prose.
fn resolve_optional(
    packet: &mut Packet,
    target: CompoundId,
    optional: FieldId,
    diags: &mut Diagnostics,
) {
    let guard = previous_non_optional(packet, target, optional);
    if let Some(guard_id) = guard {
        if packet.field(guard_id).typ == "Boolean" {
            packet.link_condition(optional, guard_id);
            return;
        }
    }
    let comment = packet.field(optional).comment.clone();
    match comment.as_deref().and_then(|c| parse_condition(packet, guard, c)) {
        Some(expr) => packet.field_mut(optional).only_if = Some(expr),
        None => diags.warn(format!(
            "optional field '{}' has no resolvable presence condition",
            packet.field(optional).name
        )),
    }
}

fn previous_non_optional(packet: &Packet, target: CompoundId, before: FieldId) -> Option<FieldId> {
    let mut previous = None;
    for id in packet.compound(target).field_ids() {
        if id == before {
            break;
        }
        if !packet.field(id).is_optional() {
            previous = Some(id);
        }
    }
    previous
}
