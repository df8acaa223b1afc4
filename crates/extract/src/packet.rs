//! Per-packet extraction: main table discovery, header scan, id parse.

use protodoc_html::Section;
use protodoc_ir::names::classname;
use protodoc_ir::Packet;

use crate::below::resolve_below;
use crate::compound::{compound_columns, parse_compound};
use crate::context::LocalContext;
use crate::diag::Diagnostics;
use crate::error::PacketError;

/// Lifts one packet section into IR.
///
/// The main table is the first table of the section; everything after it
/// is handed to the below-main resolver. The packet id sits at row 1,
/// column 0 of the main table, in decimal or `0x...` hex.
pub fn extract_packet(section: &Section, diags: &mut Diagnostics) -> Result<Packet, PacketError> {
    let (table_index, table) = section.first_table().ok_or(PacketError::NoMainTable)?;
    let (names_col, types_col, notes_col) =
        compound_columns(table).ok_or(PacketError::MissingHeader)?;

    let raw_id = table.text_at(1, 0).ok_or(PacketError::MissingPacketId)?;
    let id = parse_int_auto(raw_id).map_err(|source| PacketError::BadPacketId {
        raw: raw_id.to_string(),
        source,
    })?;

    let mut packet = Packet::new(classname(&section.title), id);
    let mut ctx = LocalContext::new(names_col, types_col, notes_col, table.row_count());
    let root = packet.root();
    parse_compound(
        &mut ctx,
        &mut packet,
        table,
        1,
        root,
        table.row_count().saturating_sub(1),
        diags,
    );
    resolve_below(&mut packet, &section.content[table_index + 1..], diags);
    log::debug!("extracted {packet}");
    Ok(packet)
}

/// Parses an integer with base auto-detection: `0x...` is hex, anything
/// else decimal.
fn parse_int_auto(raw: &str) -> Result<i32, std::num::ParseIntError> {
    let trimmed = raw.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        i32::from_str_radix(hex, 16)
    } else {
        trimmed.parse()
    }
}
