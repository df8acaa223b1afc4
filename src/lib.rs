// --- Module Structure ---
// `protodoc-html`:    structured view over the parsed wiki DOM (flattened
//                     streams, dense tables, section trees).
// `protodoc-ir`:      the typed protocol IR, identifier normalizers and the
//                     JSON contract for downstream generators.
// `protodoc-extract`: the best-effort lifter wiring the two together.
//
// This crate is the integration layer: callers parse the page themselves
// (the HTML fetch and the DOM parser are outside the core) and get back an
// owned `Protocol` plus the diagnostics the run produced.

pub use protodoc_extract::{Diagnostic, Diagnostics, PacketError, Severity};
pub use protodoc_html::{hierarchize, hierarchize_document, Fragment, HtmlList, Section, Table};
pub use protodoc_ir::json::{packet_json, protocol_json};
pub use protodoc_ir::names;
pub use protodoc_ir::{
    Compound, CompoundEntry, CompoundId, Enum, EnumEntry, Field, FieldId, Packet, Protocol,
    SubProtocol, Switch, SwitchCase, SwitchId,
};

// Re-exported so callers can parse without pinning the DOM crate
// themselves.
pub use scraper::Html;

/// The outcome of one extraction run: the IR plus everything the lifter
/// had to complain about along the way.
#[derive(Debug)]
pub struct Extraction {
    pub protocol: Protocol,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    /// The stable JSON contract plus the run's diagnostics.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "protocol": protocol_json(&self.protocol),
            "diagnostics": self.diagnostics,
        })
    }
}

/// Extracts the protocol IR from a parsed documentation page.
///
/// Never fails: unusable packets are dropped with diagnostics, missing
/// sub-protocol sections come back empty.
pub fn extract_protocol(document: &Html, game_version: &str, protocol_number: i32) -> Extraction {
    let mut diagnostics = Diagnostics::new();
    let sections = hierarchize_document(document);
    let protocol = match sections.first() {
        Some(root) => {
            protodoc_extract::extract_protocol(root, game_version, protocol_number, &mut diagnostics)
        }
        None => {
            diagnostics.error("document has no headings; nothing to extract");
            Protocol {
                game_version: game_version.to_string(),
                protocol_number,
                handshake: SubProtocol::empty("Handshaking"),
                status: SubProtocol::empty("Status"),
                login: SubProtocol::empty("Login"),
                play: SubProtocol::empty("Play"),
            }
        }
    };
    log::info!(
        "extracted {} packets from protocol {} ({})",
        protocol.packet_count(),
        protocol.protocol_number,
        protocol.game_version
    );
    Extraction {
        protocol,
        diagnostics: diagnostics.into_records(),
    }
}
