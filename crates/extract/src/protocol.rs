//! Whole-protocol assembly over the section tree.

use protodoc_html::Section;
use protodoc_ir::{Packet, Protocol, SubProtocol};

use crate::diag::Diagnostics;
use crate::packet::extract_packet;

/// The anchor ids of the four sub-protocol sections.
const SUB_PROTOCOL_ANCHORS: [&str; 4] = ["Handshaking", "Status", "Login", "Play"];

/// Builds the full protocol IR from the document's root section.
///
/// Always returns a protocol; missing sections and dropped packets only
/// leave diagnostics behind.
pub fn extract_protocol(
    root: &Section,
    game_version: &str,
    protocol_number: i32,
    diags: &mut Diagnostics,
) -> Protocol {
    let [handshake, status, login, play] =
        SUB_PROTOCOL_ANCHORS.map(|anchor| extract_sub_protocol(root, anchor, diags));
    Protocol {
        game_version: game_version.to_string(),
        protocol_number,
        handshake,
        status,
        login,
        play,
    }
}

fn extract_sub_protocol(root: &Section, anchor: &str, diags: &mut Diagnostics) -> SubProtocol {
    let Some(section) = root.sub_by_anchor(anchor) else {
        diags.warn(format!("sub-protocol section '{anchor}' not found"));
        return SubProtocol::empty(anchor);
    };
    let clientbound = direction_packets(section, "Clientbound", diags);
    let serverbound = direction_packets(section, "Serverbound", diags);
    SubProtocol {
        name: section.title.clone(),
        clientbound,
        serverbound,
    }
}

fn direction_packets(section: &Section, direction: &str, diags: &mut Diagnostics) -> Vec<Packet> {
    let Some(dir_section) = section.sub_by_title(direction) else {
        return Vec::new();
    };
    let mut packets = Vec::new();
    for packet_section in dir_section.subsections() {
        diags.set_packet(Some(packet_section.title.clone()));
        match extract_packet(packet_section, diags) {
            Ok(packet) => packets.push(packet),
            Err(e) if e.is_hard() => diags.error(e.to_string()),
            Err(e) => diags.warn(e.to_string()),
        }
    }
    diags.set_packet(None);
    packets
}
