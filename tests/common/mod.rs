//! Shared fixtures and helpers for the integration tests.

use protodoc::{Extraction, Html};

/// A miniature documentation page exercising every extraction path: plain
/// scalar packets, inline enums, length pairs, boolean guards, nested
/// compounds, switches, and below-main satellites. The cosmetic `div`
/// wrapper mirrors the wiki's markup.
pub const PAGE: &str = r#"
<div class="mw-parser-output">
<h1><span id="Protocol">Protocol</span></h1>
<p>This page documents the protocol.</p>

<h2><span id="Handshaking">Handshaking</span></h2>
<h3>Serverbound</h3>
<h4>Handshake</h4>
<p>Initiates the connection.</p>
<table>
  <tr><th>Packet ID</th><th>State</th><th>Bound To</th>
      <th>Field Name</th><th>Field Type</th><th>Notes</th></tr>
  <tr><td rowspan="4">0x00</td><td rowspan="4">Handshaking</td><td rowspan="4">Server</td>
      <td>Protocol Version</td><td>VarInt</td><td></td></tr>
  <tr><td>Username</td><td>String (16)</td><td></td></tr>
  <tr><td>Server Address</td><td>String (255)</td><td>Hostname or IP</td></tr>
  <tr><td>Server Port</td><td>Unsigned Short</td><td></td></tr>
</table>

<h2><span id="Status">Status</span></h2>
<h3>Clientbound</h3>
<h4>Status Response</h4>
<table>
  <tr><th>Packet ID</th><th>State</th><th>Bound To</th>
      <th>Field Name</th><th>Field Type</th><th>Notes</th></tr>
  <tr><td>0x00</td><td>Status</td><td>Client</td>
      <td>State</td><td>Int</td><td>0: idle; 1: running; 2: error</td></tr>
</table>
<h3>Serverbound</h3>
<h4>Status Request</h4>
<table>
  <tr><th>Packet ID</th><th>State</th><th>Bound To</th>
      <th>Field Name</th><th>Field Type</th><th>Notes</th></tr>
  <tr><td>0x00</td><td>Status</td><td>Server</td>
      <td>no field</td><td>no field</td><td></td></tr>
</table>

<h2><span id="Login">Login</span></h2>
<h3>Serverbound</h3>
<h4>Encryption Begin</h4>
<table>
  <tr><th>Packet ID</th><th>State</th><th>Bound To</th>
      <th>Field Name</th><th>Field Type</th><th>Notes</th></tr>
  <tr><td rowspan="4">0x01</td><td rowspan="4">Login</td><td rowspan="4">Server</td>
      <td>Length</td><td>VarInt</td><td></td></tr>
  <tr><td>Data</td><td>Byte Array</td><td></td></tr>
  <tr><td>Has Token</td><td>Boolean</td><td></td></tr>
  <tr><td>Token</td><td>Optional VarInt</td><td></td></tr>
</table>

<h2><span id="Play">Play</span></h2>
<h3>Clientbound</h3>
<h4>Particle Burst</h4>
<table>
  <tr><th>Packet ID</th><th>State</th><th>Bound To</th>
      <th colspan="2">Field Name</th><th colspan="2">Field Type</th><th>Notes</th></tr>
  <tr><td rowspan="4">0x24</td><td rowspan="4">Play</td><td rowspan="4">Client</td>
      <td colspan="2">Count</td><td colspan="2">VarInt</td><td></td></tr>
  <tr><td rowspan="2">Particle</td><td>Particle ID</td><td rowspan="2">Array</td><td>VarInt</td><td></td></tr>
  <tr><td>Data</td><td>Float</td><td></td></tr>
  <tr><td colspan="2">Scale</td><td colspan="2">Float</td><td></td></tr>
</table>
<h4>Entity Action</h4>
<table>
  <tr><th>Packet ID</th><th>State</th><th>Bound To</th>
      <th colspan="2">Field Name</th><th colspan="2">Field Type</th><th>Notes</th></tr>
  <tr><td rowspan="5">0x1B</td><td rowspan="5">Play</td><td rowspan="5">Client</td>
      <td colspan="2">Kind</td><td colspan="2">VarInt</td><td></td></tr>
  <tr><th colspan="5">Kind</th></tr>
  <tr><td>0: alpha</td><td>Alpha Value</td><td colspan="2">Int</td><td></td></tr>
  <tr><td>1: beta</td><td>no field</td><td colspan="2">no field</td><td></td></tr>
  <tr><td colspan="2">Footer</td><td colspan="2">Byte</td><td></td></tr>
</table>
<h3>Serverbound</h3>
<h4>Client Status</h4>
<table>
  <tr><th>Packet ID</th><th>State</th><th>Bound To</th>
      <th>Field Name</th><th>Field Type</th><th>Notes</th></tr>
  <tr><td rowspan="2">0x04</td><td rowspan="2">Play</td><td rowspan="2">Server</td>
      <td>Action</td><td>VarInt</td><td>See below</td></tr>
  <tr><td>Mode</td><td>Unsigned Byte</td><td></td></tr>
</table>
<p>Action values:</p>
<table>
  <tr><th>Value</th><th>Name</th><th>Notes</th></tr>
  <tr><td>0</td><td>perform respawn</td><td>sent after death</td></tr>
  <tr><td>1</td><td>request stats</td><td></td></tr>
</table>
<p>The mode can be:</p>
<ul>
  <li>0: survival</li>
  <li>1: creative</li>
</ul>
</div>
"#;

pub fn extract_page(html: &str) -> Extraction {
    let _ = env_logger::builder().is_test(true).try_init();
    let document = Html::parse_document(html);
    protodoc::extract_protocol(&document, "1.12.2", 340)
}

pub fn extract_fixture() -> Extraction {
    extract_page(PAGE)
}
