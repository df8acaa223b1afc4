//! The protocol IR tree.
//!
//! Ownership is strictly tree-shaped: a [`Protocol`] owns its
//! [`SubProtocol`]s, each of which owns its [`Packet`]s. Inside a packet,
//! fields, compounds and switches live in arenas owned by the packet and
//! reference each other by typed index, never by pointer, so the sideways
//! links (length pairs, option guards, discriminants) cannot dangle and the
//! whole IR stays `Clone + PartialEq`.

use std::collections::HashMap;
use std::fmt;

use crate::ids::{CompoundId, FieldId, SwitchId};
use crate::names::classname;

/// One packet field.
///
/// At most one of `enumeration`, `switch`, `compound` is ever populated;
/// the setters on [`Packet`] refuse to attach a second kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Field {
    pub name: String,
    pub typ: String,
    pub comment: Option<String>,
    pub string_max_length: Option<u32>,
    pub length_given_by: Option<FieldId>,
    pub is_length_of: Option<FieldId>,
    pub only_if: Option<String>,
    pub only_if_bool: Option<FieldId>,
    pub is_condition_of: Option<FieldId>,
    enumeration: Option<Box<Enum>>,
    switch: Option<SwitchId>,
    compound: Option<CompoundId>,
}

impl Field {
    pub fn new(name: String, typ: String, comment: Option<String>) -> Self {
        Field {
            name,
            typ,
            comment,
            ..Field::default()
        }
    }

    pub fn enumeration(&self) -> Option<&Enum> {
        self.enumeration.as_deref()
    }

    pub fn switch(&self) -> Option<SwitchId> {
        self.switch
    }

    pub fn compound(&self) -> Option<CompoundId> {
        self.compound
    }

    /// True for `Option[...]` typed fields.
    pub fn is_optional(&self) -> bool {
        self.typ.starts_with("Option")
    }

    /// True for `Array[...]` and `Option[Array[...]]` typed fields.
    pub fn is_array(&self) -> bool {
        self.typ.starts_with("Array[") || self.typ.starts_with("Option[Array[")
    }

    /// True when the field can provide the length of a following array:
    /// an integer type, optionally wrapped in `Option[...]`.
    pub fn can_give_length(&self) -> bool {
        let bare = self
            .typ
            .strip_prefix("Option[")
            .and_then(|t| t.strip_suffix(']'))
            .unwrap_or(&self.typ);
        matches!(bare, "Varint" | "Int" | "Short" | "Byte")
    }

    fn has_attachment(&self) -> bool {
        self.enumeration.is_some() || self.switch.is_some() || self.compound.is_some()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({}: {})", self.name, self.typ)
    }
}

/// A closed set of `(value, name)` pairs attached to a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub entries: Vec<EnumEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    pub value: String,
    pub name: String,
    pub comment: Option<String>,
}

/// A tagged union discriminated by another field of the packet.
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub name: String,
    pub discriminant: FieldId,
    pub cases: Vec<SwitchCase>,
    /// True when the discriminant lies outside the compound holding the
    /// switch.
    pub is_outward: bool,
}

/// One branch of a switch: a compound plus the discriminant value that
/// selects it.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub value: String,
    pub compound: CompoundId,
}

/// An entry of a compound, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundEntry {
    Field(FieldId),
    Switch(SwitchId),
}

/// An ordered, named product of fields and switches.
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub name: String,
    pub parent_field: Option<FieldId>,
    pub entries: Vec<CompoundEntry>,
    fields_by_name: HashMap<String, FieldId>,
    pub contains_outward_switch: bool,
}

impl Compound {
    fn new(name: String) -> Self {
        Compound {
            name,
            parent_field: None,
            entries: Vec::new(),
            fields_by_name: HashMap::new(),
            contains_outward_switch: false,
        }
    }

    /// The field with the given (normalized) name, if this compound has it.
    pub fn field_named(&self, name: &str) -> Option<FieldId> {
        self.fields_by_name.get(name).copied()
    }

    /// Field entries in source order.
    pub fn field_ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.entries.iter().filter_map(|e| match e {
            CompoundEntry::Field(id) => Some(*id),
            CompoundEntry::Switch(_) => None,
        })
    }
}

/// One packet: its main compound plus the numeric id, with the arenas every
/// id of this packet points into.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub name: String,
    pub id: i32,
    root: CompoundId,
    fields: Vec<Field>,
    compounds: Vec<Compound>,
    switches: Vec<Switch>,
    /// Packet-wide field dictionary; on name collision the most recently
    /// parsed field wins, which is what the textual cross-references want.
    fields_by_name: HashMap<String, FieldId>,
}

impl Packet {
    pub fn new(name: String, id: i32) -> Self {
        let root_compound = Compound::new(name.clone());
        Packet {
            name,
            id,
            root: CompoundId::new(0),
            fields: Vec::new(),
            compounds: vec![root_compound],
            switches: Vec::new(),
            fields_by_name: HashMap::new(),
        }
    }

    /// The main compound.
    pub fn root(&self) -> CompoundId {
        self.root
    }

    pub fn field(&self, id: FieldId) -> &Field {
        &self.fields[id.index()]
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut Field {
        &mut self.fields[id.index()]
    }

    pub fn compound(&self, id: CompoundId) -> &Compound {
        &self.compounds[id.index()]
    }

    pub fn switch(&self, id: SwitchId) -> &Switch {
        &self.switches[id.index()]
    }

    /// All fields of the packet in parse order, across all compounds.
    pub fn field_ids(&self) -> impl Iterator<Item = FieldId> {
        (0..self.fields.len()).map(FieldId::new)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Looks a field up in the packet-wide dictionary.
    pub fn field_by_name(&self, name: &str) -> Option<FieldId> {
        self.fields_by_name.get(name).copied()
    }

    /// Allocates a fresh, empty compound.
    pub fn new_compound(&mut self, name: String) -> CompoundId {
        let id = CompoundId::new(self.compounds.len());
        self.compounds.push(Compound::new(name));
        id
    }

    /// Appends a field to a compound and registers its name in both the
    /// compound-local and packet-wide dictionaries.
    pub fn add_field(&mut self, compound: CompoundId, field: Field) -> FieldId {
        let id = FieldId::new(self.fields.len());
        let name = field.name.clone();
        self.fields.push(field);
        let c = &mut self.compounds[compound.index()];
        c.entries.push(CompoundEntry::Field(id));
        c.fields_by_name.insert(name.clone(), id);
        self.fields_by_name.insert(name, id);
        id
    }

    /// Appends a finished switch to a compound.
    ///
    /// Marks the compound when the switch is outward and back-links the
    /// discriminant field unless it already carries another attachment.
    pub fn add_switch(&mut self, compound: CompoundId, switch: Switch) -> SwitchId {
        let id = SwitchId::new(self.switches.len());
        let discriminant = switch.discriminant;
        let outward = switch.is_outward;
        self.switches.push(switch);
        let c = &mut self.compounds[compound.index()];
        c.entries.push(CompoundEntry::Switch(id));
        if outward {
            c.contains_outward_switch = true;
        }
        let field = &mut self.fields[discriminant.index()];
        if !field.has_attachment() {
            field.switch = Some(id);
        }
        id
    }

    /// Renames a field, updating the dictionaries that index it.
    pub fn rename_field(&mut self, id: FieldId, compound: CompoundId, new_name: String) {
        let old = std::mem::replace(&mut self.fields[id.index()].name, new_name.clone());
        let c = &mut self.compounds[compound.index()];
        if c.fields_by_name.get(&old) == Some(&id) {
            c.fields_by_name.remove(&old);
        }
        c.fields_by_name.insert(new_name.clone(), id);
        if self.fields_by_name.get(&old) == Some(&id) {
            self.fields_by_name.remove(&old);
        }
        self.fields_by_name.insert(new_name, id);
    }

    /// Establishes the symmetric length pair `array.length_given_by =
    /// provider` / `provider.is_length_of = array`.
    pub fn link_length(&mut self, array: FieldId, provider: FieldId) {
        self.fields[array.index()].length_given_by = Some(provider);
        self.fields[provider.index()].is_length_of = Some(array);
    }

    /// Establishes the symmetric boolean guard pair on an optional field.
    pub fn link_condition(&mut self, optional: FieldId, guard: FieldId) {
        let guard_name = self.fields[guard.index()].name.clone();
        let f = &mut self.fields[optional.index()];
        f.only_if = Some(guard_name);
        f.only_if_bool = Some(guard);
        self.fields[guard.index()].is_condition_of = Some(optional);
    }

    /// Attaches an enum to a field. Returns false (and leaves the field
    /// untouched) when the field already carries an enum, switch or
    /// compound.
    pub fn attach_enum(&mut self, id: FieldId, e: Enum) -> bool {
        let field = &mut self.fields[id.index()];
        if field.has_attachment() {
            return false;
        }
        field.enumeration = Some(Box::new(e));
        true
    }

    /// Makes `compound` the nested compound of `field` (and `field` its
    /// parent). Returns false when the field already carries an attachment.
    pub fn set_field_compound(&mut self, id: FieldId, compound: CompoundId) -> bool {
        if self.fields[id.index()].has_attachment() {
            return false;
        }
        self.fields[id.index()].compound = Some(compound);
        self.compounds[compound.index()].parent_field = Some(id);
        true
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Packet({}, 0x{:02X}, {} fields)", self.name, self.id, self.fields.len())
    }
}

/// One of the four connection states, with its packets per direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SubProtocol {
    pub name: String,
    pub clientbound: Vec<Packet>,
    pub serverbound: Vec<Packet>,
}

impl SubProtocol {
    pub fn empty(name: impl Into<String>) -> Self {
        SubProtocol {
            name: name.into(),
            clientbound: Vec::new(),
            serverbound: Vec::new(),
        }
    }

    pub fn packet_count(&self) -> usize {
        self.clientbound.len() + self.serverbound.len()
    }

    /// Clientbound packet by (freely spelled) name.
    pub fn clientbound_by_name(&self, name: &str) -> Option<&Packet> {
        let wanted = classname(name);
        self.clientbound.iter().find(|p| p.name == wanted)
    }

    /// Serverbound packet by (freely spelled) name.
    pub fn serverbound_by_name(&self, name: &str) -> Option<&Packet> {
        let wanted = classname(name);
        self.serverbound.iter().find(|p| p.name == wanted)
    }

    pub fn clientbound_by_id(&self, id: i32) -> Option<&Packet> {
        self.clientbound.iter().find(|p| p.id == id)
    }

    pub fn serverbound_by_id(&self, id: i32) -> Option<&Packet> {
        self.serverbound.iter().find(|p| p.id == id)
    }
}

impl fmt::Display for SubProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SubProtocol({}, clientbound: {} packets, serverbound: {} packets)",
            self.name,
            self.clientbound.len(),
            self.serverbound.len()
        )
    }
}

/// The full protocol of one game version.
#[derive(Debug, Clone, PartialEq)]
pub struct Protocol {
    pub game_version: String,
    pub protocol_number: i32,
    pub handshake: SubProtocol,
    pub status: SubProtocol,
    pub login: SubProtocol,
    pub play: SubProtocol,
}

impl Protocol {
    pub fn sub_protocols(&self) -> [&SubProtocol; 4] {
        [&self.handshake, &self.status, &self.login, &self.play]
    }

    pub fn packet_count(&self) -> usize {
        self.sub_protocols().iter().map(|s| s.packet_count()).sum()
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Protocol({}, {}, {}, {}, {}, {})",
            self.game_version, self.protocol_number, self.handshake, self.status, self.login, self.play
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_packet() -> Packet {
        Packet::new("Handshake".to_string(), 0)
    }

    #[test]
    fn fields_register_in_both_dictionaries() {
        let mut p = sample_packet();
        let root = p.root();
        let id = p.add_field(root, Field::new("state".into(), "Varint".into(), None));
        assert_eq!(p.field_by_name("state"), Some(id));
        assert_eq!(p.compound(root).field_named("state"), Some(id));
        assert_eq!(p.compound(root).entries, vec![CompoundEntry::Field(id)]);
    }

    #[test]
    fn length_links_are_reciprocal() {
        let mut p = sample_packet();
        let root = p.root();
        let len = p.add_field(root, Field::new("length".into(), "Varint".into(), None));
        let data = p.add_field(root, Field::new("data".into(), "Array[Byte]".into(), None));
        p.link_length(data, len);
        assert_eq!(p.field(data).length_given_by, Some(len));
        assert_eq!(p.field(len).is_length_of, Some(data));
    }

    #[test]
    fn condition_links_are_reciprocal() {
        let mut p = sample_packet();
        let root = p.root();
        let has = p.add_field(root, Field::new("hasMaybe".into(), "Boolean".into(), None));
        let maybe = p.add_field(root, Field::new("maybe".into(), "Option[Varint]".into(), None));
        p.link_condition(maybe, has);
        assert_eq!(p.field(maybe).only_if.as_deref(), Some("hasMaybe"));
        assert_eq!(p.field(maybe).only_if_bool, Some(has));
        assert_eq!(p.field(has).is_condition_of, Some(maybe));
    }

    #[test]
    fn attachments_are_exclusive() {
        let mut p = sample_packet();
        let root = p.root();
        let f = p.add_field(root, Field::new("mode".into(), "Varint".into(), None));
        assert!(p.attach_enum(
            f,
            Enum {
                name: "Mode".into(),
                entries: vec![],
            }
        ));
        let nested = p.new_compound("Mode".into());
        assert!(!p.set_field_compound(f, nested));
        assert!(!p.attach_enum(
            f,
            Enum {
                name: "Again".into(),
                entries: vec![],
            }
        ));
        assert!(p.field(f).enumeration().is_some());
        assert_eq!(p.field(f).compound(), None);
    }

    #[test]
    fn outward_switch_marks_the_compound() {
        let mut p = sample_packet();
        let root = p.root();
        let kind = p.add_field(root, Field::new("kind".into(), "Varint".into(), None));
        let case = p.new_compound("Alpha".into());
        p.add_switch(
            root,
            Switch {
                name: "kind".into(),
                discriminant: kind,
                cases: vec![SwitchCase {
                    value: "0".into(),
                    compound: case,
                }],
                is_outward: true,
            },
        );
        assert!(p.compound(root).contains_outward_switch);
        assert!(p.field(kind).switch().is_some());
    }

    #[test]
    fn rename_moves_the_dictionary_entries() {
        let mut p = sample_packet();
        let root = p.root();
        let len = p.add_field(root, Field::new("length".into(), "Varint".into(), None));
        p.rename_field(len, root, "dataLength".into());
        assert_eq!(p.field(len).name, "dataLength");
        assert_eq!(p.field_by_name("dataLength"), Some(len));
        assert_eq!(p.field_by_name("length"), None);
        assert_eq!(p.compound(root).field_named("length"), None);
    }

    #[test]
    fn type_predicates() {
        let f = |t: &str| Field::new("x".into(), t.into(), None);
        assert!(f("Option[Varint]").is_optional());
        assert!(f("Array[Byte]").is_array());
        assert!(f("Option[Array[Byte]]").is_array());
        assert!(f("Varint").can_give_length());
        assert!(f("Option[Int]").can_give_length());
        assert!(!f("Long").can_give_length());
        assert!(!f("Array[Byte]").can_give_length());
    }

    #[test]
    fn sub_protocol_lookups() {
        let mut sp = SubProtocol::empty("Play");
        sp.clientbound.push(Packet::new("SpawnObject".into(), 0));
        sp.serverbound.push(Packet::new("ChatMessage".into(), 2));
        assert!(sp.clientbound_by_name("Spawn Object").is_some());
        assert!(sp.serverbound_by_name("chat message").is_some());
        assert!(sp.serverbound_by_id(2).is_some());
        assert_eq!(sp.packet_count(), 2);
    }
}
