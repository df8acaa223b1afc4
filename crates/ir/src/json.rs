//! Stable JSON serialization of the IR.
//!
//! Every node becomes an object with a `"dataType"` discriminator; sideways
//! references are serialized by field name so the output stands alone
//! without arena indices. This is the contract consumed by downstream code
//! generators.

use serde_json::{json, Map, Value};

use crate::ids::{CompoundId, FieldId, SwitchId};
use crate::model::{Compound, CompoundEntry, Enum, EnumEntry, Packet, Protocol, SubProtocol};

/// Serializes a whole protocol.
pub fn protocol_json(p: &Protocol) -> Value {
    json!({
        "dataType": "Protocol",
        "gameVersion": p.game_version,
        "protocolNumber": p.protocol_number,
        "handshake": sub_protocol_json(&p.handshake),
        "status": sub_protocol_json(&p.status),
        "login": sub_protocol_json(&p.login),
        "play": sub_protocol_json(&p.play),
    })
}

pub fn sub_protocol_json(sp: &SubProtocol) -> Value {
    json!({
        "dataType": "SubProtocol",
        "name": sp.name,
        "clientbound": sp.clientbound.iter().map(packet_json).collect::<Vec<_>>(),
        "serverbound": sp.serverbound.iter().map(packet_json).collect::<Vec<_>>(),
    })
}

/// Serializes a packet as its main compound plus the packet id.
pub fn packet_json(p: &Packet) -> Value {
    let mut obj = compound_object(p, p.root());
    obj.insert("dataType".into(), "PacketInfos".into());
    obj.insert("id".into(), p.id.into());
    Value::Object(obj)
}

fn compound_json(p: &Packet, id: CompoundId) -> Value {
    Value::Object(compound_object(p, id))
}

fn compound_object(p: &Packet, id: CompoundId) -> Map<String, Value> {
    let c = p.compound(id);
    let mut obj = Map::new();
    obj.insert("dataType".into(), "Compound".into());
    obj.insert("name".into(), c.name.clone().into());
    obj.insert(
        "parentField".into(),
        opt_field_name(p, c.parent_field),
    );
    obj.insert(
        "containsOutwardSwitch".into(),
        c.contains_outward_switch.into(),
    );
    let entries: Vec<Value> = c
        .entries
        .iter()
        .map(|e| match e {
            CompoundEntry::Field(f) => field_json(p, *f),
            CompoundEntry::Switch(s) => switch_json(p, *s),
        })
        .collect();
    obj.insert("entries".into(), entries.into());
    obj
}

fn field_json(p: &Packet, id: FieldId) -> Value {
    let f = p.field(id);
    json!({
        "dataType": "Field",
        "name": f.name,
        "type": f.typ,
        "comment": f.comment,
        "stringMaxLength": f.string_max_length,
        "lengthGivenBy": opt_field_name(p, f.length_given_by),
        "isLengthOf": opt_field_name(p, f.is_length_of),
        "onlyIf": f.only_if,
        "onlyIfBool": opt_field_name(p, f.only_if_bool),
        "isConditionOf": opt_field_name(p, f.is_condition_of),
        "enum": f.enumeration().map(|e| enum_json(p, id, e)).unwrap_or(Value::Null),
        "switch": f.switch().map(|s| Value::from(p.switch(s).name.clone())).unwrap_or(Value::Null),
        "compound": f.compound().map(|c| compound_json(p, c)).unwrap_or(Value::Null),
    })
}

fn switch_json(p: &Packet, id: SwitchId) -> Value {
    let s = p.switch(id);
    let entries: Vec<Value> = s
        .cases
        .iter()
        .map(|case| {
            let mut obj = compound_object(p, case.compound);
            obj.insert("dataType".into(), "SwitchEntry".into());
            obj.insert("value".into(), case.value.clone().into());
            Value::Object(obj)
        })
        .collect();
    json!({
        "dataType": "Switch",
        "name": s.name,
        "discriminant": p.field(s.discriminant).name,
        "isOutward": s.is_outward,
        "entries": entries,
    })
}

fn enum_json(p: &Packet, owner: FieldId, e: &Enum) -> Value {
    json!({
        "dataType": "Enum",
        "name": e.name,
        "discriminant": p.field(owner).name,
        "entries": e.entries.iter().map(enum_entry_json).collect::<Vec<_>>(),
    })
}

fn enum_entry_json(e: &EnumEntry) -> Value {
    json!({
        "dataType": "EnumEntry",
        "value": e.value,
        "name": e.name,
        "comment": e.comment,
    })
}

fn opt_field_name(p: &Packet, id: Option<FieldId>) -> Value {
    match id {
        Some(f) => p.field(f).name.clone().into(),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, SwitchCase};

    fn sample() -> Packet {
        let mut p = Packet::new("StatusRequest".to_string(), 0);
        let root = p.root();
        let len = p.add_field(root, Field::new("dataLength".into(), "Varint".into(), None));
        let data = p.add_field(root, Field::new("data".into(), "Array[Byte]".into(), None));
        p.link_length(data, len);
        p.attach_enum(
            len,
            Enum {
                name: "DataLength".into(),
                entries: vec![EnumEntry {
                    value: "0".into(),
                    name: "EMPTY".into(),
                    comment: None,
                }],
            },
        );
        p
    }

    #[test]
    fn packet_objects_carry_data_types() {
        let v = packet_json(&sample());
        assert_eq!(v["dataType"], "PacketInfos");
        assert_eq!(v["id"], 0);
        assert_eq!(v["name"], "StatusRequest");
        let entries = v["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["dataType"], "Field");
        assert_eq!(entries[0]["enum"]["dataType"], "Enum");
        assert_eq!(entries[0]["enum"]["entries"][0]["dataType"], "EnumEntry");
    }

    #[test]
    fn cross_references_use_field_names() {
        let v = packet_json(&sample());
        let entries = v["entries"].as_array().unwrap();
        assert_eq!(entries[0]["isLengthOf"], "data");
        assert_eq!(entries[1]["lengthGivenBy"], "dataLength");
        assert_eq!(entries[1]["enum"], Value::Null);
    }

    #[test]
    fn switches_serialize_cases_as_switch_entries() {
        let mut p = Packet::new("Interact".to_string(), 2);
        let root = p.root();
        let kind = p.add_field(root, Field::new("kind".into(), "Varint".into(), None));
        let attack = p.new_compound("Attack".into());
        p.add_switch(
            root,
            crate::model::Switch {
                name: "kind".into(),
                discriminant: kind,
                cases: vec![SwitchCase {
                    value: "1".into(),
                    compound: attack,
                }],
                is_outward: false,
            },
        );
        let v = packet_json(&p);
        let entries = v["entries"].as_array().unwrap();
        assert_eq!(entries[0]["switch"], "kind");
        assert_eq!(entries[1]["dataType"], "Switch");
        assert_eq!(entries[1]["discriminant"], "kind");
        assert_eq!(entries[1]["entries"][0]["dataType"], "SwitchEntry");
        assert_eq!(entries[1]["entries"][0]["value"], "1");
        assert_eq!(entries[1]["entries"][0]["name"], "Attack");
    }
}
