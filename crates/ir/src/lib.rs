//! Typed intermediate representation of a protocol.
//!
//! The tree is `Protocol -> SubProtocol -> Packet -> Compound`, where a
//! compound's entries are fields and switches. Within one packet every
//! field, compound and switch lives in an arena and is addressed by a
//! typed index, so the cross-reference graph (length providers, option
//! guards, switch discriminants) can point sideways without upsetting the
//! tree-shaped ownership.

pub mod ids;
pub mod json;
pub mod model;
pub mod names;

pub use ids::{CompoundId, FieldId, SwitchId};
pub use model::{
    Compound, CompoundEntry, Enum, EnumEntry, Field, Packet, Protocol, SubProtocol, Switch,
    SwitchCase,
};
