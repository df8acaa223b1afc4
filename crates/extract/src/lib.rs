//! Best-effort lifter from hierarchized wiki HTML to the protocol IR.
//!
//! The entry point is [`extract_protocol`], which walks the section tree
//! for the four sub-protocols and runs, per packet, the compound parser
//! over the main table and the below-main resolver over the trailing
//! content. Anomalies become [`Diagnostic`] records; only a packet whose
//! main table is unusable is dropped.

mod below;
mod compound;
mod conditions;
mod context;
mod diag;
mod error;
mod notes;
mod packet;
mod protocol;

pub use diag::{Diagnostic, Diagnostics, Severity};
pub use error::PacketError;
pub use packet::extract_packet;
pub use protocol::extract_protocol;
