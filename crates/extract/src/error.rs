//! The few hard failures a single packet can hit.

use thiserror::Error;

/// Why a packet section could not be lifted at all.
///
/// Everything else the extractor encounters degrades into a diagnostic;
/// these three drop the packet (spec'd behavior: a table without its header
/// row is not a compound, and an unreadable id means a broken document).
#[derive(Debug, Error)]
pub enum PacketError {
    #[error("packet section has no table")]
    NoMainTable,

    #[error("main table has no 'field name'/'field type' header row")]
    MissingHeader,

    #[error("main table has no packet id cell")]
    MissingPacketId,

    #[error("malformed packet id '{raw}': {source}")]
    BadPacketId {
        raw: String,
        source: std::num::ParseIntError,
    },
}

impl PacketError {
    /// True for the id failures that are reported at error severity; the
    /// header failures only warrant a warning.
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            PacketError::MissingPacketId | PacketError::BadPacketId { .. }
        )
    }
}
