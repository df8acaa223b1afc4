//! Per-table cursor state for the compound parser.

/// Column cursors and row count for the table currently being parsed.
///
/// Recursion into nested compounds and switch cases shifts the cursors
/// right and must restore them on return, in exactly the reverse order of
/// the shifts; the parser does this with explicit save/restore around each
/// recursive call.
#[derive(Debug, Clone, Copy)]
pub struct LocalContext {
    pub names_col: usize,
    pub types_col: usize,
    pub notes_col: Option<usize>,
    pub row_count: usize,
}

impl LocalContext {
    pub fn new(names_col: usize, types_col: usize, notes_col: Option<usize>, row_count: usize) -> Self {
        LocalContext {
            names_col,
            types_col,
            notes_col,
            row_count,
        }
    }
}
