//! Dense table materialization.
//!
//! An HTML table with rowspan/colspan attributes is turned into a dense
//! `rows x cols` grid. A spanned region is stored once as an [`Anchor`] in
//! its top-left position; every other covered position holds a [`Cell::Ref`]
//! with the anchor's coordinates, so the grid can be addressed uniformly
//! without duplicating cell content.

use std::fmt;

use scraper::ElementRef;

use crate::text::{collect_text, is_struck};

/// The owning cell of a (possibly spanned) table region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Trimmed textual content; `None` for an empty cell.
    pub text: Option<String>,
    /// True for `<th>` cells.
    pub is_header: bool,
    /// True when the content is struck through (`<s>`/`<del>`/`<strike>`).
    pub is_deleted: bool,
    /// Number of grid rows covered, always >= 1.
    pub rows: usize,
    /// Number of grid columns covered, always >= 1.
    pub cols: usize,
}

/// One position of the materialized grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// A position never populated by the source (ragged table).
    Empty,
    /// The owning cell of its region.
    Anchor(Anchor),
    /// A position covered by a span; points back at the anchor's coordinates.
    Ref { row: usize, col: usize },
}

/// A dense rectangular grid of [`Cell`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    grid: Vec<Vec<Cell>>,
    cols: usize,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// The cell at a grid position, `None` when out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.get(row).and_then(|r| r.get(col))
    }

    /// True when the position is covered by a span but does not own it.
    pub fn is_ref(&self, row: usize, col: usize) -> bool {
        matches!(self.cell(row, col), Some(Cell::Ref { .. }))
    }

    /// The anchor visible at a position, following a [`Cell::Ref`] back to
    /// its owner.
    pub fn anchor_at(&self, row: usize, col: usize) -> Option<&Anchor> {
        match self.cell(row, col)? {
            Cell::Anchor(a) => Some(a),
            Cell::Ref { row: r, col: c } => match self.cell(*r, *c)? {
                Cell::Anchor(a) => Some(a),
                _ => None,
            },
            Cell::Empty => None,
        }
    }

    /// The text visible at a position, following references.
    pub fn text_at(&self, row: usize, col: usize) -> Option<&str> {
        self.anchor_at(row, col).and_then(|a| a.text.as_deref())
    }

    /// Materializes a `<table>` element.
    ///
    /// The column count is computed from the first row's colspans. Span
    /// values of zero or less are clamped to 1 and span rectangles are
    /// clipped to the grid; positions a ragged source never reaches stay
    /// [`Cell::Empty`].
    pub fn materialize(table: ElementRef) -> Table {
        let rows = table_rows(table);
        let cols = rows
            .first()
            .map(|tr| row_cells(*tr).map(|td| span_attr(td, "colspan")).sum())
            .unwrap_or(0);

        let mut grid = vec![vec![Cell::Empty; cols]; rows.len()];
        for (i, tr) in rows.iter().enumerate() {
            let mut j = 0;
            for td in row_cells(*tr) {
                while j < cols && grid[i][j] != Cell::Empty {
                    j += 1;
                }
                if j >= cols {
                    break;
                }
                let rowspan = span_attr(td, "rowspan");
                let colspan = span_attr(td, "colspan");
                let anchor = Anchor {
                    text: collect_text(*td),
                    is_header: td.value().name() == "th",
                    is_deleted: is_struck(*td),
                    rows: rowspan,
                    cols: colspan,
                };
                for xi in i..(i + rowspan).min(grid.len()) {
                    for xj in j..(j + colspan).min(cols) {
                        grid[xi][xj] = Cell::Ref { row: i, col: j };
                    }
                }
                grid[i][j] = Cell::Anchor(anchor);
                j += colspan;
            }
        }
        let table = Table { grid, cols };
        log::trace!("materialized\n{table}");
        table
    }
}

fn table_rows(table: ElementRef) -> Vec<ElementRef> {
    let mut rows = Vec::new();
    for child in table.children() {
        let Some(el) = ElementRef::wrap(child) else {
            continue;
        };
        match el.value().name() {
            "tr" => rows.push(el),
            "thead" | "tbody" | "tfoot" => rows.extend(
                el.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| e.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn row_cells(tr: ElementRef) -> impl Iterator<Item = ElementRef> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|e| matches!(e.value().name(), "th" | "td"))
}

fn span_attr(td: ElementRef, name: &str) -> usize {
    td.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(1)
        .max(1) as usize
}

impl fmt::Display for Table {
    /// Renders an aligned sketch of the grid, used in debug logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<Vec<String>> = self
            .grid
            .iter()
            .map(|row| row.iter().map(cell_label).collect())
            .collect();
        let mut widths = vec![0usize; self.cols];
        for row in &labels {
            for (j, label) in row.iter().enumerate() {
                widths[j] = widths[j].max(label.chars().count());
            }
        }
        writeln!(f, "Table {}x{}", self.row_count(), self.cols)?;
        for row in &labels {
            for (j, label) in row.iter().enumerate() {
                write!(f, "| {:w$} ", label, w = widths[j])?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

fn cell_label(cell: &Cell) -> String {
    match cell {
        Cell::Empty => "ø".to_string(),
        Cell::Anchor(a) => {
            let prefix = if a.is_header { "$" } else { "" };
            match &a.text {
                Some(t) => format!("{prefix}{t}"),
                None => format!("{prefix}ø"),
            }
        }
        Cell::Ref { row, col } => format!("^{row},{col}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn materialize_first(html: &str) -> Table {
        let doc = Html::parse_document(html);
        let sel = Selector::parse("table").unwrap();
        let el = doc.select(&sel).next().expect("fixture has a table");
        Table::materialize(el)
    }

    const SPANNED: &str = r#"<table>
        <tr><th>A</th><th>B</th><th>C</th></tr>
        <tr><td rowspan="2">left</td><td colspan="2">wide</td></tr>
        <tr><td>x</td><td>y</td></tr>
    </table>"#;

    #[test]
    fn spans_place_one_anchor_and_references() {
        let t = materialize_first(SPANNED);
        assert_eq!(t.row_count(), 3);
        assert_eq!(t.col_count(), 3);

        match t.cell(1, 0) {
            Some(Cell::Anchor(a)) => {
                assert_eq!(a.text.as_deref(), Some("left"));
                assert_eq!((a.rows, a.cols), (2, 1));
            }
            other => panic!("expected anchor, got {other:?}"),
        }
        assert_eq!(t.cell(2, 0), Some(&Cell::Ref { row: 1, col: 0 }));
        assert_eq!(t.cell(1, 2), Some(&Cell::Ref { row: 1, col: 1 }));
        // Shifted by the rowspan, the last row's cells land in columns 1-2.
        assert_eq!(t.text_at(2, 1), Some("x"));
        assert_eq!(t.text_at(2, 2), Some("y"));
    }

    #[test]
    fn references_resolve_to_their_anchor() {
        let t = materialize_first(SPANNED);
        assert_eq!(t.text_at(2, 0), Some("left"));
        assert!(t.is_ref(2, 0));
        assert!(!t.is_ref(1, 0));
    }

    #[test]
    fn every_position_is_consistent() {
        let t = materialize_first(SPANNED);
        let mut ref_counts = std::collections::HashMap::new();
        for i in 0..t.row_count() {
            for j in 0..t.col_count() {
                match t.cell(i, j).unwrap() {
                    Cell::Empty => {}
                    Cell::Anchor(a) => {
                        assert!(a.rows >= 1 && a.cols >= 1);
                    }
                    Cell::Ref { row, col } => {
                        // The anchor's rectangle must cover this position.
                        let a = match t.cell(*row, *col).unwrap() {
                            Cell::Anchor(a) => a,
                            other => panic!("dangling reference to {other:?}"),
                        };
                        assert!(i >= *row && i < row + a.rows);
                        assert!(j >= *col && j < col + a.cols);
                        *ref_counts.entry((*row, *col)).or_insert(0usize) += 1;
                    }
                }
            }
        }
        // Each anchor is referenced by exactly rows*cols - 1 positions
        // (clipping aside, which this fixture does not trigger).
        for ((row, col), count) in ref_counts {
            match t.cell(row, col).unwrap() {
                Cell::Anchor(a) => assert_eq!(count, a.rows * a.cols - 1),
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn zero_spans_are_clamped() {
        let t = materialize_first(
            r#"<table><tr><td colspan="0">a</td><td rowspan="-3">b</td></tr></table>"#,
        );
        assert_eq!(t.col_count(), 2);
        assert_eq!(t.text_at(0, 0), Some("a"));
        assert_eq!(t.text_at(0, 1), Some("b"));
    }

    #[test]
    fn ragged_rows_leave_empty_cells() {
        let t = materialize_first(
            r#"<table><tr><td>a</td><td>b</td><td>c</td></tr><tr><td>d</td></tr></table>"#,
        );
        assert_eq!(t.text_at(1, 0), Some("d"));
        assert_eq!(t.cell(1, 1), Some(&Cell::Empty));
        assert_eq!(t.cell(1, 2), Some(&Cell::Empty));
    }

    #[test]
    fn header_and_deleted_flags_are_recorded() {
        let t = materialize_first(
            r#"<table><tr><th>Head</th><td><s>gone</s></td></tr></table>"#,
        );
        let head = t.anchor_at(0, 0).unwrap();
        assert!(head.is_header);
        assert!(!head.is_deleted);
        let gone = t.anchor_at(0, 1).unwrap();
        assert!(!gone.is_header);
        assert!(gone.is_deleted);
        assert_eq!(gone.text.as_deref(), Some("gone"));
    }

    #[test]
    fn cell_text_joins_inline_markup_with_spaces() {
        let t = materialize_first(
            r#"<table><tr><td><a href="/VarInt">VarInt</a> Enum</td></tr></table>"#,
        );
        assert_eq!(t.text_at(0, 0), Some("VarInt Enum"));
    }

    #[test]
    fn nested_tables_do_not_corrupt_the_outer_grid() {
        let t = materialize_first(
            r#"<table>
                <tr><td>outer</td><td><table><tr><td>inner</td></tr></table></td></tr>
            </table>"#,
        );
        assert_eq!(t.row_count(), 1);
        assert_eq!(t.text_at(0, 0), Some("outer"));
        assert_eq!(t.text_at(0, 1), Some("inner"));
    }
}
