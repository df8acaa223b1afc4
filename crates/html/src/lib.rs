//! Structured view over an already-parsed wiki HTML document.
//!
//! The DOM itself comes from `scraper`; callers parse the page and hand the
//! tree in. This crate turns that loose tree into the three shapes the
//! extractor works with:
//!
//! - a flat stream of headings, tables, lists and text runs (`flatten`),
//! - dense rectangular tables with rowspan/colspan resolved (`Table`),
//! - a section tree folded from the heading levels (`Section`).

pub mod flatten;
pub mod list;
pub mod section;
pub mod table;
mod text;

pub use flatten::{flatten, FlatNode};
pub use list::{HtmlList, ListItem};
pub use section::{hierarchize, hierarchize_document, Fragment, Section};
pub use table::{Anchor, Cell, Table};
