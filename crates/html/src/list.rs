//! Ordered and unordered HTML lists.

use crate::table::Table;

/// An `<ol>` or `<ul>` with its items.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlList {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

/// One `<li>`: either a text run or a nested structure.
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    Text(String),
    List(HtmlList),
    Table(Table),
}

impl HtmlList {
    /// The textual items, skipping nested structures.
    pub fn text_items(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            ListItem::Text(t) => Some(t.as_str()),
            _ => None,
        })
    }
}
