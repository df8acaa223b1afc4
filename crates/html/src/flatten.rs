//! Cosmetic-container flattening.
//!
//! The wiki wraps meaningful content in purely presentational `div` nests.
//! Flattening walks a container and yields its semantic pieces as one linear
//! stream, descending through wrappers that merely hold a heading or a table
//! somewhere below, so that document order survives for the section builder.

use scraper::ElementRef;

use crate::list::{HtmlList, ListItem};
use crate::table::Table;
use crate::text::{element_text, has_structural_descendant, heading_level};

/// One element of the flattened document stream.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatNode {
    Heading {
        level: u8,
        anchor: Option<String>,
        title: String,
    },
    Table(Table),
    List(HtmlList),
    Text(String),
}

/// Flattens a container element into a linear stream.
///
/// Tables and lists are materialized in place; headings are reduced to
/// their level, anchor id and title; wrapper elements with structural
/// descendants are descended into; everything else becomes a trimmed text
/// run (empty runs are dropped).
pub fn flatten(container: ElementRef) -> Vec<FlatNode> {
    let mut out = Vec::new();
    flatten_into(container, &mut out);
    out
}

fn flatten_into(container: ElementRef, out: &mut Vec<FlatNode>) {
    for child in container.children() {
        if let Some(el) = ElementRef::wrap(child) {
            let name = el.value().name();
            if let Some(level) = heading_level(name) {
                let (anchor, title) = inspect_heading(el);
                out.push(FlatNode::Heading {
                    level,
                    anchor,
                    title,
                });
            } else if name == "table" {
                out.push(FlatNode::Table(Table::materialize(el)));
            } else if name == "ol" || name == "ul" {
                out.push(FlatNode::List(parse_list(el)));
            } else if has_structural_descendant(el) {
                flatten_into(el, out);
            } else if let Some(text) = element_text(el) {
                out.push(FlatNode::Text(text));
            }
        } else if let Some(t) = child.value().as_text() {
            let trimmed = t.trim();
            if !trimmed.is_empty() {
                out.push(FlatNode::Text(trimmed.to_string()));
            }
        }
    }
}

/// Reads the anchor id and title out of a heading element.
///
/// The wiki emits `<h2><span class="mw-headline" id="...">Title</span></h2>`,
/// so the id is taken from the heading itself or, failing that, from its
/// first child element.
fn inspect_heading(h: ElementRef) -> (Option<String>, String) {
    let own_id = h.value().id().map(str::to_string);
    let anchor = own_id.or_else(|| {
        h.children()
            .filter_map(ElementRef::wrap)
            .find_map(|c| c.value().id().map(str::to_string))
    });
    let title = element_text(h).unwrap_or_default();
    (anchor, title)
}

fn parse_list(list: ElementRef) -> HtmlList {
    let ordered = list.value().name() == "ol";
    let mut items = Vec::new();
    for li in list
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "li")
    {
        if let Some(nested) = sole_child_element(li) {
            match nested.value().name() {
                "ol" | "ul" => {
                    items.push(ListItem::List(parse_list(nested)));
                    continue;
                }
                "table" => {
                    items.push(ListItem::Table(Table::materialize(nested)));
                    continue;
                }
                _ => {}
            }
        }
        if let Some(text) = element_text(li) {
            items.push(ListItem::Text(text));
        }
    }
    HtmlList { ordered, items }
}

/// The single element child of `li`, if text around it is only whitespace.
fn sole_child_element(li: ElementRef) -> Option<ElementRef> {
    let mut found = None;
    for child in li.children() {
        if let Some(el) = ElementRef::wrap(child) {
            if found.is_some() {
                return None;
            }
            found = Some(el);
        } else if let Some(t) = child.value().as_text() {
            if !t.trim().is_empty() {
                return None;
            }
        }
    }
    found
}
