//! Text collection helpers shared by the table materializer and flattener.

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

/// Collects the text of a node and its descendants.
///
/// Every text chunk is trimmed and empty chunks are dropped; the survivors
/// are joined with a single space. Returns `None` when nothing is left,
/// which is how an empty table cell is represented downstream.
pub(crate) fn collect_text(node: NodeRef<Node>) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for n in node.descendants() {
        if let Some(t) = n.value().as_text() {
            let trimmed = t.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

pub(crate) fn element_text(el: ElementRef) -> Option<String> {
    collect_text(*el)
}

/// True when the node contains struck-through markup, which the wiki uses
/// for fields removed from the current protocol revision.
pub(crate) fn is_struck(node: NodeRef<Node>) -> bool {
    node.descendants().skip(1).any(|n| {
        n.value()
            .as_element()
            .is_some_and(|e| matches!(e.name(), "s" | "del" | "strike"))
    })
}

/// Returns the heading level for `h1`..`h6` tag names.
pub(crate) fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// True when the element has a heading or table somewhere below it, in
/// which case the flattener descends instead of yielding it whole.
pub(crate) fn has_structural_descendant(el: ElementRef) -> bool {
    el.descendants().skip(1).any(|n| {
        n.value()
            .as_element()
            .is_some_and(|e| e.name() == "table" || heading_level(e.name()).is_some())
    })
}
