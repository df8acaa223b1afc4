//! Heading-to-section folding.
//!
//! The flat stream is folded into a tree of sections keyed by heading
//! level: each section owns everything between its heading and the next
//! heading of equal or higher rank. A recursive-descent reader over a
//! peekable iterator expresses the "re-read the terminating heading"
//! behavior as one token of lookahead.

use std::iter::Peekable;
use std::vec::IntoIter;

use scraper::{ElementRef, Html};

use crate::flatten::{flatten, FlatNode};
use crate::list::HtmlList;
use crate::table::Table;

/// One element of a section's body.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Section(Section),
    Table(Table),
    List(HtmlList),
    Text(String),
}

/// A hierarchized slice of the document.
///
/// Invariant: every child section has a strictly greater level than its
/// parent, and siblings keep their source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub level: u8,
    pub title: String,
    pub anchor: Option<String>,
    pub content: Vec<Fragment>,
}

impl Section {
    /// Direct child sections, in source order.
    pub fn subsections(&self) -> impl Iterator<Item = &Section> {
        self.content.iter().filter_map(|f| match f {
            Fragment::Section(s) => Some(s),
            _ => None,
        })
    }

    /// The direct child section with the given anchor id.
    pub fn sub_by_anchor(&self, anchor: &str) -> Option<&Section> {
        self.subsections()
            .find(|s| s.anchor.as_deref() == Some(anchor))
    }

    /// The direct child section with the given title.
    pub fn sub_by_title(&self, title: &str) -> Option<&Section> {
        self.subsections().find(|s| s.title == title)
    }

    /// The first table in this section's own body, with its content index.
    pub fn first_table(&self) -> Option<(usize, &Table)> {
        self.content.iter().enumerate().find_map(|(i, f)| match f {
            Fragment::Table(t) => Some((i, t)),
            _ => None,
        })
    }

    /// All tables of this section and its descendants, in document order.
    pub fn recursive_tables(&self) -> Vec<&Table> {
        let mut out = Vec::new();
        for f in &self.content {
            match f {
                Fragment::Table(t) => out.push(t),
                Fragment::Section(s) => out.extend(s.recursive_tables()),
                _ => {}
            }
        }
        out
    }
}

/// Folds a container element into top-level sections.
///
/// Content before the first heading is dropped, matching how the wiki
/// pages front-load navigation chrome.
pub fn hierarchize(root: ElementRef) -> Vec<Section> {
    let mut iter = flatten(root).into_iter().peekable();
    let mut sections = Vec::new();
    while let Some(node) = iter.next() {
        if let FlatNode::Heading {
            level,
            anchor,
            title,
        } = node
        {
            sections.push(read_section(&mut iter, level, anchor, title));
        }
    }
    sections
}

/// Convenience entry point for a whole parsed document: folds the `<body>`.
pub fn hierarchize_document(document: &Html) -> Vec<Section> {
    let body = document
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "body")
        .unwrap_or_else(|| document.root_element());
    hierarchize(body)
}

fn read_section(
    iter: &mut Peekable<IntoIter<FlatNode>>,
    level: u8,
    anchor: Option<String>,
    title: String,
) -> Section {
    let mut content = Vec::new();
    while let Some(next) = iter.peek() {
        match next {
            FlatNode::Heading { level: next_level, .. } => {
                if *next_level <= level {
                    break;
                }
                let Some(FlatNode::Heading {
                    level: child_level,
                    anchor: child_anchor,
                    title: child_title,
                }) = iter.next()
                else {
                    unreachable!("peeked a heading");
                };
                content.push(Fragment::Section(read_section(
                    iter,
                    child_level,
                    child_anchor,
                    child_title,
                )));
            }
            _ => match iter.next() {
                Some(FlatNode::Table(t)) => content.push(Fragment::Table(t)),
                Some(FlatNode::List(l)) => content.push(Fragment::List(l)),
                Some(FlatNode::Text(t)) => content.push(Fragment::Text(t)),
                _ => unreachable!("peeked a non-heading"),
            },
        }
    }
    Section {
        level,
        title,
        anchor,
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn sections_of(html: &str) -> Vec<Section> {
        let doc = Html::parse_document(html);
        let sel = Selector::parse("body").unwrap();
        hierarchize(doc.select(&sel).next().unwrap())
    }

    const NESTED: &str = r#"
        <h1><span id="Protocol">Protocol</span></h1>
        <p>intro</p>
        <h2><span id="Status">Status</span></h2>
        <h3>Clientbound</h3>
        <h4>Response</h4>
        <p>packet text</p>
        <h3>Serverbound</h3>
        <h2><span id="Login">Login</span></h2>
    "#;

    #[test]
    fn sections_nest_by_level() {
        let sections = sections_of(NESTED);
        assert_eq!(sections.len(), 1);
        let root = &sections[0];
        assert_eq!(root.level, 1);
        assert_eq!(root.anchor.as_deref(), Some("Protocol"));

        let status = root.sub_by_anchor("Status").unwrap();
        let titles: Vec<&str> = status.subsections().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Clientbound", "Serverbound"]);

        let cb = status.sub_by_title("Clientbound").unwrap();
        let packet = cb.subsections().next().unwrap();
        assert_eq!(packet.title, "Response");
        assert_eq!(packet.content, vec![Fragment::Text("packet text".into())]);

        assert!(root.sub_by_anchor("Login").is_some());
    }

    #[test]
    fn levels_are_strictly_monotone() {
        fn check(section: &Section) {
            for child in section.subsections() {
                assert!(child.level > section.level);
                check(child);
            }
        }
        for section in &sections_of(NESTED) {
            check(section);
        }
    }

    #[test]
    fn content_before_first_heading_is_dropped() {
        let sections = sections_of("<p>preamble</p><h2>Only</h2><p>body</p>");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, vec![Fragment::Text("body".into())]);
    }

    #[test]
    fn equal_level_heading_closes_the_section() {
        let sections = sections_of("<h2>A</h2><p>a</p><h2>B</h2><p>b</p>");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "A");
        assert_eq!(sections[1].content, vec![Fragment::Text("b".into())]);
    }
}
