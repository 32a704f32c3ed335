//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use silo_core::model::{DocNode, Element, ElementKind, Note, NoteId};

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times, subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Wrap children in a paragraph element.
#[allow(dead_code)]
pub fn paragraph(children: Vec<DocNode>) -> DocNode {
    DocNode::element(ElementKind::Paragraph, children)
}

/// A note-link element resolved to `target`, default display text.
#[allow(dead_code)]
pub fn link_to(target: &Note) -> DocNode {
    let mut el = Element::new(
        ElementKind::NoteLink,
        vec![DocNode::text(target.title.as_str())],
    );
    el.note_id = Some(target.id.clone());
    el.note_title = Some(target.title.clone());
    DocNode::Element(el)
}

/// A note-link element that only names its target by title, the shape
/// importers produce before resolution.
#[allow(dead_code)]
pub fn unresolved_link(title: &str) -> DocNode {
    let mut el = Element::new(ElementKind::NoteLink, vec![DocNode::text(title)]);
    el.note_title = Some(title.to_string());
    DocNode::Element(el)
}

/// A note-link element whose display text the user overrode.
#[allow(dead_code)]
pub fn custom_link_to(target: &Note, text: &str) -> DocNode {
    let mut el = Element::new(ElementKind::NoteLink, vec![DocNode::text(text)]);
    el.note_id = Some(target.id.clone());
    el.note_title = Some(target.title.clone());
    el.custom_text = Some(true);
    DocNode::Element(el)
}

/// A note-link element whose id slot still holds the target title, the
/// legacy shape left behind by older saves.
#[allow(dead_code)]
pub fn placeholder_link(title: &str) -> DocNode {
    let mut el = Element::new(ElementKind::NoteLink, vec![DocNode::text(title)]);
    el.note_id = Some(NoteId::new(title));
    el.note_title = Some(title.to_string());
    DocNode::Element(el)
}

/// A note titled `title` whose body is the given paragraphs.
#[allow(dead_code)]
pub fn note_with(title: &str, content: Vec<DocNode>) -> Note {
    Note::new(NoteId::generate(), title).with_content(content)
}

/// Dig the element out at `paragraph` / `child` of a note body.
#[allow(dead_code)]
pub fn element_at(content: &[DocNode], paragraph: usize, child: usize) -> Element {
    content[paragraph]
        .as_element()
        .and_then(|p| p.children.get(child))
        .and_then(DocNode::as_element)
        .cloned()
        .expect("no element at that address")
}
