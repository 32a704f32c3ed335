//! Shared test utilities for building note corpora

use crate::{
    model::{DocNode, Element, ElementKind, Note, NoteId},
    store::NoteStore,
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Helper function to wrap children in a paragraph element
pub fn paragraph(children: Vec<DocNode>) -> DocNode {
    DocNode::element(ElementKind::Paragraph, children)
}

/// Helper function to create a note-link resolved to `target`
pub fn link_to(target: &Note) -> DocNode {
    let mut el = Element::new(
        ElementKind::NoteLink,
        vec![DocNode::text(target.title.as_str())],
    );
    el.note_id = Some(target.id.clone());
    el.note_title = Some(target.title.clone());
    DocNode::Element(el)
}

/// Helper function to create a note-link whose display text the user
/// overrode
pub fn custom_link_to(target: &Note, text: &str) -> DocNode {
    let mut el = Element::new(ElementKind::NoteLink, vec![DocNode::text(text)]);
    el.note_id = Some(target.id.clone());
    el.note_title = Some(target.title.clone());
    el.custom_text = Some(true);
    DocNode::Element(el)
}

/// Ids for the notes [`garden_corpus`] creates.
pub struct GardenCorpus {
    pub store: NoteStore,
    pub target: NoteId,
    pub journal: NoteId,
    pub ledger: NoteId,
    pub archive: NoteId,
}

/// Create a store with one link target, "Garden", and three notes around it:
///
/// - "Journal" links to it twice, in separate paragraphs, default text
/// - "Ledger" links to it once with custom display text
/// - "Archive" links to it only from inside a table, which sync ignores
pub fn garden_corpus() -> GardenCorpus {
    init_logging();

    let target = Note::new(NoteId::generate(), "Garden");

    let journal = Note::new(NoteId::generate(), "Journal").with_content(vec![
        paragraph(vec![DocNode::text("watering notes, see "), link_to(&target)]),
        paragraph(vec![DocNode::text("pruning: "), link_to(&target)]),
    ]);
    let ledger = Note::new(NoteId::generate(), "Ledger").with_content(vec![paragraph(vec![
        DocNode::text("seeds bought for "),
        custom_link_to(&target, "my plot"),
    ])]);
    let archive = Note::new(NoteId::generate(), "Archive").with_content(vec![DocNode::element(
        ElementKind::Table,
        vec![DocNode::element(
            ElementKind::TableRow,
            vec![link_to(&target)],
        )],
    )]);

    let ids = (
        target.id.clone(),
        journal.id.clone(),
        ledger.id.clone(),
        archive.id.clone(),
    );
    let store = NoteStore::with_notes([target, journal, ledger, archive]);
    GardenCorpus {
        store,
        target: ids.0,
        journal: ids.1,
        ledger: ids.2,
        archive: ids.3,
    }
}
