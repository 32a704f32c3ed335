//! Import pipeline integration tests
//!
//! These tests feed parsed documents through the importer, then exercise
//! the interplay between freshly minted stub notes and the backlink
//! synchronizer that later touches them.

mod common;

use std::sync::Arc;

use common::*;
use silo_core::{
    backlinks::BacklinkSyncer,
    link_ids::{ImportedDocument, NoteImporter},
    model::{DocNode, Note, NoteId, UserId},
    remote::{MemoryRemote, RemoteCall},
    store::NoteStore,
};
use test_log::test;

fn document(title: &str, content: Vec<DocNode>) -> ImportedDocument {
    ImportedDocument {
        title: title.to_string(),
        content,
    }
}

fn find_by_title(store: &NoteStore, title: &str) -> Note {
    store
        .snapshot()
        .into_values()
        .find(|note| note.title == title)
        .expect("note not found by title")
}

#[test(tokio::test)]
async fn test_import_then_rename_keeps_links_healthy() {
    let store = NoteStore::new();
    store.set_user_id(Some(UserId::new("user-1")));
    let remote = Arc::new(MemoryRemote::new());

    let importer = NoteImporter::new(store.clone(), remote.clone());
    let outcome = importer
        .import(vec![document(
            "Journal",
            vec![paragraph(vec![
                DocNode::text("see "),
                unresolved_link("Compost"),
            ])],
        )])
        .await;

    // The journal plus a stub for its unresolved target, pushed as one
    // batch.
    assert_eq!(outcome.notes_imported, 2, "outcome: {outcome}");
    assert_eq!(outcome.stubs_created, 1, "outcome: {outcome}");
    assert_eq!(outcome.remote_upserted, 2, "outcome: {outcome}");
    let calls = remote.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], RemoteCall::UpsertNotes(ids) if ids.len() == 2));

    let stub = find_by_title(&store, "Compost");
    let journal = find_by_title(&store, "Journal");
    assert_eq!(
        element_at(&journal.content, 0, 1).note_id,
        Some(stub.id.clone())
    );

    // Renaming the stub carries the journal's link along.
    let syncer = BacklinkSyncer::new(store.clone(), remote.clone());
    let sync = syncer.sync_rename(&stub.id, "Compost Basics").await;
    assert_eq!(sync.notes_updated, 1);
    assert_eq!(sync.remote_pushed, 1);

    let journal = store.get(&journal.id).unwrap();
    let el = element_at(&journal.content, 0, 1);
    assert_eq!(el.note_title.as_deref(), Some("Compost Basics"));
    assert_eq!(el.plain_text(), "Compost Basics");
    assert_eq!(el.note_id, Some(stub.id));
    assert_eq!(remote.content_of(&journal.id), Some(journal.content));
}

#[test(tokio::test)]
async fn test_import_links_to_existing_notes_by_title() {
    let existing = Note::new(NoteId::generate(), "Compost");
    let existing_id = existing.id.clone();
    let store = NoteStore::with_notes([existing]);

    let importer = NoteImporter::new(store.clone(), MemoryRemote::new());
    let outcome = importer
        .import(vec![document(
            "Journal",
            vec![paragraph(vec![unresolved_link("compost")])],
        )])
        .await;

    assert_eq!(outcome.stubs_created, 0);
    assert_eq!(outcome.notes_imported, 1);

    let journal = find_by_title(&store, "Journal");
    assert_eq!(element_at(&journal.content, 0, 0).note_id, Some(existing_id));
}

#[test(tokio::test)]
async fn test_import_is_local_only_when_offline() {
    let store = NoteStore::new();
    store.set_user_id(Some(UserId::new("user-1")));
    store.set_offline_mode(true);

    let importer = NoteImporter::new(store.clone(), MemoryRemote::new());
    let outcome = importer
        .import(vec![document(
            "Journal",
            vec![paragraph(vec![DocNode::text("offline scribbles")])],
        )])
        .await;

    assert_eq!(outcome.notes_imported, 1);
    assert_eq!(outcome.remote_upserted, 0);
    assert!(importer.remote().calls().is_empty());
    assert_eq!(store.len(), 1);
}
