//! Backlink synchronization integration tests
//!
//! These tests drive rename and re-identification flows through the public
//! API and check both the local store and the traffic recorded by the
//! in-memory remote.

mod common;

use common::*;
use silo_core::{
    backlinks::BacklinkSyncer,
    config::SiloConfig,
    model::{DocNode, ElementKind, Note, NoteId, UserId},
    remote::MemoryRemote,
    store::NoteStore,
};
use test_log::test;

fn signed_in_store(notes: impl IntoIterator<Item = Note>) -> NoteStore {
    let store = NoteStore::with_notes(notes);
    store.set_user_id(Some(UserId::new("user-1")));
    store
}

#[test(tokio::test)]
async fn test_rename_propagates_to_every_referrer() {
    let target = Note::new(NoteId::generate(), "Garden");
    let journal = note_with(
        "Journal",
        vec![
            paragraph(vec![DocNode::text("am: "), link_to(&target)]),
            paragraph(vec![DocNode::text("pm: "), link_to(&target)]),
        ],
    );
    let ledger = note_with(
        "Ledger",
        vec![paragraph(vec![
            DocNode::text("seeds for "),
            custom_link_to(&target, "the plot"),
        ])],
    );
    let journal_id = journal.id.clone();
    let ledger_id = ledger.id.clone();

    let store = signed_in_store([target.clone(), journal, ledger]);
    let syncer = BacklinkSyncer::new(store.clone(), MemoryRemote::new());

    let outcome = syncer.sync_rename(&target.id, "Garden 2026").await;
    assert_eq!(outcome.notes_updated, 2, "outcome: {outcome}");
    assert_eq!(outcome.links_rewritten, 3, "outcome: {outcome}");
    assert_eq!(outcome.remote_pushed, 2, "outcome: {outcome}");
    assert_eq!(outcome.remote_failed, 0, "outcome: {outcome}");

    let journal = store.get(&journal_id).unwrap();
    for para in 0..2 {
        let el = element_at(&journal.content, para, 1);
        assert_eq!(el.note_title.as_deref(), Some("Garden 2026"));
        assert_eq!(el.plain_text(), "Garden 2026");
        assert_eq!(el.note_id, Some(target.id.clone()));
    }

    // User-chosen display text survives, only the carried title moves.
    let ledger = store.get(&ledger_id).unwrap();
    let el = element_at(&ledger.content, 0, 1);
    assert_eq!(el.note_title.as_deref(), Some("Garden 2026"));
    assert_eq!(el.plain_text(), "the plot");

    // The remote received exactly the committed bodies.
    assert_eq!(
        syncer.remote().content_of(&journal_id),
        Some(journal.content)
    );
    assert_eq!(syncer.remote().content_of(&ledger_id), Some(ledger.content));
}

#[test(tokio::test)]
async fn test_offline_config_keeps_rename_local() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("silo.toml");
    std::fs::write(&config_path, "offline_mode = true\n").unwrap();
    let config = SiloConfig::load(&config_path).unwrap();
    assert!(config.offline_mode);

    let target = Note::new(NoteId::generate(), "Old");
    let referrer = note_with("Referrer", vec![paragraph(vec![link_to(&target)])]);
    let referrer_id = referrer.id.clone();

    let store = signed_in_store([target.clone(), referrer]);
    store.set_offline_mode(config.offline_mode);
    let syncer = BacklinkSyncer::new(store.clone(), MemoryRemote::new());

    let outcome = syncer.sync_rename(&target.id, "New").await;
    assert_eq!(outcome.notes_updated, 1);
    assert_eq!(outcome.remote_pushed, 0);
    assert!(syncer.remote().calls().is_empty());

    let el = element_at(&store.get(&referrer_id).unwrap().content, 0, 0);
    assert_eq!(el.note_title.as_deref(), Some("New"));
}

#[test(tokio::test)]
async fn test_signed_out_rename_stays_local() {
    let target = Note::new(NoteId::generate(), "Old");
    let referrer = note_with("Referrer", vec![paragraph(vec![link_to(&target)])]);
    let referrer_id = referrer.id.clone();

    // No user session at all.
    let store = NoteStore::with_notes([target.clone(), referrer]);
    let syncer = BacklinkSyncer::new(store.clone(), MemoryRemote::new());

    let outcome = syncer.sync_rename(&target.id, "New").await;
    assert_eq!(outcome.notes_updated, 1);
    assert!(syncer.remote().calls().is_empty());

    let el = element_at(&store.get(&referrer_id).unwrap().content, 0, 0);
    assert_eq!(el.note_title.as_deref(), Some("New"));
}

#[test(tokio::test)]
async fn test_remote_failure_never_rolls_back_local() {
    let target = Note::new(NoteId::generate(), "Old");
    let flaky = note_with("Flaky", vec![paragraph(vec![link_to(&target)])]);
    let steady = note_with("Steady", vec![paragraph(vec![link_to(&target)])]);
    let flaky_id = flaky.id.clone();
    let steady_id = steady.id.clone();

    let store = signed_in_store([target.clone(), flaky, steady]);
    let remote = MemoryRemote::new();
    remote.fail_on(flaky_id.clone());
    let syncer = BacklinkSyncer::new(store.clone(), remote);

    let outcome = syncer.sync_rename(&target.id, "New").await;
    assert_eq!(outcome.notes_updated, 2);
    assert_eq!(outcome.remote_pushed, 1);
    assert_eq!(outcome.remote_failed, 1);

    // Both local copies carry the rename regardless of the failed push.
    for id in [&flaky_id, &steady_id] {
        let el = element_at(&store.get(id).unwrap().content, 0, 0);
        assert_eq!(el.note_title.as_deref(), Some("New"));
    }
    assert_eq!(syncer.remote().content_of(&flaky_id), None);
    assert!(syncer.remote().content_of(&steady_id).is_some());
}

#[test(tokio::test)]
async fn test_reassign_finalizes_placeholder_ids() {
    let referrer = note_with(
        "Journal",
        vec![paragraph(vec![
            DocNode::text("see "),
            placeholder_link("Compost"),
        ])],
    );
    let referrer_id = referrer.id.clone();

    let store = signed_in_store([referrer]);
    let syncer = BacklinkSyncer::new(store.clone(), MemoryRemote::new());

    let real = NoteId::generate();
    let outcome = syncer
        .sync_reassign(&NoteId::new("Compost"), &real, "Compost")
        .await;
    assert_eq!(outcome.links_rewritten, 1);
    assert_eq!(outcome.remote_pushed, 1);

    let el = element_at(&store.get(&referrer_id).unwrap().content, 0, 1);
    let id = el.note_id.clone().unwrap();
    assert_eq!(id, real);
    assert!(!id.is_placeholder());
    assert_eq!(el.note_title.as_deref(), Some("Compost"));
}

#[test(tokio::test)]
async fn test_table_only_references_never_sync() {
    let target = Note::new(NoteId::generate(), "Garden");
    let archive = note_with(
        "Archive",
        vec![DocNode::element(
            ElementKind::Table,
            vec![DocNode::element(
                ElementKind::TableRow,
                vec![link_to(&target)],
            )],
        )],
    );

    let store = signed_in_store([target.clone(), archive]);
    let syncer = BacklinkSyncer::new(store, MemoryRemote::new());

    let outcome = syncer.sync_rename(&target.id, "Garden 2026").await;
    assert_eq!(outcome.notes_updated, 0);
    assert_eq!(outcome.links_rewritten, 0);
    assert!(syncer.remote().calls().is_empty());
}
