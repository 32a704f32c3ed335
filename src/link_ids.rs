//! Import-side link target resolution.
//!
//! Freshly imported documents carry note-links that only know a target
//! *title*. Before such a document is committed, every note-link needs a
//! real target id: an existing note's id when one matches the title, or a
//! freshly minted id backed by a stub note that the user can fill in later.
//! The id placeholders this pass occasionally leaves behind (a pub-link
//! keeps none at all) are what [`crate::backlinks`] later heals through
//! reassignment.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::{
    model::{DocNode, ElementKind, Note, NoteId, NoteMap},
    remote::RemotePersist,
    store::NoteStore,
};

/// Case-insensitive title to id mapping, threaded through an import batch so
/// two documents linking to the same yet-unknown title agree on one minted
/// id.
#[derive(Debug, Default)]
pub struct TitleIdCache(BTreeMap<String, NoteId>);

impl TitleIdCache {
    pub fn new() -> Self {
        TitleIdCache::default()
    }

    pub fn get(&self, title: &str) -> Option<&NoteId> {
        self.0.get(&title.to_lowercase())
    }

    pub fn insert(&mut self, title: &str, id: NoteId) {
        self.0.insert(title.to_lowercase(), id);
    }
}

/// Result of resolving one document's links.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkResolution {
    /// The document with every note-link's `noteId` filled in.
    pub content: Vec<DocNode>,
    /// Stub notes minted for titles that matched nothing, id and title only.
    pub new_notes: Vec<Note>,
}

/// Fill in `noteId` on every note-link in `content`.
///
/// Resolution order per link: the batch cache first, then a case-insensitive
/// title scan over non-wiki notes in `notes`, then a fresh id plus a stub
/// note. Pub-links are left alone, as are table subtrees, which this pass
/// treats as opaque just like the sync passes do. Links missing a title
/// cannot be resolved and keep whatever id they had.
pub fn resolve_note_ids(
    content: &[DocNode],
    notes: &NoteMap,
    cache: &mut TitleIdCache,
) -> LinkResolution {
    let mut new_notes = Vec::new();
    let content = content
        .iter()
        .map(|node| resolve_node(node, notes, cache, &mut new_notes))
        .collect();
    LinkResolution { content, new_notes }
}

fn resolve_node(
    node: &DocNode,
    notes: &NoteMap,
    cache: &mut TitleIdCache,
    new_notes: &mut Vec<Note>,
) -> DocNode {
    let DocNode::Element(el) = node else {
        return node.clone();
    };
    if el.kind.is_opaque() {
        return node.clone();
    }

    let mut el = el.clone();
    if el.kind == ElementKind::NoteLink {
        match el.note_title.clone() {
            Some(title) => {
                el.note_id = Some(note_id_for_title(&title, notes, cache, new_notes));
            }
            None => debug!("note-link without a title, leaving its id unset"),
        }
    }
    el.children = el
        .children
        .iter()
        .map(|child| resolve_node(child, notes, cache, new_notes))
        .collect();
    DocNode::Element(el)
}

fn note_id_for_title(
    title: &str,
    notes: &NoteMap,
    cache: &mut TitleIdCache,
    new_notes: &mut Vec<Note>,
) -> NoteId {
    let needle = title.to_lowercase();
    let existing = cache.get(title).cloned().or_else(|| {
        notes
            .values()
            .find(|note| !note.is_wiki && note.title.to_lowercase() == needle)
            .map(|note| note.id.clone())
    });
    let id = match existing {
        Some(id) => id,
        None => {
            let id = NoteId::generate();
            debug!(%title, %id, "minting stub note for unresolved link target");
            new_notes.push(Note::new(id.clone(), title));
            id
        }
    };
    cache.insert(title, id.clone());
    id
}

/// A document handed to the importer: already parsed into a tree, named by
/// the title it should be saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDocument {
    pub title: String,
    pub content: Vec<DocNode>,
}

/// Counters describing one import batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Notes committed to the local store, stubs included.
    pub notes_imported: usize,
    /// Stub notes minted for unresolved link targets.
    pub stubs_created: usize,
    /// Notes included in a successful remote batch upsert. Zero when
    /// offline, signed out, or the upsert failed.
    pub remote_upserted: usize,
}

impl fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} notes ({} stubs), {} pushed remotely",
            self.notes_imported, self.stubs_created, self.remote_upserted
        )
    }
}

/// Commits import batches: resolves link targets, writes everything to the
/// local store, then batch-upserts remotely when online and signed in.
///
/// Stub notes are queued before the document that caused them, so a later
/// document with the same title lands on top of its stub rather than under
/// it. The whole batch is deduplicated by id before persisting; the last
/// version of a note wins, which is always the fullest one.
pub struct NoteImporter<R> {
    store: NoteStore,
    remote: R,
}

impl<R: RemotePersist> NoteImporter<R> {
    pub fn new(store: NoteStore, remote: R) -> Self {
        NoteImporter { store, remote }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub async fn import(&self, documents: Vec<ImportedDocument>) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();
        let snapshot = self.store.snapshot();
        let mut cache = TitleIdCache::new();
        let mut incoming: Vec<Note> = Vec::new();

        for doc in documents {
            let LinkResolution { content, new_notes } =
                resolve_note_ids(&doc.content, &snapshot, &mut cache);
            outcome.stubs_created += new_notes.len();
            incoming.extend(new_notes);

            // The document's own id comes from the cache when an earlier
            // link already minted one for this title.
            let id = match cache.get(&doc.title) {
                Some(id) => id.clone(),
                None => NoteId::generate(),
            };
            cache.insert(&doc.title, id.clone());

            let mut note = Note::new(id, doc.title);
            if !content.is_empty() {
                note.content = content;
            }
            incoming.push(note);
        }

        // Last write per id wins: a full document replaces the stub minted
        // for it moments earlier.
        let mut by_id: BTreeMap<NoteId, Note> = BTreeMap::new();
        for note in incoming {
            by_id.insert(note.id.clone(), note);
        }
        let batch: Vec<Note> = by_id.into_values().collect();

        for note in &batch {
            self.store.upsert(note.clone());
        }
        outcome.notes_imported = batch.len();

        if self.store.offline_mode() {
            info!(%outcome, "import committed locally, offline mode");
            return outcome;
        }
        let Some(user_id) = self.store.user_id() else {
            info!(%outcome, "import committed locally, not signed in");
            return outcome;
        };

        match self.remote.upsert_notes(&batch, &user_id).await {
            Ok(()) => outcome.remote_upserted = batch.len(),
            Err(err) => warn!(%err, "remote import upsert failed, local copies stand"),
        }

        info!(%outcome, "import complete");
        outcome
    }
}
