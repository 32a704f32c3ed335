//! In-memory note store: the authoritative local working set.
//!
//! The store is a cheaply cloneable handle over shared state. Reads hand out
//! snapshots so scans never hold the lock while they walk documents; writes
//! take the lock briefly and announce themselves on a broadcast channel after
//! the commit lands. Local commits are authoritative: remote persistence is
//! layered on top and never blocks or rolls back a store write.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::model::{DocNode, Note, NoteId, NoteMap, UserId};

/// Capacity of the change feed. Slow subscribers that fall further behind
/// than this observe a `Lagged` error, not missed commits.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Change notification emitted after a commit has landed in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreEvent {
    /// A note was inserted whole, or replaced whole.
    NoteUpserted(NoteId),
    /// An existing note had a subset of fields patched.
    NoteUpdated(NoteId),
    NoteRemoved(NoteId),
}

impl fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreEvent::NoteUpserted(id) => write!(f, "NoteUpserted({id})"),
            StoreEvent::NoteUpdated(id) => write!(f, "NoteUpdated({id})"),
            StoreEvent::NoteRemoved(id) => write!(f, "NoteRemoved({id})"),
        }
    }
}

/// Partial note update. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<Vec<DocNode>>,
    pub md_content: Option<String>,
    pub cover: Option<String>,
    pub is_pub: Option<bool>,
    pub is_wiki: Option<bool>,
    pub is_daily: Option<bool>,
}

impl NotePatch {
    fn apply(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(md_content) = self.md_content {
            note.md_content = Some(md_content);
        }
        if let Some(cover) = self.cover {
            note.cover = Some(cover);
        }
        if let Some(is_pub) = self.is_pub {
            note.is_pub = is_pub;
        }
        if let Some(is_wiki) = self.is_wiki {
            note.is_wiki = is_wiki;
        }
        if let Some(is_daily) = self.is_daily {
            note.is_daily = is_daily;
        }
        note.updated_at = Utc::now();
    }
}

struct StoreInner {
    notes: RwLock<NoteMap>,
    offline: AtomicBool,
    user_id: RwLock<Option<UserId>>,
    events: broadcast::Sender<StoreEvent>,
}

/// Handle to the shared note collection. Clones observe and mutate the same
/// state.
#[derive(Clone)]
pub struct NoteStore {
    inner: Arc<StoreInner>,
}

impl Default for NoteStore {
    fn default() -> Self {
        NoteStore::new()
    }
}

impl NoteStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        NoteStore {
            inner: Arc::new(StoreInner {
                notes: RwLock::new(BTreeMap::new()),
                offline: AtomicBool::new(false),
                user_id: RwLock::new(None),
                events,
            }),
        }
    }

    pub fn with_notes(notes: impl IntoIterator<Item = Note>) -> Self {
        let store = NoteStore::new();
        {
            let mut guard = store.inner.notes.write();
            for note in notes {
                guard.insert(note.id.clone(), note);
            }
        }
        store
    }

    /// Clone of the full collection. Scans operate on the snapshot so a
    /// concurrent editor keystroke cannot shift paths mid-walk.
    pub fn snapshot(&self) -> NoteMap {
        self.inner.notes.read().clone()
    }

    pub fn get(&self, id: &NoteId) -> Option<Note> {
        self.inner.notes.read().get(id).cloned()
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.inner.notes.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.notes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.notes.read().is_empty()
    }

    /// Insert or replace a whole note.
    pub fn upsert(&self, note: Note) {
        let id = note.id.clone();
        self.inner.notes.write().insert(id.clone(), note);
        self.emit(StoreEvent::NoteUpserted(id));
    }

    /// Patch an existing note, bumping `updated_at`. Patches addressed to
    /// ids the store does not hold are dropped, never upserted: the note was
    /// deleted since the caller looked.
    pub fn update(&self, id: &NoteId, patch: NotePatch) -> bool {
        let committed = {
            let mut guard = self.inner.notes.write();
            match guard.get_mut(id) {
                Some(note) => {
                    patch.apply(note);
                    true
                }
                None => false,
            }
        };
        if committed {
            self.emit(StoreEvent::NoteUpdated(id.clone()));
        } else {
            debug!(%id, "dropping patch for unknown note");
        }
        committed
    }

    /// Patch a batch of notes under one write lock, so readers observe either
    /// none or all of a sync pass. Returns the ids that were present and
    /// committed.
    pub fn update_many(&self, updates: Vec<(NoteId, NotePatch)>) -> Vec<NoteId> {
        let mut committed = Vec::with_capacity(updates.len());
        {
            let mut guard = self.inner.notes.write();
            for (id, patch) in updates {
                match guard.get_mut(&id) {
                    Some(note) => {
                        patch.apply(note);
                        committed.push(id);
                    }
                    None => debug!(%id, "dropping patch for unknown note"),
                }
            }
        }
        for id in &committed {
            self.emit(StoreEvent::NoteUpdated(id.clone()));
        }
        committed
    }

    pub fn remove(&self, id: &NoteId) -> Option<Note> {
        let removed = self.inner.notes.write().remove(id);
        if removed.is_some() {
            self.emit(StoreEvent::NoteRemoved(id.clone()));
        }
        removed
    }

    /// Subscribe to commit notifications. Only commits after the call are
    /// observed.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    /// When set, sync passes stop at the local commit and make no remote
    /// calls at all.
    pub fn offline_mode(&self) -> bool {
        self.inner.offline.load(Ordering::SeqCst)
    }

    pub fn set_offline_mode(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Owner under which remote writes are issued. `None` means signed out,
    /// which also suppresses remote calls.
    pub fn user_id(&self) -> Option<UserId> {
        self.inner.user_id.read().clone()
    }

    pub fn set_user_id(&self, user_id: Option<UserId>) {
        *self.inner.user_id.write() = user_id;
    }

    fn emit(&self, event: StoreEvent) {
        // Err only means nobody is subscribed right now.
        let _ = self.inner.events.send(event);
    }
}

impl fmt::Debug for NoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteStore")
            .field("notes", &self.len())
            .field("offline", &self.offline_mode())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for NoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoteStore({} notes)", self.len())
    }
}
