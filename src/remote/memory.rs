//! In-process [`RemotePersist`] implementation.
//!
//! Serves two purposes: a null transport for embedders that want the full
//! sync pipeline without a backend, and an observable double for tests,
//! which can inspect the call log and inject per-note failures.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::{
    error::SiloError,
    model::{DocNode, Note, NoteId, UserId},
};

use super::RemotePersist;

/// One write attempt, recorded in call order whether it succeeded or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    UpdateContent(NoteId),
    UpsertNotes(Vec<NoteId>),
}

#[derive(Debug, Default)]
pub struct MemoryRemote {
    rows: RwLock<BTreeMap<NoteId, Note>>,
    contents: RwLock<BTreeMap<NoteId, Vec<DocNode>>>,
    calls: RwLock<Vec<RemoteCall>>,
    failing: RwLock<BTreeSet<NoteId>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        MemoryRemote::default()
    }

    /// Make every write addressed at `id` fail from now on.
    pub fn fail_on(&self, id: NoteId) {
        self.failing.write().insert(id);
    }

    /// Every write attempted so far, in order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.read().clone()
    }

    /// Number of content-update attempts made so far.
    pub fn update_calls(&self) -> usize {
        self.calls
            .read()
            .iter()
            .filter(|c| matches!(c, RemoteCall::UpdateContent(_)))
            .count()
    }

    /// Last successfully persisted content for a note, if any.
    pub fn content_of(&self, id: &NoteId) -> Option<Vec<DocNode>> {
        self.contents.read().get(id).cloned()
    }

    /// Rows landed by [`RemotePersist::upsert_notes`].
    pub fn rows(&self) -> BTreeMap<NoteId, Note> {
        self.rows.read().clone()
    }
}

#[async_trait]
impl RemotePersist for MemoryRemote {
    async fn update_note_content(
        &self,
        id: &NoteId,
        content: &[DocNode],
        user_id: &UserId,
    ) -> Result<(), SiloError> {
        self.calls
            .write()
            .push(RemoteCall::UpdateContent(id.clone()));
        if self.failing.read().contains(id) {
            return Err(SiloError::Remote(format!(
                "note {id} is configured to fail"
            )));
        }
        debug!(%id, user = %user_id, "memory remote storing content update");
        self.contents.write().insert(id.clone(), content.to_vec());
        Ok(())
    }

    async fn upsert_notes(&self, notes: &[Note], user_id: &UserId) -> Result<(), SiloError> {
        self.calls.write().push(RemoteCall::UpsertNotes(
            notes.iter().map(|n| n.id.clone()).collect(),
        ));
        if let Some(failing) = notes
            .iter()
            .find(|n| self.failing.read().contains(&n.id))
        {
            return Err(SiloError::Remote(format!(
                "note {} is configured to fail",
                failing.id
            )));
        }
        let mut rows = self.rows.write();
        for note in notes {
            let mut incoming = note.clone();
            incoming.user_id = Some(user_id.clone());
            // Emulate the backend's (owner, title) conflict target: an
            // existing row with the same owner and title is replaced rather
            // than left to duplicate.
            let conflict = rows
                .iter()
                .find(|(_, row)| {
                    row.user_id.as_ref() == Some(user_id) && row.title == incoming.title
                })
                .map(|(id, _)| id.clone());
            if let Some(old_id) = conflict {
                if old_id != incoming.id {
                    rows.remove(&old_id);
                }
            }
            rows.insert(incoming.id.clone(), incoming);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;

    #[test_log::test(tokio::test)]
    async fn test_records_calls_and_contents() {
        let remote = MemoryRemote::new();
        let id = NoteId::generate();
        let user = UserId::new("u1");
        let content = vec![DocNode::element(
            ElementKind::Paragraph,
            vec![DocNode::text("hello")],
        )];

        remote
            .update_note_content(&id, &content, &user)
            .await
            .unwrap();
        assert_eq!(remote.update_calls(), 1);
        assert_eq!(remote.content_of(&id), Some(content));
    }

    #[test_log::test(tokio::test)]
    async fn test_injected_failures_still_count_as_attempts() {
        let remote = MemoryRemote::new();
        let id = NoteId::generate();
        remote.fail_on(id.clone());

        let err = remote
            .update_note_content(&id, &[], &UserId::new("u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SiloError::Remote(_)));
        assert_eq!(remote.update_calls(), 1);
        assert_eq!(remote.content_of(&id), None);
    }

    #[test_log::test(tokio::test)]
    async fn test_upsert_merges_on_owner_and_title() {
        let remote = MemoryRemote::new();
        let user = UserId::new("u1");

        let first = Note::new(NoteId::generate(), "Inbox");
        remote.upsert_notes(&[first.clone()], &user).await.unwrap();

        // Same title, different id: replaces rather than duplicates.
        let second = Note::new(NoteId::generate(), "Inbox");
        remote.upsert_notes(&[second.clone()], &user).await.unwrap();

        let rows = remote.rows();
        assert_eq!(rows.len(), 1);
        assert!(rows.contains_key(&second.id));
        assert_eq!(rows[&second.id].user_id, Some(user));
    }
}
