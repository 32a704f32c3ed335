//! The rename/reassign orchestrator.

use std::fmt;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    model::NoteId,
    remote::RemotePersist,
    store::{NotePatch, NoteStore},
};

use super::{
    matcher::compute_backlinks,
    rewrite::{rewrite_content, RenameOp},
};

/// Counters describing one sync pass. Purely informational: a pass never
/// fails as a whole, it just reports what landed where.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Referencing notes whose rewritten content was committed locally.
    pub notes_updated: usize,
    /// Link occurrences actually rewritten across those notes.
    pub links_rewritten: usize,
    /// Remote content updates acknowledged by the backend.
    pub remote_pushed: usize,
    /// Remote content updates attempted and failed. The corresponding local
    /// commits stand regardless.
    pub remote_failed: usize,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} notes, {} links rewritten, remote {} ok / {} failed",
            self.notes_updated, self.links_rewritten, self.remote_pushed, self.remote_failed
        )
    }
}

/// Drives a full backlink pass when a note's identifying information
/// changes.
///
/// A pass has two phases with a hard ordering guarantee between them:
///
/// 1. Local: snapshot the store, find every link to the target, fold the
///    rewrite over each referencing note's tree, and commit all rewritten
///    notes in one batch. This phase is synchronous with respect to the
///    store and never aborts the pass; a stale address or a note deleted
///    mid-flight is skipped, not escalated.
/// 2. Remote: when online and signed in, push each committed note's content
///    concurrently and await the whole batch. One note's failure neither
///    cancels the others nor rolls anything back locally.
///
/// Phase 1 completes before any remote call starts; a rename is fully
/// visible locally even on a dead network. Remote divergence heals on the
/// next successful push for the same note.
pub struct BacklinkSyncer<R> {
    store: NoteStore,
    remote: R,
}

impl<R: RemotePersist> BacklinkSyncer<R> {
    pub fn new(store: NoteStore, remote: R) -> Self {
        BacklinkSyncer { store, remote }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// The target kept its id and changed title. Every link to it gets the
    /// new title (and, unless custom, new display text).
    pub async fn sync_rename(&self, target: &NoteId, new_title: &str) -> SyncOutcome {
        self.sync(target, RenameOp::retitle(new_title)).await
    }

    /// The target's id changed, typically a placeholder finalized after
    /// import or publication. Links are matched by the old id and rewritten
    /// to carry the new id and the given title.
    pub async fn sync_reassign(
        &self,
        old_id: &NoteId,
        new_id: &NoteId,
        title: &str,
    ) -> SyncOutcome {
        self.sync(old_id, RenameOp::reassign(title, new_id.clone()))
            .await
    }

    async fn sync(&self, target: &NoteId, op: RenameOp) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        let notes = self.store.snapshot();
        let backlinks = compute_backlinks(&notes, target);
        if backlinks.is_empty() {
            debug!(%target, "no backlinks to sync");
            return outcome;
        }

        let mut updates = Vec::with_capacity(backlinks.len());
        for backlink in &backlinks {
            let Some(note) = notes.get(&backlink.note_id) else {
                debug!(note = %backlink.note_id, "matched note missing from snapshot, skipping");
                continue;
            };
            let (next, rewritten) = rewrite_content(&note.content, &backlink.matches, &op);
            outcome.links_rewritten += rewritten;
            updates.push((backlink.note_id.clone(), next));
        }

        let committed = self.store.update_many(
            updates
                .iter()
                .map(|(id, content)| {
                    (
                        id.clone(),
                        NotePatch {
                            content: Some(content.clone()),
                            ..Default::default()
                        },
                    )
                })
                .collect(),
        );
        outcome.notes_updated = committed.len();

        if self.store.offline_mode() {
            info!(%target, %outcome, "backlinks synced locally, offline mode");
            return outcome;
        }
        let Some(user_id) = self.store.user_id() else {
            info!(%target, %outcome, "backlinks synced locally, not signed in");
            return outcome;
        };

        updates.retain(|(id, _)| committed.contains(id));
        let user_id = &user_id;
        let pushes = updates.iter().map(|(id, content)| async move {
            self.remote
                .update_note_content(id, content, user_id)
                .await
                .map_err(|err| {
                    warn!(note = %id, %err, "remote backlink update failed");
                })
        });
        for result in join_all(pushes).await {
            match result {
                Ok(()) => outcome.remote_pushed += 1,
                Err(()) => outcome.remote_failed += 1,
            }
        }

        info!(%target, %outcome, "backlink sync complete");
        outcome
    }
}
