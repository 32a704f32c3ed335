//! Remote persistence port.
//!
//! The engine never talks to a backend directly. Every remote write goes
//! through [`RemotePersist`], so the synchronizer and importer stay testable
//! and embedders can swap transports. [`http::RestClient`] (behind the
//! `remote-http` feature, on by default) speaks the PostgREST dialect the
//! hosted backend uses; [`memory::MemoryRemote`] keeps everything in process.

use async_trait::async_trait;

use crate::{
    error::SiloError,
    model::{DocNode, Note, NoteId, UserId},
};

#[cfg(feature = "remote-http")]
pub mod http;
pub mod memory;

#[cfg(feature = "remote-http")]
pub use http::RestClient;
pub use memory::{MemoryRemote, RemoteCall};

/// Writes the engine issues against the backing database.
///
/// Implementations are addressed per owner: every call carries the
/// authenticated user's id and must scope its effect to that user's rows.
#[async_trait]
pub trait RemotePersist: Send + Sync {
    /// Persist one note's rewritten content, addressed by note id.
    ///
    /// Only the content column travels; everything else on the row is left
    /// to the backend. Callers treat failures as best-effort losses, never
    /// as a reason to revert local state.
    async fn update_note_content(
        &self,
        id: &NoteId,
        content: &[DocNode],
        user_id: &UserId,
    ) -> Result<(), SiloError>;

    /// Batch-upsert whole notes with per-owner title conflict resolution: an
    /// incoming row whose (owner, title) pair already exists merges onto the
    /// existing row instead of duplicating it.
    async fn upsert_notes(&self, notes: &[Note], user_id: &UserId) -> Result<(), SiloError>;
}

/// Forwarding impl so an importer and a synchronizer can share one backend
/// handle, `Arc<dyn RemotePersist>` included.
#[async_trait]
impl<T: RemotePersist + ?Sized> RemotePersist for std::sync::Arc<T> {
    async fn update_note_content(
        &self,
        id: &NoteId,
        content: &[DocNode],
        user_id: &UserId,
    ) -> Result<(), SiloError> {
        (**self).update_note_content(id, content, user_id).await
    }

    async fn upsert_notes(&self, notes: &[Note], user_id: &UserId) -> Result<(), SiloError> {
        (**self).upsert_notes(notes, user_id).await
    }
}
