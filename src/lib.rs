//! # silo-core
//!
//! A Rust library for keeping note-to-note links consistent across renames, re-identifications,
//! and imports, with local-first persistence and best-effort remote synchronization.
//!
//! The name "silo" refers to the local store every user keeps: notes land there first and fan
//! out to the backend only when the network and a session allow it.
//!
//! ## Overview
//!
//! silo-core operates on notes whose bodies are JSON trees of elements and text leaves, the
//! shape produced by block-based editors. Inline link elements carry both a stable target id
//! and a denormalized target title, so every rename or id change leaves the corpus briefly
//! inconsistent. This library finds the affected links, rewrites them in place, commits the
//! results locally, and pushes them to the remote backend without ever letting a network
//! failure lose a local write.
//!
//! ### Key Features
//!
//! - **Backlink healing**: One pass finds and rewrites every link to a renamed or re-identified note
//! - **Local-first writes**: The in-memory store commits before any remote call starts
//! - **Best-effort fan-out**: Concurrent per-note remote updates, failures logged and isolated
//! - **Offline awareness**: A store-level flag and the session state gate all remote traffic
//! - **Lossless trees**: Unknown element attributes and text marks survive every rewrite
//! - **Import resolution**: Imported documents get their link targets resolved or stubbed in one batch
//!
//! ## Architecture
//!
//! The library is organized around several key components:
//!
//! - **[`model`]**: Note and document-tree data structures (`Note`, `DocNode`, `Element`)
//! - **[`store`]**: Shared in-memory note store with change events (`NoteStore`)
//! - **[`backlinks`]**: Corpus scan, link rewriting, and the synchronization driver (`BacklinkSyncer`)
//! - **[`link_ids`]**: Import-side link target resolution and stub minting (`NoteImporter`)
//! - **[`path`]**: Child-index addressing into document trees (`TreePath`)
//! - **[`remote`]**: Remote persistence port and its transports (`RemotePersist`, `RestClient`)
//! - **[`config`]**: TOML configuration for offline default and remote endpoint
//!
//! ## Quick Start
//!
//! ### Renaming a Note
//!
//! Rewrite every link to a note after its title changes:
//!
//! ```rust,no_run
//! use silo_core::backlinks::BacklinkSyncer;
//! use silo_core::model::{Note, NoteId};
//! use silo_core::remote::MemoryRemote;
//! use silo_core::store::NoteStore;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let store = NoteStore::new();
//!     let garden = Note::new(NoteId::generate(), "Garden");
//!     let target = garden.id.clone();
//!     store.upsert(garden);
//!     // ... add notes whose bodies link to "Garden" ...
//!
//!     let syncer = BacklinkSyncer::new(store, MemoryRemote::new());
//!     let outcome = syncer.sync_rename(&target, "Garden 2026").await;
//!     println!("{outcome}");
//! }
//! ```
//!
//! ### Importing Documents
//!
//! Imported documents name their link targets by title only. The importer
//! resolves each title against the corpus and mints stub notes for the rest:
//!
//! ```rust,no_run
//! use silo_core::link_ids::{ImportedDocument, NoteImporter};
//! use silo_core::model::{DocNode, Element, ElementKind};
//! use silo_core::remote::MemoryRemote;
//! use silo_core::store::NoteStore;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut link = Element::new(ElementKind::NoteLink, vec![DocNode::text("Compost")]);
//!     link.note_title = Some("Compost".to_string());
//!
//!     let importer = NoteImporter::new(NoteStore::new(), MemoryRemote::new());
//!     let outcome = importer
//!         .import(vec![ImportedDocument {
//!             title: "Journal".to_string(),
//!             content: vec![DocNode::element(
//!                 ElementKind::Paragraph,
//!                 vec![DocNode::text("see "), DocNode::Element(link)],
//!             )],
//!         }])
//!         .await;
//!     println!("{outcome}");
//! }
//! ```
//!
//! ### Talking to a Real Backend (requires `remote-http` feature)
//!
//! ```rust,no_run
//! # #[cfg(feature = "remote-http")]
//! # fn example() -> Result<(), silo_core::SiloError> {
//! use silo_core::backlinks::BacklinkSyncer;
//! use silo_core::config::RemoteConfig;
//! use silo_core::remote::RestClient;
//! use silo_core::store::NoteStore;
//!
//! let remote = RestClient::new(RemoteConfig {
//!     base_url: "https://project.supabase.co".to_string(),
//!     api_key: Some("anon-key".to_string()),
//!     ..RemoteConfig::default()
//! })?;
//! let syncer = BacklinkSyncer::new(NoteStore::new(), remote);
//! # let _ = syncer;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Local-First Dual Write
//!
//! Every synchronization pass runs in two phases. Phase one is synchronous
//! and infallible: snapshot the store, compute the rewrites, commit them all
//! under a single lock. Phase two pushes the committed notes to the remote
//! backend concurrently, one call per note, and only logs failures. Offline
//! mode or a missing session skips phase two entirely; the local commit
//! stands either way, and the remote converges on the next successful push.
//!
//! ### Links Carry Id and Title
//!
//! A note-link element stores the target's id, a denormalized copy of its
//! title, and a `customText` flag telling the rewriter whether the user
//! overrode the display text. Matching considers the id *or* the stored
//! title, which also heals legacy links that were saved with a title in the
//! id slot. Rewrites always refresh the stored title and replace the display
//! text unless `customText` is set.
//!
//! ### Tree Addressing
//!
//! A [`path::TreePath`] is a list of child indices leading from a root node
//! to a link. Rewrites clone the containing tree and mutate the addressed
//! node, so readers of the old snapshot are never disturbed. Table subtrees
//! are deliberately opaque: links inside them are neither matched nor
//! rewritten.
//!
//! ### Placeholder Ids
//!
//! Imports and publication flows sometimes create notes before their final
//! id is known. [`backlinks::BacklinkSyncer::sync_reassign`] migrates every
//! link from the provisional id to the final one, and
//! [`model::NoteId::is_placeholder`] tells the two apart.
//!
//! ## Features
//!
//! - **default**: Everything, including the HTTP transport
//! - **remote-http**: `reqwest`-based [`remote::RestClient`]; disable it for a local-only build
//!
//! ## Module Guide
//!
//! Start with [`store::NoteStore`] for holding notes, then
//! [`backlinks::BacklinkSyncer`] for rename and re-id propagation. See
//! [`link_ids`] for bringing external documents into the corpus and
//! [`remote`] for wiring up a backend.

pub mod backlinks;
pub mod config;
pub mod error;
pub mod link_ids;
pub mod model;
pub mod path;
pub mod remote;
pub mod store;
#[cfg(test)]
mod tests;

pub use error::*;
