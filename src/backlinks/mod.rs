//! Backlink discovery and synchronization.
//!
//! When a note's title or id changes, every other note that links to it is
//! holding stale link metadata. This module finds those links
//! ([`matcher`]), rewrites them in place ([`rewrite`]), and drives the whole
//! pass end to end with local-first persistence ([`sync`]).

pub mod matcher;
pub mod rewrite;
pub mod sync;

pub use matcher::{compute_backlinks, BacklinkMatch, LinkMatch};
pub use rewrite::{rewrite_content, rewrite_link, RenameOp};
pub use sync::{BacklinkSyncer, SyncOutcome};
