//! The link-node mutation applied at matched addresses.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    model::{DocNode, NoteId},
    path::apply_at,
};

use super::matcher::LinkMatch;

/// What a sync pass writes into each matched link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOp {
    /// The target note's current title.
    pub new_title: String,
    /// When set, every matched link's target id is rewritten too. Used after
    /// an id is finalized, to heal links still pointing at a provisional id
    /// or an import-time title placeholder.
    pub new_id: Option<NoteId>,
}

impl RenameOp {
    pub fn retitle(new_title: impl Into<String>) -> Self {
        RenameOp {
            new_title: new_title.into(),
            new_id: None,
        }
    }

    pub fn reassign(new_title: impl Into<String>, new_id: NoteId) -> Self {
        RenameOp {
            new_title: new_title.into(),
            new_id: Some(new_id),
        }
    }
}

/// Rewrite one link node in place. Returns whether anything was written.
///
/// Nodes that are not note-links or pub-links are left untouched. The guard
/// matters: a recorded address can drift onto an arbitrary node if the
/// document changed between scan and rewrite, and clobbering whatever is
/// there now would corrupt the note.
///
/// Unless the user pinned custom display text, the link's children are
/// replaced with a single text leaf reading the new title, keeping visible
/// text and target title in lockstep.
pub fn rewrite_link(node: &mut DocNode, op: &RenameOp) -> bool {
    let Some(el) = node.as_element_mut() else {
        debug!("matched address resolved to a text leaf, skipping");
        return false;
    };
    if !el.kind.is_link() {
        debug!(kind = %el.kind, "matched address is not a link, skipping");
        return false;
    }

    el.note_title = Some(op.new_title.clone());
    if let Some(new_id) = &op.new_id {
        el.note_id = Some(new_id.clone());
    }
    if !el.has_custom_text() {
        el.children = vec![DocNode::text(op.new_title.clone())];
    }
    true
}

/// Apply `op` at every matched address of one note, cumulatively. Returns
/// the rebuilt tree and how many addressed links were actually rewritten.
///
/// Each address is resolved against the output of the previous rewrite, not
/// the original tree. Matches can share ancestors, and folding over one
/// evolving tree is what keeps a later rewrite from reverting an earlier
/// one.
pub fn rewrite_content(
    content: &[DocNode],
    matches: &[LinkMatch],
    op: &RenameOp,
) -> (Vec<DocNode>, usize) {
    let mut next = content.to_vec();
    let mut rewritten = 0;
    for link in matches {
        next = apply_at(&next, &link.path, |node| {
            if rewrite_link(node, op) {
                rewritten += 1;
            }
        });
    }
    (next, rewritten)
}
