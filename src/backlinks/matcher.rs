//! Corpus scan for links targeting a given note.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    model::{DocNode, Element, NoteId, NoteMap},
    path::TreePath,
};

/// One link occurrence inside a referencing note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMatch {
    /// Address of the link element within the note's content, valid against
    /// the snapshot the scan ran on.
    pub path: TreePath,
    /// The link's visible text at scan time. Relevance ranking downstream
    /// keys off it.
    pub text: String,
}

/// All link occurrences targeting one note, within one referencing note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklinkMatch {
    pub note_id: NoteId,
    /// Document order. A note linking to the same target several times gets
    /// one entry per occurrence.
    pub matches: Vec<LinkMatch>,
}

/// Scan every note except the target itself and report, per referencing
/// note, where links to `target` occur.
///
/// A link matches when its `noteId` equals the target id, or when its
/// `noteTitle` does. The second form covers imported corpora where a link's
/// recorded id is still a title placeholder and the "id" being synced is
/// that title string. Notes without matches are omitted. Table and table-row
/// subtrees are never entered.
pub fn compute_backlinks(notes: &NoteMap, target: &NoteId) -> Vec<BacklinkMatch> {
    let mut result = Vec::new();
    for (id, note) in notes {
        if id == target {
            continue;
        }
        let mut matches = Vec::new();
        scan_nodes(&note.content, target, &TreePath::default(), &mut matches);
        if !matches.is_empty() {
            trace!(note = %id, count = matches.len(), "backlinks found");
            result.push(BacklinkMatch {
                note_id: id.clone(),
                matches,
            });
        }
    }
    result
}

fn scan_nodes(nodes: &[DocNode], target: &NoteId, prefix: &TreePath, out: &mut Vec<LinkMatch>) {
    for (index, node) in nodes.iter().enumerate() {
        let DocNode::Element(el) = node else {
            continue;
        };
        let path = prefix.child(index);
        if targets(el, target) {
            out.push(LinkMatch {
                path: path.clone(),
                text: el.plain_text(),
            });
        }
        if !el.kind.is_opaque() {
            scan_nodes(&el.children, target, &path, out);
        }
    }
}

fn targets(el: &Element, target: &NoteId) -> bool {
    el.is_link()
        && (el.note_id.as_ref() == Some(target)
            || el.note_title.as_deref() == Some(target.as_str()))
}
