//! Child-index addressing into document trees.
//!
//! A [`TreePath`] names a node by the sequence of child indices leading to it
//! from the document root. Paths are recorded during corpus scans and
//! consumed later by [`apply_at`], possibly after the document changed, so
//! resolution is total: an address that no longer fits the tree resolves to
//! nothing instead of failing.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::DocNode;

/// Address of a node in a document tree, root downward. The first index
/// selects among the root nodes, each following index selects among the
/// previous element's children.
///
/// The empty path addresses nothing. A document is a forest of root nodes,
/// not a single node, so there is no node for the empty path to name.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TreePath(Vec<usize>);

impl TreePath {
    pub fn new(indices: Vec<usize>) -> Self {
        TreePath(indices)
    }

    /// Extend this address by one more child index. Used while descending
    /// during scans.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        TreePath(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Walk the address through `content`. `None` when the path is empty,
    /// an index is out of bounds, or a text leaf appears before the final
    /// index.
    pub fn resolve<'a>(&self, content: &'a [DocNode]) -> Option<&'a DocNode> {
        let (first, rest) = self.0.split_first()?;
        let mut node = content.get(*first)?;
        for index in rest {
            let DocNode::Element(el) = node else {
                return None;
            };
            node = el.children.get(*index)?;
        }
        Some(node)
    }
}

impl Display for TreePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(empty)");
        }
        let mut sep = "";
        for index in &self.0 {
            write!(f, "{sep}{index}")?;
            sep = ".";
        }
        Ok(())
    }
}

impl From<Vec<usize>> for TreePath {
    fn from(indices: Vec<usize>) -> Self {
        TreePath(indices)
    }
}

impl From<&[usize]> for TreePath {
    fn from(indices: &[usize]) -> Self {
        TreePath(indices.to_vec())
    }
}

impl FromIterator<usize> for TreePath {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        TreePath(iter.into_iter().collect())
    }
}

/// Rebuild `content` with `mutate` applied to the node at `path`.
///
/// The input is never modified; callers receive a fresh tree and decide
/// whether to commit it. An address that does not resolve yields the content
/// unchanged, which keeps batch rewrites safe against documents edited
/// between scan and application.
pub fn apply_at<F>(content: &[DocNode], path: &TreePath, mutate: F) -> Vec<DocNode>
where
    F: FnOnce(&mut DocNode),
{
    let mut next = content.to_vec();
    match locate_mut(&mut next, path.indices()) {
        Some(node) => mutate(node),
        None => debug!(%path, "address does not resolve, content unchanged"),
    }
    next
}

fn locate_mut<'a>(nodes: &'a mut [DocNode], indices: &[usize]) -> Option<&'a mut DocNode> {
    let (first, rest) = indices.split_first()?;
    let mut node = nodes.get_mut(*first)?;
    for index in rest {
        let DocNode::Element(el) = node else {
            return None;
        };
        node = el.children.get_mut(*index)?;
    }
    Some(node)
}
