//! Core data model: notes and the tree-structured rich text they contain.
//!
//! Documents are stored as JSON trees produced by the editor. Every node is
//! either an [`Element`] with a `type` tag and `children`, or a [`TextLeaf`].
//! The model is deliberately tolerant: element kinds this crate does not
//! recognize round-trip through [`ElementKind::Other`], and any attributes
//! beyond the modeled ones are preserved verbatim in flattened attribute
//! maps. Editors evolve faster than sync engines, and a rewrite pass must
//! never strip formatting it does not understand.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique note identifier.
///
/// Stored as a string rather than a [`Uuid`] because imported corpora contain
/// placeholder ids (a note title standing in for an id that did not exist at
/// import time). [`NoteId::is_placeholder`] distinguishes the two forms.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        NoteId(id.into())
    }

    /// Mint a fresh v4 id, hyphenated lowercase like every id the editor
    /// produces.
    pub fn generate() -> Self {
        NoteId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is not a parseable UUID, i.e. an import-time title
    /// placeholder still awaiting reassignment.
    pub fn is_placeholder(&self) -> bool {
        Uuid::parse_str(&self.0).is_err()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NoteId {
    fn from(src: &str) -> Self {
        NoteId(src.to_string())
    }
}

impl From<String> for NoteId {
    fn from(src: String) -> Self {
        NoteId(src)
    }
}

impl From<Uuid> for NoteId {
    fn from(src: Uuid) -> Self {
        NoteId(src.to_string())
    }
}

impl AsRef<str> for NoteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Owner of a note, as issued by the auth provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(src: &str) -> Self {
        UserId(src.to_string())
    }
}

/// Element type tag.
///
/// Only the kinds this engine inspects are enumerated; everything else the
/// editor emits (headings, lists, block quotes, ...) is carried through
/// [`ElementKind::Other`] so serialization is lossless.
#[derive(Clone, Debug, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Paragraph,
    /// Internal link to another note, addressed by note id.
    NoteLink,
    /// Link to the published form of a note.
    PubLink,
    Table,
    TableRow,
    Other(String),
}

impl ElementKind {
    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::Paragraph => "paragraph",
            ElementKind::NoteLink => "note-link",
            ElementKind::PubLink => "pub-link",
            ElementKind::Table => "table",
            ElementKind::TableRow => "table-row",
            ElementKind::Other(s) => s,
        }
    }

    /// Link kinds carry note targeting fields and are subject to rewriting.
    pub fn is_link(&self) -> bool {
        matches!(self, ElementKind::NoteLink | ElementKind::PubLink)
    }

    /// Tables manage their own internal structure. Traversals treat them as
    /// leaves and never descend into their subtrees.
    pub fn is_opaque(&self) -> bool {
        matches!(self, ElementKind::Table | ElementKind::TableRow)
    }
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for ElementKind {
    fn from(src: String) -> Self {
        match src.as_str() {
            "paragraph" => ElementKind::Paragraph,
            "note-link" => ElementKind::NoteLink,
            "pub-link" => ElementKind::PubLink,
            "table" => ElementKind::Table,
            "table-row" => ElementKind::TableRow,
            _ => ElementKind::Other(src),
        }
    }
}

impl From<&str> for ElementKind {
    fn from(src: &str) -> Self {
        ElementKind::from(src.to_string())
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> String {
        match kind {
            ElementKind::Other(s) => s,
            k => k.as_str().to_string(),
        }
    }
}

/// Leaf node holding a run of text plus whatever formatting marks the editor
/// attached (bold, italic, code, ...). Marks are opaque to this crate.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TextLeaf {
    pub text: String,
    #[serde(flatten)]
    pub marks: Map<String, Value>,
}

impl TextLeaf {
    pub fn new(text: impl Into<String>) -> Self {
        TextLeaf {
            text: text.into(),
            marks: Map::new(),
        }
    }
}

/// Interior tree node.
///
/// The link fields are populated only on [`ElementKind::NoteLink`] and
/// [`ElementKind::PubLink`] elements; wire names follow the editor's
/// camelCase convention. Unmodeled attributes (element ids, list depth,
/// checkbox state, urls) survive in `attrs`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub children: Vec<DocNode>,
    /// Target note's title at the time the link was written or last synced.
    #[serde(rename = "noteTitle", default, skip_serializing_if = "Option::is_none")]
    pub note_title: Option<String>,
    /// Target note's id. Placeholder ids from imports hold a title instead.
    #[serde(rename = "noteId", default, skip_serializing_if = "Option::is_none")]
    pub note_id: Option<NoteId>,
    /// Set when the user overrode the link's display text. Rewrites must not
    /// clobber such text.
    #[serde(rename = "customText", default, skip_serializing_if = "Option::is_none")]
    pub custom_text: Option<bool>,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl Element {
    pub fn new(kind: ElementKind, children: Vec<DocNode>) -> Self {
        Element {
            kind,
            children,
            note_title: None,
            note_id: None,
            custom_text: None,
            attrs: Map::new(),
        }
    }

    pub fn is_link(&self) -> bool {
        self.kind.is_link()
    }

    /// Whether the user pinned the display text. Absent and `false` both mean
    /// the text tracks the target title.
    pub fn has_custom_text(&self) -> bool {
        self.custom_text == Some(true)
    }

    /// Concatenated text of every descendant leaf, in document order.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[DocNode], out: &mut String) {
    for node in nodes {
        match node {
            DocNode::Text(leaf) => out.push_str(&leaf.text),
            DocNode::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// A node in a document tree: an element or a text leaf.
///
/// Untagged on the wire, exactly as the editor serializes them. An object
/// with a `type` field is an element; anything with only `text` (plus marks)
/// is a leaf.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DocNode {
    Element(Element),
    Text(TextLeaf),
}

impl DocNode {
    pub fn text(text: impl Into<String>) -> Self {
        DocNode::Text(TextLeaf::new(text))
    }

    pub fn element(kind: ElementKind, children: Vec<DocNode>) -> Self {
        DocNode::Element(Element::new(kind, children))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            DocNode::Element(el) => Some(el),
            DocNode::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            DocNode::Element(el) => Some(el),
            DocNode::Text(_) => None,
        }
    }

    pub fn plain_text(&self) -> String {
        match self {
            DocNode::Element(el) => el.plain_text(),
            DocNode::Text(leaf) => leaf.text.clone(),
        }
    }
}

/// A note: stable identity, title, document tree, ownership and sync
/// metadata. Field names match the persisted row shape.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: Vec<DocNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Markdown rendition kept alongside the tree for export surfaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attr: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_pub: bool,
    /// Wiki notes are shared reference material, excluded from title-based
    /// link resolution.
    #[serde(default)]
    pub is_wiki: bool,
    #[serde(default)]
    pub is_daily: bool,
}

impl Note {
    /// A new note with an empty paragraph for content, the shape the editor
    /// expects when it first opens a note.
    pub fn new(id: NoteId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Note {
            id,
            title: title.into(),
            content: vec![DocNode::element(
                ElementKind::Paragraph,
                vec![DocNode::text("")],
            )],
            user_id: None,
            md_content: None,
            cover: None,
            attr: Map::new(),
            created_at: now,
            updated_at: now,
            is_pub: false,
            is_wiki: false,
            is_daily: false,
        }
    }

    pub fn with_content(mut self, content: Vec<DocNode>) -> Self {
        self.content = content;
        self
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Id-keyed note collection. Ordered so scans and event logs are
/// deterministic.
pub type NoteMap = BTreeMap<NoteId, Note>;
