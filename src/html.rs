//! The document shape the query front-end is evaluated against.
//!
//! Loading and parsing actual HTML/XML is a collaborator's concern; this
//! module only fixes the contract the suggestor and (eventually) an executor
//! read from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One element node in a flattened document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Index into the owning [`HtmlDocument::nodes`]; `nodes[id] == self`.
    pub id: i64,
    pub tag: String,
    pub text: String,
    pub inner_html: String,
    pub attributes: HashMap<String, String>,
    pub parent_id: Option<i64>,
}

/// A document as a flat, id-indexed node table. `nodes[i].id == i` for every
/// `i`; this lets callers resolve `parent_id`/child lookups by plain indexing
/// instead of walking a tree structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HtmlDocument {
    pub nodes: Vec<Node>,
}

impl HtmlDocument {
    pub fn get(&self, id: i64) -> Option<&Node> {
        self.nodes.get(usize::try_from(id).ok()?)
    }

    pub fn children_of(&self, id: i64) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.parent_id == Some(id))
    }

    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.parent_id.is_none())
    }
}
