//! Tree document module
//!
//! Provides the in-memory mirror of a store subtree and the two passes that
//! produce and persist it:
//! - [`TreeDocument`] / [`TreeNode`] - the nested document model
//! - [`TreeMaterializer`] - recursive subtree walk into a fresh document
//! - [`DocumentWriter`] - all-or-nothing publish to the local target file

mod materializer;
mod writer;

pub use materializer::*;
pub use writer::*;


use std::collections::BTreeMap;

use serde::Serialize;

use crate::constants::DOCUMENT_ROOT_KEY;

/// A single node of the materialized document.
///
/// Internal store nodes become nested mappings keyed by child name, leaves
/// become raw strings. Serializes untagged, so a document renders as plain
/// nested JSON objects with string values at the leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TreeNode {
    Leaf(String),
    Branch(BTreeMap<String, TreeNode>),
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf(_))
    }
}

/// A materialized subtree: a synthetic root key wrapping the inner content.
///
/// Each materialization pass produces a brand-new document; documents are
/// never mutated in place. The inner map is ordered by key, so an unchanged
/// subtree always serializes to identical bytes regardless of the order the
/// store listed its children in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDocument {
    inner: BTreeMap<String, TreeNode>,
}

impl TreeDocument {
    pub(crate) fn new(inner: BTreeMap<String, TreeNode>) -> Self {
        Self { inner }
    }

    /// Name of the synthetic top-level key.
    pub fn root_key() -> &'static str {
        DOCUMENT_ROOT_KEY
    }

    /// The content nested one level below the synthetic root key.
    pub fn inner(&self) -> &BTreeMap<String, TreeNode> {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Render the inner content as pretty-printed JSON.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.inner)
    }
}

/// Child paths are always `parent + "/" + child`; no escaping or
/// normalization is performed.
pub(crate) fn join_path(
    parent: &str,
    child: &str,
) -> String {
    format!("{}/{}", parent, child)
}
