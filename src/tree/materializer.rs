//! Recursive subtree materialization
//!
//! Walks a store subtree and mirrors it into a fresh [`TreeDocument`]:
//! nodes with children become nested mappings, childless nodes are leaves
//! whose raw value is fetched. A pass either mirrors the whole subtree or
//! fails; partial documents are never produced.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;

use super::join_path;
use super::TreeDocument;
use super::TreeNode;
use crate::ReadError;
use crate::Result;
use crate::StoreClient;
use crate::TraversalError;

/// Produces a [`TreeDocument`] from the subtree rooted at a fixed path.
pub struct TreeMaterializer {
    client: Arc<dyn StoreClient>,
    root_path: String,
}

impl TreeMaterializer {
    pub fn new(
        client: Arc<dyn StoreClient>,
        root_path: impl Into<String>,
    ) -> Self {
        Self {
            client,
            root_path: root_path.into(),
        }
    }

    /// The subtree root this materializer walks.
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Walk the subtree and build a fresh document.
    ///
    /// The root always materializes as a mapping of its children: a root with
    /// no children yields an empty document, not an error. Below the root,
    /// a node with children is internal and a childless node is a leaf.
    ///
    /// # Errors
    /// - [`TraversalError`] when a child listing fails anywhere in the subtree
    /// - [`ReadError`] when a leaf value cannot be fetched
    pub async fn materialize(&self) -> Result<TreeDocument> {
        let children = self
            .client
            .children(&self.root_path)
            .await
            .map_err(|e| TraversalError::child_listing(self.root_path.as_str(), e))?;

        let mut inner = BTreeMap::new();
        for child in children {
            let child_path = join_path(&self.root_path, &child);
            let node = self.walk(child_path).await?;
            inner.insert(child, node);
        }

        debug!(
            "materialized {} top-level node(s) under {}",
            inner.len(),
            self.root_path
        );
        Ok(TreeDocument::new(inner))
    }

    fn walk(
        &self,
        path: String,
    ) -> BoxFuture<'_, Result<TreeNode>> {
        async move {
            let children = self
                .client
                .children(&path)
                .await
                .map_err(|e| TraversalError::child_listing(path.as_str(), e))?;

            if children.is_empty() {
                let value = self
                    .client
                    .get_value(&path)
                    .await
                    .map_err(|e| ReadError::leaf_value(path.as_str(), e))?;
                return Ok(TreeNode::Leaf(value));
            }

            let mut branch = BTreeMap::new();
            for child in children {
                let child_path = join_path(&path, &child);
                let node = self.walk(child_path).await?;
                branch.insert(child, node);
            }
            Ok(TreeNode::Branch(branch))
        }
        .boxed()
    }
}
