//! Region forest and the read interface onto it.
//!
//! Regions form a forest: every node has at most one parent and the parent
//! graph must be acyclic. The organisational-structure collaborator owns the
//! data; this crate only reads it through [`RegionSource`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_types::RegionId;

/// A node in the region forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionNode {
    pub id: RegionId,
    #[serde(default)]
    pub parent: Option<RegionId>,
    /// Type tag (e.g. `"country"`, `"zone"`, `"city"`). Not interpreted.
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl RegionNode {
    /// Creates an active root node.
    pub fn root(id: RegionId, kind: impl Into<String>) -> Self {
        Self {
            id,
            parent: None,
            kind: kind.into(),
            active: true,
        }
    }

    /// Creates an active node under `parent`.
    pub fn child(id: RegionId, parent: RegionId, kind: impl Into<String>) -> Self {
        Self {
            id,
            parent: Some(parent),
            kind: kind.into(),
            active: true,
        }
    }

    /// Marks the node inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Failure reading from the region collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("region source unavailable: {0}")]
pub struct RegionSourceError(pub String);

/// Read-only access to the region forest.
///
/// Every call is a suspension point. Dropping the returned future cancels
/// the lookup.
pub trait RegionSource: Send + Sync {
    /// Returns the direct children of every id in `parents`, in one batch.
    fn children_of(
        &self,
        parents: &[RegionId],
    ) -> impl Future<Output = Result<Vec<RegionNode>, RegionSourceError>> + Send;

    /// Returns a single node, if it exists.
    fn node(
        &self,
        id: RegionId,
    ) -> impl Future<Output = Result<Option<RegionNode>, RegionSourceError>> + Send;
}

/// A region forest held in memory.
///
/// Counts lookups so callers can observe how many round trips a walk took.
#[derive(Debug, Default)]
pub struct InMemoryRegionGraph {
    nodes: HashMap<RegionId, RegionNode>,
    children: HashMap<RegionId, Vec<RegionId>>,
    lookups: AtomicUsize,
}

impl InMemoryRegionGraph {
    /// Builds the graph from a node list. Later duplicates replace earlier ones.
    pub fn from_nodes(nodes: impl IntoIterator<Item = RegionNode>) -> Self {
        let nodes: HashMap<RegionId, RegionNode> =
            nodes.into_iter().map(|node| (node.id, node)).collect();

        let mut children: HashMap<RegionId, Vec<RegionId>> = HashMap::new();
        for node in nodes.values() {
            if let Some(parent) = node.parent {
                children.entry(parent).or_default().push(node.id);
            }
        }
        for ids in children.values_mut() {
            ids.sort_unstable();
        }

        Self {
            nodes,
            children,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Number of source calls served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl RegionSource for InMemoryRegionGraph {
    async fn children_of(&self, parents: &[RegionId]) -> Result<Vec<RegionNode>, RegionSourceError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        let mut out = Vec::new();
        for parent in parents {
            if let Some(ids) = self.children.get(parent) {
                out.extend(ids.iter().filter_map(|id| self.nodes.get(id)).cloned());
            }
        }
        Ok(out)
    }

    async fn node(&self, id: RegionId) -> Result<Option<RegionNode>, RegionSourceError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.nodes.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(id: u64) -> RegionId {
        RegionId::new(id)
    }

    #[tokio::test]
    async fn children_are_batched_per_call() {
        let graph = InMemoryRegionGraph::from_nodes([
            RegionNode::root(r(1), "country"),
            RegionNode::child(r(2), r(1), "zone"),
            RegionNode::child(r(3), r(1), "zone"),
            RegionNode::child(r(4), r(2), "city"),
            RegionNode::child(r(5), r(3), "city"),
        ]);

        let level = graph.children_of(&[r(2), r(3)]).await.unwrap();
        let ids: Vec<RegionId> = level.iter().map(|n| n.id).collect();

        assert_eq!(ids, vec![r(4), r(5)]);
        assert_eq!(graph.lookup_count(), 1);
    }

    #[tokio::test]
    async fn missing_node_is_none() {
        let graph = InMemoryRegionGraph::from_nodes([RegionNode::root(r(1), "country")]);
        assert!(graph.node(r(99)).await.unwrap().is_none());
        assert!(graph.children_of(&[r(99)]).await.unwrap().is_empty());
    }

    #[test]
    fn node_deserializes_with_defaults() {
        let node: RegionNode = serde_json::from_str(r#"{"id": 3, "type": "city"}"#).unwrap();
        assert_eq!(node.parent, None);
        assert_eq!(node.kind, "city");
        assert!(node.active);
    }
}
