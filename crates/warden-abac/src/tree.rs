//! Nested view of a principal's region and its active descendants.
//!
//! Display only. Nothing here is consulted for access decisions.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::warn;
use warden_types::RegionId;

use crate::error::Result;
use crate::region::{RegionNode, RegionSource};

/// A region with its (active) children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionTreeNode {
    #[serde(flatten)]
    pub node: RegionNode,
    pub children: Vec<RegionTreeNode>,
}

impl RegionTreeNode {
    /// Total number of nodes in this subtree.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(&node.children);
        }
        count
    }
}

impl Drop for RegionTreeNode {
    fn drop(&mut self) {
        // Iterative, so deep chains cannot overflow the stack.
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Materialises the subtree rooted at `root`.
///
/// Inactive descendants are dropped together with everything below them.
/// The root is included even if inactive. Returns `None` when the root does
/// not exist. Children keep the order the source returned them in.
pub async fn build_region_tree<G: RegionSource>(
    source: &G,
    root: RegionId,
) -> Result<Option<RegionTreeNode>> {
    let Some(root_node) = source.node(root).await? else {
        return Ok(None);
    };

    let mut visited = BTreeSet::from([root]);
    let mut levels: Vec<Vec<RegionNode>> = Vec::new();
    let mut frontier = vec![root];

    while !frontier.is_empty() {
        let children = source.children_of(&frontier).await?;
        let mut level = Vec::new();

        for child in children {
            if !child.active || child.parent.is_none() {
                continue;
            }
            if !visited.insert(child.id) {
                warn!(region = %child.id, "Cycle in region graph, skipping revisited node");
                continue;
            }
            level.push(child);
        }

        frontier = level.iter().map(|node| node.id).collect();
        if !level.is_empty() {
            levels.push(level);
        }
    }

    // Deepest level first: every node's children are complete before it is built.
    let mut built: HashMap<RegionId, Vec<RegionTreeNode>> = HashMap::new();
    for level in levels.into_iter().rev() {
        for node in level {
            let Some(parent) = node.parent else {
                continue;
            };
            let children = built.remove(&node.id).unwrap_or_default();
            built
                .entry(parent)
                .or_default()
                .push(RegionTreeNode { node, children });
        }
    }

    let children = built.remove(&root).unwrap_or_default();
    Ok(Some(RegionTreeNode {
        node: root_node,
        children,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::InMemoryRegionGraph;

    fn r(id: u64) -> RegionId {
        RegionId::new(id)
    }

    #[tokio::test]
    async fn deep_chain_builds_without_recursion() {
        const DEPTH: u64 = 100_000;
        let graph = InMemoryRegionGraph::from_nodes(
            std::iter::once(RegionNode::root(r(0), "country"))
                .chain((1..DEPTH).map(|id| RegionNode::child(r(id), r(id - 1), "zone"))),
        );

        let tree = build_region_tree(&graph, r(0)).await.unwrap().unwrap();
        assert_eq!(u64::try_from(tree.size()).unwrap(), DEPTH);

        let mut node = &tree;
        let mut depth = 1;
        while let Some(child) = node.children.first() {
            assert_eq!(child.node.parent, Some(node.node.id));
            node = child;
            depth += 1;
        }
        assert_eq!(depth, DEPTH);
        assert_eq!(node.node.id, r(DEPTH - 1));
    }

    #[tokio::test]
    async fn siblings_keep_source_order_across_levels() {
        let graph = InMemoryRegionGraph::from_nodes([
            RegionNode::root(r(1), "country"),
            RegionNode::child(r(3), r(1), "zone"),
            RegionNode::child(r(2), r(1), "zone"),
            RegionNode::child(r(31), r(3), "city"),
            RegionNode::child(r(30), r(3), "city"),
            RegionNode::child(r(20), r(2), "city").inactive(),
            RegionNode::child(r(200), r(20), "site"),
        ]);

        let tree = build_region_tree(&graph, r(1)).await.unwrap().unwrap();
        let zones: Vec<RegionId> = tree.children.iter().map(|c| c.node.id).collect();
        assert_eq!(zones, vec![r(2), r(3)]);
        assert!(tree.children[0].children.is_empty());
        let cities: Vec<RegionId> = tree.children[1].children.iter().map(|c| c.node.id).collect();
        assert_eq!(cities, vec![r(30), r(31)]);
        assert_eq!(tree.size(), 5);
    }
}
