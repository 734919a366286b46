//! Ordered collector for granted nodes.

use crate::host::AllocatedNode;
use crate::protocol::ResourceItem;

/// Nodes received so far in the current reply, in arrival order.
///
/// No deduplication or range checks happen here; the launcher decides what
/// to make of repeated hosts or negative slot counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeList {
    nodes: Vec<AllocatedNode>,
}

impl NodeList {
    /// Appends the node described by `item`.
    pub fn push(&mut self, item: ResourceItem) {
        self.nodes
            .push(AllocatedNode::granted(item.hostname, item.slots_available));
    }

    /// Number of nodes collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing has been collected yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Collected nodes in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &AllocatedNode> {
        self.nodes.iter()
    }

    /// Hands over the collected nodes, leaving the list empty.
    pub fn take(&mut self) -> Vec<AllocatedNode> {
        std::mem::take(&mut self.nodes)
    }

    /// Drops everything collected so far.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
