//! Per-variable unique subtable for decision nodes.
//!
//! The node table keeps one subtable per registered variable:
//!
//! ```text
//! subtables[0] → Subtable for rank 0 (e.g., variable x)
//! subtables[1] → Subtable for rank 1 (e.g., variable y)
//! ...
//! ```
//!
//! Each subtable is a hash map from `(low, high)` children to node id.
//! Since all nodes in a subtable have the same variable, the variable is
//! not part of the key. Together the subtables form the unique table that
//! guarantees at most one node per `(variable, low, high)` triple.

use std::collections::HashMap;

use crate::reference::NodeId;
use crate::types::Var;

/// A subtable storing decision nodes for a single variable.
#[derive(Debug, Clone)]
pub struct Subtable {
    /// The variable for all nodes in this subtable.
    pub variable: Var,

    /// Map from (low, high) to node id in the arena.
    nodes: HashMap<(NodeId, NodeId), NodeId>,
}

impl Subtable {
    /// Create a new empty subtable for the given variable.
    pub fn new(variable: Var) -> Self {
        Self {
            variable,
            nodes: HashMap::new(),
        }
    }

    /// Look up a node by its children.
    pub fn find(&self, low: NodeId, high: NodeId) -> Option<NodeId> {
        self.nodes.get(&(low, high)).copied()
    }

    /// Insert a node into the subtable.
    pub fn insert(&mut self, low: NodeId, high: NodeId, id: NodeId) {
        let old = self.nodes.insert((low, high), id);
        assert!(old.is_none(), "Duplicate node for ({}, {}, {})", self.variable, low, high);
    }

    /// Remove a node from the subtable.
    ///
    /// Returns the node id if the node was present.
    pub fn remove(&mut self, low: NodeId, high: NodeId) -> Option<NodeId> {
        self.nodes.remove(&(low, high))
    }

    /// Get the number of nodes in this subtable.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all (low, high, id) tuples.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId, NodeId)> + '_ {
        self.nodes.iter().map(|(&(low, high), &id)| (low, high, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtable_basic() {
        let mut st = Subtable::new(Var::new(1));

        let low = NodeId::FALSE;
        let high = NodeId::TRUE;

        assert!(st.find(low, high).is_none());

        st.insert(low, high, NodeId::new(42));
        assert_eq!(st.find(low, high), Some(NodeId::new(42)));
        assert_eq!(st.len(), 1);

        st.remove(low, high);
        assert!(st.find(low, high).is_none());
        assert!(st.is_empty());
    }

    #[test]
    fn test_subtable_multiple_nodes() {
        let mut st = Subtable::new(Var::new(1));

        st.insert(NodeId::FALSE, NodeId::TRUE, NodeId::new(10));
        st.insert(NodeId::new(2), NodeId::new(3), NodeId::new(20));
        st.insert(NodeId::TRUE, NodeId::new(3), NodeId::new(30));

        assert_eq!(st.len(), 3);
        assert_eq!(st.find(NodeId::FALSE, NodeId::TRUE), Some(NodeId::new(10)));
        assert_eq!(st.find(NodeId::new(2), NodeId::new(3)), Some(NodeId::new(20)));
        assert_eq!(st.find(NodeId::TRUE, NodeId::new(3)), Some(NodeId::new(30)));
        assert_eq!(st.iter().count(), 3);
    }

    #[test]
    #[should_panic(expected = "Duplicate node")]
    fn test_subtable_duplicate_insert() {
        let mut st = Subtable::new(Var::new(0));
        st.insert(NodeId::FALSE, NodeId::TRUE, NodeId::new(2));
        st.insert(NodeId::FALSE, NodeId::TRUE, NodeId::new(3));
    }
}
