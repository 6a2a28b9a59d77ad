//! Node table: the arena that owns every node, plus the unique table.
//!
//! # Layout
//!
//! ```text
//! slots[0] → FALSE terminal (permanent)
//! slots[1] → TRUE terminal (permanent)
//! slots[2..] → decision nodes, or free cells awaiting reuse
//! ```
//!
//! # Reference counts
//!
//! Each decision node counts its parents plus the external handles
//! ([`Diagram`][crate::diagram::Diagram]s) that point at it. A node whose
//! count is zero is *dead*. Dead nodes stay in their subtable until the
//! next [`collect_garbage`][NodeTable::collect_garbage] and may be revived
//! by a lookup in the meantime. A sweep unlinks a node from its subtable
//! before its slot becomes reusable, so lookups never see freed cells.

use std::cmp::min;

use log::{debug, trace};

use crate::node::Node;
use crate::reference::NodeId;
use crate::subtable::Subtable;
use crate::types::Var;

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    rc: u32,
    occupied: bool,
}

impl Slot {
    const TERMINAL: Slot = Slot {
        node: Node::TERMINAL,
        rc: 0,
        occupied: true,
    };
}

pub struct NodeTable {
    slots: Vec<Slot>,
    subtables: Vec<Subtable>,

    /// Index of the first *possibly* free (non-occupied) cell.
    min_free: usize,
    /// Number of occupied decision cells.
    live: usize,
    /// Number of occupied decision cells with a zero reference count.
    dead: usize,

    sweeps: usize,
    reclaimed: usize,
}

impl NodeTable {
    /// Create a table with room for `capacity` nodes (terminals included).
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity.max(2));
        slots.push(Slot::TERMINAL); // FALSE
        slots.push(Slot::TERMINAL); // TRUE

        Self {
            slots,
            subtables: Vec::new(),
            min_free: 2,
            live: 0,
            dead: 0,
            sweeps: 0,
            reclaimed: 0,
        }
    }

    /// Register a subtable for a freshly issued variable.
    pub fn add_variable(&mut self, var: Var) {
        assert_eq!(var.index(), self.subtables.len(), "Variables must be added in rank order");
        self.subtables.push(Subtable::new(var));
    }

    pub fn num_vars(&self) -> usize {
        self.subtables.len()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the record of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to an occupied slot.
    pub fn node(&self, id: NodeId) -> Node {
        let slot = &self.slots[id.index()];
        assert!(slot.occupied, "Node {} is not allocated", id);
        slot.node
    }

    pub fn variable(&self, id: NodeId) -> Var {
        self.node(id).variable
    }

    pub fn low(&self, id: NodeId) -> NodeId {
        self.node(id).low
    }

    pub fn high(&self, id: NodeId) -> NodeId {
        self.node(id).high
    }

    /// Returns true if `id` refers to an allocated node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.get(id.index()).is_some_and(|slot| slot.occupied)
    }

    pub fn ref_count(&self, id: NodeId) -> u32 {
        self.slots[id.index()].rc
    }

    /// Number of slots currently allocated in the arena.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of decision nodes in the table (live or dead).
    pub fn num_nodes(&self) -> usize {
        self.live
    }

    /// Number of decision nodes with a zero reference count.
    pub fn num_dead(&self) -> usize {
        self.dead
    }

    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    pub fn reclaimed(&self) -> usize {
        self.reclaimed
    }

    // ========================================================================
    // Node Construction
    // ========================================================================

    /// Returns one of the two terminal singletons.
    pub fn terminal(&self, value: bool) -> NodeId {
        NodeId::terminal(value)
    }

    /// Returns the unique node `(variable, low, high)`.
    ///
    /// If `low == high` the test is redundant and `low` is returned
    /// without touching the table.
    ///
    /// Callers must ensure that `variable` precedes the variables of both
    /// children; this is checked in debug builds only.
    pub fn decision(&mut self, variable: Var, low: NodeId, high: NodeId) -> NodeId {
        if low == high {
            trace!("mk: redundant test on {}, reusing {}", variable, low);
            return low;
        }

        debug_assert!(
            variable < self.variable(low) && variable < self.variable(high),
            "Ordering violated: {} must precede {} and {}",
            variable,
            self.variable(low),
            self.variable(high)
        );

        let subtable = match self.subtables.get(variable.index()) {
            Some(subtable) => subtable,
            None => panic!("Variable {} is unknown to the node table", variable),
        };
        if let Some(id) = subtable.find(low, high) {
            trace!("mk: found {} = ({}, {}, {})", id, variable, low, high);
            return id;
        }

        let id = self.alloc(Node::new(variable, low, high));
        self.subtables[variable.index()].insert(low, high, id);
        self.inc_ref(low);
        self.inc_ref(high);
        trace!("mk: created {} = ({}, {}, {})", id, variable, low, high);
        id
    }

    /// Allocate a slot for a new node with a zero reference count.
    fn alloc(&mut self, node: Node) -> NodeId {
        let index = (self.min_free..self.slots.len())
            .find(|&i| !self.slots[i].occupied)
            .unwrap_or_else(|| {
                self.slots.push(Slot {
                    node: Node::TERMINAL,
                    rc: 0,
                    occupied: false,
                });
                self.slots.len() - 1
            });

        assert!(index < NodeId::new(u32::MAX).index(), "Node table is full");

        self.slots[index] = Slot {
            node,
            rc: 0,
            occupied: true,
        };
        self.min_free = index + 1;
        self.live += 1;
        self.dead += 1;

        NodeId::new(index as u32)
    }

    /// Release the slot of a dead node.
    fn free(&mut self, id: NodeId) {
        let index = id.index();
        assert!(!id.is_terminal(), "Terminal {} cannot be freed", id);

        self.slots[index].occupied = false;
        self.min_free = min(self.min_free, index);
        self.live -= 1;
        self.dead -= 1;
    }

    // ========================================================================
    // Reference Counting
    // ========================================================================

    pub fn inc_ref(&mut self, id: NodeId) {
        if id.is_terminal() {
            return;
        }
        let slot = &mut self.slots[id.index()];
        assert!(slot.occupied, "Node {} is not allocated", id);
        slot.rc += 1;
        if slot.rc == 1 {
            self.dead -= 1;
        }
    }

    pub fn dec_ref(&mut self, id: NodeId) {
        if id.is_terminal() {
            return;
        }
        let slot = &mut self.slots[id.index()];
        assert!(slot.occupied, "Node {} is not allocated", id);
        assert!(slot.rc > 0, "Reference count underflow on {}", id);
        slot.rc -= 1;
        if slot.rc == 0 {
            self.dead += 1;
        }
    }

    // ========================================================================
    // Garbage Collection
    // ========================================================================

    /// Reclaim every dead node, cascading to children that die as a result.
    ///
    /// Returns the number of reclaimed nodes.
    pub fn collect_garbage(&mut self) -> usize {
        debug!("Collecting garbage: {} live, {} dead", self.live, self.dead);

        let mut queue: Vec<NodeId> = (2..self.slots.len())
            .filter(|&i| self.slots[i].occupied && self.slots[i].rc == 0)
            .map(|i| NodeId::new(i as u32))
            .collect();

        let mut count = 0;
        while let Some(id) = queue.pop() {
            let node = self.slots[id.index()].node;
            let removed = self.subtables[node.variable.index()].remove(node.low, node.high);
            assert_eq!(removed, Some(id), "Unique table out of sync for {}", id);
            self.free(id);
            count += 1;

            for child in [node.low, node.high] {
                if child.is_terminal() {
                    continue;
                }
                let slot = &mut self.slots[child.index()];
                slot.rc -= 1;
                if slot.rc == 0 {
                    self.dead += 1;
                    queue.push(child);
                }
            }
        }

        self.sweeps += 1;
        self.reclaimed += count;
        debug!("Reclaimed {} nodes, {} remain", count, self.live);
        count
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn table_with_vars(n: u32) -> NodeTable {
        let mut table = NodeTable::with_capacity(16);
        for i in 0..n {
            table.add_variable(Var::new(i));
        }
        table
    }

    #[test]
    fn test_terminals() {
        let table = table_with_vars(0);
        assert_eq!(table.terminal(false), NodeId::FALSE);
        assert_eq!(table.terminal(true), NodeId::TRUE);
        assert!(table.variable(NodeId::FALSE).is_terminal());
        assert!(table.variable(NodeId::TRUE).is_terminal());
        assert_eq!(table.num_nodes(), 0);
    }

    #[test]
    fn test_decision_unique() {
        let mut table = table_with_vars(2);
        let x = Var::new(0);
        let a = table.decision(x, NodeId::FALSE, NodeId::TRUE);
        let b = table.decision(x, NodeId::FALSE, NodeId::TRUE);
        assert_eq!(a, b);
        assert_eq!(table.num_nodes(), 1);

        let c = table.decision(x, NodeId::TRUE, NodeId::FALSE);
        assert_ne!(a, c);
        assert_eq!(table.num_nodes(), 2);
    }

    #[test]
    fn test_decision_reduction() {
        let mut table = table_with_vars(2);
        let y = table.decision(Var::new(1), NodeId::FALSE, NodeId::TRUE);
        let res = table.decision(Var::new(0), y, y);
        assert_eq!(res, y);
        assert_eq!(table.num_nodes(), 1);
    }

    #[test]
    fn test_children_are_referenced() {
        let mut table = table_with_vars(2);
        let y = table.decision(Var::new(1), NodeId::FALSE, NodeId::TRUE);
        assert_eq!(table.ref_count(y), 0);
        assert_eq!(table.num_dead(), 1);

        let f = table.decision(Var::new(0), NodeId::FALSE, y);
        assert_eq!(table.ref_count(y), 1);
        assert_eq!(table.ref_count(f), 0);
        assert_eq!(table.num_dead(), 1);
    }

    #[test]
    fn test_collect_garbage_cascades() {
        let mut table = table_with_vars(2);
        let y = table.decision(Var::new(1), NodeId::FALSE, NodeId::TRUE);
        let f = table.decision(Var::new(0), NodeId::FALSE, y);
        let g = table.decision(Var::new(0), y, NodeId::TRUE);
        table.inc_ref(g);
        assert_eq!(table.num_nodes(), 3);

        // Only `f` is dead; `y` survives through `g`.
        assert_eq!(table.collect_garbage(), 1);
        assert!(!table.contains(f));
        assert!(table.contains(y));
        assert!(table.contains(g));

        table.dec_ref(g);
        assert_eq!(table.collect_garbage(), 2);
        assert_eq!(table.num_nodes(), 0);
        assert_eq!(table.num_dead(), 0);
        assert_eq!(table.reclaimed(), 3);
        assert_eq!(table.sweeps(), 2);
    }

    #[test]
    fn test_freed_slot_is_reused_and_unique() {
        let mut table = table_with_vars(1);
        let x = Var::new(0);
        let a = table.decision(x, NodeId::FALSE, NodeId::TRUE);
        table.collect_garbage();
        assert!(!table.contains(a));

        let b = table.decision(x, NodeId::TRUE, NodeId::FALSE);
        assert_eq!(a.index(), b.index());
        assert_eq!(table.low(b), NodeId::TRUE);

        // The old triple is gone: requesting it creates a fresh node.
        let c = table.decision(x, NodeId::FALSE, NodeId::TRUE);
        assert_ne!(c, b);
        assert_eq!(table.num_nodes(), 2);
    }

    #[test]
    fn test_dead_node_is_revived() {
        let mut table = table_with_vars(1);
        let x = Var::new(0);
        let a = table.decision(x, NodeId::FALSE, NodeId::TRUE);
        table.inc_ref(a);
        table.dec_ref(a);
        assert_eq!(table.num_dead(), 1);

        let b = table.decision(x, NodeId::FALSE, NodeId::TRUE);
        assert_eq!(a, b);
        table.inc_ref(b);
        assert_eq!(table.num_dead(), 0);
        assert_eq!(table.collect_garbage(), 0);
    }

    #[test]
    #[should_panic(expected = "underflow")]
    fn test_dec_ref_underflow() {
        let mut table = table_with_vars(1);
        let a = table.decision(Var::new(0), NodeId::FALSE, NodeId::TRUE);
        table.dec_ref(a);
    }

    #[test]
    #[should_panic(expected = "unknown to the node table")]
    fn test_decision_unknown_variable() {
        let mut table = table_with_vars(1);
        table.decision(Var::new(3), NodeId::FALSE, NodeId::TRUE);
    }
}
