//! User-facing handle on a canonical diagram.
//!
//! A [`Diagram`] pairs a root node with the manager that owns it. Holding a
//! handle keeps the root (and everything below it) alive across garbage
//! collections; cloning and dropping handles adjusts the root's reference
//! count.
//!
//! Because diagrams are canonical, equality is a constant-time identity
//! check: two handles of the same manager are equal exactly when they
//! represent the same Boolean function.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, BitXor, Not};

use crate::apply::BinaryOp;
use crate::bdd::Bdd;
use crate::node::Node;
use crate::reference::NodeId;
use crate::types::Var;

pub struct Diagram<'a> {
    bdd: &'a Bdd,
    root: NodeId,
}

impl<'a> Diagram<'a> {
    /// Creates a handle without touching the reference count.
    ///
    /// The caller must have accounted for this handle already.
    pub(crate) fn from_raw(bdd: &'a Bdd, root: NodeId) -> Self {
        Self { bdd, root }
    }

    /// The manager that owns this diagram.
    pub fn manager(&self) -> &'a Bdd {
        self.bdd
    }
}

// ============================================================================
// Traversal
// ============================================================================

impl<'a> Diagram<'a> {
    /// Stable identifier of the root node.
    pub fn id(&self) -> NodeId {
        self.root
    }

    pub fn is_terminal(&self) -> bool {
        self.root.is_terminal()
    }

    pub fn is_false(&self) -> bool {
        self.root.is_false()
    }

    pub fn is_true(&self) -> bool {
        self.root.is_true()
    }

    /// The constant value, if the diagram is a terminal.
    pub fn terminal_value(&self) -> Option<bool> {
        self.root.terminal_value()
    }

    /// The variable tested at the root; [`Var::TERMINAL`] for a constant.
    pub fn variable(&self) -> Var {
        self.bdd.variable(self.root)
    }

    /// The root's 0-child. A terminal is its own child.
    pub fn low(&self) -> NodeId {
        if self.is_terminal() {
            return self.root;
        }
        self.bdd.low(self.root)
    }

    /// The root's 1-child. A terminal is its own child.
    pub fn high(&self) -> NodeId {
        if self.is_terminal() {
            return self.root;
        }
        self.bdd.high(self.root)
    }

    /// The root record.
    pub fn node(&self) -> Node {
        self.bdd.node(self.root)
    }

    /// The sub-diagrams reached through the 0- and 1-edge of the root.
    pub fn children(&self) -> Option<(Diagram<'a>, Diagram<'a>)> {
        if self.is_terminal() {
            return None;
        }
        let node = self.node();
        Some((self.bdd.wrap(node.low), self.bdd.wrap(node.high)))
    }

    /// Reachable nodes in depth-first pre-order, low edge first.
    ///
    /// Every node is listed once, terminals included.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            if !id.is_terminal() {
                let node = self.bdd.node(id);
                stack.push(node.high);
                stack.push(node.low);
            }
        }

        order
    }

    /// Reachable nodes in depth-first post-order: every node after its children.
    pub fn nodes_postorder(&self) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        // (node, children already pushed)
        let mut stack = vec![(self.root, false)];

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            if !id.is_terminal() {
                let node = self.bdd.node(id);
                stack.push((node.high, false));
                stack.push((node.low, false));
            }
        }

        order
    }

    /// Number of distinct nodes reachable from the root, terminals included.
    pub fn node_count(&self) -> usize {
        self.bdd.descendants([self.root]).len()
    }

    /// Variables the function depends on, in order.
    pub fn support(&self) -> Vec<Var> {
        let mut vars: Vec<Var> = self
            .bdd
            .descendants([self.root])
            .into_iter()
            .filter(|id| !id.is_terminal())
            .map(|id| self.bdd.variable(id))
            .collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    /// The first variable in the order that the function depends on.
    pub fn top_variable(&self) -> Option<Var> {
        if self.is_terminal() {
            None
        } else {
            Some(self.variable())
        }
    }

    pub fn to_bracket_string(&self) -> String {
        self.bdd.to_bracket_string(self.root)
    }
}

// ============================================================================
// Queries
// ============================================================================

impl<'a> Diagram<'a> {
    /// Evaluates the function under a total assignment.
    pub fn eval<F>(&self, assignment: F) -> bool
    where
        F: Fn(Var) -> bool,
    {
        let mut current = self.root;
        while !current.is_terminal() {
            let node = self.bdd.node(current);
            current = node.child(assignment(node.variable));
        }
        current.is_true()
    }

    /// Returns true if both diagrams denote the same function.
    ///
    /// # Panics
    ///
    /// Panics if `other` belongs to another manager.
    pub fn equivalent(&self, other: &Diagram<'a>) -> bool {
        self.bdd.check_owner(other);
        self.root == other.root
    }
}

// ============================================================================
// Operations
// ============================================================================

impl<'a> Diagram<'a> {
    pub fn negate(&self) -> Diagram<'a> {
        self.bdd.apply_not(self)
    }

    pub fn apply(&self, op: BinaryOp, other: &Diagram<'a>) -> Diagram<'a> {
        self.bdd.apply(op, self, other)
    }

    pub fn and_with(&self, other: &Diagram<'a>) -> Diagram<'a> {
        self.apply(BinaryOp::And, other)
    }

    pub fn or_with(&self, other: &Diagram<'a>) -> Diagram<'a> {
        self.apply(BinaryOp::Or, other)
    }

    pub fn xor_with(&self, other: &Diagram<'a>) -> Diagram<'a> {
        self.apply(BinaryOp::Xor, other)
    }

    pub fn implies(&self, other: &Diagram<'a>) -> Diagram<'a> {
        self.apply(BinaryOp::Implies, other)
    }

    pub fn iff(&self, other: &Diagram<'a>) -> Diagram<'a> {
        self.apply(BinaryOp::Equiv, other)
    }

    /// `self ? then : otherwise`
    pub fn ite(&self, then: &Diagram<'a>, otherwise: &Diagram<'a>) -> Diagram<'a> {
        self.bdd.ite(self, then, otherwise)
    }

    pub fn restrict(&self, var: Var, value: bool) -> Diagram<'a> {
        self.bdd.restrict(self, var, value)
    }

    pub fn restrict_many(&self, values: &[(Var, bool)]) -> Diagram<'a> {
        self.bdd.restrict_many(self, values)
    }

    /// Substitutes `g` for `var`.
    pub fn compose(&self, var: Var, g: &Diagram<'a>) -> Diagram<'a> {
        self.bdd.compose(self, var, g)
    }
}

// ============================================================================
// Handle bookkeeping
// ============================================================================

impl Clone for Diagram<'_> {
    fn clone(&self) -> Self {
        self.bdd.retain(self.root);
        Self {
            bdd: self.bdd,
            root: self.root,
        }
    }
}

impl Drop for Diagram<'_> {
    fn drop(&mut self) {
        self.bdd.release(self.root);
    }
}

impl PartialEq for Diagram<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.bdd, other.bdd) && self.root == other.root
    }
}

impl Eq for Diagram<'_> {}

impl Hash for Diagram<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root.hash(state);
    }
}

impl fmt::Debug for Diagram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Diagram").field(&self.root).finish()
    }
}

impl fmt::Display for Diagram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bracket_string())
    }
}

// ============================================================================
// Operators
// ============================================================================

impl<'a> Not for &Diagram<'a> {
    type Output = Diagram<'a>;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl<'a> Not for Diagram<'a> {
    type Output = Diagram<'a>;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<'a> $trait<&Diagram<'a>> for &Diagram<'a> {
            type Output = Diagram<'a>;

            fn $method(self, rhs: &Diagram<'a>) -> Self::Output {
                self.apply($op, rhs)
            }
        }

        impl<'a> $trait<Diagram<'a>> for Diagram<'a> {
            type Output = Diagram<'a>;

            fn $method(self, rhs: Diagram<'a>) -> Self::Output {
                self.apply($op, &rhs)
            }
        }

        impl<'a> $trait<&Diagram<'a>> for Diagram<'a> {
            type Output = Diagram<'a>;

            fn $method(self, rhs: &Diagram<'a>) -> Self::Output {
                self.apply($op, rhs)
            }
        }

        impl<'a> $trait<Diagram<'a>> for &Diagram<'a> {
            type Output = Diagram<'a>;

            fn $method(self, rhs: Diagram<'a>) -> Self::Output {
                self.apply($op, &rhs)
            }
        }
    };
}

impl_binary_op!(BitAnd, bitand, BinaryOp::And);
impl_binary_op!(BitOr, bitor, BinaryOp::Or);
impl_binary_op!(BitXor, bitxor, BinaryOp::Xor);
