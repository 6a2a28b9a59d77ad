use crate::reference::NodeId;
use crate::types::Var;

/// A node record: the variable tested and the two children.
///
/// Terminal slots hold [`Node::TERMINAL`], whose variable is the
/// [`Var::TERMINAL`] sentinel and whose children point at FALSE.
///
/// # Invariants (decision nodes)
///
/// - `low != high` (reducedness)
/// - `variable < var(low)` and `variable < var(high)` (ordering)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    /// Variable tested at this node.
    pub variable: Var,
    /// Child taken when `variable` is false.
    pub low: NodeId,
    /// Child taken when `variable` is true.
    pub high: NodeId,
}

impl Node {
    pub const TERMINAL: Node = Node {
        variable: Var::TERMINAL,
        low: NodeId::FALSE,
        high: NodeId::FALSE,
    };

    pub const fn new(variable: Var, low: NodeId, high: NodeId) -> Self {
        Self { variable, low, high }
    }

    pub const fn is_terminal(&self) -> bool {
        self.variable.is_terminal()
    }

    /// Returns the child selected by `value`.
    pub const fn child(&self, value: bool) -> NodeId {
        if value {
            self.high
        } else {
            self.low
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::TERMINAL
    }
}
