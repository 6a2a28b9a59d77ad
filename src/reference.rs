use std::fmt::{Display, Formatter};

/// A reference to a node in the [`NodeTable`][crate::table::NodeTable].
///
/// Diagrams carry no complement edges, so a `NodeId` is simply the index
/// of the node's slot in the arena. Ids are stable for as long as the node
/// is alive; a reclaimed slot may later be reused for a different node.
///
/// # Terminal Values
///
/// - `NodeId::FALSE` (⊥) — constant 0
/// - `NodeId::TRUE` (⊤) — constant 1
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// The constant false function.
    pub const FALSE: NodeId = NodeId(0);

    /// The constant true function.
    pub const TRUE: NodeId = NodeId(1);

    pub(crate) const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Returns the terminal for the given constant.
    pub const fn terminal(value: bool) -> Self {
        if value {
            NodeId::TRUE
        } else {
            NodeId::FALSE
        }
    }

    /// Returns the raw index value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the index for array access.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns true if this is a terminal (FALSE or TRUE).
    pub const fn is_terminal(self) -> bool {
        self.0 <= 1
    }

    pub const fn is_false(self) -> bool {
        self.0 == 0
    }

    pub const fn is_true(self) -> bool {
        self.0 == 1
    }

    /// Returns the constant value of a terminal, or `None` for decision nodes.
    pub const fn terminal_value(self) -> Option<bool> {
        match self.0 {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            0 => write!(f, "⊥"),
            1 => write!(f, "⊤"),
            _ => write!(f, "@{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminals() {
        assert!(NodeId::FALSE.is_false());
        assert!(NodeId::FALSE.is_terminal());
        assert!(!NodeId::FALSE.is_true());

        assert!(NodeId::TRUE.is_true());
        assert!(NodeId::TRUE.is_terminal());
        assert!(!NodeId::TRUE.is_false());

        assert_eq!(NodeId::terminal(false), NodeId::FALSE);
        assert_eq!(NodeId::terminal(true), NodeId::TRUE);
    }

    #[test]
    fn test_non_terminal() {
        let id = NodeId::new(42);
        assert!(!id.is_terminal());
        assert_eq!(id.terminal_value(), None);
        assert_eq!(id.raw(), 42);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", NodeId::FALSE), "⊥");
        assert_eq!(format!("{}", NodeId::TRUE), "⊤");
        assert_eq!(format!("{}", NodeId::new(42)), "@42");
    }
}
