//! Type-safe handle for registered variables.
//!
//! A [`Var`] is the rank of a variable in the global total order: the
//! position at which the variable was first registered. Lower ranks are
//! tested first, i.e. closer to the root of every diagram. Each variable
//! also records which registry issued it, so a variable from one manager is
//! never mistaken for another manager's variable of the same rank.
use std::fmt;

/// A registered variable, identified by its rank (0-indexed).
///
/// # Invariants
///
/// - Ranks are assigned once, in registration order, and never change.
/// - Variables of the same registry are ordered by rank alone.
/// - [`Var::TERMINAL`] is a sentinel stored in terminal nodes; it compares
///   greater than every real variable, so a terminal never becomes the top
///   variable of an operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var {
    // Field order matters: the derived `Ord` compares ranks first.
    rank: u32,
    owner: u32,
}

impl Var {
    /// Sentinel "variable" of the terminal nodes.
    pub const TERMINAL: Var = Var::new(u32::MAX);

    /// A variable of rank `rank` that belongs to no registry.
    pub(crate) const fn new(rank: u32) -> Self {
        Self::owned(0, rank)
    }

    /// A variable of rank `rank` issued by the registry `owner`.
    pub(crate) const fn owned(owner: u32, rank: u32) -> Self {
        Var { rank, owner }
    }

    /// Returns the rank of the variable in the global order.
    pub const fn rank(self) -> u32 {
        self.rank
    }

    /// Returns the rank as a `usize`, for indexing.
    pub const fn index(self) -> usize {
        self.rank as usize
    }

    /// Identity of the registry that issued this variable.
    pub(crate) const fn owner(self) -> u32 {
        self.owner
    }

    pub const fn is_terminal(self) -> bool {
        self.rank == u32::MAX
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_terminal() {
            write!(f, "x∞")
        } else {
            write!(f, "x{}", self.rank)
        }
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.rank
    }
}
