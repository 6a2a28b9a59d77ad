//! The diagram manager.
//!
//! A [`Bdd`] owns everything shared by the diagrams built with it: the
//! variable registry (which fixes the global variable order) and the node
//! table (which guarantees that every Boolean function has exactly one
//! node). All operations take `&self`; the state lives behind [`RefCell`]s,
//! so a manager can be moved between threads but not shared by them.
//!
//! ```
//! use obdd_rs::bdd::Bdd;
//!
//! let bdd = Bdd::new();
//! let x = bdd.var("x").unwrap();
//! let y = bdd.var("y").unwrap();
//! let f = bdd.mk_var(x).and_with(&bdd.mk_var(y));
//! let g = bdd.mk_var(y).and_with(&bdd.mk_var(x));
//! assert_eq!(f, g);
//! ```

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use log::debug;

use crate::diagram::Diagram;
use crate::error::Result;
use crate::node::Node;
use crate::reference::NodeId;
use crate::registry::{VarInfo, VarRegistry};
use crate::table::NodeTable;
use crate::types::Var;

/// Tuning knobs of a [`Bdd`] manager.
///
/// ```
/// use obdd_rs::bdd::{Bdd, BddConfig};
///
/// let bdd = Bdd::with_config(BddConfig::default().with_gc_threshold(64));
/// assert_eq!(bdd.config().gc_threshold, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BddConfig {
    /// Number of node slots allocated up front (terminals included).
    pub initial_capacity: usize,
    /// Each per-call memo table starts with room for `2^memo_bits` entries.
    pub memo_bits: usize,
    /// Number of dead nodes that triggers an automatic sweep.
    pub gc_threshold: usize,
    /// Whether top-level operations may sweep dead nodes automatically.
    pub auto_gc: bool,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1 << 10,
            memo_bits: 10,
            gc_threshold: 1 << 14,
            auto_gc: true,
        }
    }
}

impl BddConfig {
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_memo_bits(mut self, bits: usize) -> Self {
        assert!(bits <= 31, "Memo bits should be in the range 0..=31");
        self.memo_bits = bits;
        self
    }

    pub fn with_gc_threshold(mut self, threshold: usize) -> Self {
        self.gc_threshold = threshold;
        self
    }

    pub fn with_auto_gc(mut self, enabled: bool) -> Self {
        self.auto_gc = enabled;
        self
    }
}

/// Snapshot of the manager's bookkeeping counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BddStats {
    /// Decision nodes currently allocated (dead ones included).
    pub live: usize,
    /// Allocated decision nodes that nothing references.
    pub dead: usize,
    /// Total number of slots in the arena, terminals included.
    pub capacity: usize,
    /// Number of registered variables.
    pub variables: usize,
    /// Number of completed garbage collections.
    pub sweeps: usize,
    /// Total number of nodes reclaimed by all sweeps.
    pub reclaimed: usize,
}

impl fmt::Display for BddStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes ({} dead), capacity {}, {} variables, {} sweeps reclaimed {} nodes",
            self.live, self.dead, self.capacity, self.variables, self.sweeps, self.reclaimed
        )
    }
}

pub struct Bdd {
    vars: RefCell<VarRegistry>,
    nodes: RefCell<NodeTable>,
    config: BddConfig,
}

impl Bdd {
    pub fn new() -> Self {
        Self::with_config(BddConfig::default())
    }

    pub fn with_config(config: BddConfig) -> Self {
        debug!("Creating manager with {:?}", config);
        Self {
            vars: RefCell::new(VarRegistry::new()),
            nodes: RefCell::new(NodeTable::with_capacity(config.initial_capacity)),
            config,
        }
    }

    pub fn config(&self) -> &BddConfig {
        &self.config
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new()
    }
}

impl fmt::Debug for Bdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("Bdd")
            .field("variables", &stats.variables)
            .field("live", &stats.live)
            .field("dead", &stats.dead)
            .field("capacity", &stats.capacity)
            .finish()
    }
}

// ============================================================================
// Variables
// ============================================================================

impl Bdd {
    /// Returns the variable identified by `(names, indices)`.
    ///
    /// The first request for a given identity issues a fresh variable that
    /// is ordered after every variable registered before it. Later requests
    /// return the same variable.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if `names` is empty, if some name
    /// token is empty, or if some index is negative.
    pub fn register<S: AsRef<str>>(&self, names: &[S], indices: &[i64]) -> Result<Var> {
        let (var, fresh) = self.vars.borrow_mut().register(names, indices)?;
        if fresh {
            self.nodes.borrow_mut().add_variable(var);
        }
        Ok(var)
    }

    /// Returns the scalar variable called `name`.
    pub fn var(&self, name: &str) -> Result<Var> {
        self.register(&[name], &[])
    }

    /// Returns the element `name[index]` of an indexed variable family.
    pub fn var_indexed(&self, name: &str, index: i64) -> Result<Var> {
        self.register(&[name], &[index])
    }

    /// Looks up a variable without registering it.
    pub fn find_var<S: AsRef<str>>(&self, names: &[S], indices: &[i64]) -> Option<Var> {
        self.vars.borrow().find(names, indices)
    }

    pub fn num_vars(&self) -> usize {
        self.vars.borrow().len()
    }

    /// All registered variables, in order.
    pub fn vars(&self) -> Vec<Var> {
        self.vars.borrow().vars().collect()
    }

    /// Returns the symbolic identity of `var`.
    pub fn var_info(&self, var: Var) -> VarInfo {
        self.vars.borrow().info(var).clone()
    }

    /// Compares two variables by their position in the order.
    pub fn compare(&self, a: Var, b: Var) -> Ordering {
        self.vars.borrow().compare(a, b)
    }

    /// Panics unless `var` was issued by this manager.
    pub(crate) fn check_var(&self, var: Var) {
        assert!(
            self.vars.borrow().contains(var),
            "Variable {} is unknown to this manager",
            var
        );
    }
}

// ============================================================================
// Nodes
// ============================================================================

impl Bdd {
    /// Returns the record of the node `id`.
    pub fn node(&self, id: NodeId) -> Node {
        self.nodes.borrow().node(id)
    }

    pub fn variable(&self, id: NodeId) -> Var {
        self.nodes.borrow().variable(id)
    }

    pub fn low(&self, id: NodeId) -> NodeId {
        self.nodes.borrow().low(id)
    }

    pub fn high(&self, id: NodeId) -> NodeId {
        self.nodes.borrow().high(id)
    }

    /// Returns the unique node `(v, low, high)`, applying the reduction rule.
    pub(crate) fn mk_node(&self, v: Var, low: NodeId, high: NodeId) -> NodeId {
        self.nodes.borrow_mut().decision(v, low, high)
    }

    /// Returns the sub-diagram that `f` selects under `var = value`.
    ///
    /// If `f` does not test `var` at its root, both cofactors are `f` itself.
    pub(crate) fn top_cofactors(&self, f: NodeId, var: Var) -> (NodeId, NodeId) {
        let node = self.node(f);
        if node.variable == var {
            (node.low, node.high)
        } else {
            debug_assert!(var < node.variable, "Cofactor on {} below the root of {}", var, f);
            (f, f)
        }
    }

    /// Wraps a node into a handle, protecting it from garbage collection.
    pub(crate) fn wrap(&self, id: NodeId) -> Diagram<'_> {
        self.nodes.borrow_mut().inc_ref(id);
        Diagram::from_raw(self, id)
    }

    pub(crate) fn retain(&self, id: NodeId) {
        self.nodes.borrow_mut().inc_ref(id);
    }

    pub(crate) fn release(&self, id: NodeId) {
        self.nodes.borrow_mut().dec_ref(id);
    }

    #[cfg(test)]
    pub(crate) fn ref_count(&self, id: NodeId) -> u32 {
        self.nodes.borrow().ref_count(id)
    }

    /// Returns the ids of all nodes reachable from `roots`, terminals included.
    pub fn descendants(&self, roots: impl IntoIterator<Item = NodeId>) -> HashSet<NodeId> {
        let nodes = self.nodes.borrow();
        let mut visited = HashSet::new();
        let mut stack: Vec<NodeId> = roots.into_iter().collect();

        while let Some(id) = stack.pop() {
            if visited.insert(id) && !id.is_terminal() {
                stack.push(nodes.low(id));
                stack.push(nodes.high(id));
            }
        }

        visited
    }

    /// Renders the diagram rooted at `id` as nested brackets, high branch first.
    pub fn to_bracket_string(&self, id: NodeId) -> String {
        match id.terminal_value() {
            Some(false) => "(0)".to_string(),
            Some(true) => "(1)".to_string(),
            None => {
                let node = self.node(id);
                format!(
                    "{}:({}, {}, {})",
                    id,
                    node.variable,
                    self.to_bracket_string(node.high),
                    self.to_bracket_string(node.low)
                )
            }
        }
    }
}

// ============================================================================
// Diagram constructors
// ============================================================================

impl Bdd {
    /// Returns the constant function `value`.
    pub fn constant(&self, value: bool) -> Diagram<'_> {
        let id = self.nodes.borrow().terminal(value);
        self.wrap(id)
    }

    pub fn zero(&self) -> Diagram<'_> {
        self.constant(false)
    }

    pub fn one(&self) -> Diagram<'_> {
        self.constant(true)
    }

    /// Returns the projection function of `var`.
    pub fn mk_var(&self, var: Var) -> Diagram<'_> {
        self.literal(var, true)
    }

    /// Returns `var` if `positive`, otherwise its negation.
    pub fn literal(&self, var: Var, positive: bool) -> Diagram<'_> {
        self.check_var(var);
        let id = if positive {
            self.mk_node(var, NodeId::FALSE, NodeId::TRUE)
        } else {
            self.mk_node(var, NodeId::TRUE, NodeId::FALSE)
        };
        self.wrap(id)
    }

    /// Returns the conjunction of the given literals.
    pub fn cube(&self, literals: impl IntoIterator<Item = (Var, bool)>) -> Diagram<'_> {
        let mut literals: Vec<(Var, bool)> = literals.into_iter().collect();
        literals.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        literals.dedup_by_key(|lit| lit.0);

        let mut current = NodeId::TRUE;
        for (var, positive) in literals {
            self.check_var(var);
            current = if positive {
                self.mk_node(var, NodeId::FALSE, current)
            } else {
                self.mk_node(var, current, NodeId::FALSE)
            };
        }
        self.wrap(current)
    }

    /// Returns the node `(var, low, high)` as a diagram.
    ///
    /// # Panics
    ///
    /// Panics if `var` does not precede the top variables of both children,
    /// or if either child belongs to another manager.
    pub fn decision<'a>(&'a self, var: Var, low: &Diagram<'a>, high: &Diagram<'a>) -> Diagram<'a> {
        self.check_var(var);
        self.check_owner(low);
        self.check_owner(high);
        assert!(
            var < self.variable(low.id()) && var < self.variable(high.id()),
            "Variable {} must precede the children's variables",
            var
        );
        let id = self.mk_node(var, low.id(), high.id());
        self.wrap(id)
    }

    /// Panics if `f` was built by a different manager.
    pub(crate) fn check_owner(&self, f: &Diagram<'_>) {
        assert!(
            std::ptr::eq(self, f.manager()),
            "Diagram {} belongs to a different manager",
            f.id()
        );
    }
}

// ============================================================================
// Garbage collection
// ============================================================================

impl Bdd {
    /// Reclaims every node that no diagram can reach.
    ///
    /// Returns the number of reclaimed nodes.
    pub fn collect_garbage(&self) -> usize {
        self.nodes.borrow_mut().collect_garbage()
    }

    /// Sweeps dead nodes if automatic collection is enabled and due.
    ///
    /// Only called at the entry of top-level operations, when every live
    /// function is protected by a [`Diagram`] handle.
    pub(crate) fn maybe_collect_garbage(&self) {
        if !self.config.auto_gc {
            return;
        }
        let dead = self.nodes.borrow().num_dead();
        if dead >= self.config.gc_threshold {
            debug!("{} dead nodes reached threshold {}", dead, self.config.gc_threshold);
            self.collect_garbage();
        }
    }

    pub fn stats(&self) -> BddStats {
        let nodes = self.nodes.borrow();
        BddStats {
            live: nodes.num_nodes(),
            dead: nodes.num_dead(),
            capacity: nodes.capacity(),
            variables: self.vars.borrow().len(),
            sweeps: nodes.sweeps(),
            reclaimed: nodes.reclaimed(),
        }
    }
}
