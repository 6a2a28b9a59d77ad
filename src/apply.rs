//! Apply engine: binary connectives, negation, if-then-else and restriction.
//!
//! Every operation is the classic Shannon recursion on the top variable of
//! its operands, memoized per top-level call:
//!
//! ```text
//! f op g = mk(v, f|v=0 op g|v=0, f|v=1 op g|v=1)    v = min(var(f), var(g))
//! ```
//!
//! Results are built with the manager's hash-consing constructor, so they
//! are canonical: two calls computing the same function return the same
//! node.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::bdd::Bdd;
use crate::cache::Cache;
use crate::diagram::Diagram;
use crate::reference::NodeId;
use crate::types::Var;

/// Binary Boolean connectives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Xor,
    Implies,
    Equiv,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 5] = [
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Implies,
        BinaryOp::Equiv,
    ];

    /// Truth table of the connective.
    pub fn eval(self, a: bool, b: bool) -> bool {
        match self {
            BinaryOp::And => a && b,
            BinaryOp::Or => a || b,
            BinaryOp::Xor => a ^ b,
            BinaryOp::Implies => !a || b,
            BinaryOp::Equiv => a == b,
        }
    }

    pub fn is_commutative(self) -> bool {
        !matches!(self, BinaryOp::Implies)
    }

    /// Returns the result without recursion when one operand decides it.
    ///
    /// Only ever returns one of the operands or a terminal, so no node is
    /// created here.
    fn shortcut(self, f: NodeId, g: NodeId) -> Option<NodeId> {
        if let (Some(a), Some(b)) = (f.terminal_value(), g.terminal_value()) {
            return Some(NodeId::terminal(self.eval(a, b)));
        }
        match self {
            BinaryOp::And => {
                if f.is_false() || g.is_false() {
                    Some(NodeId::FALSE)
                } else if f.is_true() || f == g {
                    Some(g)
                } else if g.is_true() {
                    Some(f)
                } else {
                    None
                }
            }
            BinaryOp::Or => {
                if f.is_true() || g.is_true() {
                    Some(NodeId::TRUE)
                } else if f.is_false() || f == g {
                    Some(g)
                } else if g.is_false() {
                    Some(f)
                } else {
                    None
                }
            }
            BinaryOp::Xor => {
                if f == g {
                    Some(NodeId::FALSE)
                } else if f.is_false() {
                    Some(g)
                } else if g.is_false() {
                    Some(f)
                } else {
                    None
                }
            }
            BinaryOp::Implies => {
                if f.is_false() || g.is_true() || f == g {
                    Some(NodeId::TRUE)
                } else if f.is_true() {
                    Some(g)
                } else {
                    None
                }
            }
            BinaryOp::Equiv => {
                if f == g {
                    Some(NodeId::TRUE)
                } else if f.is_true() {
                    Some(g)
                } else if g.is_true() {
                    Some(f)
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Implies => "implies",
            BinaryOp::Equiv => "equiv",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Recursive kernels on raw node ids
// ============================================================================

impl Bdd {
    pub(crate) fn apply_node(&self, op: BinaryOp, f: NodeId, g: NodeId) -> NodeId {
        let mut cache = Cache::new(self.config().memo_bits);
        let res = self.apply_rec(op, f, g, &mut cache);
        debug!(
            "apply({}, {}, {}) -> {}, memo: {} hits, {} misses",
            op,
            f,
            g,
            res,
            cache.hits(),
            cache.misses()
        );
        res
    }

    fn apply_rec(&self, op: BinaryOp, f: NodeId, g: NodeId, cache: &mut Cache<(NodeId, NodeId), NodeId>) -> NodeId {
        if let Some(res) = op.shortcut(f, g) {
            return res;
        }

        // Commutative connectives share one memo entry per unordered pair.
        let key = if op.is_commutative() && g < f { (g, f) } else { (f, g) };
        if let Some(res) = cache.get(&key) {
            return res;
        }

        let v = self.variable(f).min(self.variable(g));
        let (f0, f1) = self.top_cofactors(f, v);
        let (g0, g1) = self.top_cofactors(g, v);

        let low = self.apply_rec(op, f0, g0, cache);
        let high = self.apply_rec(op, f1, g1, cache);
        let res = self.mk_node(v, low, high);

        cache.insert(key, res);
        res
    }

    pub(crate) fn not_node(&self, f: NodeId) -> NodeId {
        let mut cache = Cache::new(self.config().memo_bits);
        let res = self.not_rec(f, &mut cache);
        debug!("not({}) -> {}, memo: {} hits, {} misses", f, res, cache.hits(), cache.misses());
        res
    }

    fn not_rec(&self, f: NodeId, cache: &mut Cache<NodeId, NodeId>) -> NodeId {
        if let Some(value) = f.terminal_value() {
            return NodeId::terminal(!value);
        }
        if let Some(res) = cache.get(&f) {
            return res;
        }

        let node = self.node(f);
        let low = self.not_rec(node.low, cache);
        let high = self.not_rec(node.high, cache);
        let res = self.mk_node(node.variable, low, high);

        cache.insert(f, res);
        res
    }

    pub(crate) fn ite_node(&self, f: NodeId, g: NodeId, h: NodeId) -> NodeId {
        let mut cache = Cache::new(self.config().memo_bits);
        let res = self.ite_rec(f, g, h, &mut cache);
        debug!(
            "ite({}, {}, {}) -> {}, memo: {} hits, {} misses",
            f,
            g,
            h,
            res,
            cache.hits(),
            cache.misses()
        );
        res
    }

    fn ite_rec(&self, f: NodeId, g: NodeId, h: NodeId, cache: &mut Cache<(NodeId, NodeId, NodeId), NodeId>) -> NodeId {
        // Base cases:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        if f.is_true() {
            return g;
        }
        if f.is_false() {
            return h;
        }
        if g == h {
            return g;
        }
        if g.is_true() && h.is_false() {
            return f;
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,G,F) => ite(F,G,0)
        let g = if g == f { NodeId::TRUE } else { g };
        let h = if h == f { NodeId::FALSE } else { h };

        let key = (f, g, h);
        if let Some(res) = cache.get(&key) {
            return res;
        }

        let v = self.variable(f).min(self.variable(g)).min(self.variable(h));
        let (f0, f1) = self.top_cofactors(f, v);
        let (g0, g1) = self.top_cofactors(g, v);
        let (h0, h1) = self.top_cofactors(h, v);

        let low = self.ite_rec(f0, g0, h0, cache);
        let high = self.ite_rec(f1, g1, h1, cache);
        let res = self.mk_node(v, low, high);

        cache.insert(key, res);
        res
    }

    pub(crate) fn restrict_node(&self, f: NodeId, v: Var, value: bool) -> NodeId {
        let mut cache = Cache::new(self.config().memo_bits);
        let res = self.restrict_rec(f, v, value, &mut cache);
        debug!(
            "restrict({}, {} = {}) -> {}, memo: {} hits, {} misses",
            f,
            v,
            value,
            res,
            cache.hits(),
            cache.misses()
        );
        res
    }

    fn restrict_rec(&self, f: NodeId, v: Var, value: bool, cache: &mut Cache<NodeId, NodeId>) -> NodeId {
        if f.is_terminal() {
            return f;
        }

        let node = self.node(f);
        if node.variable > v {
            // Below `v` in the order: `f` cannot depend on it.
            return f;
        }
        if node.variable == v {
            return node.child(value);
        }

        if let Some(res) = cache.get(&f) {
            return res;
        }

        let low = self.restrict_rec(node.low, v, value, cache);
        let high = self.restrict_rec(node.high, v, value, cache);
        let res = self.mk_node(node.variable, low, high);

        cache.insert(f, res);
        res
    }

    pub(crate) fn restrict_many_node(&self, f: NodeId, values: &HashMap<Var, bool>) -> NodeId {
        let Some(&last) = values.keys().max() else {
            return f;
        };
        let mut cache = Cache::new(self.config().memo_bits);
        let res = self.restrict_many_rec(f, values, last, &mut cache);
        debug!(
            "restrict_many({}, {} values) -> {}, memo: {} hits, {} misses",
            f,
            values.len(),
            res,
            cache.hits(),
            cache.misses()
        );
        res
    }

    fn restrict_many_rec(
        &self,
        f: NodeId,
        values: &HashMap<Var, bool>,
        last: Var,
        cache: &mut Cache<NodeId, NodeId>,
    ) -> NodeId {
        if f.is_terminal() {
            return f;
        }

        let node = self.node(f);
        if node.variable > last {
            return f;
        }

        if let Some(res) = cache.get(&f) {
            return res;
        }

        let res = if let Some(&value) = values.get(&node.variable) {
            self.restrict_many_rec(node.child(value), values, last, cache)
        } else {
            let low = self.restrict_many_rec(node.low, values, last, cache);
            let high = self.restrict_many_rec(node.high, values, last, cache);
            self.mk_node(node.variable, low, high)
        };

        cache.insert(f, res);
        res
    }
}

// ============================================================================
// Top-level operations
// ============================================================================

impl Bdd {
    /// Combines two diagrams with a binary connective.
    ///
    /// # Panics
    ///
    /// Panics if either operand belongs to another manager.
    pub fn apply<'a>(&'a self, op: BinaryOp, f: &Diagram<'a>, g: &Diagram<'a>) -> Diagram<'a> {
        self.check_owner(f);
        self.check_owner(g);
        self.maybe_collect_garbage();
        let res = self.apply_node(op, f.id(), g.id());
        self.wrap(res)
    }

    pub fn apply_not<'a>(&'a self, f: &Diagram<'a>) -> Diagram<'a> {
        self.check_owner(f);
        self.maybe_collect_garbage();
        let res = self.not_node(f.id());
        self.wrap(res)
    }

    pub fn apply_and<'a>(&'a self, f: &Diagram<'a>, g: &Diagram<'a>) -> Diagram<'a> {
        self.apply(BinaryOp::And, f, g)
    }

    pub fn apply_or<'a>(&'a self, f: &Diagram<'a>, g: &Diagram<'a>) -> Diagram<'a> {
        self.apply(BinaryOp::Or, f, g)
    }

    pub fn apply_xor<'a>(&'a self, f: &Diagram<'a>, g: &Diagram<'a>) -> Diagram<'a> {
        self.apply(BinaryOp::Xor, f, g)
    }

    pub fn apply_imply<'a>(&'a self, f: &Diagram<'a>, g: &Diagram<'a>) -> Diagram<'a> {
        self.apply(BinaryOp::Implies, f, g)
    }

    pub fn apply_eq<'a>(&'a self, f: &Diagram<'a>, g: &Diagram<'a>) -> Diagram<'a> {
        self.apply(BinaryOp::Equiv, f, g)
    }

    /// If-then-else: `(f ∧ g) ∨ (¬f ∧ h)`.
    pub fn ite<'a>(&'a self, f: &Diagram<'a>, g: &Diagram<'a>, h: &Diagram<'a>) -> Diagram<'a> {
        self.check_owner(f);
        self.check_owner(g);
        self.check_owner(h);
        self.maybe_collect_garbage();
        let res = self.ite_node(f.id(), g.id(), h.id());
        self.wrap(res)
    }

    /// Cofactor of `f` with `v` fixed to `value`.
    pub fn restrict<'a>(&'a self, f: &Diagram<'a>, v: Var, value: bool) -> Diagram<'a> {
        self.check_owner(f);
        self.check_var(v);
        self.maybe_collect_garbage();
        let res = self.restrict_node(f.id(), v, value);
        self.wrap(res)
    }

    /// Cofactor of `f` by a partial assignment.
    ///
    /// If a variable occurs more than once, its last value wins.
    pub fn restrict_many<'a>(&'a self, f: &Diagram<'a>, values: &[(Var, bool)]) -> Diagram<'a> {
        self.check_owner(f);
        for &(v, _) in values {
            self.check_var(v);
        }
        self.maybe_collect_garbage();
        let values: HashMap<Var, bool> = values.iter().copied().collect();
        let res = self.restrict_many_node(f.id(), &values);
        self.wrap(res)
    }

    /// Substitutes `g` for the variable `v` in `f`.
    ///
    /// ```text
    /// compose(f, v, g) = ite(g, f|v=1, f|v=0)
    /// ```
    pub fn compose<'a>(&'a self, f: &Diagram<'a>, v: Var, g: &Diagram<'a>) -> Diagram<'a> {
        self.check_owner(f);
        self.check_owner(g);
        self.check_var(v);
        self.maybe_collect_garbage();
        // Hold the cofactors as handles while the second one is built.
        let f1 = self.wrap(self.restrict_node(f.id(), v, true));
        let f0 = self.wrap(self.restrict_node(f.id(), v, false));
        let res = self.ite_node(g.id(), f1.id(), f0.id());
        self.wrap(res)
    }

    /// Conjunction of all given diagrams; TRUE if there are none.
    pub fn and_all<'a, 'b>(&'a self, fs: impl IntoIterator<Item = &'b Diagram<'a>>) -> Diagram<'a>
    where
        'a: 'b,
    {
        let mut res = self.one();
        for f in fs {
            res = self.apply_and(&res, f);
        }
        res
    }

    /// Disjunction of all given diagrams; FALSE if there are none.
    pub fn or_all<'a, 'b>(&'a self, fs: impl IntoIterator<Item = &'b Diagram<'a>>) -> Diagram<'a>
    where
        'a: 'b,
    {
        let mut res = self.zero();
        for f in fs {
            res = self.apply_or(&res, f);
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::expr::Expr;

    use super::*;

    fn setup(bdd: &Bdd, n: usize) -> Vec<Diagram<'_>> {
        (0..n)
            .map(|i| bdd.mk_var(bdd.var_indexed("x", i as i64).unwrap()))
            .collect()
    }

    #[test]
    fn test_binary_op_eval() {
        assert!(BinaryOp::And.eval(true, true));
        assert!(!BinaryOp::And.eval(true, false));
        assert!(BinaryOp::Or.eval(false, true));
        assert!(BinaryOp::Xor.eval(false, true));
        assert!(!BinaryOp::Xor.eval(true, true));
        assert!(BinaryOp::Implies.eval(false, false));
        assert!(!BinaryOp::Implies.eval(true, false));
        assert!(BinaryOp::Equiv.eval(false, false));
        assert!(!BinaryOp::Implies.is_commutative());
    }

    #[test]
    fn test_terminal_operands() {
        let bdd = Bdd::default();
        for op in BinaryOp::ALL {
            for a in [false, true] {
                for b in [false, true] {
                    let res = bdd.apply(op, &bdd.constant(a), &bdd.constant(b));
                    assert_eq!(res, bdd.constant(op.eval(a, b)), "{} {} {}", a, op, b);
                }
            }
        }
    }

    #[test]
    fn test_and_identity_returns_operand() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 3);
        let f = &(&xs[0] ^ &xs[1]) | &xs[2];

        let res = bdd.apply_and(&bdd.one(), &f);
        assert_eq!(res.id(), f.id());
    }

    #[test]
    fn test_commutativity() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 2);
        for op in BinaryOp::ALL {
            if op.is_commutative() {
                assert_eq!(bdd.apply(op, &xs[0], &xs[1]), bdd.apply(op, &xs[1], &xs[0]));
            }
        }
    }

    #[test]
    fn test_de_morgan() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 2);

        let lhs = bdd.apply_not(&bdd.apply_and(&xs[0], &xs[1]));
        let rhs = bdd.apply_or(&bdd.apply_not(&xs[0]), &bdd.apply_not(&xs[1]));
        assert_eq!(lhs, rhs);

        let lhs = bdd.apply_not(&bdd.apply_or(&xs[0], &xs[1]));
        let rhs = bdd.apply_and(&bdd.apply_not(&xs[0]), &bdd.apply_not(&xs[1]));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_xor_itself() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 1);
        assert_eq!(bdd.apply_xor(&xs[0], &xs[0]), bdd.zero());
        assert_eq!(bdd.apply_xor(&xs[0], &bdd.apply_not(&xs[0])), bdd.one());
    }

    #[test]
    fn test_double_negation() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 3);
        let f = bdd.apply_imply(&xs[0], &bdd.apply_eq(&xs[1], &xs[2]));
        assert_eq!(bdd.apply_not(&bdd.apply_not(&f)), f);
    }

    #[test]
    fn test_implies_and_equiv() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 2);
        let (x, y) = (&xs[0], &xs[1]);

        assert_eq!(bdd.apply_imply(x, y), bdd.apply_or(&bdd.apply_not(x), y));
        assert_eq!(
            bdd.apply_eq(x, y),
            bdd.apply_and(&bdd.apply_imply(x, y), &bdd.apply_imply(y, x))
        );
        assert_eq!(bdd.apply_eq(x, y), bdd.apply_not(&bdd.apply_xor(x, y)));
    }

    #[test]
    fn test_ite() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 3);
        let (x, y, z) = (&xs[0], &xs[1], &xs[2]);

        let f = bdd.ite(x, y, z);
        let expected = bdd.apply_or(&bdd.apply_and(x, y), &bdd.apply_and(&bdd.apply_not(x), z));
        assert_eq!(f, expected);
        assert_eq!(f.variable(), x.variable());

        assert_eq!(bdd.ite(&bdd.one(), y, z), *y);
        assert_eq!(bdd.ite(&bdd.zero(), y, z), *z);
        assert_eq!(bdd.ite(x, y, y), *y);
        assert_eq!(bdd.ite(x, &bdd.one(), &bdd.zero()), *x);
        assert_eq!(bdd.ite(x, &bdd.zero(), &bdd.one()), bdd.apply_not(x));
        assert_eq!(bdd.ite(x, x, z), bdd.apply_or(x, z));
        assert_eq!(bdd.ite(x, y, x), bdd.apply_and(x, y));
    }

    #[test]
    fn test_restrict() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 3);
        let (x, y, z) = (&xs[0], &xs[1], &xs[2]);
        let vx = x.variable();
        let vy = y.variable();

        // f = x & (y | !z)
        let f = bdd.apply_and(x, &bdd.apply_or(y, &bdd.apply_not(z)));

        assert_eq!(bdd.restrict(&f, vx, false), bdd.zero());
        assert_eq!(bdd.restrict(&f, vx, true), bdd.apply_or(y, &bdd.apply_not(z)));
        assert_eq!(bdd.restrict(&f, vy, true), *x);
        assert_eq!(bdd.restrict(&f, vy, false), bdd.apply_and(x, &bdd.apply_not(z)));

        // x ^ y restricted on x = 1 is the very node of !y.
        let g = bdd.apply_xor(x, y);
        let not_y = bdd.compile(&!Expr::var(vy));
        assert_eq!(bdd.restrict(&g, vx, true).id(), not_y.id());
    }

    #[test]
    fn test_restrict_absent_variable() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 3);
        let f = bdd.apply_and(&xs[1], &xs[2]);
        assert_eq!(bdd.restrict(&f, xs[0].variable(), true).id(), f.id());
        assert_eq!(bdd.restrict(&bdd.one(), xs[0].variable(), false), bdd.one());
    }

    #[test]
    fn test_restrict_many() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 3);
        let (x, y, z) = (&xs[0], &xs[1], &xs[2]);

        let f = bdd.apply_or(&bdd.apply_and(x, y), z);
        let res = bdd.restrict_many(&f, &[(x.variable(), true), (z.variable(), false)]);
        assert_eq!(res, *y);

        let sequential = bdd.restrict(&bdd.restrict(&f, x.variable(), true), z.variable(), false);
        assert_eq!(res, sequential);

        assert_eq!(bdd.restrict_many(&f, &[]), f);
    }

    #[test]
    fn test_compose() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 3);
        let (x, y, z) = (&xs[0], &xs[1], &xs[2]);

        // (x & z)[x := y | z] = (y | z) & z = z
        let f = bdd.apply_and(x, z);
        let g = bdd.apply_or(y, z);
        assert_eq!(bdd.compose(&f, x.variable(), &g), *z);

        // Substituting a variable by itself is the identity.
        assert_eq!(bdd.compose(&f, x.variable(), x), f);

        // (x ^ y)[y := x] = 0
        let h = bdd.apply_xor(x, y);
        assert_eq!(bdd.compose(&h, y.variable(), x), bdd.zero());
    }

    #[test]
    fn test_and_all_or_all() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 3);

        let all = bdd.and_all(&xs);
        let expected = bdd.apply_and(&bdd.apply_and(&xs[0], &xs[1]), &xs[2]);
        assert_eq!(all, expected);

        let any = bdd.or_all(xs.iter());
        let expected = bdd.apply_or(&bdd.apply_or(&xs[0], &xs[1]), &xs[2]);
        assert_eq!(any, expected);

        assert_eq!(bdd.and_all([]), bdd.one());
        assert_eq!(bdd.or_all([]), bdd.zero());
    }

    #[test]
    fn test_memo_shares_work() {
        let bdd = Bdd::default();
        let xs = setup(&bdd, 6);

        // The xor of two chains stays linear when sub-results are shared.
        let f = bdd.and_all(&xs[..3]);
        let g = bdd.or_all(&xs[3..]);
        let before = bdd.stats().live;
        let h = bdd.apply_xor(&f, &g);
        let created = bdd.stats().live - before;
        assert!(created <= 12, "created {} nodes", created);
        assert!(!h.is_terminal());
    }
}
