//! Compilation of expressions into canonical diagrams.
//!
//! Constants become terminals, a variable becomes its projection node, and
//! every connective is delegated to the apply engine. Structurally equal
//! expressions, and more generally logically equivalent ones, compile to
//! the very same node.

use log::debug;

use crate::apply::BinaryOp;
use crate::bdd::Bdd;
use crate::cache::Cache;
use crate::diagram::Diagram;
use crate::error::{Error, Result};
use crate::expr::{Expr, ExprArena, ExprId, Op};
use crate::reference::NodeId;

impl Bdd {
    /// Compiles a boxed expression.
    ///
    /// # Panics
    ///
    /// Panics if the expression mentions a variable unknown to this manager.
    pub fn compile(&self, expr: &Expr) -> Diagram<'_> {
        debug!("compile(size = {})", expr.size());
        self.maybe_collect_garbage();
        let res = self.compile_rec(expr);
        self.wrap(res)
    }

    fn compile_rec(&self, expr: &Expr) -> NodeId {
        match expr {
            Expr::Const(value) => NodeId::terminal(*value),
            Expr::Var(var) => {
                self.check_var(*var);
                self.mk_node(*var, NodeId::FALSE, NodeId::TRUE)
            }
            Expr::Not(a) => {
                let a = self.compile_rec(a);
                self.not_node(a)
            }
            Expr::And(a, b) => self.compile_binary(BinaryOp::And, a, b),
            Expr::Or(a, b) => self.compile_binary(BinaryOp::Or, a, b),
            Expr::Xor(a, b) => self.compile_binary(BinaryOp::Xor, a, b),
            Expr::Implies(a, b) => self.compile_binary(BinaryOp::Implies, a, b),
        }
    }

    fn compile_binary(&self, op: BinaryOp, a: &Expr, b: &Expr) -> NodeId {
        let a = self.compile_rec(a);
        let b = self.compile_rec(b);
        self.apply_node(op, a, b)
    }

    /// Compiles the sub-expression of `arena` rooted at `root`.
    ///
    /// Each arena node is compiled at most once per call, however many
    /// parents share it.
    ///
    /// # Errors
    ///
    /// Returns a structural error if `root` is not in the arena, or if a
    /// reachable node has the wrong number of operands or refers to an
    /// operand that was not pushed before it.
    pub fn compile_arena(&self, arena: &ExprArena, root: ExprId) -> Result<Diagram<'_>> {
        debug!("compile_arena(root = {}, len = {})", root, arena.len());
        if arena.get(root).is_none() {
            return Err(Error::Structural {
                node: root,
                reason: format!("root is outside the arena of {} nodes", arena.len()),
            });
        }

        self.maybe_collect_garbage();
        let mut cache = Cache::new(self.config().memo_bits);
        let res = self.compile_arena_rec(arena, root, &mut cache)?;
        debug!(
            "compile_arena -> {}, memo: {} hits, {} misses",
            res,
            cache.hits(),
            cache.misses()
        );
        Ok(self.wrap(res))
    }

    fn compile_arena_rec(&self, arena: &ExprArena, id: ExprId, cache: &mut Cache<ExprId, NodeId>) -> Result<NodeId> {
        if let Some(res) = cache.get(&id) {
            return Ok(res);
        }

        let node = arena.get(id).ok_or_else(|| Error::Structural {
            node: id,
            reason: "no such node".to_string(),
        })?;

        if node.args.len() != node.op.arity() {
            return Err(Error::Structural {
                node: id,
                reason: format!(
                    "{:?} expects {} operands, got {}",
                    node.op,
                    node.op.arity(),
                    node.args.len()
                ),
            });
        }
        if let Some(&arg) = node.args.iter().find(|&&arg| arg >= id) {
            return Err(Error::Structural {
                node: id,
                reason: format!("operand {} does not precede its parent", arg),
            });
        }

        let res = match node.op {
            Op::Const(value) => NodeId::terminal(value),
            Op::Var(var) => {
                self.check_var(var);
                self.mk_node(var, NodeId::FALSE, NodeId::TRUE)
            }
            Op::Not => {
                let a = self.compile_arena_rec(arena, node.args[0], cache)?;
                self.not_node(a)
            }
            Op::And => self.compile_arena_binary(BinaryOp::And, arena, &node.args, cache)?,
            Op::Or => self.compile_arena_binary(BinaryOp::Or, arena, &node.args, cache)?,
            Op::Xor => self.compile_arena_binary(BinaryOp::Xor, arena, &node.args, cache)?,
            Op::Implies => self.compile_arena_binary(BinaryOp::Implies, arena, &node.args, cache)?,
        };

        cache.insert(id, res);
        Ok(res)
    }

    fn compile_arena_binary(
        &self,
        op: BinaryOp,
        arena: &ExprArena,
        args: &[ExprId],
        cache: &mut Cache<ExprId, NodeId>,
    ) -> Result<NodeId> {
        let a = self.compile_arena_rec(arena, args[0], cache)?;
        let b = self.compile_arena_rec(arena, args[1], cache)?;
        Ok(self.apply_node(op, a, b))
    }
}
