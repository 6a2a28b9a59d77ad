//! Boolean expressions over registered variables.
//!
//! Two representations are provided:
//!
//! - [`Expr`], a boxed tree that is convenient to build by hand or with the
//!   `!`, `&`, `|` and `^` operators.
//! - [`ExprArena`], a flat, index-addressed store in which a sub-expression
//!   may be shared by several parents. Nodes only refer to nodes pushed
//!   before them; the compiler checks this and the operator arities, and
//!   reports violations as structural errors.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use crate::types::Var;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Const(bool),
    Var(Var),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Xor(Box<Expr>, Box<Expr>),
    Implies(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn constant(value: bool) -> Self {
        Expr::Const(value)
    }

    pub fn var(var: Var) -> Self {
        Expr::Var(var)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(value: Self) -> Self {
        Expr::Not(Box::new(value))
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Expr::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Expr::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn xor(lhs: Self, rhs: Self) -> Self {
        Expr::Xor(Box::new(lhs), Box::new(rhs))
    }

    pub fn implies(lhs: Self, rhs: Self) -> Self {
        Expr::Implies(Box::new(lhs), Box::new(rhs))
    }

    /// Evaluates the expression under `assignment`.
    pub fn eval<F>(&self, assignment: &F) -> bool
    where
        F: Fn(Var) -> bool,
    {
        match self {
            Expr::Const(value) => *value,
            Expr::Var(var) => assignment(*var),
            Expr::Not(a) => !a.eval(assignment),
            Expr::And(a, b) => a.eval(assignment) && b.eval(assignment),
            Expr::Or(a, b) => a.eval(assignment) || b.eval(assignment),
            Expr::Xor(a, b) => a.eval(assignment) ^ b.eval(assignment),
            Expr::Implies(a, b) => !a.eval(assignment) || b.eval(assignment),
        }
    }

    /// Variables occurring syntactically in the expression, in order.
    pub fn support(&self) -> BTreeSet<Var> {
        let mut vars = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                Expr::Const(_) => {}
                Expr::Var(var) => {
                    vars.insert(*var);
                }
                Expr::Not(a) => stack.push(a),
                Expr::And(a, b) | Expr::Or(a, b) | Expr::Xor(a, b) | Expr::Implies(a, b) => {
                    stack.push(a);
                    stack.push(b);
                }
            }
        }
        vars
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Expr::Const(_) | Expr::Var(_) => 1,
            Expr::Not(a) => 1 + a.size(),
            Expr::And(a, b) | Expr::Or(a, b) | Expr::Xor(a, b) | Expr::Implies(a, b) => 1 + a.size() + b.size(),
        }
    }
}

impl From<Var> for Expr {
    fn from(var: Var) -> Self {
        Expr::Var(var)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Const(value)
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Self::Output {
        Expr::not(self)
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Self) -> Self::Output {
        Expr::and(self, rhs)
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Self) -> Self::Output {
        Expr::or(self, rhs)
    }
}

impl BitXor for Expr {
    type Output = Expr;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Expr::xor(self, rhs)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(false) => write!(f, "0"),
            Expr::Const(true) => write!(f, "1"),
            Expr::Var(var) => write!(f, "{}", var),
            Expr::Not(a) => write!(f, "!{}", a),
            Expr::And(a, b) => write!(f, "({} & {})", a, b),
            Expr::Or(a, b) => write!(f, "({} | {})", a, b),
            Expr::Xor(a, b) => write!(f, "({} ^ {})", a, b),
            Expr::Implies(a, b) => write!(f, "({} -> {})", a, b),
        }
    }
}

// ============================================================================
// Arena representation
// ============================================================================

/// Index of a node in an [`ExprArena`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ExprId(usize);

impl ExprId {
    pub const fn new(index: usize) -> Self {
        ExprId(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operator of an arena node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Op {
    Const(bool),
    Var(Var),
    Not,
    And,
    Or,
    Xor,
    Implies,
}

impl Op {
    /// Number of operands the operator takes.
    pub fn arity(self) -> usize {
        match self {
            Op::Const(_) | Op::Var(_) => 0,
            Op::Not => 1,
            Op::And | Op::Or | Op::Xor | Op::Implies => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprNode {
    pub op: Op,
    pub args: Vec<ExprId>,
}

/// Flat expression storage; operands are referenced by [`ExprId`].
#[derive(Debug, Clone, Default)]
pub struct ExprArena {
    nodes: Vec<ExprNode>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ExprId) -> Option<&ExprNode> {
        self.nodes.get(id.0)
    }

    /// Appends a raw node without any checks.
    ///
    /// Arity and operand order are validated when the arena is compiled.
    pub fn push(&mut self, op: Op, args: impl IntoIterator<Item = ExprId>) -> ExprId {
        let id = ExprId(self.nodes.len());
        self.nodes.push(ExprNode {
            op,
            args: args.into_iter().collect(),
        });
        id
    }

    pub fn constant(&mut self, value: bool) -> ExprId {
        self.push(Op::Const(value), [])
    }

    pub fn var(&mut self, var: Var) -> ExprId {
        self.push(Op::Var(var), [])
    }

    pub fn not(&mut self, a: ExprId) -> ExprId {
        self.push(Op::Not, [a])
    }

    pub fn and(&mut self, a: ExprId, b: ExprId) -> ExprId {
        self.push(Op::And, [a, b])
    }

    pub fn or(&mut self, a: ExprId, b: ExprId) -> ExprId {
        self.push(Op::Or, [a, b])
    }

    pub fn xor(&mut self, a: ExprId, b: ExprId) -> ExprId {
        self.push(Op::Xor, [a, b])
    }

    pub fn implies(&mut self, a: ExprId, b: ExprId) -> ExprId {
        self.push(Op::Implies, [a, b])
    }

    /// Copies a boxed expression into the arena and returns its root.
    pub fn add_expr(&mut self, expr: &Expr) -> ExprId {
        match expr {
            Expr::Const(value) => self.constant(*value),
            Expr::Var(var) => self.var(*var),
            Expr::Not(a) => {
                let a = self.add_expr(a);
                self.not(a)
            }
            Expr::And(a, b) => {
                let (a, b) = (self.add_expr(a), self.add_expr(b));
                self.and(a, b)
            }
            Expr::Or(a, b) => {
                let (a, b) = (self.add_expr(a), self.add_expr(b));
                self.or(a, b)
            }
            Expr::Xor(a, b) => {
                let (a, b) = (self.add_expr(a), self.add_expr(b));
                self.xor(a, b)
            }
            Expr::Implies(a, b) => {
                let (a, b) = (self.add_expr(a), self.add_expr(b));
                self.implies(a, b)
            }
        }
    }

    pub fn from_expr(expr: &Expr) -> (Self, ExprId) {
        let mut arena = Self::new();
        let root = arena.add_expr(expr);
        (arena, root)
    }
}
