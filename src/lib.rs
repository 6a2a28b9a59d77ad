//! # obdd-rs: Ordered Binary Decision Diagrams
//!
//! **`obdd-rs`** represents Boolean functions as reduced, ordered binary
//! decision diagrams. For a fixed variable order every function has exactly
//! one diagram, and this library makes that diagram a single shared node:
//! two diagrams are equal exactly when their root ids are equal, which
//! turns equivalence checking into a constant-time comparison.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: a [`Bdd`][crate::bdd::Bdd] manager
//!   owns the variable order and the unique node table; every diagram is
//!   built through it.
//! - **Symbolic Variables**: variables are named by a tuple of names and an
//!   optional tuple of indices (`"x"`, `"a[2,3]"`); they are ordered by
//!   first registration.
//! - **Hash Consing**: at most one node per `(variable, low, high)` triple,
//!   and no node whose two children coincide.
//! - **Handles**: a [`Diagram`][crate::diagram::Diagram] keeps its nodes
//!   alive; unreferenced nodes are reclaimed by a reference-counting sweep.
//! - **Expressions**: Boolean expression trees compile directly into
//!   canonical diagrams.
//!
//! ## Basic Usage
//!
//! ```rust
//! use obdd_rs::bdd::Bdd;
//! use obdd_rs::expr::Expr;
//!
//! // 1. Initialize the manager
//! let bdd = Bdd::default();
//!
//! // 2. Register variables; x is ordered before y
//! let x = bdd.var("x").unwrap();
//! let y = bdd.var("y").unwrap();
//!
//! // 3. Build f = x AND (NOT y)
//! let f = bdd.mk_var(x) & !bdd.mk_var(y);
//!
//! // 4. The same function compiled from an expression is the same node
//! let g = bdd.compile(&(!Expr::var(y) & Expr::var(x)));
//! assert_eq!(f, g);
//!
//! // 5. Evaluate and restrict
//! assert!(f.eval(|v| v == x));
//! assert_eq!(f.restrict(x, true), !bdd.mk_var(y));
//! ```
//!
//! ## Core Components
//!
//! - **[`bdd`]**: the manager, its configuration and statistics.
//! - **[`apply`]**: binary connectives, negation, if-then-else, restriction.
//! - **[`compile`]**: expression to diagram compilation.
//! - **[`diagram`]**: the user-facing handle and its traversal interface.
//! - **[`sat`]** and **[`paths`]**: satisfying assignments and model counting.

pub mod apply;
pub mod bdd;
pub mod cache;
pub mod compile;
pub mod diagram;
pub mod error;
pub mod expr;
pub mod node;
pub mod paths;
pub mod reference;
pub mod registry;
pub mod sat;
pub mod subtable;
pub mod table;
pub mod types;
