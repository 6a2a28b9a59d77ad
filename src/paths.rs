//! Iterator over the paths to TRUE in a diagram.
//!
//! Each path is the list of decisions `(variable, value)` taken from the
//! root down to the TRUE terminal, in variable order. Every path denotes a
//! cube of the function's on-set; distinct paths denote disjoint cubes.
//!
//! ```
//! use obdd_rs::bdd::Bdd;
//!
//! let bdd = Bdd::default();
//! let x = bdd.var("x").unwrap();
//! let y = bdd.var("y").unwrap();
//!
//! // f = x XOR y (true when exactly one is true)
//! let f = bdd.mk_var(x) ^ bdd.mk_var(y);
//!
//! let paths: Vec<_> = f.paths().collect();
//! assert_eq!(paths.len(), 2);
//! assert_eq!(paths[0], vec![(x, true), (y, false)]);
//! assert_eq!(paths[1], vec![(x, false), (y, true)]);
//! ```
//!
//! The number of paths can be exponential in the number of variables.

use crate::diagram::Diagram;
use crate::reference::NodeId;
use crate::types::Var;

impl<'a> Diagram<'a> {
    /// Returns an iterator over all paths to TRUE, high branches first.
    ///
    /// The constant TRUE has exactly one (empty) path, FALSE has none.
    pub fn paths(&self) -> Paths<'a> {
        Paths::new(self.clone())
    }
}

#[derive(Debug, Clone, Copy)]
enum Branch {
    High,
    Low,
}

#[derive(Debug)]
struct StackFrame {
    node: NodeId,
    /// Which branch to explore next (None if both explored)
    next_branch: Option<Branch>,
}

/// An iterator over the paths to TRUE of a diagram.
///
/// Created by [`Diagram::paths()`]. The iterator holds a handle on the
/// root, so the diagram stays alive while it is being enumerated.
pub struct Paths<'a> {
    root: Diagram<'a>,
    stack: Vec<StackFrame>,
    /// Current path being built (reused across iterations)
    current_path: Vec<(Var, bool)>,
}

impl<'a> Paths<'a> {
    fn new(root: Diagram<'a>) -> Self {
        let stack = vec![StackFrame {
            node: root.id(),
            next_branch: Some(Branch::High),
        }];
        Paths {
            root,
            stack,
            current_path: Vec::new(),
        }
    }

    /// Leaves the frame on top of the stack.
    fn backtrack(&mut self) {
        self.stack.pop();
        // Pop the decision that led here (unless this was the root)
        if !self.stack.is_empty() {
            self.current_path.pop();
        }
    }
}

impl Iterator for Paths<'_> {
    type Item = Vec<(Var, bool)>;

    fn next(&mut self) -> Option<Self::Item> {
        let bdd = self.root.manager();
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;
            let next_branch = frame.next_branch;

            if node.is_true() {
                let result = self.current_path.clone();
                self.backtrack();
                return Some(result);
            }
            if node.is_false() {
                self.backtrack();
                continue;
            }

            let record = bdd.node(node);
            match next_branch {
                Some(Branch::High) => {
                    frame.next_branch = Some(Branch::Low);
                    self.current_path.push((record.variable, true));
                    self.stack.push(StackFrame {
                        node: record.high,
                        next_branch: Some(Branch::High),
                    });
                }
                Some(Branch::Low) => {
                    frame.next_branch = None;
                    self.current_path.push((record.variable, false));
                    self.stack.push(StackFrame {
                        node: record.low,
                        next_branch: Some(Branch::High),
                    });
                }
                None => self.backtrack(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use num_bigint::BigUint;
    use test_log::test;

    use crate::bdd::Bdd;

    use super::*;

    #[test]
    fn test_paths_single_cube() {
        let bdd = Bdd::default();
        let x = bdd.var("x").unwrap();
        let y = bdd.var("y").unwrap();
        let z = bdd.var("z").unwrap();

        let f = bdd.cube([(x, true), (y, false), (z, true)]);
        let paths: Vec<_> = f.paths().collect();
        assert_eq!(paths, vec![vec![(x, true), (y, false), (z, true)]]);
    }

    #[test]
    fn test_paths_two_cubes() {
        let bdd = Bdd::default();
        let x = bdd.var("x").unwrap();
        let y = bdd.var("y").unwrap();
        let z = bdd.var("z").unwrap();

        let c1 = bdd.cube([(x, true), (y, false), (z, true)]);
        let c2 = bdd.cube([(x, true), (y, true), (z, false)]);
        let f = &c1 | &c2;

        let paths: Vec<_> = f.paths().collect();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&vec![(x, true), (y, false), (z, true)]));
        assert!(paths.contains(&vec![(x, true), (y, true), (z, false)]));
    }

    #[test]
    fn test_paths_constants() {
        let bdd = Bdd::default();
        let paths: Vec<_> = bdd.one().paths().collect();
        assert_eq!(paths, vec![Vec::<(Var, bool)>::new()]);
        assert_eq!(bdd.zero().paths().count(), 0);
    }

    #[test]
    fn test_paths_cover_sat_count() {
        let bdd = Bdd::default();
        let vars: Vec<Var> = (0..5).map(|i| bdd.var_indexed("x", i).unwrap()).collect();
        let lit = |i: usize| bdd.mk_var(vars[i]);
        let f = (lit(0) & lit(2)) | (lit(1) ^ lit(4)) | !lit(3);

        // Paths are disjoint cubes: their sizes add up to the model count.
        let mut total = BigUint::default();
        for path in f.paths() {
            let assignment: HashMap<Var, bool> = path.iter().copied().collect();
            assert!(f.eval(|v| assignment.get(&v).copied().unwrap_or(false)));
            total += BigUint::from(1u8) << (vars.len() - path.len());
        }
        assert_eq!(total, f.sat_count());
    }

    #[test]
    fn test_paths_outlive_handle() {
        let bdd = Bdd::default();
        let x = bdd.var("x").unwrap();
        let y = bdd.var("y").unwrap();

        let mut paths = {
            let f = bdd.mk_var(x) | bdd.mk_var(y);
            f.paths()
        };
        bdd.collect_garbage();
        assert_eq!(paths.next(), Some(vec![(x, true)]));
        assert_eq!(paths.next(), Some(vec![(x, false), (y, true)]));
        assert_eq!(paths.next(), None);
    }
}
