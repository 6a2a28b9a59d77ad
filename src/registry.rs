//! Variable registry: deduplicated symbolic variables and their total order.
//!
//! A variable is identified by an ordered tuple of names and an ordered
//! tuple of non-negative indices. The first registration of a given
//! `(names, indices)` pair assigns the next unused rank; every later request
//! for the same pair returns the same [`Var`].
//!
//! ```text
//! register(["x"], [])      -> x0
//! register(["y"], [])      -> x1
//! register(["x"], [])      -> x0     (deduplicated)
//! register(["a"], [2, 3])  -> x2     (displayed as "a[2,3]")
//! ```
//!
//! Entries are never removed: variables live as long as the manager.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use log::debug;

use crate::error::{Error, Result};
use crate::types::Var;

/// Symbolic identity of a registered variable.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct VarInfo {
    names: Vec<String>,
    indices: Vec<u64>,
}

impl VarInfo {
    /// Validates a registration request and builds the identity key.
    fn parse<S: AsRef<str>>(names: &[S], indices: &[i64]) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::EmptyNames);
        }
        if let Some(position) = names.iter().position(|name| name.as_ref().is_empty()) {
            return Err(Error::EmptyName { position });
        }
        let indices = indices
            .iter()
            .map(|&index| u64::try_from(index).map_err(|_| Error::NegativeIndex { index }))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            names: names.iter().map(|name| name.as_ref().to_owned()).collect(),
            indices,
        })
    }

    /// All name tokens, innermost first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index tuple; empty for a scalar variable.
    pub fn indices(&self) -> &[u64] {
        &self.indices
    }

    /// The innermost variable name.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    /// The fully qualified name: name tokens, outermost first, joined by `.`.
    pub fn qualname(&self) -> String {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.reverse();
        names.join(".")
    }
}

impl fmt::Display for VarInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualname())?;
        if !self.indices.is_empty() {
            let indices: Vec<String> = self.indices.iter().map(u64::to_string).collect();
            write!(f, "[{}]", indices.join(","))?;
        }
        Ok(())
    }
}

/// Source of registry identities; 0 is reserved for unowned variables.
static NEXT_REGISTRY_ID: AtomicU32 = AtomicU32::new(1);

/// Registry of all variables known to a manager.
#[derive(Debug)]
pub struct VarRegistry {
    /// Identity stamped into every variable issued here.
    id: u32,
    /// Identity -> variable.
    by_key: HashMap<VarInfo, Var>,
    /// Rank -> identity.
    infos: Vec<VarInfo>,
}

impl Default for VarRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl VarRegistry {
    pub fn new() -> Self {
        let id = NEXT_REGISTRY_ID.fetch_add(1, AtomicOrdering::Relaxed);
        assert_ne!(id, 0, "Registry identities exhausted");
        Self {
            id,
            by_key: HashMap::new(),
            infos: Vec::new(),
        }
    }

    /// Returns the variable for `(names, indices)`, registering it on first use.
    ///
    /// The second component of the result is `true` if a new variable was created.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyNames`] if `names` is empty
    /// - [`Error::EmptyName`] if some name token is the empty string
    /// - [`Error::NegativeIndex`] if some index is negative
    pub fn register<S: AsRef<str>>(&mut self, names: &[S], indices: &[i64]) -> Result<(Var, bool)> {
        let info = VarInfo::parse(names, indices)?;
        if let Some(&var) = self.by_key.get(&info) {
            return Ok((var, false));
        }

        assert!(self.infos.len() < Var::TERMINAL.index(), "Variable registry is full");
        let var = Var::owned(self.id, self.infos.len() as u32);
        debug!("register: {} -> {}", info, var);
        self.by_key.insert(info.clone(), var);
        self.infos.push(info);
        Ok((var, true))
    }

    /// Looks up a variable without registering it.
    pub fn find<S: AsRef<str>>(&self, names: &[S], indices: &[i64]) -> Option<Var> {
        let info = VarInfo::parse(names, indices).ok()?;
        self.by_key.get(&info).copied()
    }

    /// Compares two variables by rank: `Less` means `a` is tested before `b`.
    pub fn compare(&self, a: Var, b: Var) -> Ordering {
        a.rank().cmp(&b.rank())
    }

    /// Returns the identity of a registered variable.
    ///
    /// # Panics
    ///
    /// Panics if `var` was not issued by this registry.
    pub fn info(&self, var: Var) -> &VarInfo {
        assert!(self.contains(var), "Variable {} is unknown to this registry", var);
        &self.infos[var.index()]
    }

    /// Whether `var` was issued by this registry.
    pub fn contains(&self, var: Var) -> bool {
        var.owner() == self.id && var.index() < self.infos.len()
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Iterates over all variables in rank order.
    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        let id = self.id;
        (0..self.infos.len() as u32).map(move |rank| Var::owned(id, rank))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_register_dedup() {
        let mut reg = VarRegistry::new();
        let (x1, fresh1) = reg.register(&["x"], &[]).unwrap();
        let (x2, fresh2) = reg.register(&["x"], &[]).unwrap();
        assert_eq!(x1, x2);
        assert!(fresh1);
        assert!(!fresh2);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_register_ranks_in_creation_order() {
        let mut reg = VarRegistry::new();
        let (x, _) = reg.register(&["x"], &[]).unwrap();
        let (y, _) = reg.register(&["y"], &[]).unwrap();
        assert_eq!(x.rank(), 0);
        assert_eq!(y.rank(), 1);
        assert_eq!(reg.compare(x, y), Ordering::Less);
        assert_eq!(reg.compare(y, x), Ordering::Greater);
        assert_eq!(reg.compare(x, x), Ordering::Equal);
    }

    #[test]
    fn test_register_indexed() {
        let mut reg = VarRegistry::new();
        let (a0, _) = reg.register(&["a"], &[0]).unwrap();
        let (a1, _) = reg.register(&["a"], &[1]).unwrap();
        let (a, _) = reg.register(&["a"], &[]).unwrap();
        assert_ne!(a0, a1);
        assert_ne!(a0, a);
        assert_eq!(reg.find(&["a"], &[1]), Some(a1));
        assert_eq!(reg.find(&["a"], &[2]), None);
    }

    #[test]
    fn test_register_errors() {
        let mut reg = VarRegistry::new();
        let empty: [&str; 0] = [];
        assert_eq!(reg.register(&empty, &[]), Err(Error::EmptyNames));
        assert_eq!(reg.register(&["x", ""], &[]), Err(Error::EmptyName { position: 1 }));
        assert_eq!(reg.register(&["x"], &[1, -3]), Err(Error::NegativeIndex { index: -3 }));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_display() {
        let mut reg = VarRegistry::new();
        let (x, _) = reg.register(&["x"], &[]).unwrap();
        let (v, _) = reg.register(&["bit", "reg"], &[2, 3]).unwrap();
        assert_eq!(reg.info(x).to_string(), "x");
        assert_eq!(reg.info(v).to_string(), "reg.bit[2,3]");
        assert_eq!(reg.info(v).name(), "bit");
        assert_eq!(reg.info(v).indices(), &[2, 3]);
    }

    #[test]
    #[should_panic(expected = "unknown to this registry")]
    fn test_info_unknown_var() {
        let reg = VarRegistry::new();
        reg.info(Var::new(5));
    }

    #[test]
    fn test_contains_rejects_other_registry() {
        let mut first = VarRegistry::new();
        let mut second = VarRegistry::new();
        let (a, _) = first.register(&["a"], &[]).unwrap();
        let (x, _) = second.register(&["x"], &[]).unwrap();
        assert_eq!(a.rank(), x.rank());
        assert!(first.contains(a));
        assert!(!second.contains(a));
        assert!(!first.contains(Var::new(0)));
        assert_eq!(second.vars().collect::<Vec<_>>(), vec![x]);
    }

    #[test]
    #[should_panic(expected = "unknown to this registry")]
    fn test_info_other_registry() {
        let mut first = VarRegistry::new();
        let mut second = VarRegistry::new();
        let (a, _) = first.register(&["a"], &[]).unwrap();
        second.register(&["x"], &[]).unwrap();
        second.info(a);
    }
}
