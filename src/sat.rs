use std::collections::HashMap;

use num_bigint::BigUint;

use crate::diagram::Diagram;
use crate::reference::NodeId;
use crate::types::Var;

impl Diagram<'_> {
    /// Returns one satisfying partial assignment, if any exists.
    ///
    /// Variables not mentioned in the result may take any value.
    /// Returns `None` for the constant false function.
    pub fn one_sat(&self) -> Option<Vec<(Var, bool)>> {
        if self.is_false() {
            return None;
        }

        let bdd = self.manager();
        let mut path = Vec::new();
        let mut current = self.id();

        // Walk down, preferring the high branch whenever it is satisfiable.
        // In a reduced diagram every non-FALSE node reaches TRUE.
        while !current.is_true() {
            let node = bdd.node(current);
            if !node.high.is_false() {
                path.push((node.variable, true));
                current = node.high;
            } else {
                path.push((node.variable, false));
                current = node.low;
            }
        }

        Some(path)
    }

    /// Number of satisfying assignments over all registered variables.
    pub fn sat_count(&self) -> BigUint {
        self.sat_count_over(self.manager().num_vars())
    }

    /// Number of satisfying assignments to the first `num_vars` variables.
    ///
    /// # Panics
    ///
    /// Panics if the function depends on a variable outside that range.
    pub fn sat_count_over(&self, num_vars: usize) -> BigUint {
        let max = BigUint::from(1u8) << num_vars;
        let mut cache = HashMap::new();
        self.sat_count_rec(self.id(), num_vars, &max, &mut cache)
    }

    fn sat_count_rec(
        &self,
        id: NodeId,
        num_vars: usize,
        max: &BigUint,
        cache: &mut HashMap<NodeId, BigUint>,
    ) -> BigUint {
        match id.terminal_value() {
            Some(false) => return BigUint::default(),
            Some(true) => return max.clone(),
            None => {}
        }

        if let Some(count) = cache.get(&id) {
            return count.clone();
        }

        let node = self.manager().node(id);
        assert!(
            node.variable.index() < num_vars,
            "Variable {} is outside the first {} variables",
            node.variable,
            num_vars
        );

        // Half of all assignments go through each branch of a test.
        let low = self.sat_count_rec(node.low, num_vars, max, cache);
        let high = self.sat_count_rec(node.high, num_vars, max, cache);
        let count: BigUint = (low + high) >> 1;

        cache.insert(id, count.clone());
        count
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::bdd::Bdd;

    use super::*;

    #[test]
    fn test_one_sat() {
        let bdd = Bdd::default();
        let x = bdd.var("x").unwrap();
        let y = bdd.var("y").unwrap();
        let z = bdd.var("z").unwrap();

        let f = bdd.cube([(x, true), (y, false), (z, false)]);
        let model = f.one_sat();
        assert_eq!(model, Some(vec![(x, true), (y, false), (z, false)]));

        let g = &f & &!bdd.cube(model.unwrap());
        assert_eq!(g.one_sat(), None);
    }

    #[test]
    fn test_one_sat_satisfies() {
        let bdd = Bdd::default();
        let vars: Vec<Var> = (0..4).map(|i| bdd.var_indexed("x", i).unwrap()).collect();
        let f = (bdd.mk_var(vars[0]) ^ bdd.mk_var(vars[3])) & !bdd.mk_var(vars[1]);

        let model = f.one_sat().unwrap();
        let assignment: HashMap<Var, bool> = model.into_iter().collect();
        assert!(f.eval(|v| assignment.get(&v).copied().unwrap_or(false)));
        assert!(f.eval(|v| assignment.get(&v).copied().unwrap_or(true)));
    }

    #[test]
    fn test_one_sat_terminals() {
        let bdd = Bdd::default();
        assert_eq!(bdd.one().one_sat(), Some(vec![]));
        assert_eq!(bdd.zero().one_sat(), None);
    }

    #[test]
    fn test_sat_count_terminal() {
        let bdd = Bdd::default();
        assert_eq!(bdd.zero().sat_count_over(3), BigUint::default());
        assert_eq!(bdd.one().sat_count_over(0), BigUint::from(1u8));
        assert_eq!(bdd.one().sat_count_over(3), BigUint::from(8u8));
    }

    #[test]
    fn test_sat_count() {
        let bdd = Bdd::default();
        let x = bdd.var("x").unwrap();
        let y = bdd.var("y").unwrap();
        let z = bdd.var("z").unwrap();
        let (fx, fy, fz) = (bdd.mk_var(x), bdd.mk_var(y), bdd.mk_var(z));

        assert_eq!(fx.sat_count(), BigUint::from(4u8));
        assert_eq!((&fx & &fy).sat_count(), BigUint::from(2u8));
        assert_eq!((&fx | &fz).sat_count(), BigUint::from(6u8));
        assert_eq!((&fx ^ &fy ^ &fz).sat_count(), BigUint::from(4u8));
        assert_eq!((&fx & &fy).sat_count_over(5), BigUint::from(8u8));
    }

    #[test]
    fn test_sat_count_many_variables() {
        let bdd = Bdd::default();
        let vars: Vec<Var> = (0..100).map(|i| bdd.var_indexed("x", i).unwrap()).collect();
        let f = bdd.mk_var(vars[99]);
        assert_eq!(f.sat_count(), BigUint::from(1u8) << 99);
    }

    #[test]
    #[should_panic(expected = "outside the first")]
    fn test_sat_count_too_few_variables() {
        let bdd = Bdd::default();
        bdd.var("x").unwrap();
        let y = bdd.var("y").unwrap();
        bdd.mk_var(y).sat_count_over(1);
    }
}
