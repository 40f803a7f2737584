use super::{Atom, ObjectIdx, SymbolIdx, Tuple, TupleIdx, VariableIdx};
use crate::problem::StateVariable;

use indexmap::IndexSet;
use std::collections::HashMap;
use std::ops::Range;

/// Dense bijection between atoms (equivalently `(symbol, tuple)` pairs) and `[0, N)`.
///
/// Indices are assigned symbol by symbol, so each symbol owns a contiguous
/// range. Within a symbol, variables keep their declaration order and values
/// their domain order. The index is closed-world: it is built once from the
/// static domains and never grows afterwards.
#[derive(Debug, Clone)]
pub struct TupleIndex {
    atoms: IndexSet<Atom>,
    tuples: Vec<Tuple>,
    symbols: Vec<SymbolIdx>,
    tuple_lookup: Vec<HashMap<Tuple, TupleIdx>>,
    symbol_ranges: Vec<Range<TupleIdx>>,
}

impl TupleIndex {
    pub fn new(num_symbols: usize, variables: &[StateVariable]) -> Self {
        let mut by_symbol: Vec<Vec<VariableIdx>> = vec![Vec::new(); num_symbols];
        for (variable, var) in variables.iter().enumerate() {
            assert!(
                var.symbol < num_symbols,
                "variable {} refers to unknown symbol {}",
                var.name,
                var.symbol
            );
            by_symbol[var.symbol].push(variable);
        }

        let mut index = TupleIndex {
            atoms: IndexSet::new(),
            tuples: Vec::new(),
            symbols: Vec::new(),
            tuple_lookup: vec![HashMap::new(); num_symbols],
            symbol_ranges: Vec::with_capacity(num_symbols),
        };

        for (symbol, symbol_variables) in by_symbol.iter().enumerate() {
            let start = index.atoms.len();
            for &variable in symbol_variables {
                let var = &variables[variable];
                for &value in &var.domain {
                    let (idx, fresh) = index.atoms.insert_full(Atom::new(variable, value));
                    assert!(fresh, "value {value} repeated in the domain of {}", var.name);

                    let mut tuple = var.args.clone();
                    tuple.push(value);
                    index.tuple_lookup[symbol].insert(tuple.clone(), idx);
                    index.tuples.push(tuple);
                    index.symbols.push(symbol);
                }
            }
            index.symbol_ranges.push(start..index.atoms.len());
        }

        index
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Panics if the atom was never registered.
    pub fn to_index(&self, atom: &Atom) -> TupleIdx {
        match self.atoms.get_index_of(atom) {
            Some(idx) => idx,
            None => panic!("atom {atom} is not registered in the tuple index"),
        }
    }

    /// Non-fatal lookup, for values that may lie outside a variable's domain.
    pub fn find(&self, atom: &Atom) -> Option<TupleIdx> {
        self.atoms.get_index_of(atom)
    }

    /// Panics if the tuple was never registered for this symbol.
    pub fn tuple_to_index(&self, symbol: SymbolIdx, tuple: &[ObjectIdx]) -> TupleIdx {
        match self.tuple_lookup.get(symbol).and_then(|tuples| tuples.get(tuple)) {
            Some(&idx) => idx,
            None => panic!("tuple {tuple:?} of symbol {symbol} is not registered in the tuple index"),
        }
    }

    pub fn to_atom(&self, idx: TupleIdx) -> &Atom {
        match self.atoms.get_index(idx) {
            Some(atom) => atom,
            None => panic!("tuple index {idx} is out of range"),
        }
    }

    pub fn to_tuple(&self, idx: TupleIdx) -> &[ObjectIdx] {
        &self.tuples[idx]
    }

    pub fn symbol_of(&self, idx: TupleIdx) -> SymbolIdx {
        self.symbols[idx]
    }

    pub fn symbol_range(&self, symbol: SymbolIdx) -> Range<TupleIdx> {
        self.symbol_ranges[symbol].clone()
    }

    /// Atoms in index order.
    pub fn atoms(&self) -> &IndexSet<Atom> {
        &self.atoms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::random_problem;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn variable(name: &str, symbol: SymbolIdx, args: Vec<ObjectIdx>, domain: Vec<ObjectIdx>) -> StateVariable {
        StateVariable {
            name: name.to_string(),
            symbol,
            args,
            domain,
        }
    }

    #[test]
    fn test_symbols_own_contiguous_ranges() {
        // Declared interleaved on purpose: at(a), clear(a), at(b).
        let variables = vec![
            variable("at(a)", 0, vec![0], vec![10, 11, 12]),
            variable("clear(a)", 1, vec![0], vec![0, 1]),
            variable("at(b)", 0, vec![1], vec![10, 11, 12]),
        ];
        let index = TupleIndex::new(2, &variables);

        assert_eq!(index.len(), 8);
        assert_eq!(index.symbol_range(0), 0..6);
        assert_eq!(index.symbol_range(1), 6..8);

        let idx = index.to_index(&Atom::new(2, 11));
        assert_eq!(idx, 4);
        assert_eq!(index.symbol_of(idx), 0);
        assert_eq!(index.to_tuple(idx), &[1, 11]);
        assert_eq!(index.tuple_to_index(0, &[1, 11]), idx);
        assert_eq!(index.tuple_to_index(1, &[0, 1]), 7);
    }

    #[test]
    fn test_bijection_on_random_problems() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let problem = random_problem(&mut rng);
            let index = problem.index();

            let mut seen = HashSet::new();
            for variable in 0..problem.variables().len() {
                for &value in &problem.variable(variable).domain {
                    let atom = Atom::new(variable, value);
                    let idx = index.to_index(&atom);
                    assert_eq!(*index.to_atom(idx), atom);
                    assert!(seen.insert(idx));
                }
            }
            // Indices form a permutation of [0, N).
            assert_eq!(seen.len(), index.len());
            assert!(seen.iter().all(|&idx| idx < index.len()));
        }
    }

    #[test]
    fn test_find_outside_domain() {
        let variables = vec![variable("x", 0, vec![], vec![0, 1])];
        let index = TupleIndex::new(1, &variables);
        assert_eq!(index.find(&Atom::new(0, 1)), Some(1));
        assert_eq!(index.find(&Atom::new(0, 2)), None);
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn test_unknown_atom_is_fatal() {
        let variables = vec![variable("x", 0, vec![], vec![0, 1])];
        let index = TupleIndex::new(1, &variables);
        index.to_index(&Atom::new(0, 3));
    }
}
