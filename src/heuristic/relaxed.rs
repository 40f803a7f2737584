use crate::common::{Atom, ObjectIdx, State, SymbolIdx, TupleIdx, TupleIndex, VariableIdx};

use indexmap::IndexSet;

/// Per-variable sets of admissible values under the delete relaxation.
///
/// Domains only grow and keep insertion order, so a value's position ranks
/// it by the layer that reached it. `delta` holds the values committed by the latest layer,
/// and `reached` is the union of all domains as a bitset over tuple ids; a
/// symbol's slice of it is that symbol's extension.
#[derive(Debug, Clone)]
pub struct RelaxedState {
    domains: Vec<IndexSet<ObjectIdx>>,
    delta: Vec<Vec<ObjectIdx>>,
    reached: Vec<bool>,
    num_atoms: usize,
}

impl RelaxedState {
    pub fn from_state(index: &TupleIndex, state: &State) -> Self {
        let mut relaxed = RelaxedState {
            domains: vec![IndexSet::new(); state.len()],
            delta: vec![Vec::new(); state.len()],
            reached: vec![false; index.len()],
            num_atoms: 0,
        };
        for atom in state.atoms() {
            relaxed.insert(index, atom);
        }
        relaxed
    }

    pub fn domain(&self, variable: VariableIdx) -> &IndexSet<ObjectIdx> {
        &self.domains[variable]
    }

    pub fn delta(&self, variable: VariableIdx) -> &[ObjectIdx] {
        &self.delta[variable]
    }

    pub fn changed(&self, variable: VariableIdx) -> bool {
        !self.delta[variable].is_empty()
    }

    pub fn contains(&self, index: &TupleIndex, atom: &Atom) -> bool {
        index.find(atom).is_some_and(|idx| self.reached[idx])
    }

    pub fn is_reached(&self, idx: TupleIdx) -> bool {
        self.reached[idx]
    }

    pub fn extension(&self, index: &TupleIndex, symbol: SymbolIdx) -> &[bool] {
        &self.reached[index.symbol_range(symbol)]
    }

    /// Total number of atoms over all domains.
    pub fn num_atoms(&self) -> usize {
        self.num_atoms
    }

    pub fn num_variables(&self) -> usize {
        self.domains.len()
    }

    pub(crate) fn clear_delta(&mut self) {
        for delta in &mut self.delta {
            delta.clear();
        }
    }

    /// Returns `false` if the atom was already present.
    pub(crate) fn insert(&mut self, index: &TupleIndex, atom: Atom) -> bool {
        let idx = index.to_index(&atom);
        if self.reached[idx] {
            return false;
        }
        self.reached[idx] = true;
        self.domains[atom.variable].insert(atom.value);
        self.delta[atom.variable].push(atom.value);
        self.num_atoms += 1;
        true
    }
}
