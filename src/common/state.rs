use super::{Atom, ObjectIdx, VariableIdx};

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Total valuation of the state variables with a precomputed hash.
#[derive(Debug, Clone)]
pub struct State {
    values: Vec<ObjectIdx>,
    hash: u64,
}

impl State {
    pub fn new(values: Vec<ObjectIdx>) -> Self {
        let hash = Self::compute_hash(&values);
        State { values, hash }
    }

    fn compute_hash(values: &[ObjectIdx]) -> u64 {
        let mut hasher = DefaultHasher::new();
        values.hash(&mut hasher);
        hasher.finish()
    }

    /// Copy of this state with the changeset applied, later atoms overriding earlier ones.
    pub fn apply(&self, changeset: &[Atom]) -> State {
        let mut values = self.values.clone();
        for atom in changeset {
            values[atom.variable] = atom.value;
        }
        State::new(values)
    }

    pub fn value(&self, variable: VariableIdx) -> ObjectIdx {
        self.values[variable]
    }

    pub fn values(&self) -> &[ObjectIdx] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn satisfies(&self, atom: &Atom) -> bool {
        self.values
            .get(atom.variable)
            .is_some_and(|&value| value == atom.value)
    }

    pub fn atoms(&self) -> impl Iterator<Item = Atom> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(variable, &value)| Atom::new(variable, value))
    }

    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.values == other.values
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (variable, value) in self.values.iter().enumerate() {
            if variable > 0 {
                write!(f, ", ")?;
            }
            write!(f, "x{variable}={value}")?;
        }
        write!(f, "]")
    }
}
