use super::{ObjectIdx, VariableIdx};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `variable = value` fact. Ordered by variable, then value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Atom {
    pub variable: VariableIdx,
    pub value: ObjectIdx,
}

impl Atom {
    pub fn new(variable: VariableIdx, value: ObjectIdx) -> Self {
        Atom { variable, value }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}={}", self.variable, self.value)
    }
}

/// Argument list of a ground symbol instance with the value appended.
pub type Tuple = Vec<ObjectIdx>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_order_by_variable_then_value() {
        let mut atoms = vec![Atom::new(1, 0), Atom::new(0, 5), Atom::new(0, 2)];
        atoms.sort();
        assert_eq!(atoms, vec![Atom::new(0, 2), Atom::new(0, 5), Atom::new(1, 0)]);
    }
}
