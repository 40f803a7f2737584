use crate::common::{Atom, ObjectIdx, State, VariableIdx};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals(Atom),
    NotEquals(Atom),
    /// Disjunction of equalities.
    AnyOf(Vec<Atom>),
}

impl Condition {
    pub fn holds(&self, state: &State) -> bool {
        match self {
            Condition::Equals(atom) => state.satisfies(atom),
            Condition::NotEquals(atom) => !state.satisfies(atom),
            Condition::AnyOf(atoms) => atoms.iter().any(|atom| state.satisfies(atom)),
        }
    }

    pub(crate) fn collect_variables(&self, out: &mut Vec<VariableIdx>) {
        match self {
            Condition::Equals(atom) | Condition::NotEquals(atom) => out.push(atom.variable),
            Condition::AnyOf(atoms) => out.extend(atoms.iter().map(|atom| atom.variable)),
        }
    }
}

/// Conjunction of conditions. The empty conjunction is a tautology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formula {
    conditions: Vec<Condition>,
}

impl Formula {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Formula { conditions }
    }

    pub fn tautology() -> Self {
        Formula::default()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_tautology(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn holds(&self, state: &State) -> bool {
        self.conditions.iter().all(|condition| condition.holds(state))
    }

    /// Number of conjuncts the state violates.
    pub fn unsatisfied(&self, state: &State) -> usize {
        self.conditions
            .iter()
            .filter(|condition| !condition.holds(state))
            .count()
    }

    pub(crate) fn collect_variables(&self, out: &mut Vec<VariableIdx>) {
        for condition in &self.conditions {
            condition.collect_variables(out);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectValue {
    Constant(ObjectIdx),
    /// Copy the current value of another variable.
    Variable(VariableIdx),
    /// Add a delta to the current value of the affected variable.
    Offset(ObjectIdx),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    pub condition: Formula,
    pub variable: VariableIdx,
    pub value: EffectValue,
}

impl Effect {
    pub fn assign(variable: VariableIdx, value: ObjectIdx) -> Self {
        Effect {
            condition: Formula::tautology(),
            variable,
            value: EffectValue::Constant(value),
        }
    }

    pub fn copy(variable: VariableIdx, source: VariableIdx) -> Self {
        Effect {
            condition: Formula::tautology(),
            variable,
            value: EffectValue::Variable(source),
        }
    }

    pub fn offset(variable: VariableIdx, delta: ObjectIdx) -> Self {
        Effect {
            condition: Formula::tautology(),
            variable,
            value: EffectValue::Offset(delta),
        }
    }

    pub fn when(mut self, condition: Formula) -> Self {
        self.condition = condition;
        self
    }

    /// The atom this effect produces in `state`, or `None` if its condition
    /// does not hold (or the offset overflows).
    pub fn evaluate(&self, state: &State) -> Option<Atom> {
        if !self.condition.holds(state) {
            return None;
        }
        let value = match self.value {
            EffectValue::Constant(value) => value,
            EffectValue::Variable(source) => state.value(source),
            EffectValue::Offset(delta) => state.value(self.variable).checked_add(delta)?,
        };
        Some(Atom::new(self.variable, value))
    }

    pub(crate) fn collect_variables(&self, out: &mut Vec<VariableIdx>) {
        self.condition.collect_variables(out);
        match self.value {
            EffectValue::Constant(_) => {}
            EffectValue::Variable(source) => out.push(source),
            EffectValue::Offset(_) => out.push(self.variable),
        }
    }
}
