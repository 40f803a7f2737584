use super::{Effect, Formula};
use crate::common::{ActionIdx, Atom, State, VariableIdx};

/// Fully instantiated action. Read-only once the problem is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundAction {
    pub id: ActionIdx,
    pub name: String,
    pub precondition: Formula,
    pub effects: Vec<Effect>,
    relevant: Vec<VariableIdx>,
}

impl GroundAction {
    pub fn new(id: ActionIdx, name: String, precondition: Formula, effects: Vec<Effect>) -> Self {
        let mut relevant = Vec::new();
        precondition.collect_variables(&mut relevant);
        for effect in &effects {
            effect.collect_variables(&mut relevant);
        }
        relevant.sort_unstable();
        relevant.dedup();

        GroundAction {
            id,
            name,
            precondition,
            effects,
            relevant,
        }
    }

    pub fn is_applicable(&self, state: &State) -> bool {
        self.precondition.holds(state)
    }

    /// Atoms written by the effects, all evaluated on the same pre-state.
    /// `None` if an effect value cannot be computed.
    pub fn changeset(&self, state: &State) -> Option<Vec<Atom>> {
        let mut changeset = Vec::with_capacity(self.effects.len());
        for effect in &self.effects {
            if !effect.condition.holds(state) {
                continue;
            }
            changeset.push(effect.evaluate(state)?);
        }
        Some(changeset)
    }

    /// Variables whose relaxed domains can change what this action supports.
    /// Empty for actions with no precondition and constant effects.
    pub fn relevant_variables(&self) -> &[VariableIdx] {
        &self.relevant
    }
}
