use super::RelaxedState;
use crate::common::{Atom, ObjectIdx};
use crate::problem::{Condition, EffectValue, Formula, GroundAction, ProblemContext};

/// An atom an action can newly produce, with the atoms that justify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub atom: Atom,
    pub causes: Vec<Atom>,
}

/// Relaxed reasoning over a single action or the goal, against fixed domains.
///
/// This is the seam where another constraint technology can replace
/// [`DirectSupport`] without touching the graph construction.
pub trait ActionSupport {
    /// `None` if the precondition is not relaxed-satisfiable. Otherwise the
    /// atoms not yet in `relaxed` that the action makes achievable.
    fn compute_support(
        &self,
        problem: &ProblemContext,
        action: &GroundAction,
        relaxed: &RelaxedState,
    ) -> Option<Vec<Achievement>>;

    /// `None` if the goal is not relaxed-satisfiable, otherwise a supporting atom set.
    fn goal_support(
        &self,
        problem: &ProblemContext,
        goal: &Formula,
        relaxed: &RelaxedState,
    ) -> Option<Vec<Atom>>;
}

/// Checks every condition by direct lookup in the relaxed domains and picks
/// the earliest-reached witness for each.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectSupport;

impl DirectSupport {
    fn witness(problem: &ProblemContext, condition: &Condition, relaxed: &RelaxedState) -> Option<Atom> {
        let index = problem.index();
        match condition {
            Condition::Equals(atom) => relaxed.contains(index, atom).then_some(*atom),
            Condition::NotEquals(atom) => relaxed
                .domain(atom.variable)
                .iter()
                .find(|&&value| value != atom.value)
                .map(|&value| Atom::new(atom.variable, value)),
            Condition::AnyOf(atoms) => atoms
                .iter()
                .copied()
                .filter(|atom| relaxed.contains(index, atom))
                .min_by_key(|atom| Self::position(relaxed, atom)),
        }
    }

    fn position(relaxed: &RelaxedState, atom: &Atom) -> usize {
        relaxed
            .domain(atom.variable)
            .get_index_of(&atom.value)
            .unwrap_or(usize::MAX)
    }

    fn formula_support(
        problem: &ProblemContext,
        formula: &Formula,
        relaxed: &RelaxedState,
        support: &mut Vec<Atom>,
    ) -> bool {
        for condition in formula.conditions() {
            match Self::witness(problem, condition, relaxed) {
                Some(atom) => {
                    if !support.contains(&atom) {
                        support.push(atom);
                    }
                }
                None => return false,
            }
        }
        true
    }
}

impl ActionSupport for DirectSupport {
    fn compute_support(
        &self,
        problem: &ProblemContext,
        action: &GroundAction,
        relaxed: &RelaxedState,
    ) -> Option<Vec<Achievement>> {
        let index = problem.index();
        let mut precondition = Vec::new();
        if !Self::formula_support(problem, &action.precondition, relaxed, &mut precondition) {
            return None;
        }

        let mut achievements = Vec::new();
        for effect in &action.effects {
            let mut causes = precondition.clone();
            if !Self::formula_support(problem, &effect.condition, relaxed, &mut causes) {
                continue;
            }

            let mut propose = |value: ObjectIdx, extra: Option<Atom>| {
                let atom = Atom::new(effect.variable, value);
                if index.find(&atom).is_none() || relaxed.contains(index, &atom) {
                    return;
                }
                if achievements.iter().any(|a: &Achievement| a.atom == atom) {
                    return;
                }
                let mut causes = causes.clone();
                if let Some(extra) = extra {
                    if !causes.contains(&extra) {
                        causes.push(extra);
                    }
                }
                achievements.push(Achievement { atom, causes });
            };

            match effect.value {
                EffectValue::Constant(value) => propose(value, None),
                EffectValue::Variable(source) => {
                    for &value in relaxed.domain(source) {
                        propose(value, Some(Atom::new(source, value)));
                    }
                }
                EffectValue::Offset(delta) => {
                    for &value in relaxed.domain(effect.variable) {
                        if let Some(result) = value.checked_add(delta) {
                            propose(result, Some(Atom::new(effect.variable, value)));
                        }
                    }
                }
            }
        }
        Some(achievements)
    }

    fn goal_support(
        &self,
        problem: &ProblemContext,
        goal: &Formula,
        relaxed: &RelaxedState,
    ) -> Option<Vec<Atom>> {
        let mut support = Vec::new();
        Self::formula_support(problem, goal, relaxed, &mut support).then_some(support)
    }
}
