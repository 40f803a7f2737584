mod action;
mod builder;
mod formula;

pub use action::GroundAction;
pub use builder::ProblemBuilder;
pub use formula::{Condition, Effect, EffectValue, Formula};

use crate::common::{ActionIdx, ObjectIdx, State, SymbolIdx, TupleIndex, VariableIdx};

use anyhow::{anyhow, ensure};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Predicate,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

/// One ground fluent with its static domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateVariable {
    pub name: String,
    pub symbol: SymbolIdx,
    pub args: Vec<ObjectIdx>,
    pub domain: Vec<ObjectIdx>,
}

impl StateVariable {
    pub fn admits(&self, value: ObjectIdx) -> bool {
        self.domain.contains(&value)
    }
}

/// Everything a planner run needs to know about the grounded problem.
///
/// Built once, then shared by reference with every heuristic, novelty
/// evaluator and solver of the run.
#[derive(Debug, Clone)]
pub struct ProblemContext {
    symbols: Vec<Symbol>,
    objects: Vec<String>,
    variables: Vec<StateVariable>,
    variable_names: HashMap<String, VariableIdx>,
    index: TupleIndex,
    actions: Vec<GroundAction>,
    goal: Formula,
    initial_state: State,
}

impl ProblemContext {
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn objects(&self) -> &[String] {
        &self.objects
    }

    pub fn variables(&self) -> &[StateVariable] {
        &self.variables
    }

    pub fn variable(&self, variable: VariableIdx) -> &StateVariable {
        &self.variables[variable]
    }

    pub fn variable_by_name(&self, name: &str) -> Option<VariableIdx> {
        self.variable_names.get(name).copied()
    }

    pub fn index(&self) -> &TupleIndex {
        &self.index
    }

    pub fn actions(&self) -> &[GroundAction] {
        &self.actions
    }

    pub fn action(&self, action: ActionIdx) -> &GroundAction {
        &self.actions[action]
    }

    pub fn goal(&self) -> &Formula {
        &self.goal
    }

    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    pub fn is_goal(&self, state: &State) -> bool {
        self.goal.holds(state)
    }

    /// Successor of `state` under `action`, or `None` if the action is not
    /// applicable or would push a variable out of its domain.
    pub fn successor(&self, state: &State, action: ActionIdx) -> Option<State> {
        let action = &self.actions[action];
        if !action.is_applicable(state) {
            return None;
        }
        let changeset = action.changeset(state)?;
        if changeset
            .iter()
            .any(|atom| !self.variables[atom.variable].admits(atom.value))
        {
            return None;
        }
        Some(state.apply(&changeset))
    }

    /// Rejects states that do not fit the declared variables and domains.
    pub fn validate_state(&self, state: &State) -> anyhow::Result<()> {
        ensure!(
            state.len() == self.variables.len(),
            "state has {} values but the problem declares {} variables",
            state.len(),
            self.variables.len()
        );
        for (variable, &value) in state.values().iter().enumerate() {
            let var = &self.variables[variable];
            if !var.admits(value) {
                return Err(anyhow!(
                    "value {value} is outside the domain {:?} of {}",
                    var.domain,
                    var.name
                ));
            }
        }
        Ok(())
    }

    pub fn action_names(&self, plan: &[ActionIdx]) -> Vec<String> {
        plan.iter()
            .map(|&action| self.actions[action].name.clone())
            .collect()
    }
}
