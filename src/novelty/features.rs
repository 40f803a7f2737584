use crate::common::{ObjectIdx, State};
use crate::problem::ProblemContext;

use serde::{Deserialize, Serialize};

/// Extra features appended after the state variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureConfig {
    /// One 0/1 feature per goal conjunct.
    pub goal_conditions: bool,
    /// One 0/1 feature per action, set when the action is applicable.
    pub applicable_actions: bool,
}

/// Reduces a state to the fixed, ordered feature list novelty is computed on.
#[derive(Debug, Clone)]
pub struct FeatureExtractor<'a> {
    problem: &'a ProblemContext,
    config: FeatureConfig,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(problem: &'a ProblemContext, config: FeatureConfig) -> Self {
        FeatureExtractor { problem, config }
    }

    pub fn len(&self) -> usize {
        let mut len = self.problem.variables().len();
        if self.config.goal_conditions {
            len += self.problem.goal().conditions().len();
        }
        if self.config.applicable_actions {
            len += self.problem.actions().len();
        }
        len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn extract(&self, state: &State) -> Vec<ObjectIdx> {
        let mut features = Vec::with_capacity(self.len());
        features.extend_from_slice(state.values());
        if self.config.goal_conditions {
            features.extend(
                self.problem
                    .goal()
                    .conditions()
                    .iter()
                    .map(|condition| ObjectIdx::from(condition.holds(state))),
            );
        }
        if self.config.applicable_actions {
            features.extend(
                self.problem
                    .actions()
                    .iter()
                    .map(|action| ObjectIdx::from(action.is_applicable(state))),
            );
        }
        features
    }
}
