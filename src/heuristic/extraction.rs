use super::{RelaxedPlanningGraph, RpgStatus};
use crate::common::{ActionIdx, TupleIdx};

use indexmap::IndexSet;
use std::collections::{HashSet, VecDeque};

/// Set of actions backchained from the goal support of a relaxed graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaxedPlan {
    actions: IndexSet<ActionIdx>,
    goal_layer: usize,
}

impl RelaxedPlan {
    /// `None` if the graph never reached the goal.
    pub fn extract(graph: &RelaxedPlanningGraph) -> Option<Self> {
        if graph.status() != RpgStatus::Goal {
            return None;
        }
        let goal = graph.goal_support()?;

        let mut pending: VecDeque<TupleIdx> = goal.iter().copied().collect();
        let mut processed = HashSet::new();
        let mut actions = IndexSet::new();

        while let Some(atom) = pending.pop_front() {
            if !processed.insert(atom) {
                continue;
            }
            let Some(support) = graph.support(atom) else {
                panic!("atom {atom} reached the goal support without a recorded achiever");
            };
            // Seed atoms need no action.
            let Some(action) = support.action else {
                continue;
            };
            actions.insert(action);
            pending.extend(support.causes.iter().copied());
        }

        Some(RelaxedPlan {
            actions,
            goal_layer: graph.layer(),
        })
    }

    /// Distinct actions, in the order backchaining found them.
    pub fn actions(&self) -> &IndexSet<ActionIdx> {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn h_ff(&self) -> usize {
        self.actions.len()
    }

    pub fn h_max(&self) -> usize {
        self.goal_layer
    }
}
