use super::{Heuristic, HeuristicValue};
use crate::common::State;
use crate::problem::ProblemContext;

/// Number of goal conjuncts the state violates.
#[derive(Debug, Clone, Copy)]
pub struct GoalCounting<'a> {
    problem: &'a ProblemContext,
}

impl<'a> GoalCounting<'a> {
    pub fn new(problem: &'a ProblemContext) -> Self {
        GoalCounting { problem }
    }
}

impl Heuristic for GoalCounting<'_> {
    fn evaluate(&self, state: &State) -> HeuristicValue {
        self.problem.goal().unsatisfied(state).into()
    }
}

/// Zero on goal states, one elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct Blind<'a> {
    problem: &'a ProblemContext,
}

impl<'a> Blind<'a> {
    pub fn new(problem: &'a ProblemContext) -> Self {
        Blind { problem }
    }
}

impl Heuristic for Blind<'_> {
    fn evaluate(&self, state: &State) -> HeuristicValue {
        HeuristicValue::Cost(usize::from(!self.problem.is_goal(state)))
    }
}
