mod extraction;
mod goal_count;
mod relaxed;
mod rpg;
mod support;

pub use extraction::RelaxedPlan;
pub use goal_count::{Blind, GoalCounting};
pub use relaxed::RelaxedState;
pub use rpg::{RelaxedPlanningGraph, RpgEngine, RpgStatus, Support};
pub use support::{Achievement, ActionSupport, DirectSupport};

use crate::common::State;
use crate::problem::ProblemContext;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Estimated distance to the goal. `Unreachable` orders after every cost and
/// never takes part in arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum HeuristicValue {
    Cost(usize),
    Unreachable,
}

impl HeuristicValue {
    pub fn cost(self) -> Option<usize> {
        match self {
            HeuristicValue::Cost(cost) => Some(cost),
            HeuristicValue::Unreachable => None,
        }
    }

    pub fn is_unreachable(self) -> bool {
        self == HeuristicValue::Unreachable
    }
}

impl From<usize> for HeuristicValue {
    fn from(cost: usize) -> Self {
        HeuristicValue::Cost(cost)
    }
}

impl fmt::Display for HeuristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeuristicValue::Cost(cost) => write!(f, "{cost}"),
            HeuristicValue::Unreachable => write!(f, "unreachable"),
        }
    }
}

pub trait Heuristic {
    fn evaluate(&self, state: &State) -> HeuristicValue;
}

impl<H: Heuristic + ?Sized> Heuristic for Box<H> {
    fn evaluate(&self, state: &State) -> HeuristicValue {
        (**self).evaluate(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicKind {
    /// Size of the relaxed plan.
    Hff,
    /// Depth of the first relaxed layer satisfying the goal.
    Hmax,
    GoalCount,
    Blind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxedCost {
    Ff,
    Max,
}

/// h_FF or h_max on top of an [`RpgEngine`].
#[derive(Debug, Clone)]
pub struct RelaxedPlanHeuristic<'a, S = DirectSupport> {
    engine: RpgEngine<'a, S>,
    cost: RelaxedCost,
}

impl<'a> RelaxedPlanHeuristic<'a, DirectSupport> {
    pub fn new(problem: &'a ProblemContext, cost: RelaxedCost) -> Self {
        RelaxedPlanHeuristic {
            engine: RpgEngine::new(problem),
            cost,
        }
    }
}

impl<'a, S: ActionSupport> RelaxedPlanHeuristic<'a, S> {
    pub fn with_engine(engine: RpgEngine<'a, S>, cost: RelaxedCost) -> Self {
        RelaxedPlanHeuristic { engine, cost }
    }
}

impl<S: ActionSupport> Heuristic for RelaxedPlanHeuristic<'_, S> {
    fn evaluate(&self, state: &State) -> HeuristicValue {
        let graph = self.engine.build(state);
        match self.cost {
            RelaxedCost::Ff => RelaxedPlan::extract(&graph)
                .map_or(HeuristicValue::Unreachable, |plan| plan.h_ff().into()),
            RelaxedCost::Max => match graph.status() {
                RpgStatus::Goal => graph.layer().into(),
                _ => HeuristicValue::Unreachable,
            },
        }
    }
}

pub fn build_heuristic<'a>(kind: HeuristicKind, problem: &'a ProblemContext) -> Box<dyn Heuristic + 'a> {
    match kind {
        HeuristicKind::Hff => Box::new(RelaxedPlanHeuristic::new(problem, RelaxedCost::Ff)),
        HeuristicKind::Hmax => Box::new(RelaxedPlanHeuristic::new(problem, RelaxedCost::Max)),
        HeuristicKind::GoalCount => Box::new(GoalCounting::new(problem)),
        HeuristicKind::Blind => Box::new(Blind::new(problem)),
    }
}
