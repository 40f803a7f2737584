mod best_first;
mod bfs;
mod bfws;
mod iw;
mod node;

pub use best_first::{BestFirstSearch, MAX_G_WEIGHT};
pub use bfs::BreadthFirstSearch;
pub use bfws::WidthBestFirstSearch;
pub use iw::IteratedWidthSearch;

use crate::common::{ActionIdx, State};
use crate::config::Config;
use crate::heuristic::build_heuristic;
use crate::novelty::NoveltyEvaluator;
use crate::problem::ProblemContext;
use crate::stat::Stats;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// The state space a search runs over.
pub trait SearchModel {
    fn initial_state(&self) -> State;

    fn is_goal(&self, state: &State) -> bool;

    /// Recomputed lazily for every expanded state.
    fn applicable_actions<'s>(&'s self, state: &'s State) -> Box<dyn Iterator<Item = ActionIdx> + 's>;

    /// `None` if the action cannot be applied in `state`.
    fn apply(&self, state: &State, action: ActionIdx) -> Option<State>;
}

impl SearchModel for ProblemContext {
    fn initial_state(&self) -> State {
        ProblemContext::initial_state(self).clone()
    }

    fn is_goal(&self, state: &State) -> bool {
        ProblemContext::is_goal(self, state)
    }

    fn applicable_actions<'s>(&'s self, state: &'s State) -> Box<dyn Iterator<Item = ActionIdx> + 's> {
        Box::new(
            self.actions()
                .iter()
                .filter(move |action| action.is_applicable(state))
                .map(|action| action.id),
        )
    }

    fn apply(&self, state: &State, action: ActionIdx) -> Option<State> {
        self.successor(state, action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    Solved { plan: Vec<ActionIdx> },
    /// The search space was exhausted without pruning, or the initial state
    /// is a relaxed dead end.
    Unreachable,
    BudgetExhausted,
    /// Every width was tried and some states were pruned by novelty.
    WidthExhausted,
}

impl SearchOutcome {
    pub fn plan(&self) -> Option<&[ActionIdx]> {
        match self {
            SearchOutcome::Solved { plan } => Some(plan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub outcome: SearchOutcome,
    pub stats: Stats,
}

pub trait Solver {
    fn solve(&mut self) -> SearchResult;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Budget {
    pub time_limit: Option<Duration>,
    pub max_expansions: Option<usize>,
}

impl Budget {
    pub fn unlimited() -> Self {
        Self::default()
    }
}

/// A started [`Budget`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct BudgetClock {
    budget: Budget,
    start: Instant,
}

impl BudgetClock {
    pub(crate) fn start(budget: Budget) -> Self {
        BudgetClock {
            budget,
            start: Instant::now(),
        }
    }

    pub(crate) fn exhausted(&self, stats: &Stats) -> bool {
        self.budget
            .max_expansions
            .is_some_and(|limit| stats.expanded >= limit)
            || self
                .budget
                .time_limit
                .is_some_and(|limit| self.start.elapsed() >= limit)
    }

    pub(crate) fn finish(&self, stats: &mut Stats) {
        stats.time_us = self.start.elapsed().as_micros() as usize;
        stats.print();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SolverKind {
    Bfs,
    BestFirst,
    Iw,
    #[default]
    Bfws,
}

/// The solver described by `config`, running on `problem`.
pub fn build_solver<'a>(config: &Config, problem: &'a ProblemContext) -> anyhow::Result<Box<dyn Solver + 'a>> {
    let budget = config.budget();
    let solver: Box<dyn Solver + 'a> = match config.solver {
        SolverKind::Bfs => Box::new(BreadthFirstSearch::new(problem, budget)),
        SolverKind::BestFirst => Box::new(
            BestFirstSearch::new(problem, build_heuristic(config.heuristic, problem), budget)
                .with_g_weight(config.g_weight)
                .with_reopen(config.reopen),
        ),
        SolverKind::Iw => Box::new(IteratedWidthSearch::new(
            problem,
            config.features,
            config.max_width,
            budget,
        )?),
        SolverKind::Bfws => {
            let novelty = NoveltyEvaluator::new(problem, config.features, config.max_width)?;
            Box::new(
                WidthBestFirstSearch::new(problem, build_heuristic(config.heuristic, problem), novelty, budget)
                    .with_partitioning(config.partition_novelty),
            )
        }
    };
    Ok(solver)
}
