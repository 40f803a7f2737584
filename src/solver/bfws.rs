use super::node::{NodeArena, OpenNode};
use super::{Budget, BudgetClock, SearchModel, SearchOutcome, SearchResult, Solver};
use crate::common::State;
use crate::heuristic::{Heuristic, HeuristicValue};
use crate::novelty::NoveltyEvaluator;
use crate::problem::ProblemContext;
use crate::stat::Stats;

use std::collections::{BTreeSet, HashSet};
use tracing::{debug, instrument, trace, warn};

/// `(novelty, h, unsatisfied goals)`, smaller is better.
type WidthKey = (usize, HeuristicValue, usize);

/// Best-first width search: states are ordered by novelty first, then by the
/// heuristic, then by the number of unsatisfied goal conditions.
///
/// Every state is expanded at most once. With partitioning, novelty is
/// measured only against states with the same number of unsatisfied goals.
pub struct WidthBestFirstSearch<'a, H> {
    problem: &'a ProblemContext,
    heuristic: H,
    novelty: NoveltyEvaluator<'a>,
    partition: bool,
    budget: Budget,
    stats: Stats,
}

impl<'a, H: Heuristic> WidthBestFirstSearch<'a, H> {
    pub fn new(problem: &'a ProblemContext, heuristic: H, novelty: NoveltyEvaluator<'a>, budget: Budget) -> Self {
        WidthBestFirstSearch {
            problem,
            heuristic,
            novelty,
            partition: false,
            budget,
            stats: Stats::default(),
        }
    }

    pub fn with_partitioning(mut self, partition: bool) -> Self {
        self.partition = partition;
        self
    }

    /// `None` for dead ends.
    fn key(&mut self, state: &State) -> Option<WidthKey> {
        self.stats.evaluated += 1;
        let h = self.heuristic.evaluate(state);
        if h.is_unreachable() {
            return None;
        }
        let unsatisfied = self.problem.goal().unsatisfied(state);
        let partition = if self.partition { unsatisfied } else { 0 };
        let novelty = self.novelty.novelty_in(partition, state);
        Some((novelty, h, unsatisfied))
    }

    fn search(&mut self, clock: &BudgetClock) -> SearchOutcome {
        let mut arena = NodeArena::default();
        let mut open = BTreeSet::new();
        let mut closed = HashSet::new();
        let mut generation = 0;

        let root = SearchModel::initial_state(self.problem);
        let Some(key) = self.key(&root) else {
            warn!("goal unreachable from initial state");
            self.stats.dead_ends += 1;
            return SearchOutcome::Unreachable;
        };
        closed.insert(root.clone());
        open.insert(OpenNode {
            key,
            generation,
            node: arena.root(root),
        });

        while let Some(OpenNode { key, node: current, .. }) = open.pop_first() {
            if clock.exhausted(&self.stats) {
                debug!("budget exhausted after {} expansions", self.stats.expanded);
                return SearchOutcome::BudgetExhausted;
            }
            let state = arena.get(current).state.clone();
            if self.problem.is_goal(&state) {
                return SearchOutcome::Solved {
                    plan: arena.extract_plan(current),
                };
            }
            self.stats.expanded += 1;
            trace!("expand node: {state} key={key:?}");

            let successors: Vec<_> = self
                .problem
                .applicable_actions(&state)
                .filter_map(|action| Some((action, self.problem.successor(&state, action)?)))
                .collect();
            for (action, successor) in successors {
                self.stats.generated += 1;
                if !closed.insert(successor.clone()) {
                    continue;
                }
                let Some(key) = self.key(&successor) else {
                    trace!("dead end: {successor}");
                    self.stats.dead_ends += 1;
                    continue;
                };
                generation += 1;
                open.insert(OpenNode {
                    key,
                    generation,
                    node: arena.child(current, action, successor),
                });
            }
        }

        SearchOutcome::Unreachable
    }
}

impl<H: Heuristic> Solver for WidthBestFirstSearch<'_, H> {
    #[instrument(skip_all, name = "bfws", fields(width = self.novelty.max_width(), partition = self.partition), level = "debug")]
    fn solve(&mut self) -> SearchResult {
        self.stats = Stats::default();
        self.novelty.reset();
        let clock = BudgetClock::start(self.budget);
        let outcome = self.search(&clock);
        clock.finish(&mut self.stats);
        SearchResult {
            outcome,
            stats: self.stats.clone(),
        }
    }
}
