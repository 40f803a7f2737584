use super::node::{NodeArena, OpenNode};
use super::{Budget, BudgetClock, SearchModel, SearchOutcome, SearchResult, Solver};
use crate::common::State;
use crate::heuristic::{Heuristic, HeuristicValue};
use crate::stat::Stats;

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument, trace, warn};

/// Largest path-cost weight a configuration may ask for.
pub const MAX_G_WEIGHT: usize = 1000;

#[derive(Debug, Clone, Copy)]
struct Seen {
    h: HeuristicValue,
    best_g: usize,
    closed: bool,
}

/// Best-first search on `g_weight * g + h`, ties broken by `h` and then by
/// generation order. Priorities saturate at `usize::MAX` instead of
/// overflowing.
///
/// The heuristic is evaluated once per distinct state. States it reports as
/// unreachable are dead ends and never enter the open list.
pub struct BestFirstSearch<'a, M: SearchModel + ?Sized, H> {
    model: &'a M,
    heuristic: H,
    g_weight: usize,
    reopen: bool,
    budget: Budget,
    stats: Stats,
}

impl<'a, M: SearchModel + ?Sized, H: Heuristic> BestFirstSearch<'a, M, H> {
    pub fn new(model: &'a M, heuristic: H, budget: Budget) -> Self {
        BestFirstSearch {
            model,
            heuristic,
            g_weight: 1,
            reopen: false,
            budget,
            stats: Stats::default(),
        }
    }

    /// 0 gives greedy best-first search, 1 gives A*.
    pub fn with_g_weight(mut self, g_weight: usize) -> Self {
        self.g_weight = g_weight;
        self
    }

    /// Whether closed states reached again on a cheaper path are expanded again.
    pub fn with_reopen(mut self, reopen: bool) -> Self {
        self.reopen = reopen;
        self
    }

    fn priority(&self, g_cost: usize, h: usize) -> (usize, usize) {
        (self.g_weight.saturating_mul(g_cost).saturating_add(h), h)
    }

    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        self.stats.evaluated += 1;
        self.heuristic.evaluate(state)
    }

    fn search(&mut self, clock: &BudgetClock) -> SearchOutcome {
        let mut arena = NodeArena::default();
        let mut open = BTreeSet::new();
        let mut seen: HashMap<State, Seen> = HashMap::new();
        let mut generation = 0;

        let root = self.model.initial_state();
        let Some(h) = self.evaluate(&root).cost() else {
            warn!("goal unreachable from initial state");
            self.stats.dead_ends += 1;
            return SearchOutcome::Unreachable;
        };
        seen.insert(
            root.clone(),
            Seen {
                h: HeuristicValue::Cost(h),
                best_g: 0,
                closed: false,
            },
        );
        open.insert(OpenNode {
            key: self.priority(0, h),
            generation,
            node: arena.root(root),
        });

        while let Some(OpenNode { node: current, .. }) = open.pop_first() {
            if clock.exhausted(&self.stats) {
                debug!("budget exhausted after {} expansions", self.stats.expanded);
                return SearchOutcome::BudgetExhausted;
            }
            let node = arena.get(current);
            let g_cost = node.g_cost;
            let state = node.state.clone();

            let Some(entry) = seen.get_mut(&state) else {
                continue;
            };
            // Stale entry superseded by a cheaper path, or already expanded.
            if g_cost > entry.best_g || entry.closed {
                continue;
            }
            entry.closed = true;

            if self.model.is_goal(&state) {
                return SearchOutcome::Solved {
                    plan: arena.extract_plan(current),
                };
            }
            self.stats.expanded += 1;
            trace!("expand node: {state} g={g_cost}");

            let successors: Vec<_> = self
                .model
                .applicable_actions(&state)
                .filter_map(|action| Some((action, self.model.apply(&state, action)?)))
                .collect();
            let tentative_g_cost = g_cost + 1;
            for (action, successor) in successors {
                self.stats.generated += 1;
                let h = match seen.get_mut(&successor) {
                    Some(entry) => {
                        let Some(h) = entry.h.cost() else {
                            continue;
                        };
                        if tentative_g_cost >= entry.best_g {
                            continue;
                        }
                        if entry.closed {
                            if !self.reopen {
                                continue;
                            }
                            self.stats.reopened += 1;
                            entry.closed = false;
                        }
                        entry.best_g = tentative_g_cost;
                        h
                    }
                    None => {
                        let value = self.evaluate(&successor);
                        seen.insert(
                            successor.clone(),
                            Seen {
                                h: value,
                                best_g: tentative_g_cost,
                                closed: false,
                            },
                        );
                        match value.cost() {
                            Some(h) => h,
                            None => {
                                trace!("dead end: {successor}");
                                self.stats.dead_ends += 1;
                                continue;
                            }
                        }
                    }
                };

                generation += 1;
                open.insert(OpenNode {
                    key: self.priority(tentative_g_cost, h),
                    generation,
                    node: arena.child(current, action, successor),
                });
            }
        }

        SearchOutcome::Unreachable
    }
}

impl<M: SearchModel + ?Sized, H: Heuristic> Solver for BestFirstSearch<'_, M, H> {
    #[instrument(skip_all, name = "best_first", fields(g_weight = self.g_weight, reopen = self.reopen), level = "debug")]
    fn solve(&mut self) -> SearchResult {
        self.stats = Stats::default();
        let clock = BudgetClock::start(self.budget);
        let outcome = self.search(&clock);
        clock.finish(&mut self.stats);
        SearchResult {
            outcome,
            stats: self.stats.clone(),
        }
    }
}
