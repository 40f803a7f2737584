use super::node::NodeArena;
use super::{Budget, BudgetClock, SearchModel, SearchOutcome, SearchResult, Solver};
use crate::novelty::NoveltyEvaluator;
use crate::stat::Stats;

use std::collections::{HashSet, VecDeque};
use tracing::{debug, instrument, trace};

/// Breadth-first search with duplicate detection and, when `novelty` is
/// given, pruning of every state whose novelty exceeds the active bound.
///
/// Pruned states are never goal-tested. Running out of states after pruning
/// reports [`SearchOutcome::WidthExhausted`] rather than `Unreachable`.
pub(crate) fn breadth_first<M: SearchModel + ?Sized>(
    model: &M,
    mut novelty: Option<&mut NoveltyEvaluator>,
    clock: &BudgetClock,
    stats: &mut Stats,
) -> SearchOutcome {
    let mut arena = NodeArena::default();
    let mut open = VecDeque::new();
    let mut closed = HashSet::new();
    let pruned_before = stats.pruned;

    let root = model.initial_state();
    if let Some(novelty) = novelty.as_deref_mut() {
        stats.evaluated += 1;
        novelty.novelty(&root);
    }
    if model.is_goal(&root) {
        return SearchOutcome::Solved { plan: Vec::new() };
    }
    closed.insert(root.clone());
    open.push_back(arena.root(root));

    while let Some(current) = open.pop_front() {
        if clock.exhausted(stats) {
            debug!("budget exhausted after {} expansions", stats.expanded);
            return SearchOutcome::BudgetExhausted;
        }
        stats.expanded += 1;
        let state = arena.get(current).state.clone();
        trace!("expand node: {state}");

        for action in model.applicable_actions(&state) {
            let Some(successor) = model.apply(&state, action) else {
                continue;
            };
            stats.generated += 1;
            if closed.contains(&successor) {
                continue;
            }

            if let Some(novelty) = novelty.as_deref_mut() {
                stats.evaluated += 1;
                if novelty.novelty(&successor) > novelty.bound() {
                    stats.pruned += 1;
                    continue;
                }
            }

            closed.insert(successor.clone());
            let child = arena.child(current, action, successor);
            if model.is_goal(&arena.get(child).state) {
                return SearchOutcome::Solved {
                    plan: arena.extract_plan(child),
                };
            }
            open.push_back(child);
        }
    }

    if stats.pruned > pruned_before {
        SearchOutcome::WidthExhausted
    } else {
        SearchOutcome::Unreachable
    }
}

/// Blind breadth-first search. Plans are shortest in number of actions.
pub struct BreadthFirstSearch<'a, M: SearchModel + ?Sized> {
    model: &'a M,
    budget: Budget,
    stats: Stats,
}

impl<'a, M: SearchModel + ?Sized> BreadthFirstSearch<'a, M> {
    pub fn new(model: &'a M, budget: Budget) -> Self {
        BreadthFirstSearch {
            model,
            budget,
            stats: Stats::default(),
        }
    }
}

impl<M: SearchModel + ?Sized> Solver for BreadthFirstSearch<'_, M> {
    #[instrument(skip_all, name = "bfs", level = "debug")]
    fn solve(&mut self) -> SearchResult {
        self.stats = Stats::default();
        let clock = BudgetClock::start(self.budget);
        let outcome = breadth_first(self.model, None, &clock, &mut self.stats);
        clock.finish(&mut self.stats);
        SearchResult {
            outcome,
            stats: self.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::State;
    use crate::test_utils::*;

    #[test]
    fn test_single_switch() {
        init_tracing();
        let problem = single_switch();
        assert!(problem.is_goal(&State::new(vec![1])));

        let result = BreadthFirstSearch::new(&problem, Budget::unlimited()).solve();
        assert_eq!(result.outcome, SearchOutcome::Solved { plan: vec![0] });
        assert_eq!(result.stats.expanded, 1);
    }

    #[test]
    fn test_shortest_plan_on_chain() {
        init_tracing();
        let problem = chain(4);
        let result = BreadthFirstSearch::new(&problem, Budget::unlimited()).solve();
        assert_eq!(result.outcome, SearchOutcome::Solved { plan: vec![0, 1, 2, 3] });
    }

    #[test]
    fn test_exhausted_space_is_unreachable() {
        init_tracing();
        let problem = unreachable_goal();
        let result = BreadthFirstSearch::new(&problem, Budget::unlimited()).solve();
        assert_eq!(result.outcome, SearchOutcome::Unreachable);
        assert_eq!(result.stats.pruned, 0);
    }

    #[test]
    fn test_counter_offsets_stay_in_domain() {
        init_tracing();
        let problem = counter(3);
        let result = BreadthFirstSearch::new(&problem, Budget::unlimited()).solve();
        assert_eq!(result.outcome, SearchOutcome::Solved { plan: vec![0, 0, 0] });
    }
}
