use super::{ActionSupport, DirectSupport, RelaxedState};
use crate::common::{ActionIdx, Atom, State, TupleIdx, TupleIndex};
use crate::problem::ProblemContext;

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpgStatus {
    Seeded,
    Expanding,
    /// Fixpoint reached without satisfying the goal.
    Closed,
    Goal,
}

/// First achiever of an atom. `action` is `None` for atoms of the seed state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Support {
    pub action: Option<ActionIdx>,
    pub layer: usize,
    pub causes: Vec<TupleIdx>,
}

/// Outcome of one relaxed-graph construction. Owned by a single heuristic
/// evaluation.
#[derive(Debug, Clone)]
pub struct RelaxedPlanningGraph {
    status: RpgStatus,
    layer: usize,
    relaxed: RelaxedState,
    supports: Vec<Option<Support>>,
    goal_support: Option<Vec<TupleIdx>>,
}

impl RelaxedPlanningGraph {
    fn seed(index: &TupleIndex, state: &State) -> Self {
        let relaxed = RelaxedState::from_state(index, state);
        let mut supports = vec![None; index.len()];
        for atom in state.atoms() {
            supports[index.to_index(&atom)] = Some(Support {
                action: None,
                layer: 0,
                causes: Vec::new(),
            });
        }
        RelaxedPlanningGraph {
            status: RpgStatus::Seeded,
            layer: 0,
            relaxed,
            supports,
            goal_support: None,
        }
    }

    fn commit(&mut self, index: &TupleIndex, staged: IndexMap<TupleIdx, Support>) {
        self.layer += 1;
        self.relaxed.clear_delta();
        for (idx, support) in staged {
            assert!(
                self.supports[idx].is_none(),
                "atom {} received a second first-achiever support",
                index.to_atom(idx)
            );
            debug_assert_eq!(support.layer, self.layer);
            self.relaxed.insert(index, *index.to_atom(idx));
            self.supports[idx] = Some(support);
        }
    }

    fn reach_goal(&mut self, index: &TupleIndex, support: &[Atom]) {
        self.status = RpgStatus::Goal;
        self.goal_support = Some(support.iter().map(|atom| index.to_index(atom)).collect());
    }

    pub fn status(&self) -> RpgStatus {
        self.status
    }

    /// Index of the last committed layer. Layer 0 is the seed.
    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn relaxed(&self) -> &RelaxedState {
        &self.relaxed
    }

    pub fn support(&self, idx: TupleIdx) -> Option<&Support> {
        self.supports[idx].as_ref()
    }

    pub fn supports(&self) -> &[Option<Support>] {
        &self.supports
    }

    pub fn goal_support(&self) -> Option<&[TupleIdx]> {
        self.goal_support.as_deref()
    }
}

/// Builds layered relaxed planning graphs for one problem.
///
/// Every layer is computed against the domains frozen at the end of the
/// previous one. New atoms are staged and committed together, so an atom
/// found in layer `i` only ever depends on atoms from layers `< i`. Actions
/// are visited in id order and the first one to propose an atom keeps it.
#[derive(Debug, Clone)]
pub struct RpgEngine<'a, S = DirectSupport> {
    problem: &'a ProblemContext,
    support: S,
}

impl<'a> RpgEngine<'a, DirectSupport> {
    pub fn new(problem: &'a ProblemContext) -> Self {
        Self::with_support(problem, DirectSupport)
    }
}

impl<'a, S: ActionSupport> RpgEngine<'a, S> {
    pub fn with_support(problem: &'a ProblemContext, support: S) -> Self {
        RpgEngine { problem, support }
    }

    pub fn problem(&self) -> &'a ProblemContext {
        self.problem
    }

    /// Panics if `seed` does not assign every variable of the problem.
    pub fn build(&self, seed: &State) -> RelaxedPlanningGraph {
        let problem = self.problem;
        assert_eq!(
            seed.len(),
            problem.variables().len(),
            "relaxed graph seeded with a state of the wrong arity"
        );
        let index = problem.index();
        let mut graph = RelaxedPlanningGraph::seed(index, seed);

        if let Some(support) = self.support.goal_support(problem, problem.goal(), &graph.relaxed) {
            graph.reach_goal(index, &support);
            return graph;
        }
        graph.status = RpgStatus::Expanding;

        loop {
            let next_layer = graph.layer + 1;
            let first_layer = graph.layer == 0;
            let mut staged: IndexMap<TupleIdx, Support> = IndexMap::new();

            for action in problem.actions() {
                // After the first layer only actions touching a changed variable
                // can support something new.
                if !first_layer
                    && !action
                        .relevant_variables()
                        .iter()
                        .any(|&variable| graph.relaxed.changed(variable))
                {
                    continue;
                }

                let Some(achievements) =
                    self.support.compute_support(problem, action, &graph.relaxed)
                else {
                    continue;
                };

                for achievement in achievements {
                    let idx = index.to_index(&achievement.atom);
                    if graph.supports[idx].is_some() {
                        continue;
                    }
                    if let Entry::Vacant(entry) = staged.entry(idx) {
                        entry.insert(Support {
                            action: Some(action.id),
                            layer: next_layer,
                            causes: achievement
                                .causes
                                .iter()
                                .map(|atom| index.to_index(atom))
                                .collect(),
                        });
                    }
                }
            }

            if staged.is_empty() {
                trace!("relaxed fixpoint at layer {} without the goal", graph.layer);
                graph.status = RpgStatus::Closed;
                return graph;
            }

            trace!("layer {next_layer}: {} new atoms", staged.len());
            graph.commit(index, staged);
            debug_assert!(graph.layer <= index.len());

            if let Some(support) = self.support.goal_support(problem, problem.goal(), &graph.relaxed) {
                trace!("goal reached at layer {}", graph.layer);
                graph.reach_goal(index, &support);
                return graph;
            }
        }
    }
}
