use super::bfs::breadth_first;
use super::{Budget, BudgetClock, SearchOutcome, SearchResult, Solver};
use crate::novelty::{FeatureConfig, NoveltyEvaluator};
use crate::problem::ProblemContext;
use crate::stat::Stats;

use tracing::{debug, info, instrument};

/// IW(1), IW(2), ... up to `max_width`: breadth-first searches that prune
/// every state not novel at the current width. Tables are reset between
/// widths; statistics accumulate.
pub struct IteratedWidthSearch<'a> {
    problem: &'a ProblemContext,
    novelty: NoveltyEvaluator<'a>,
    budget: Budget,
    stats: Stats,
}

impl<'a> IteratedWidthSearch<'a> {
    pub fn new(
        problem: &'a ProblemContext,
        features: FeatureConfig,
        max_width: usize,
        budget: Budget,
    ) -> anyhow::Result<Self> {
        Ok(IteratedWidthSearch {
            problem,
            novelty: NoveltyEvaluator::new(problem, features, max_width)?,
            budget,
            stats: Stats::default(),
        })
    }
}

impl Solver for IteratedWidthSearch<'_> {
    #[instrument(skip_all, name = "iw", fields(max_width = self.novelty.max_width()), level = "debug")]
    fn solve(&mut self) -> SearchResult {
        self.stats = Stats::default();
        let clock = BudgetClock::start(self.budget);
        let mut outcome = SearchOutcome::WidthExhausted;

        for width in 1..=self.novelty.max_width() {
            self.novelty.reset();
            self.novelty
                .set_bound(width)
                .expect("width within the configured maximum");
            debug!("running IW({width})");

            outcome = breadth_first(self.problem, Some(&mut self.novelty), &clock, &mut self.stats);
            match outcome {
                SearchOutcome::WidthExhausted => debug!("IW({width}) exhausted"),
                _ => {
                    info!("IW({width}) finished");
                    break;
                }
            }
        }

        clock.finish(&mut self.stats);
        SearchResult {
            outcome,
            stats: self.stats.clone(),
        }
    }
}
