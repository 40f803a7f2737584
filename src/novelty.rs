mod features;
mod table;

pub use features::{FeatureConfig, FeatureExtractor};
pub use table::{FeatureValue, NoveltyTable, MAX_NOVELTY_WIDTH};

use crate::common::State;
use crate::problem::ProblemContext;

use std::collections::HashMap;

/// Novelty of states with respect to every state evaluated before them.
///
/// Tables can be partitioned by an arbitrary key; states only compete with
/// states of the same partition. The plain [`novelty`] query uses a single
/// partition.
///
/// [`novelty`]: NoveltyEvaluator::novelty
#[derive(Debug, Clone)]
pub struct NoveltyEvaluator<'a> {
    features: FeatureExtractor<'a>,
    template: NoveltyTable,
    partitions: HashMap<usize, NoveltyTable>,
}

impl<'a> NoveltyEvaluator<'a> {
    pub fn new(problem: &'a ProblemContext, config: FeatureConfig, max_width: usize) -> anyhow::Result<Self> {
        Ok(NoveltyEvaluator {
            features: FeatureExtractor::new(problem, config),
            template: NoveltyTable::new(max_width)?,
            partitions: HashMap::new(),
        })
    }

    pub fn max_width(&self) -> usize {
        self.template.max_width()
    }

    pub fn bound(&self) -> usize {
        self.template.bound()
    }

    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    /// Restricts queries to orders `1..=bound`. Also applies to existing partitions.
    pub fn set_bound(&mut self, bound: usize) -> anyhow::Result<()> {
        self.template.set_bound(bound)?;
        for table in self.partitions.values_mut() {
            table.set_bound(bound)?;
        }
        Ok(())
    }

    /// In `1..=bound + 1`; `bound + 1` means not novel at any tracked order.
    pub fn novelty(&mut self, state: &State) -> usize {
        self.novelty_in(0, state)
    }

    pub fn novelty_in(&mut self, partition: usize, state: &State) -> usize {
        let features = self.features.extract(state);
        let template = &self.template;
        self.partitions
            .entry(partition)
            .or_insert_with(|| template.clone())
            .evaluate(&features)
    }

    /// Forgets every seen tuple in every partition.
    pub fn reset(&mut self) {
        self.partitions.clear();
    }
}
