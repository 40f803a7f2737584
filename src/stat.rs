use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub expanded: usize,
    pub generated: usize,
    /// Heuristic and novelty evaluations.
    pub evaluated: usize,
    /// Successors dropped by novelty pruning.
    pub pruned: usize,
    pub dead_ends: usize,
    pub reopened: usize,
    pub time_us: usize,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Time(microseconds) {:?} Expanded {:?} Generated {:?} Evaluated {:?} Pruned {:?} Dead ends {:?} Reopened {:?}",
            self.time_us,
            self.expanded,
            self.generated,
            self.evaluated,
            self.pruned,
            self.dead_ends,
            self.reopened
        );
    }
}
