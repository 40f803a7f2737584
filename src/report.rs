use crate::config::Config;
use crate::heuristic::HeuristicKind;
use crate::problem::ProblemContext;
use crate::solver::{SearchOutcome, SearchResult, SolverKind};
use crate::stat::Stats;

use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// What a planner run writes to `output_path`.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub problem: String,
    pub solver: SolverKind,
    pub heuristic: HeuristicKind,
    pub max_width: usize,
    #[serde(flatten)]
    pub outcome: SearchOutcome,
    /// Action names, present when solved.
    pub actions: Option<Vec<String>>,
    pub stats: Stats,
}

impl PlanReport {
    pub fn new(config: &Config, problem: &ProblemContext, result: &SearchResult) -> Self {
        PlanReport {
            problem: config.problem_path.clone(),
            solver: config.solver,
            heuristic: config.heuristic,
            max_width: config.max_width,
            outcome: result.outcome.clone(),
            actions: result.outcome.plan().map(|plan| problem.action_names(plan)),
            stats: result.stats.clone(),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &str) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(path).parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create output directory {}", parent.display()))?;
        }
        fs::write(path, self.to_json()?).with_context(|| format!("failed to write report {path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::build_solver;
    use crate::test_utils::*;

    #[test]
    fn test_report_json() {
        let problem = two_switches();
        let config = Config {
            solver: SolverKind::Bfs,
            ..Config::default()
        };
        let result = build_solver(&config, &problem).unwrap().solve();
        let report = PlanReport::new(&config, &problem, &result);

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["outcome"], "solved");
        assert_eq!(json["solver"], "bfs");
        assert_eq!(json["plan"], serde_json::json!([0, 1]));
        assert_eq!(json["actions"], serde_json::json!(["set_x", "set_y"]));
        assert_eq!(json["stats"]["expanded"], 2);
    }

    #[test]
    fn test_unsolved_report_has_no_actions() {
        let problem = unreachable_goal();
        let config = Config {
            solver: SolverKind::Bfs,
            ..Config::default()
        };
        let result = build_solver(&config, &problem).unwrap().solve();
        let report = PlanReport::new(&config, &problem, &result);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["outcome"], "unreachable");
        assert!(json["actions"].is_null());
    }
}
