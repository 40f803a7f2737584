use crate::heuristic::HeuristicKind;
use crate::novelty::{FeatureConfig, MAX_NOVELTY_WIDTH};
use crate::solver::{Budget, SolverKind, MAX_G_WEIGHT};

use anyhow::{anyhow, ensure};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Parser, Debug, Default)]
#[command(
    name = "Width planner",
    about = "Classical planning with relaxed-plan heuristics and width-based search.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to the YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the grounded problem YAML file")]
    pub problem_path: Option<String>,

    #[arg(long, help = "Path to the JSON plan report")]
    pub output_path: Option<String>,

    #[arg(long, value_enum, help = "Search algorithm to use")]
    pub solver: Option<SolverKind>,

    #[arg(long, value_enum, help = "Heuristic for best-first search and BFWS")]
    pub heuristic: Option<HeuristicKind>,

    #[arg(long, help = "Largest novelty width")]
    pub max_width: Option<usize>,

    #[arg(long, help = "Add one novelty feature per goal condition")]
    pub goal_features: bool,

    #[arg(long, help = "Add one novelty feature per action applicability")]
    pub action_features: bool,

    #[arg(long, help = "BFWS: partition novelty by unsatisfied goal count")]
    pub partition_novelty: bool,

    #[arg(long, help = "Best-first: reopen closed states reached on a cheaper path")]
    pub reopen: bool,

    #[arg(long, help = "Best-first: weight of the path cost, 0 for greedy search")]
    pub g_weight: Option<usize>,

    #[arg(long, help = "Time limit in seconds")]
    pub time_limit_secs: Option<u64>,

    #[arg(long, help = "Expansion limit")]
    pub max_expansions: Option<usize>,

    #[arg(long = "log", help = "Tracing filter, e.g. `info` or `width_planner=debug`")]
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub problem_path: String,
    pub output_path: Option<String>,
    pub solver: SolverKind,
    pub heuristic: HeuristicKind,
    pub max_width: usize,
    pub features: FeatureConfig,
    pub partition_novelty: bool,
    pub reopen: bool,
    pub g_weight: usize,
    pub time_limit_secs: Option<u64>,
    pub max_expansions: Option<usize>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            problem_path: "problems/delivery.yaml".to_string(),
            output_path: None,
            solver: SolverKind::Bfws,
            heuristic: HeuristicKind::Hff,
            max_width: 2,
            features: FeatureConfig::default(),
            partition_novelty: false,
            reopen: false,
            g_weight: 1,
            time_limit_secs: None,
            max_expansions: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Command line flags take precedence over the config file.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(problem_path) = &cli.problem_path {
            self.problem_path = problem_path.clone();
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        if let Some(solver) = cli.solver {
            self.solver = solver;
        }
        if let Some(heuristic) = cli.heuristic {
            self.heuristic = heuristic;
        }
        if let Some(max_width) = cli.max_width {
            self.max_width = max_width;
        }
        self.features.goal_conditions |= cli.goal_features;
        self.features.applicable_actions |= cli.action_features;
        self.partition_novelty |= cli.partition_novelty;
        self.reopen |= cli.reopen;
        if let Some(g_weight) = cli.g_weight {
            self.g_weight = g_weight;
        }
        if cli.time_limit_secs.is_some() {
            self.time_limit_secs = cli.time_limit_secs;
        }
        if cli.max_expansions.is_some() {
            self.max_expansions = cli.max_expansions;
        }
        if let Some(log_filter) = &cli.log_filter {
            self.log_filter = log_filter.clone();
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.problem_path.is_empty(), "problem path must not be empty");

        if matches!(self.solver, SolverKind::Iw | SolverKind::Bfws)
            && !(1..=MAX_NOVELTY_WIDTH).contains(&self.max_width)
        {
            return Err(anyhow!(
                "Max width must be between 1 and {MAX_NOVELTY_WIDTH}, got {}",
                self.max_width
            ));
        }

        if self.partition_novelty && self.solver != SolverKind::Bfws {
            return Err(anyhow!(
                "Novelty partitioning only applies to bfws, got {:?}",
                self.solver
            ));
        }

        if self.g_weight > MAX_G_WEIGHT {
            return Err(anyhow!(
                "G weight must be at most {MAX_G_WEIGHT}, got {}",
                self.g_weight
            ));
        }

        if self.time_limit_secs == Some(0) {
            return Err(anyhow!("Time limit must be positive"));
        }
        if self.max_expansions == Some(0) {
            return Err(anyhow!("Expansion limit must be positive"));
        }
        Ok(())
    }

    pub fn budget(&self) -> Budget {
        Budget {
            time_limit: self.time_limit_secs.map(Duration::from_secs),
            max_expansions: self.max_expansions,
        }
    }
}
