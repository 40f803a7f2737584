use width_planner::config::{Cli, Config};
use width_planner::report::PlanReport;
use width_planner::solver::{build_solver, SearchOutcome};
use width_planner::yaml::load_problem;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("failed to read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        Config::default()
    }
    .override_from_command_line(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .init();
    if cli.config.is_none() {
        info!("No config file specified, using default config");
    }

    let problem = load_problem(&config.problem_path)?;
    info!(
        "Loaded {} with {} variables, {} actions and {} atoms",
        config.problem_path,
        problem.variables().len(),
        problem.actions().len(),
        problem.index().len()
    );

    let mut solver = build_solver(&config, &problem)?;
    let result = solver.solve();
    match &result.outcome {
        SearchOutcome::Solved { plan } => {
            info!("Plan found with {} actions", plan.len());
            for name in problem.action_names(plan) {
                info!("  {name}");
            }
        }
        outcome => warn!("No plan: {outcome:?}"),
    }

    if let Some(output_path) = config.output_path.as_ref() {
        PlanReport::new(&config, &problem, &result).write(output_path)?;
        info!("Report written to {output_path}");
    }
    Ok(())
}
