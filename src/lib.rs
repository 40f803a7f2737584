pub mod common;
pub mod config;
pub mod heuristic;
pub mod novelty;
pub mod problem;
pub mod report;
pub mod solver;
pub mod stat;
pub mod yaml;

#[cfg(test)]
mod test_utils;
