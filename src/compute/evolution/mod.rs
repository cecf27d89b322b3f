//! Evolutionary search module for Cartesian Genetic Programming.
//!
//! # Overview
//!
//! The evolutionary search system consists of:
//!
//! - **Genome Operations** (`genome`): random generation, point mutation and
//!   operand repair
//! - **Recombination** (`recombination`): active-gene transplant and
//!   subgraph exchange behind the [`Recombinator`] trait
//! - **Population** (`population`): fixed-size slot storage with cached
//!   active paths, fitness and solution tracking
//! - **Search Algorithms** (`search`): the 1 + lambda strategy and two-group
//!   tournament selection
//!
//! # Example
//!
//! ```rust,no_run
//! use cartesian_gp::compute::evolution::evolve;
//! use cartesian_gp::schema::{Dataset, RunConfig};
//!
//! let xs: Vec<f64> = (1..=10).map(f64::from).collect();
//! let dataset = Dataset::from_function(vec![xs], |x| x[0] * x[0] * x[0]).unwrap();
//! let config = RunConfig {
//!     population_size: 10,
//!     tolerance: 0.0,
//!     ..Default::default()
//! };
//!
//! let result = evolve(&config, &dataset).unwrap();
//! println!("fitness {} after {} evaluations", result.fitness, result.evaluations);
//! ```

mod genome;
mod population;
mod recombination;
mod search;

pub use genome::GenomeRng;
pub use population::{Individual, Population};
pub use recombination::{ActiveGeneTransplant, Recombinator, SubgraphExchange};
pub use search::{OnePlusLambda, TournamentSelection, evolve};

use crate::compute::StructuralError;
use crate::schema::ConfigError;

/// Errors raised while setting up or running an evolution.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EvolutionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),
}
