//! Cartesian Genetic Programming for symbolic regression.
//!
//! Candidate programs are genomes laid out on a `rows x columns` grid: each
//! gene names an operation and the earlier genes it reads. Evolution searches
//! for a genome whose output matches a target vector on a set of samples.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Genome, configuration, dataset and result types
//! - `compute`: Operations, active-path analysis, decoding and the
//!   evolutionary search engines
//!
//! # Example
//!
//! ```rust,no_run
//! use cartesian_gp::{
//!     compute::{active_path, evaluate, evolution::evolve},
//!     schema::{Dataset, RunConfig},
//! };
//!
//! // Sample x^3 on 1..=10
//! let xs: Vec<f64> = (1..=10).map(f64::from).collect();
//! let dataset = Dataset::from_function(vec![xs], |x| x[0].powi(3)).unwrap();
//!
//! let config = RunConfig {
//!     population_size: 10,
//!     tolerance: 0.0,
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let result = evolve(&config, &dataset).unwrap();
//! let active = active_path(&result.best).unwrap();
//! let output = evaluate(&result.best, &active, dataset.inputs()).unwrap();
//!
//! println!("found: {}, output: {:?}", result.found, output);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{EvolutionError, evolve};
pub use schema::{Dataset, EvolutionResult, Genome, RunConfig};
