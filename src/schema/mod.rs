//! Schema module - Genome, configuration and result types for CGP runs.

mod config;
mod dataset;
mod evolution;
mod genome;

pub use config::*;
pub use dataset::*;
pub use evolution::*;
pub use genome::*;
