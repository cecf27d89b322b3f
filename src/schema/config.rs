//! Run configuration for Cartesian Genetic Programming.

use serde::{Deserialize, Serialize};

use super::Geometry;

/// Top-level configuration for a single evolutionary run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of individuals (parents + children).
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Number of genome columns, including the terminal column.
    #[serde(default = "default_columns")]
    pub columns: usize,
    /// Number of genome rows; also the number of external inputs.
    #[serde(default = "default_rows")]
    pub rows: usize,
    /// Fraction of genes mutated per offspring (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Per-edge probability of adopting donor structure (0.0-1.0).
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: f64,
    /// Maximum per-sample absolute error for a genome to count as a solution.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Fitness-evaluation budget.
    #[serde(default = "default_max_evaluations")]
    pub max_evaluations: u64,
    /// Evolution driver.
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Error metric used as fitness (lower is better).
    #[serde(default)]
    pub metric: ErrorMetric,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            columns: default_columns(),
            rows: default_rows(),
            mutation_rate: default_mutation_rate(),
            exchange_rate: default_exchange_rate(),
            tolerance: default_tolerance(),
            max_evaluations: default_max_evaluations(),
            algorithm: Algorithm::default(),
            metric: ErrorMetric::default(),
            random_seed: None,
        }
    }
}

fn default_population_size() -> usize {
    5
}
fn default_columns() -> usize {
    10
}
fn default_rows() -> usize {
    1
}
fn default_mutation_rate() -> f64 {
    0.1
}
fn default_exchange_rate() -> f64 {
    0.5
}
fn default_tolerance() -> f64 {
    0.01
}
fn default_max_evaluations() -> u64 {
    10_000_000
}

/// Evolution driver selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Algorithm {
    /// Mutation-only hill climbing with one parent and `N - 1` children.
    #[default]
    OnePlusLambda,
    /// Two-group tournament with recombination of both winners.
    Tournament(TournamentConfig),
}

impl Algorithm {
    /// Number of parent slots the driver keeps in the population.
    pub fn parent_count(&self) -> usize {
        match self {
            Self::OnePlusLambda => 1,
            Self::Tournament(_) => 2,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OnePlusLambda => "1 + lambda",
            Self::Tournament(t) => match t.recombination {
                RecombinationKind::SubgraphExchange => "Subgraph Exchange",
                RecombinationKind::ActiveGeneTransplant => "Active Gene Transplant",
            },
        }
    }
}

/// Tournament selection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Recombination operator applied to the two winners.
    #[serde(default)]
    pub recombination: RecombinationKind,
    /// Size of the second group drawn from the shuffled slots; the rest form
    /// the first group.
    #[serde(default = "default_group_size")]
    pub group_size: usize,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            recombination: RecombinationKind::default(),
            group_size: default_group_size(),
        }
    }
}

fn default_group_size() -> usize {
    2
}

/// Recombination operator selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecombinationKind {
    /// Lock-step graft of a shared active subgraph from the donor.
    #[default]
    SubgraphExchange,
    /// Copy donor-active genes that are inactive in the receiver.
    ActiveGeneTransplant,
}

/// Error between evaluated output and target, summed over samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorMetric {
    /// Sum of absolute differences.
    #[default]
    AbsoluteError,
    /// Sum of squared differences.
    SquaredError,
}

impl RunConfig {
    /// Genome grid shape.
    #[inline]
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.rows, self.columns)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 1 {
            return Err(ConfigError::InvalidPopulationSize);
        }
        if self.rows < 1 {
            return Err(ConfigError::InvalidRows);
        }
        if self.columns < 3 {
            return Err(ConfigError::InvalidColumns(self.columns));
        }

        check_rate(self.mutation_rate, "mutation_rate")?;
        check_rate(self.exchange_rate, "exchange_rate")?;

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        if self.max_evaluations == 0 {
            return Err(ConfigError::InvalidBudget);
        }

        let required = self.algorithm.parent_count() + 1;
        if self.population_size < required {
            return Err(ConfigError::PopulationTooSmall {
                algorithm: self.algorithm.name(),
                required,
                actual: self.population_size,
            });
        }

        if let Algorithm::Tournament(t) = &self.algorithm
            && (t.group_size == 0 || t.group_size >= self.population_size)
        {
            return Err(ConfigError::InvalidGroupSize {
                group_size: t.group_size,
                population_size: self.population_size,
            });
        }

        Ok(())
    }
}

fn check_rate(value: f64, name: &'static str) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidRate { name, value })
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("population_size must be >= 1")]
    InvalidPopulationSize,
    #[error("rows must be >= 1")]
    InvalidRows,
    #[error("columns must be >= 3, got {0}")]
    InvalidColumns(usize),
    #[error("{name} must be >= 0 and <= 1, got {value}")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("tolerance must be a finite value >= 0, got {0}")]
    InvalidTolerance(f64),
    #[error("max_evaluations must be >= 1")]
    InvalidBudget,
    #[error("{algorithm} needs a population of at least {required}, got {actual}")]
    PopulationTooSmall {
        algorithm: &'static str,
        required: usize,
        actual: usize,
    },
    #[error("tournament group_size {group_size} must be in [1, {population_size})")]
    InvalidGroupSize {
        group_size: usize,
        population_size: usize,
    },
    #[error("input matrix must not be empty")]
    EmptyInputs,
    #[error("target output must not be empty")]
    EmptyTarget,
    #[error("input row {row} has {actual} samples, target has {expected}")]
    SampleLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("genome has {rows} input rows but the dataset provides {inputs} inputs")]
    InputCountMismatch { rows: usize, inputs: usize },
}
