//! Progress and result types reported by the evolution engines.

use serde::{Deserialize, Serialize};

use super::Genome;

/// A point in the improvement trace: the best fitness reached and the
/// generation it was first reached in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub fitness: f64,
    pub generation: usize,
}

/// Current phase of evolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EvolutionPhase {
    /// Building and scoring the initial population.
    #[default]
    Initializing,
    /// Reading cached fitness and picking survivors.
    Evaluating,
    /// Checking the solution flag and the evaluation budget.
    CheckingStop,
    /// Creating offspring.
    Reproducing,
    /// Run finished.
    Terminated(StopReason),
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// A genome within tolerance on every sample was found.
    SolutionFound,
    /// The fitness-evaluation budget ran out.
    BudgetExhausted,
}

/// Progress update emitted once per generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Current generation number.
    pub generation: usize,
    /// Fitness evaluations charged so far.
    pub evaluations: u64,
    /// Fitness-evaluation budget.
    pub max_evaluations: u64,
    /// Best fitness recorded in the improvement trace.
    pub best_fitness: f64,
    /// Current phase of the algorithm.
    pub phase: EvolutionPhase,
}

/// Final result of an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Best genome found.
    pub best: Genome,
    /// Fitness of `best`.
    pub fitness: f64,
    /// Total generations run.
    pub generations: usize,
    /// Fitness evaluations charged against the budget.
    pub evaluations: u64,
    /// Time-ordered improvement trace.
    pub improvements: Vec<Milestone>,
    /// Whether an acceptable solution was found.
    pub found: bool,
    /// Why the run stopped.
    pub stop_reason: StopReason,
    /// Seed the run's generator was initialized with.
    pub seed: u64,
    /// Wall-clock time (in seconds).
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_serialization() {
        let result = EvolutionResult {
            best: Genome::from_triples(&[[-1, -1, -1], [2, 0, 0], [-2, 1, -2]]),
            fitness: 0.0,
            generations: 3,
            evaluations: 27,
            improvements: vec![
                Milestone {
                    fitness: 12.5,
                    generation: 1,
                },
                Milestone {
                    fitness: 0.0,
                    generation: 3,
                },
            ],
            found: true,
            stop_reason: StopReason::SolutionFound,
            seed: 42,
            elapsed_seconds: 0.01,
        };

        let json = serde_json::to_string(&result).unwrap();
        let parsed: EvolutionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.best, result.best);
        assert_eq!(parsed.improvements, result.improvements);
        assert_eq!(parsed.stop_reason, StopReason::SolutionFound);
    }
}
