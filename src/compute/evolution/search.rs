//! Search algorithm implementations.
//!
//! Both engines run the same generation loop: charge the new children
//! against the evaluation budget, select from cached fitness, stop if the
//! population holds a solution, record improvements, then reproduce. The
//! loop continues while fewer evaluations than the budget were charged.

use std::time::Instant;

use log::{debug, info, trace};

use crate::schema::{
    Algorithm, Dataset, EvolutionPhase, EvolutionProgress, EvolutionResult, Genome, Milestone,
    RecombinationKind, RunConfig, StopReason, TournamentConfig,
};

use super::{
    ActiveGeneTransplant, EvolutionError, GenomeRng, Population, Recombinator, SubgraphExchange,
};

/// Generation, budget and improvement bookkeeping shared by the engines.
#[derive(Debug, Clone)]
struct Tracker {
    seed: u64,
    generation: usize,
    evaluations: u64,
    max_evaluations: u64,
    improvements: Vec<Milestone>,
    phase: EvolutionPhase,
}

impl Tracker {
    fn new(seed: u64, max_evaluations: u64) -> Self {
        Self {
            seed,
            generation: 0,
            evaluations: 0,
            max_evaluations,
            improvements: Vec::new(),
            phase: EvolutionPhase::Initializing,
        }
    }

    fn best_fitness(&self) -> f64 {
        self.improvements
            .last()
            .map_or(f64::INFINITY, |m| m.fitness)
    }

    fn exhausted(&self) -> bool {
        self.evaluations >= self.max_evaluations
    }

    fn begin_generation(&mut self, children: usize) {
        self.generation += 1;
        self.evaluations += children as u64;
        self.phase = EvolutionPhase::Evaluating;
    }

    /// Append a milestone if `fitness` beats the best recorded so far.
    fn record(&mut self, fitness: f64) {
        if fitness < self.best_fitness() {
            debug!(
                "Generation {}: fitness improved to {} ({} evaluations)",
                self.generation, fitness, self.evaluations
            );
            self.improvements.push(Milestone {
                fitness,
                generation: self.generation,
            });
        }
    }

    fn found(&mut self) {
        self.improvements.push(Milestone {
            fitness: 0.0,
            generation: self.generation,
        });
    }

    fn progress(&self) -> EvolutionProgress {
        EvolutionProgress {
            generation: self.generation,
            evaluations: self.evaluations,
            max_evaluations: self.max_evaluations,
            best_fitness: self.best_fitness(),
            phase: self.phase,
        }
    }

    fn finish(
        &mut self,
        best: Genome,
        fitness: f64,
        stop_reason: StopReason,
        started: Instant,
    ) -> EvolutionResult {
        self.phase = EvolutionPhase::Terminated(stop_reason);
        let elapsed_seconds = started.elapsed().as_secs_f64();

        info!(
            "Evolution stopped ({:?}) after {} generations, {} evaluations: fitness {}",
            stop_reason, self.generation, self.evaluations, fitness
        );

        EvolutionResult {
            best,
            fitness,
            generations: self.generation,
            evaluations: self.evaluations,
            improvements: self.improvements.clone(),
            found: stop_reason == StopReason::SolutionFound,
            stop_reason,
            seed: self.seed,
            elapsed_seconds,
        }
    }
}

/// Mutation-only hill climber with one parent and `N - 1` children.
pub struct OnePlusLambda {
    config: RunConfig,
    rng: GenomeRng,
    population: Population,
    tracker: Tracker,
}

impl OnePlusLambda {
    /// Create the engine and its random, evaluated initial population.
    pub fn new(config: &RunConfig, dataset: &Dataset) -> Result<Self, EvolutionError> {
        let config = RunConfig {
            algorithm: Algorithm::OnePlusLambda,
            ..config.clone()
        };
        let seed = config.random_seed.unwrap_or_else(rand::random);
        let mut rng = GenomeRng::new(seed);
        let population = Population::new(&config, dataset, &mut rng)?;

        info!(
            "1 + lambda: population {}, grid {}x{}, seed {}",
            config.population_size, config.rows, config.columns, seed
        );

        Ok(Self {
            tracker: Tracker::new(seed, config.max_evaluations),
            config,
            rng,
            population,
        })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn seed(&self) -> u64 {
        self.tracker.seed
    }

    /// Current progress.
    pub fn progress(&self) -> EvolutionProgress {
        self.tracker.progress()
    }

    /// Run a single generation.
    ///
    /// Returns `Some(StopReason::SolutionFound)` once the population holds an
    /// acceptable individual; the population is then left untouched.
    pub fn step_generation(&mut self) -> Result<Option<StopReason>, EvolutionError> {
        let children = self.population.len() - 1;
        self.tracker.begin_generation(children);

        // Ties go to the child.
        let parent_fitness = self.population.fitness(0);
        let (chosen, fitness) = match self.population.fittest_child() {
            Some((index, child_fitness)) if child_fitness <= parent_fitness => {
                (index, child_fitness)
            }
            _ => (0, parent_fitness),
        };

        self.tracker.phase = EvolutionPhase::CheckingStop;
        if self.population.solution().is_some() {
            self.tracker.found();
            return Ok(Some(StopReason::SolutionFound));
        }
        self.tracker.record(fitness);

        self.tracker.phase = EvolutionPhase::Reproducing;
        let parent = self.population.genome(chosen).clone();
        let geometry = self.population.geometry();
        let offspring = (0..children)
            .map(|_| self.rng.mutate(&parent, geometry, self.config.mutation_rate))
            .collect::<Result<Vec<_>, _>>()?;

        self.population.promote_parent(chosen);
        self.population.set_children(offspring)?;

        trace!(
            "Generation {}: parent fitness {}",
            self.tracker.generation,
            self.population.fitness(0)
        );

        Ok(None)
    }

    /// Run evolution with progress callback.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<EvolutionResult, EvolutionError>
    where
        F: FnMut(&EvolutionProgress),
    {
        let started = Instant::now();
        callback(&self.progress());

        let stop_reason = loop {
            if self.tracker.exhausted() {
                break StopReason::BudgetExhausted;
            }
            if let Some(reason) = self.step_generation()? {
                break reason;
            }
            callback(&self.progress());
        };

        // Children written after the last check are never reported.
        let slot = match stop_reason {
            StopReason::SolutionFound => self.population.solution().unwrap_or(0),
            StopReason::BudgetExhausted => 0,
        };
        let best = self.population.individual(slot);
        let result = self
            .tracker
            .finish(best.genome.clone(), best.fitness, stop_reason, started);
        callback(&self.progress());

        Ok(result)
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> Result<EvolutionResult, EvolutionError> {
        self.run_with_callback(|_| {})
    }
}

/// Two-group tournament: the winners of a random split recombine with each
/// other, and their mutated children replace every non-parent slot.
pub struct TournamentSelection<R: Recombinator> {
    config: RunConfig,
    rng: GenomeRng,
    population: Population,
    tracker: Tracker,
    recombinator: R,
    group_size: usize,
}

impl<R: Recombinator> TournamentSelection<R> {
    /// Create the engine and its random, evaluated initial population.
    pub fn new(config: &RunConfig, dataset: &Dataset, recombinator: R) -> Result<Self, EvolutionError> {
        let tournament = match &config.algorithm {
            Algorithm::Tournament(t) => t.clone(),
            Algorithm::OnePlusLambda => TournamentConfig::default(),
        };
        let group_size = tournament.group_size;
        let config = RunConfig {
            algorithm: Algorithm::Tournament(tournament),
            ..config.clone()
        };

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let mut rng = GenomeRng::new(seed);
        let population = Population::new(&config, dataset, &mut rng)?;

        info!(
            "Tournament ({}): population {}, grid {}x{}, seed {}",
            recombinator.name(),
            config.population_size,
            config.rows,
            config.columns,
            seed
        );

        Ok(Self {
            tracker: Tracker::new(seed, config.max_evaluations),
            config,
            rng,
            population,
            recombinator,
            group_size,
        })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn seed(&self) -> u64 {
        self.tracker.seed
    }

    /// Current progress.
    pub fn progress(&self) -> EvolutionProgress {
        self.tracker.progress()
    }

    /// Lowest-fitness member of `group`; the first member if none is finite.
    fn group_winner(&self, group: &[usize]) -> usize {
        let mut winner = group[0];
        let mut best = f64::INFINITY;
        for &index in group {
            let fitness = self.population.fitness(index);
            if fitness < best {
                winner = index;
                best = fitness;
            }
        }
        winner
    }

    /// Run a single generation.
    ///
    /// Returns `Some(StopReason::SolutionFound)` once the population holds an
    /// acceptable individual; the population is then left untouched.
    pub fn step_generation(&mut self) -> Result<Option<StopReason>, EvolutionError> {
        let size = self.population.len();
        let children = size - self.population.parent_count();
        self.tracker.begin_generation(children);

        let mut order: Vec<usize> = (0..size).collect();
        self.rng.shuffle(&mut order);
        let (second, first) = order.split_at(self.group_size);
        let w1 = self.group_winner(first);
        let w2 = self.group_winner(second);

        let (f1, f2) = (self.population.fitness(w1), self.population.fitness(w2));
        let fitness = if f1 < f2 { f1 } else { f2 };

        self.tracker.phase = EvolutionPhase::CheckingStop;
        if self.population.solution().is_some() {
            self.tracker.found();
            return Ok(Some(StopReason::SolutionFound));
        }
        self.tracker.record(fitness);

        self.tracker.phase = EvolutionPhase::Reproducing;
        let geometry = self.population.geometry();
        let first_parent = self.population.individual(w1).clone();
        let second_parent = self.population.individual(w2).clone();

        // All recombinations draw before any mutation does.
        let recombined = (0..children)
            .map(|i| {
                let (receiver, donor) = if i % 2 == 0 {
                    (&first_parent, &second_parent)
                } else {
                    (&second_parent, &first_parent)
                };
                self.recombinator.recombine(
                    &mut self.rng,
                    &receiver.genome,
                    &receiver.active,
                    &donor.genome,
                    &donor.active,
                    geometry,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let offspring = recombined
            .iter()
            .map(|child| self.rng.mutate(child, geometry, self.config.mutation_rate))
            .collect::<Result<Vec<_>, _>>()?;

        self.population.promote_parents(w1, w2);
        self.population.set_children(offspring)?;

        trace!(
            "Generation {}: winners {} ({}) and {} ({})",
            self.tracker.generation, w1, f1, w2, f2
        );

        Ok(None)
    }

    /// Run evolution with progress callback.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<EvolutionResult, EvolutionError>
    where
        F: FnMut(&EvolutionProgress),
    {
        let started = Instant::now();
        callback(&self.progress());

        let stop_reason = loop {
            if self.tracker.exhausted() {
                break StopReason::BudgetExhausted;
            }
            if let Some(reason) = self.step_generation()? {
                break reason;
            }
            callback(&self.progress());
        };

        let slot = match stop_reason {
            StopReason::SolutionFound => self.population.solution().unwrap_or(0),
            StopReason::BudgetExhausted => {
                if self.population.fitness(0) < self.population.fitness(1) {
                    0
                } else {
                    1
                }
            }
        };
        let best = self.population.individual(slot);
        let result = self
            .tracker
            .finish(best.genome.clone(), best.fitness, stop_reason, started);
        callback(&self.progress());

        Ok(result)
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> Result<EvolutionResult, EvolutionError> {
        self.run_with_callback(|_| {})
    }
}

/// Run the engine selected by `config.algorithm` to completion.
pub fn evolve(config: &RunConfig, dataset: &Dataset) -> Result<EvolutionResult, EvolutionError> {
    match &config.algorithm {
        Algorithm::OnePlusLambda => OnePlusLambda::new(config, dataset)?.run(),
        Algorithm::Tournament(t) => match t.recombination {
            RecombinationKind::SubgraphExchange => {
                TournamentSelection::new(config, dataset, SubgraphExchange::new(config.exchange_rate))?
                    .run()
            }
            RecombinationKind::ActiveGeneTransplant => TournamentSelection::new(
                config,
                dataset,
                ActiveGeneTransplant::new(config.exchange_rate),
            )?
            .run(),
        },
    }
}
