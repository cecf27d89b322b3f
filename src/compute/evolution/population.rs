//! Fixed-size population storage.
//!
//! Slots `0..parent_count` hold parents, the rest hold children. Every slot
//! caches its genome's active path, fitness and acceptable flag; the three
//! are always recomputed together when the slot's genome changes.

use crate::compute::{self, StructuralError, active_path, score};
use crate::schema::{ConfigError, Dataset, ErrorMetric, Genome, Geometry, RunConfig};

use super::{EvolutionError, GenomeRng};

/// A genome together with its cached evaluation.
#[derive(Debug, Clone)]
pub struct Individual {
    /// The genome.
    pub genome: Genome,
    /// Active path, output gene first.
    pub active: Vec<usize>,
    /// Fitness score (lower is better).
    pub fitness: f64,
    /// Within tolerance on every sample.
    pub acceptable: bool,
}

impl Individual {
    /// Decode and score `genome` against `dataset`.
    pub fn evaluate(
        genome: Genome,
        dataset: &Dataset,
        metric: ErrorMetric,
        tolerance: f64,
    ) -> Result<Self, StructuralError> {
        let active = active_path(&genome)?;
        let output = compute::evaluate(&genome, &active, dataset.inputs())?;
        let evaluation = score(&output, dataset.target(), metric, tolerance);

        Ok(Self {
            genome,
            active,
            fitness: evaluation.fitness,
            acceptable: evaluation.acceptable,
        })
    }
}

/// Fixed-size set of individuals with parent and child slots.
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
    parent_count: usize,
    geometry: Geometry,
    dataset: Dataset,
    metric: ErrorMetric,
    tolerance: f64,
    solution: Option<usize>,
}

impl Population {
    /// Create a population of random genomes, all evaluated.
    pub fn new(
        config: &RunConfig,
        dataset: &Dataset,
        rng: &mut GenomeRng,
    ) -> Result<Self, EvolutionError> {
        config.validate()?;
        if dataset.input_count() != config.rows {
            return Err(ConfigError::InputCountMismatch {
                rows: config.rows,
                inputs: dataset.input_count(),
            }
            .into());
        }

        let geometry = config.geometry();
        let genomes = (0..config.population_size)
            .map(|_| rng.random_genome(geometry))
            .collect::<Result<Vec<_>, _>>()?;

        let mut population = Self {
            individuals: Vec::new(),
            parent_count: config.algorithm.parent_count(),
            geometry,
            dataset: dataset.clone(),
            metric: config.metric,
            tolerance: config.tolerance,
            solution: None,
        };

        let evaluated = population.evaluate_all(genomes)?;
        population.individuals = evaluated;
        population.solution = population.individuals.iter().rposition(|i| i.acceptable);

        Ok(population)
    }

    fn evaluate_all(&self, genomes: Vec<Genome>) -> Result<Vec<Individual>, StructuralError> {
        genomes
            .into_iter()
            .map(|genome| Individual::evaluate(genome, &self.dataset, self.metric, self.tolerance))
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    #[inline]
    pub fn parent_count(&self) -> usize {
        self.parent_count
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individual(&self, index: usize) -> &Individual {
        &self.individuals[index]
    }

    pub fn genome(&self, index: usize) -> &Genome {
        &self.individuals[index].genome
    }

    pub fn active(&self, index: usize) -> &[usize] {
        &self.individuals[index].active
    }

    pub fn fitness(&self, index: usize) -> f64 {
        self.individuals[index].fitness
    }

    /// Slot of the most recently written acceptable individual.
    pub fn solution(&self) -> Option<usize> {
        self.solution
    }

    /// Replace slot `index` with `genome`, recomputing its evaluation.
    pub fn replace(&mut self, index: usize, genome: Genome) -> Result<(), StructuralError> {
        if index >= self.len() {
            return Err(StructuralError::SlotOutOfRange {
                slot: index,
                kind: "population",
                len: self.len(),
            });
        }
        let individual = Individual::evaluate(genome, &self.dataset, self.metric, self.tolerance)?;
        self.write(index, individual);
        Ok(())
    }

    /// Write `genome` into parent slot `slot`.
    pub fn set_parent(&mut self, slot: usize, genome: Genome) -> Result<(), StructuralError> {
        if slot >= self.parent_count {
            return Err(StructuralError::SlotOutOfRange {
                slot,
                kind: "parent",
                len: self.len(),
            });
        }
        self.replace(slot, genome)
    }

    /// Write `children` into the child slots, in order.
    pub fn set_children(&mut self, children: Vec<Genome>) -> Result<(), StructuralError> {
        let expected = self.len() - self.parent_count;
        if children.len() != expected {
            return Err(StructuralError::ChildCountMismatch {
                expected,
                actual: children.len(),
            });
        }
        let evaluated = self.evaluate_all(children)?;
        for (offset, individual) in evaluated.into_iter().enumerate() {
            self.write(self.parent_count + offset, individual);
        }
        Ok(())
    }

    /// Child slot with the lowest fitness and that fitness.
    ///
    /// Ties go to the lowest slot. Returns `None` without child slots.
    pub fn fittest_child(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for index in self.parent_count..self.len() {
            let fitness = self.fitness(index);
            if best.is_none_or(|(_, f)| fitness < f) {
                best = Some((index, fitness));
            }
        }
        best
    }

    /// Move individual `index` into parent slot 0.
    pub fn promote_parent(&mut self, index: usize) {
        if index != 0 {
            self.copy_slot(index, 0);
        }
    }

    /// Make individuals `a` and `b` the two parents.
    ///
    /// An individual already in a parent slot stays where it is.
    pub fn promote_parents(&mut self, a: usize, b: usize) {
        let parents = self.parent_count;
        let is_parent = |i: usize| i < parents;
        match (is_parent(a), is_parent(b)) {
            (true, true) => {}
            (true, false) => self.copy_slot(b, other_parent(a)),
            (false, true) => self.copy_slot(a, other_parent(b)),
            (false, false) => {
                self.copy_slot(a, 0);
                self.copy_slot(b, 1);
            }
        }
    }

    fn copy_slot(&mut self, from: usize, to: usize) {
        let individual = self.individuals[from].clone();
        self.write(to, individual);
    }

    fn write(&mut self, index: usize, individual: Individual) {
        let acceptable = individual.acceptable;
        self.individuals[index] = individual;

        if acceptable {
            self.solution = Some(index);
        } else if self.solution == Some(index) {
            self.solution = self.individuals.iter().rposition(|i| i.acceptable);
        }
    }
}

#[inline]
fn other_parent(slot: usize) -> usize {
    if slot == 0 { 1 } else { 0 }
}
