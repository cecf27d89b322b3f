//! Genome manipulation utilities for evolutionary search.
//!
//! Provides random generation, point mutation and operand repair.

use crate::compute::{Operation, StructuralError};
use crate::schema::{GENE_WIDTH, Gene, Genome, Geometry, OUTPUT, UNUSED};
use rand::prelude::*;

/// Random number generator wrapper for genome operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a random genome on the given grid.
    ///
    /// Column 0 holds terminals, the last gene is the output gene and every
    /// other gene is a function gene with in-bounds operands. A grid whose
    /// output gene sits in column 0 has nothing to read and is rejected.
    pub fn random_genome(&mut self, geometry: Geometry) -> Result<Genome, StructuralError> {
        let output = geometry.output_index();
        let genes = (0..geometry.len())
            .map(|index| {
                if index == output {
                    Ok(Gene::output(self.operand(index, geometry)?))
                } else if geometry.column_of(index) == 0 {
                    Ok(Gene::terminal())
                } else {
                    self.random_gene(index, geometry)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Genome::new(genes))
    }

    /// Generate a random function gene for position `index`.
    pub fn random_gene(&mut self, index: usize, geometry: Geometry) -> Result<Gene, StructuralError> {
        let op = Operation::ALL[self.rng.gen_range(0..Operation::COUNT)];
        let first = self.operand(index, geometry)?;
        let second = if op.arity() == 2 {
            Some(self.operand(index, geometry)?)
        } else {
            None
        };
        Ok(Gene::function(op.code(), Some(first), second))
    }

    /// Mutated copy of `genome`.
    ///
    /// Exactly `floor(len * rate) + 1` successful point mutations are made;
    /// a pick that lands on an immutable allele is redrawn.
    pub fn mutate(
        &mut self,
        genome: &Genome,
        geometry: Geometry,
        rate: f64,
    ) -> Result<Genome, StructuralError> {
        let mut child = genome.clone();
        if child.is_empty() {
            return Ok(child);
        }

        let count = (child.len() as f64 * rate).floor() as usize + 1;
        for _ in 0..count {
            loop {
                let index = self.rng.gen_range(0..child.len());
                if let Some(gene) = self.mutate_gene(child.gene(index), index, geometry)? {
                    child.set_gene(index, gene);
                    break;
                }
            }
        }

        Ok(child)
    }

    /// Point-mutate one random allele of `gene`.
    ///
    /// Returns `Ok(None)` when the drawn allele cannot be changed: a terminal
    /// or output sentinel, an unused operand slot, or an operand whose legal
    /// range has a single value.
    pub fn mutate_gene(
        &mut self,
        gene: Gene,
        index: usize,
        geometry: Geometry,
    ) -> Result<Option<Gene>, StructuralError> {
        let allele = self.rng.gen_range(0..GENE_WIDTH);
        let original = gene.0[allele];
        if original == UNUSED || original == OUTPUT {
            return Ok(None);
        }

        let mut gene = gene;
        if allele == 0 {
            let op = loop {
                let candidate = Operation::ALL[self.rng.gen_range(0..Operation::COUNT)];
                if candidate.code() as i32 != original {
                    break candidate;
                }
            };
            self.format_inputs(&mut gene, index, op, geometry)?;
            gene.0[0] = op.code() as i32;
        } else {
            let bound = checked_bound(index, geometry)?;
            if bound == 1 {
                return Ok(None);
            }
            gene.0[allele] = loop {
                let candidate = self.rng.gen_range(0..bound) as i32;
                if candidate != original {
                    break candidate;
                }
            };
        }

        Ok(Some(gene))
    }

    /// Fit the operand slots of `gene` to the arity of `op`.
    ///
    /// Slots the operation reads that are unused get a random legal operand;
    /// slots it does not read are cleared. The operation code is untouched.
    pub fn format_inputs(
        &mut self,
        gene: &mut Gene,
        index: usize,
        op: Operation,
        geometry: Geometry,
    ) -> Result<(), StructuralError> {
        for slot in 1..GENE_WIDTH {
            if slot <= op.arity() && gene.0[slot] == UNUSED {
                gene.0[slot] = self.operand(index, geometry)? as i32;
            } else if slot > op.arity() && gene.0[slot] != UNUSED {
                gene.0[slot] = UNUSED;
            }
        }
        Ok(())
    }

    /// `true` with probability `rate`.
    #[inline]
    pub fn coin(&mut self, rate: f64) -> bool {
        self.rng.r#gen::<f64>() < rate
    }

    /// Uniform random element of `items`.
    pub fn choose<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        items.choose(&mut self.rng).copied()
    }

    /// Shuffle `items` in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Random legal operand for the gene at `index`.
    fn operand(&mut self, index: usize, geometry: Geometry) -> Result<usize, StructuralError> {
        let bound = checked_bound(index, geometry)?;
        Ok(self.rng.gen_range(0..bound))
    }
}

fn checked_bound(index: usize, geometry: Geometry) -> Result<usize, StructuralError> {
    match geometry.operand_bound(index) {
        0 => Err(StructuralError::EmptyOperandRange {
            gene: index,
            column: geometry.column_of(index),
            rows: geometry.rows,
        }),
        bound => Ok(bound),
    }
}
