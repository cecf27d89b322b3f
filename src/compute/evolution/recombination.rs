//! Recombination operators.
//!
//! Both operators build a child from a deep copy of the receiver and never
//! modify either parent.

use crate::compute::{Operation, StructuralError};
use crate::schema::{GENE_WIDTH, GeneKind, Genome, Geometry};

use super::GenomeRng;

/// Builds a child genome from a receiver and a donor parent.
pub trait Recombinator {
    /// Produce a child from `receiver`, adopting structure from `donor`.
    ///
    /// `receiver_active` and `donor_active` are the parents' active paths.
    fn recombine(
        &self,
        rng: &mut GenomeRng,
        receiver: &Genome,
        receiver_active: &[usize],
        donor: &Genome,
        donor_active: &[usize],
        geometry: Geometry,
    ) -> Result<Genome, StructuralError>;

    /// Human-readable name.
    fn name(&self) -> &'static str;
}

/// Copies donor-active genes that are inactive in the receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveGeneTransplant {
    /// Probability of copying each candidate gene.
    pub rate: f64,
}

impl ActiveGeneTransplant {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl Recombinator for ActiveGeneTransplant {
    fn recombine(
        &self,
        rng: &mut GenomeRng,
        receiver: &Genome,
        receiver_active: &[usize],
        donor: &Genome,
        donor_active: &[usize],
        _geometry: Geometry,
    ) -> Result<Genome, StructuralError> {
        let mut child = receiver.clone();
        for &index in donor_active {
            if !receiver_active.contains(&index) && rng.coin(self.rate) {
                child.set_gene(index, donor.gene(index));
            }
        }
        Ok(child)
    }

    fn name(&self) -> &'static str {
        "Active Gene Transplant"
    }
}

/// Walks receiver and donor in lock-step from a shared active gene,
/// overwriting receiver operation codes with the donor's.
///
/// Operand pairs are followed with probability `rate` each. Operand values
/// themselves are kept; only slots the new operation reads or ignores are
/// repaired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubgraphExchange {
    /// Probability of following each operand pair.
    pub rate: f64,
}

impl SubgraphExchange {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl Recombinator for SubgraphExchange {
    fn recombine(
        &self,
        rng: &mut GenomeRng,
        receiver: &Genome,
        receiver_active: &[usize],
        donor: &Genome,
        donor_active: &[usize],
        geometry: Geometry,
    ) -> Result<Genome, StructuralError> {
        let mut child = receiver.clone();

        let shared: Vec<usize> = receiver_active
            .iter()
            .copied()
            .filter(|index| donor_active.contains(index))
            .collect();
        let Some(root) = rng.choose(&shared) else {
            return Ok(child);
        };

        let mut visited = vec![false; child.len()];
        // Pairs are pushed in reverse so they pop in operand order, giving a
        // depth-first preorder walk.
        let mut stack = vec![(root, root)];

        while let Some((r, d)) = stack.pop() {
            if visited[r] {
                continue;
            }

            let receiver_gene = child.gene(r);
            let donor_gene = donor.gene(d);
            if receiver_gene.is_terminal() || donor_gene.is_terminal() {
                continue;
            }

            match (receiver_gene.kind(), donor_gene.kind()) {
                (
                    Some(GeneKind::Output { source: r_source }),
                    Some(GeneKind::Output { source: d_source }),
                ) => {
                    stack.push((r_source, d_source));
                }
                (Some(GeneKind::Output { .. }), _) | (_, Some(GeneKind::Output { .. })) => {
                    return Err(StructuralError::OutputMismatch {
                        receiver: r,
                        donor: d,
                    });
                }
                (Some(GeneKind::Function { .. }), Some(GeneKind::Function { code })) => {
                    let op = Operation::from_code(code)
                        .ok_or(StructuralError::UnknownOperation { gene: d, code })?;

                    let mut next = Vec::with_capacity(GENE_WIDTH - 1);
                    for slot in 1..GENE_WIDTH {
                        if let (Some(a), Some(b)) = (receiver_gene.input(slot), donor_gene.input(slot))
                            && rng.coin(self.rate)
                        {
                            next.push((a, b));
                        }
                    }

                    let mut gene = receiver_gene;
                    rng.format_inputs(&mut gene, r, op, geometry)?;
                    gene.0[0] = op.code() as i32;
                    child.set_gene(r, gene);
                    visited[r] = true;

                    stack.extend(next.into_iter().rev());
                }
                (None, _) => {
                    return Err(StructuralError::MalformedGene {
                        gene: r,
                        alleles: receiver_gene.0,
                    });
                }
                (_, _) => {
                    return Err(StructuralError::MalformedGene {
                        gene: d,
                        alleles: donor_gene.0,
                    });
                }
            }
        }

        Ok(child)
    }

    fn name(&self) -> &'static str {
        "Subgraph Exchange"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::active_path;

    fn exchange(receiver: &[[i32; 3]], donor: &[[i32; 3]], rate: f64, seed: u64) -> Genome {
        let receiver = Genome::from_triples(receiver);
        let donor = Genome::from_triples(donor);
        let geometry = Geometry::new(1, receiver.len());
        SubgraphExchange::new(rate)
            .recombine(
                &mut GenomeRng::new(seed),
                &receiver,
                &active_path(&receiver).unwrap(),
                &donor,
                &active_path(&donor).unwrap(),
                geometry,
            )
            .unwrap()
    }

    fn parent1() -> Genome {
        Genome::from_triples(&[
            [-1, -1, -1],
            [0, 0, 0],
            [2, 0, 1],
            [2, 1, 1],
            [1, 2, 1],
            [0, 1, 2],
            [2, 2, 5],
            [0, 4, 5],
            [2, 6, 6],
            [-2, 8, -2],
        ])
    }

    fn parent2() -> Genome {
        Genome::from_triples(&[
            [-1, -1, -1],
            [1, 0, 0],
            [0, 0, 1],
            [3, 1, 1],
            [2, 1, 0],
            [2, 1, 2],
            [2, 2, 5],
            [1, 4, 5],
            [1, 6, 6],
            [-2, 7, -2],
        ])
    }

    #[test]
    fn test_subgraph_exchange_single_gene() {
        for seed in 0..10 {
            let child = exchange(
                &[[-1, -1, -1], [0, 0, 0], [-2, 1, -2]],
                &[[-1, -1, -1], [1, 0, 0], [-2, 1, -2]],
                1.0,
                seed,
            );
            assert_eq!(
                child,
                Genome::from_triples(&[[-1, -1, -1], [1, 0, 0], [-2, 1, -2]])
            );
        }
    }

    #[test]
    fn test_subgraph_exchange_formats_inputs() {
        for seed in 0..10 {
            let child = exchange(
                &[[-1, -1, -1], [0, 0, 0], [-2, 1, -2]],
                &[[-1, -1, -1], [5, 0, -1], [-2, 1, -2]],
                1.0,
                seed,
            );
            assert_eq!(
                child,
                Genome::from_triples(&[[-1, -1, -1], [5, 0, -1], [-2, 1, -2]])
            );
        }

        // Lock-step follows the output sources, not equal indices.
        let child = exchange(
            &[[-1, -1, -1], [0, 0, 0], [1, 0, 0], [-2, 2, -2]],
            &[[-1, -1, -1], [5, 0, -1], [0, 0, 0], [-2, 1, -2]],
            1.0,
            0,
        );
        assert_eq!(
            child,
            Genome::from_triples(&[[-1, -1, -1], [0, 0, 0], [5, 0, -1], [-2, 2, -2]])
        );
    }

    #[test]
    fn test_subgraph_exchange_follows_operands() {
        let child = exchange(
            &[
                [-1, -1, -1],
                [0, 0, 0],
                [1, 0, 0],
                [0, 0, 0],
                [1, 2, 0],
                [-2, 4, -2],
            ],
            &[
                [-1, -1, -1],
                [3, 0, 0],
                [0, 0, 0],
                [5, 1, -1],
                [0, 0, 0],
                [-2, 3, -2],
            ],
            1.0,
            0,
        );
        assert_eq!(
            child,
            Genome::from_triples(&[
                [-1, -1, -1],
                [0, 0, 0],
                [3, 0, 0],
                [0, 0, 0],
                [5, 2, -1],
                [-2, 4, -2],
            ])
        );
    }

    #[test]
    fn test_subgraph_exchange_leaves_parents() {
        let (p1, p2) = (parent1(), parent2());
        let (a1, a2) = (active_path(&p1).unwrap(), active_path(&p2).unwrap());
        let mut rng = GenomeRng::new(11);
        for _ in 0..20 {
            let child = SubgraphExchange::new(1.0)
                .recombine(&mut rng, &p1, &a1, &p2, &a2, Geometry::new(1, 10))
                .unwrap();
            assert!(active_path(&child).is_ok());
        }
        assert_eq!(p1, parent1());
        assert_eq!(p2, parent2());
    }

    #[test]
    fn test_subgraph_exchange_zero_rate_touches_root_only() {
        let (p1, p2) = (parent1(), parent2());
        let (a1, a2) = (active_path(&p1).unwrap(), active_path(&p2).unwrap());
        let mut rng = GenomeRng::new(12);
        for _ in 0..20 {
            let child = SubgraphExchange::new(0.0)
                .recombine(&mut rng, &p1, &a1, &p2, &a2, Geometry::new(1, 10))
                .unwrap();
            let changed: Vec<usize> = (0..p1.len())
                .filter(|&i| child.gene(i).code() != p1.gene(i).code())
                .collect();
            assert!(changed.len() <= 1, "changed: {changed:?}");
        }
    }

    #[test]
    fn test_subgraph_exchange_output_mismatch() {
        // The receiver's output source lines up with the donor's output gene.
        let receiver = Genome::from_triples(&[[-1, -1, -1], [0, 0, 0], [-2, 1, -2], [-2, 2, -2]]);
        let donor = Genome::from_triples(&[[-1, -1, -1], [0, 0, 0], [0, 1, 1], [-2, 1, -2]]);
        let result = SubgraphExchange::new(1.0).recombine(
            &mut GenomeRng::new(0),
            &receiver,
            &[3],
            &donor,
            &[3, 2],
            Geometry::new(1, 4),
        );
        assert_eq!(
            result,
            Err(StructuralError::OutputMismatch {
                receiver: 2,
                donor: 1
            })
        );
    }

    #[test]
    fn test_active_gene_transplant() {
        let (p1, p2) = (parent1(), parent2());
        let (a1, a2) = (active_path(&p1).unwrap(), active_path(&p2).unwrap());
        let geometry = Geometry::new(1, 10);
        let mut rng = GenomeRng::new(13);

        let child = ActiveGeneTransplant::new(1.0)
            .recombine(&mut rng, &p1, &a1, &p2, &a2, geometry)
            .unwrap();
        let mut expected = parent1();
        expected.set_gene(4, p2.gene(4));
        expected.set_gene(7, p2.gene(7));
        assert_eq!(child, expected);

        let child = ActiveGeneTransplant::new(0.0)
            .recombine(&mut rng, &p1, &a1, &p2, &a2, geometry)
            .unwrap();
        assert_eq!(child, p1);
    }

    #[test]
    fn test_recombined_children_are_well_formed() {
        let geometry = Geometry::new(2, 6);
        let mut rng = GenomeRng::new(14);
        for _ in 0..200 {
            let a = rng.random_genome(geometry).unwrap();
            let b = rng.random_genome(geometry).unwrap();
            let (aa, ab) = (active_path(&a).unwrap(), active_path(&b).unwrap());
            for child in [
                SubgraphExchange::new(0.5)
                    .recombine(&mut rng, &a, &aa, &b, &ab, geometry)
                    .unwrap(),
                ActiveGeneTransplant::new(0.5)
                    .recombine(&mut rng, &a, &aa, &b, &ab, geometry)
                    .unwrap(),
            ] {
                for (index, gene) in child.genes().iter().enumerate() {
                    if let Some(GeneKind::Function { code }) = gene.kind() {
                        let arity = Operation::from_code(code).unwrap().arity();
                        let bound = geometry.operand_bound(index) as i32;
                        assert!((0..bound).contains(&gene.operand(1)));
                        if arity == 2 {
                            assert!((0..bound).contains(&gene.operand(2)));
                        } else {
                            assert_eq!(gene.operand(2), -1);
                        }
                    }
                }
                assert!(active_path(&child).is_ok());
            }
        }
    }
}
