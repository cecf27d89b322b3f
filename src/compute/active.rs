//! Active-path (backward reachability) analysis.

use crate::schema::{GeneKind, Genome};

use super::StructuralError;
use super::operations::Operation;

/// Indices of all genes that influence the given output genes.
///
/// The search is breadth-first from `outputs`, following operand references
/// backwards. Output and function genes are reported in discovery order;
/// terminal genes end the search and are not reported. Discovery order is
/// not an evaluation order.
pub fn active_genes(genome: &Genome, outputs: &[usize]) -> Result<Vec<usize>, StructuralError> {
    let mut flagged = vec![false; genome.len()];
    let mut active = Vec::new();

    let mut frontier: Vec<usize> = Vec::with_capacity(outputs.len());
    for &index in outputs {
        if index >= genome.len() {
            return Err(StructuralError::OperandOutOfBounds {
                gene: index,
                operand: index,
            });
        }
        if !flagged[index] {
            flagged[index] = true;
            frontier.push(index);
        }
    }

    while !frontier.is_empty() {
        let mut next = Vec::new();

        for &index in &frontier {
            let gene = genome.gene(index);
            let operands = match gene.kind() {
                Some(GeneKind::Terminal) => continue,
                Some(GeneKind::Output { .. }) => 1,
                Some(GeneKind::Function { code }) => Operation::from_code(code)
                    .ok_or(StructuralError::UnknownOperation { gene: index, code })?
                    .arity(),
                None => {
                    return Err(StructuralError::MalformedGene {
                        gene: index,
                        alleles: gene.0,
                    });
                }
            };

            active.push(index);

            for slot in 1..=operands {
                let operand = gene.input(slot).ok_or(StructuralError::MalformedGene {
                    gene: index,
                    alleles: gene.0,
                })?;
                if operand >= genome.len() {
                    return Err(StructuralError::OperandOutOfBounds {
                        gene: index,
                        operand,
                    });
                }
                if !flagged[operand] {
                    flagged[operand] = true;
                    next.push(operand);
                }
            }
        }

        frontier = next;
    }

    Ok(active)
}

/// Active path of a genome's own output genes.
pub fn active_path(genome: &Genome) -> Result<Vec<usize>, StructuralError> {
    active_genes(genome, &genome.output_indices())
}
