//! Genome decoding and fitness scoring.

use crate::schema::{ErrorMetric, GeneKind, Genome};

use super::StructuralError;
use super::operations::Operation;

/// Evaluate a genome's active subgraph over a batch of samples.
///
/// `inputs[i]` holds external input `i` for every sample; the result holds
/// the output gene's value for every sample.
///
/// The scratch matrix has one row per external input followed by one row
/// per active gene. Rows are computed by repeated relaxation: every pass
/// re-executes every active gene against the current rows of its operands,
/// and `active.len()` passes are enough for the longest dependency chain to
/// settle, whatever order `active` lists genes in.
pub fn evaluate(
    genome: &Genome,
    active: &[usize],
    inputs: &[Vec<f64>],
) -> Result<Vec<f64>, StructuralError> {
    if let Some(&index) = active.iter().find(|&&index| index >= genome.len()) {
        return Err(StructuralError::ActiveGeneOutOfBounds {
            index,
            len: genome.len(),
        });
    }
    let &output = active.first().ok_or(StructuralError::MissingOutput)?;
    if !genome.gene(output).is_output() {
        return Err(StructuralError::MissingOutput);
    }

    let n_inputs = inputs.len();
    let samples = inputs.first().map_or(0, Vec::len);

    // Gene index -> scratch row.
    let mut rows: Vec<Option<usize>> = vec![None; genome.len()];
    for (row, slot) in rows.iter_mut().enumerate().take(n_inputs) {
        *slot = Some(row);
    }
    for (offset, &index) in active.iter().enumerate() {
        rows[index] = Some(n_inputs + offset);
    }

    let mut scratch: Vec<Vec<f64>> = Vec::with_capacity(n_inputs + active.len());
    scratch.extend(inputs.iter().cloned());
    scratch.resize(n_inputs + active.len(), vec![0.0; samples]);

    let row_of = |gene: usize, operand: Option<usize>| -> Result<usize, StructuralError> {
        let operand = operand.ok_or(StructuralError::MalformedGene {
            gene,
            alleles: genome.gene(gene).0,
        })?;
        rows.get(operand)
            .copied()
            .flatten()
            .ok_or(StructuralError::UnmappedOperand { gene, operand })
    };

    for _ in 0..active.len() {
        for (offset, &index) in active.iter().enumerate() {
            let gene = genome.gene(index);
            let target = n_inputs + offset;

            match gene.kind() {
                Some(GeneKind::Terminal) => {}
                Some(GeneKind::Output { source }) => {
                    let source = row_of(index, Some(source))?;
                    let mut out = std::mem::take(&mut scratch[target]);
                    out.copy_from_slice(&scratch[source]);
                    scratch[target] = out;
                }
                Some(GeneKind::Function { code }) => {
                    let op = Operation::from_code(code)
                        .ok_or(StructuralError::UnknownOperation { gene: index, code })?;
                    let lhs = row_of(index, gene.input(1))?;
                    let rhs = if op.arity() == 2 {
                        row_of(index, gene.input(2))?
                    } else {
                        lhs
                    };
                    let mut out = std::mem::take(&mut scratch[target]);
                    op.apply(&scratch[lhs], &scratch[rhs], &mut out);
                    scratch[target] = out;
                }
                None => {
                    return Err(StructuralError::MalformedGene {
                        gene: index,
                        alleles: gene.0,
                    });
                }
            }
        }
    }

    Ok(std::mem::take(&mut scratch[n_inputs]))
}

/// Fitness of an evaluated output against its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Error under the configured metric; NaN is reported as infinity.
    pub fitness: f64,
    /// Every per-sample absolute difference is within tolerance.
    pub acceptable: bool,
}

/// Score `output` against `target`.
pub fn score(output: &[f64], target: &[f64], metric: ErrorMetric, tolerance: f64) -> Evaluation {
    let diffs = output.iter().zip(target).map(|(o, t)| (t - o).abs());

    let error: f64 = match metric {
        ErrorMetric::AbsoluteError => diffs.clone().sum(),
        ErrorMetric::SquaredError => diffs.clone().map(|d| d * d).sum(),
    };

    Evaluation {
        fitness: if error.is_nan() { f64::INFINITY } else { error },
        acceptable: diffs.into_iter().all(|d| d <= tolerance),
    }
}
