//! Genome representation for Cartesian Genetic Programming.
//!
//! A genome is a flat, column-major list of genes laid out on a
//! `rows x columns` grid. Column 0 holds one terminal gene per external
//! input, the last gene of the last column is the single output gene, and
//! every other gene is a function gene.

use serde::{Deserialize, Serialize};

/// Operation code marking a terminal (external input) gene.
pub const TERMINAL: i32 = -1;
/// Operation code marking the output gene.
pub const OUTPUT: i32 = -2;
/// Value of an operand slot that the gene's operation does not use.
pub const UNUSED: i32 = -1;
/// Number of alleles in every gene: the operation code and two operands.
pub const GENE_WIDTH: usize = 3;

/// A single grid cell: `(code, in1, in2)`.
///
/// - terminal: `[-1, -1, -1]`
/// - function: `[op, a, b]` where `b` is `-1` for unary operations
/// - output:   `[-2, source, -2]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gene(pub [i32; GENE_WIDTH]);

/// Decoded view of a gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneKind {
    /// External input, carries no computation.
    Terminal,
    /// Copies the value of the referenced gene.
    Output { source: usize },
    /// Applies the operation with the given code to its operands.
    Function { code: usize },
}

impl Gene {
    /// Terminal gene.
    pub const fn terminal() -> Self {
        Self([TERMINAL, TERMINAL, TERMINAL])
    }

    /// Output gene copying `source`.
    pub const fn output(source: usize) -> Self {
        Self([OUTPUT, source as i32, OUTPUT])
    }

    /// Function gene with explicit operand slots (`None` = unused).
    pub fn function(code: usize, first: Option<usize>, second: Option<usize>) -> Self {
        let slot = |input: Option<usize>| input.map_or(UNUSED, |i| i as i32);
        Self([code as i32, slot(first), slot(second)])
    }

    /// Raw operation code.
    #[inline]
    pub fn code(&self) -> i32 {
        self.0[0]
    }

    /// Raw value of operand slot `slot` (1 or 2).
    #[inline]
    pub fn operand(&self, slot: usize) -> i32 {
        self.0[slot]
    }

    /// Operand slot `slot` as a gene index, if it holds one.
    #[inline]
    pub fn input(&self, slot: usize) -> Option<usize> {
        usize::try_from(self.0[slot]).ok()
    }

    pub fn is_terminal(&self) -> bool {
        self.code() == TERMINAL
    }

    pub fn is_output(&self) -> bool {
        self.code() == OUTPUT
    }

    /// Classify the gene by its operation code.
    ///
    /// Returns `None` for a negative code that is neither sentinel, or for
    /// an output gene without a valid source.
    pub fn kind(&self) -> Option<GeneKind> {
        match self.code() {
            TERMINAL => Some(GeneKind::Terminal),
            OUTPUT => self.input(1).map(|source| GeneKind::Output { source }),
            code => usize::try_from(code)
                .ok()
                .map(|code| GeneKind::Function { code }),
        }
    }
}

impl From<[i32; GENE_WIDTH]> for Gene {
    fn from(alleles: [i32; GENE_WIDTH]) -> Self {
        Self(alleles)
    }
}

/// Ordered list of genes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    genes: Vec<Gene>,
}

impl Genome {
    pub fn new(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    /// Build a genome from raw `(code, in1, in2)` triples.
    pub fn from_triples(triples: &[[i32; GENE_WIDTH]]) -> Self {
        Self {
            genes: triples.iter().copied().map(Gene).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    #[inline]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    #[inline]
    pub fn gene(&self, index: usize) -> Gene {
        self.genes[index]
    }

    #[inline]
    pub fn gene_mut(&mut self, index: usize) -> &mut Gene {
        &mut self.genes[index]
    }

    pub fn set_gene(&mut self, index: usize, gene: Gene) {
        self.genes[index] = gene;
    }

    /// Indices of all output genes.
    pub fn output_indices(&self) -> Vec<usize> {
        self.genes
            .iter()
            .enumerate()
            .filter(|(_, gene)| gene.is_output())
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of leading terminal genes.
    pub fn input_count(&self) -> usize {
        self.genes.iter().take_while(|g| g.is_terminal()).count()
    }
}

/// Grid shape of a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    /// Genes per column; also the number of external inputs.
    pub rows: usize,
    /// Number of columns, including the terminal column.
    pub columns: usize,
}

impl Geometry {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    /// Total number of genes (`rows * columns`).
    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.columns
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column of the gene at flat index `index`.
    #[inline]
    pub fn column_of(&self, index: usize) -> usize {
        index / self.rows
    }

    /// Exclusive upper bound of the legal operand range for `index`.
    ///
    /// Every gene in a strictly earlier column is a legal operand, so the
    /// legal range is `[0, column * rows)`.
    #[inline]
    pub fn operand_bound(&self, index: usize) -> usize {
        self.column_of(index) * self.rows
    }

    /// Flat index of the output gene.
    #[inline]
    pub fn output_index(&self) -> usize {
        self.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gene_kinds() {
        assert_eq!(Gene::terminal().kind(), Some(GeneKind::Terminal));
        assert_eq!(Gene::output(4).kind(), Some(GeneKind::Output { source: 4 }));
        assert_eq!(
            Gene::function(2, Some(0), Some(1)).kind(),
            Some(GeneKind::Function { code: 2 })
        );
        assert_eq!(Gene([-3, 0, 0]).kind(), None);
        assert_eq!(Gene::function(4, Some(1), None).0, [4, 1, -1]);
    }

    #[test]
    fn test_genome_column_layout() {
        let geometry = Geometry::new(2, 5);
        assert_eq!(geometry.column_of(0), 0);
        assert_eq!(geometry.column_of(1), 0);
        assert_eq!(geometry.column_of(2), 1);
        assert_eq!(geometry.column_of(9), 4);
        assert_eq!(geometry.output_index(), 9);
    }

    #[test]
    fn test_operand_bound() {
        let geometry = Geometry::new(3, 3);
        for (index, bound) in [(0, 0), (1, 0), (2, 0), (3, 3), (4, 3), (5, 3), (6, 6), (8, 6)] {
            assert_eq!(geometry.operand_bound(index), bound, "index {index}");
        }
        assert_eq!(Geometry::new(1, 4).operand_bound(2), 2);
    }

    #[test]
    fn test_output_indices() {
        let genome = Genome::from_triples(&[[-1, -1, -1], [0, 0, 0], [2, 0, 1], [-2, 2, -2]]);
        assert_eq!(genome.output_indices(), vec![3]);
        assert_eq!(genome.input_count(), 1);
    }

    #[test]
    fn test_genome_serializes_as_triples() {
        let genome = Genome::from_triples(&[[-1, -1, -1], [4, 0, -1], [-2, 1, -2]]);
        let json = serde_json::to_string(&genome).unwrap();
        assert_eq!(json, "[[-1,-1,-1],[4,0,-1],[-2,1,-2]]");
        let parsed: Genome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, genome);
    }
}
