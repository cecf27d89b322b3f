//! Compute module - Genome analysis, decoding and evolutionary search.

mod active;
mod decode;
mod operations;

pub mod evolution;

pub use active::*;
pub use decode::*;
pub use operations::*;

/// A genome that violates the grid's structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("gene {gene} in column {column} has no legal operand (rows = {rows})")]
    EmptyOperandRange {
        gene: usize,
        column: usize,
        rows: usize,
    },

    #[error("gene {receiver} is an output gene but donor gene {donor} is not, or vice versa")]
    OutputMismatch { receiver: usize, donor: usize },

    #[error("gene {gene} has unknown operation code {code}")]
    UnknownOperation { gene: usize, code: usize },

    #[error("gene {gene} is malformed: {alleles:?}")]
    MalformedGene { gene: usize, alleles: [i32; 3] },

    #[error("gene {gene} references operand {operand} outside the genome")]
    OperandOutOfBounds { gene: usize, operand: usize },

    #[error("gene {gene} references gene {operand}, which has no evaluated value")]
    UnmappedOperand { gene: usize, operand: usize },

    #[error("active path does not start at an output gene")]
    MissingOutput,

    #[error("active gene {index} is outside a genome of {len} genes")]
    ActiveGeneOutOfBounds { index: usize, len: usize },

    #[error("slot {slot} is not a {kind} slot of a population of {len}")]
    SlotOutOfRange {
        slot: usize,
        kind: &'static str,
        len: usize,
    },

    #[error("expected {expected} children, got {actual}")]
    ChildCountMismatch { expected: usize, actual: usize },
}
