//! Formula error types

use cellgrid_core::CellError;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing or evaluating a formula
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Reference to a cell outside the grid
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Formula refers back to itself
    #[error("Circular reference involving {0}")]
    CircularReference(String),
}

impl FormulaError {
    /// The error marker stored in the cell for this failure
    pub fn to_cell_error(&self) -> CellError {
        match self {
            FormulaError::Parse(_) => CellError::Parse,
            FormulaError::InvalidReference(_) | FormulaError::CircularReference(_) => CellError::Ref,
        }
    }
}
