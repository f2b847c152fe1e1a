//! Prelude module - common imports for cellgrid users
//!
//! ```rust
//! use cellgrid::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellError,
    CellPatch,
    CellRange,
    CellResult,

    // Configuration
    GridConfig,
    InsertPosition,

    // Error types
    Error,
    Result,

    // Evaluation
    FormulaEvaluator,
    Resolution,

    // Geometry
    SelectionRect,

    // Main types
    Movement,
    SessionSnapshot,
    SpreadsheetState,
    StateEvent,
};
