//! # cellgrid
//!
//! The state behind a spreadsheet widget: a grid of cells with formulas,
//! range selection, fill drag and formula reference picking.
//!
//! Rendering and input wiring live outside this crate. A host translates
//! clicks, drags and keystrokes into calls on [`SpreadsheetState`], listens
//! for [`StateEvent`]s and redraws from the getters.
//!
//! ## Features
//!
//! - Dense cell store with independent column widths and row heights
//! - Range selection and single-axis fill drag rectangles
//! - Formula reference picking with colored markers
//! - Pluggable formula evaluation (a small arithmetic evaluator is built in)
//! - JSON session snapshots
//!
//! ## Example
//!
//! ```rust
//! use cellgrid::prelude::*;
//!
//! let mut state = SpreadsheetState::new(GridConfig::new(50, 30)).unwrap();
//!
//! state.set_active_cell(CellAddress::new(0, 0));
//! state.type_text("5");
//! state.commit();
//!
//! state.set_active_cell(CellAddress::new(0, 1));
//! state.type_text("=A1+10");
//! let resolution = state.commit().unwrap();
//!
//! assert!(resolution.evaluated);
//! assert_eq!(resolution.result, CellResult::Number(15.0));
//! ```

pub mod events;
pub mod prelude;
pub mod snapshot;
pub mod state;

pub use events::{EventCallback, StateEvent};
pub use snapshot::{PersistedCell, SessionSnapshot};
pub use state::{Movement, SpreadsheetState};

// Re-export core types
pub use cellgrid_core::{
    column_label, column_labels, from_label, to_label, Cell, CellAddress, CellError, CellPatch,
    CellRange, CellResult, CellStore, Error, FillDirection, FillRect, FillSelection,
    FormulaEntity, GridConfig, InsertPosition, Layout, RangeSelection, Result, SelectionRect,
};

// Re-export formula types
pub use cellgrid_formula::{
    parse_formula, tokenize, ArithmeticEvaluator, CellLookup, ColorSource, FoldOutcome,
    FormulaError, FormulaEvaluator, FormulaMarker, PaletteColors, RandomColors, Resolution,
    Scalar, TokenKind,
};
