//! # cellgrid-core
//!
//! Core data structures for the cellgrid spreadsheet editor.
//!
//! This crate provides the fundamental types used throughout cellgrid:
//! - [`to_label`] / [`from_label`] - A1 label codec
//! - [`Cell`], [`CellResult`], [`FormulaEntity`] - per-cell records
//! - [`CellStore`] - the cell matrix with column widths and row heights
//! - [`RangeSelection`] and [`FillSelection`] - selection geometry
//!
//! ## Example
//!
//! ```rust
//! use cellgrid_core::{CellAddress, CellPatch, CellStore, GridConfig, RangeSelection};
//!
//! let mut store = CellStore::new(&GridConfig::new(10, 5));
//! store.set_cell_data(0, 0, CellPatch::value("5"));
//!
//! let mut selection = RangeSelection::new();
//! selection.anchor(CellAddress::new(0, 0));
//! selection.extend(&store, Some(CellAddress::new(1, 1)));
//! assert_eq!(selection.rect().unwrap().width, 200.0);
//! ```

pub mod cell;
pub mod config;
pub mod error;
pub mod selection;
pub mod store;

// Re-exports for convenience
pub use cell::{
    column_label, column_labels, from_label, to_label, Cell, CellAddress, CellError, CellPatch,
    CellRange, CellResult, FormulaEntity,
};
pub use config::GridConfig;
pub use error::{Error, Result};
pub use selection::{FillDirection, FillRect, FillSelection, Layout, RangeSelection, SelectionRect};
pub use store::{CellStore, InsertPosition};
