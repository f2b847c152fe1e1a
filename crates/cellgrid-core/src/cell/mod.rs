//! Cell-related types and utilities
//!
//! This module contains:
//! - [`to_label`] / [`from_label`] - the A1 label codec
//! - [`CellAddress`] and [`CellRange`] - cell locations
//! - [`Cell`] and [`FormulaEntity`] - the per-cell record
//! - [`CellResult`] and [`CellError`] - computed values

mod address;
mod data;
mod value;

pub use address::{column_label, column_labels, from_label, to_label, CellAddress, CellRange};
pub use data::{Cell, CellPatch, FormulaEntity};
pub use value::{CellError, CellResult};
