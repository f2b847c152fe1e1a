//! # cellgrid-formula
//!
//! Formula editing and evaluation for cellgrid.
//!
//! This crate provides:
//! - Formula tokenizing and entity derivation ([`tokenize`], [`entities_from_formula`])
//! - The reference tracker used while a formula is edited ([`FormulaTracker`])
//! - The evaluation bridge between a [`CellStore`](cellgrid_core::CellStore)
//!   and a [`FormulaEvaluator`] ([`resolve`], [`recalculate`])
//! - A built-in arithmetic evaluator ([`ArithmeticEvaluator`])
//!
//! ## Example
//!
//! ```rust
//! use cellgrid_core::{CellPatch, CellResult, CellStore, GridConfig};
//! use cellgrid_formula::{resolve, ArithmeticEvaluator};
//!
//! let mut store = CellStore::new(&GridConfig::new(5, 5));
//! store.set_cell_data(0, 0, CellPatch::value("5"));
//! store.set_cell_data(0, 1, CellPatch::value("=A1+10"));
//!
//! let resolution = resolve(&mut store, 0, 1, &ArithmeticEvaluator).unwrap();
//! assert!(resolution.evaluated);
//! assert_eq!(resolution.result, CellResult::Number(15.0));
//! ```

pub mod ast;
pub mod bridge;
pub mod color;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod tokenizer;
pub mod tracker;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use bridge::{recalculate, resolve, CellLookup, FormulaEvaluator, Resolution, Scalar, SnapshotLookup};
pub use color::{ColorSource, PaletteColors, RandomColors};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::ArithmeticEvaluator;
pub use parser::parse_formula;
pub use tokenizer::{count_by_kind, entities_from_formula, is_operator, tokenize, EntityCounts, Token, TokenKind};
pub use tracker::{FoldOutcome, FormulaMarker, FormulaTracker};
