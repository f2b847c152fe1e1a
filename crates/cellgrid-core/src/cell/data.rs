//! Cell records and formula entities

use super::CellResult;

/// A parsed piece of a formula: an operator or a resolved cell reference
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum FormulaEntity {
    /// An operator such as `+`
    Operation { operation: String },

    /// A reference to another cell, highlighted with `border_color`
    Variable {
        row: usize,
        column: usize,
        /// A1 label derived from `row`/`column`
        address: String,
        /// Six hex digits, without `#`
        border_color: String,
    },
}

impl FormulaEntity {
    /// Create an operation entity
    pub fn operation<S: Into<String>>(operation: S) -> Self {
        FormulaEntity::Operation {
            operation: operation.into(),
        }
    }

    /// Create a variable entity for a cell, deriving its label
    pub fn variable<S: Into<String>>(row: usize, column: usize, border_color: S) -> Self {
        FormulaEntity::Variable {
            row,
            column,
            address: super::to_label(row, column),
            border_color: border_color.into(),
        }
    }

    /// Check if this is a cell reference
    pub fn is_variable(&self) -> bool {
        matches!(self, FormulaEntity::Variable { .. })
    }

    /// The A1 label of a variable entity
    pub fn address(&self) -> Option<&str> {
        match self {
            FormulaEntity::Variable { address, .. } => Some(address),
            FormulaEntity::Operation { .. } => None,
        }
    }

    /// The highlight color of a variable entity
    pub fn border_color(&self) -> Option<&str> {
        match self {
            FormulaEntity::Variable { border_color, .. } => Some(border_color),
            FormulaEntity::Operation { .. } => None,
        }
    }
}

/// Complete data for a single grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Raw user-entered text, may start with `=`
    pub value: String,
    /// Last computed display value
    pub result: CellResult,
    /// Entities of the formula in `value`, left to right
    pub formula_entities: Vec<FormulaEntity>,
    /// Cached layout: left edge in pixels
    pub x: f64,
    /// Cached layout: top edge in pixels
    pub y: f64,
    /// Cached layout: width in pixels
    pub width: f64,
    /// Cached layout: height in pixels
    pub height: f64,
}

impl Cell {
    /// Create an empty cell with the given geometry
    pub fn empty(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            value: String::new(),
            result: CellResult::Empty,
            formula_entities: Vec::new(),
            x,
            y,
            width,
            height,
        }
    }

    /// Check if the cell holds a formula
    pub fn is_formula(&self) -> bool {
        self.value.trim_start().starts_with('=')
    }

    /// Check if the cell has no value
    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Apply a partial update, then restore the value invariants
    pub fn apply(&mut self, patch: CellPatch) {
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(result) = patch.result {
            self.result = result;
        }
        if let Some(entities) = patch.formula_entities {
            self.formula_entities = entities;
        }
        self.normalize();
    }

    /// Clear everything except geometry
    pub fn clear(&mut self) {
        self.value.clear();
        self.normalize();
    }

    // Empty value clears result and entities; entities only survive on formulas.
    fn normalize(&mut self) {
        if self.is_empty() {
            self.value.clear();
            self.result = CellResult::Empty;
            self.formula_entities.clear();
        } else if !self.is_formula() {
            self.formula_entities.clear();
        }
    }
}

/// A partial cell update, merged field by field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellPatch {
    pub value: Option<String>,
    pub result: Option<CellResult>,
    pub formula_entities: Option<Vec<FormulaEntity>>,
}

impl CellPatch {
    /// A patch that only sets the value
    pub fn value<S: Into<String>>(value: S) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// A patch that only sets the result
    pub fn result<R: Into<CellResult>>(result: R) -> Self {
        Self {
            result: Some(result.into()),
            ..Default::default()
        }
    }

    /// Add a result to this patch
    pub fn with_result<R: Into<CellResult>>(mut self, result: R) -> Self {
        self.result = Some(result.into());
        self
    }

    /// Add formula entities to this patch
    pub fn with_entities(mut self, entities: Vec<FormulaEntity>) -> Self {
        self.formula_entities = Some(entities);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell() -> Cell {
        Cell::empty(0.0, 0.0, 100.0, 25.0)
    }

    #[test]
    fn test_empty_value_clears_result_and_entities() {
        let mut cell = cell();
        cell.apply(
            CellPatch::value("=A1")
                .with_result(3.0)
                .with_entities(vec![FormulaEntity::variable(0, 0, "ff0000")]),
        );
        assert_eq!(cell.formula_entities.len(), 1);

        cell.apply(CellPatch::value("   "));
        assert_eq!(cell.value, "");
        assert_eq!(cell.result, CellResult::Empty);
        assert!(cell.formula_entities.is_empty());
    }

    #[test]
    fn test_plain_value_drops_entities() {
        let mut cell = cell();
        cell.apply(CellPatch::value("=B2").with_entities(vec![FormulaEntity::variable(1, 1, "00ff00")]));
        cell.apply(CellPatch::value("hello"));
        assert!(cell.formula_entities.is_empty());
        assert!(!cell.is_formula());
    }

    #[test]
    fn test_result_only_patch_keeps_value() {
        let mut cell = cell();
        cell.apply(CellPatch::value("=1+1"));
        cell.apply(CellPatch::result(2.0));
        assert_eq!(cell.value, "=1+1");
        assert_eq!(cell.result.as_number(), Some(2.0));
    }

    #[test]
    fn test_result_on_empty_cell_is_dropped() {
        let mut cell = cell();
        cell.apply(CellPatch::result(9.0));
        assert_eq!(cell.result, CellResult::Empty);
    }

    #[test]
    fn test_variable_entity_derives_address() {
        let entity = FormulaEntity::variable(4, 27, "abcdef");
        assert_eq!(entity.address(), Some("AB5"));
        assert_eq!(entity.border_color(), Some("abcdef"));
        assert!(entity.is_variable());
        assert!(!FormulaEntity::operation("+").is_variable());
    }
}
