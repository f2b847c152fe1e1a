//! Cell store
//!
//! Owns the dense matrix of [`Cell`] records together with the column width
//! and row height tables. Cell geometry is cached on each cell and kept in sync
//! by the resize and insert operations; nothing else touches it.

use crate::cell::{Cell, CellAddress, CellPatch, CellResult};
use crate::config::{is_valid_size, GridConfig};
use crate::selection::Layout;
use tracing::debug;

/// Where a new row or column goes relative to the target index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Insert at the target index, pushing the target down/right
    Before,
    /// Insert just after the target index
    After,
}

impl InsertPosition {
    /// Splice index for a target index: `Before ⇒ index`, `After ⇒ index + 1`
    ///
    /// Saturates at `usize::MAX`; the store clamps to its current count.
    pub fn splice_index(self, index: usize) -> usize {
        match self {
            InsertPosition::Before => index,
            InsertPosition::After => index.saturating_add(1),
        }
    }
}

/// Dense row-major storage for grid cells
#[derive(Debug, Clone)]
pub struct CellStore {
    cells: Vec<Vec<Cell>>,
    column_widths: Vec<f64>,
    row_heights: Vec<f64>,
    default_column_width: f64,
    default_row_height: f64,
}

impl CellStore {
    /// Allocate a grid of empty cells
    pub fn new(config: &GridConfig) -> Self {
        let mut store = Self {
            cells: Vec::new(),
            column_widths: vec![config.default_column_width; config.columns],
            row_heights: vec![config.default_row_height; config.rows],
            default_column_width: config.default_column_width,
            default_row_height: config.default_row_height,
        };
        let cells = (0..config.rows)
            .map(|row| (0..config.columns).map(|col| store.new_cell(row, col)).collect())
            .collect();
        store.cells = cells;
        store.relayout();
        store
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.row_heights.len()
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.column_widths.len()
    }

    /// Get a cell, or `None` when out of range
    pub fn get(&self, row: usize, column: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(column))
    }

    pub(crate) fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut Cell> {
        self.cells.get_mut(row).and_then(|r| r.get_mut(column))
    }

    /// Check if a coordinate is inside the grid
    pub fn contains(&self, row: usize, column: usize) -> bool {
        row < self.rows() && column < self.columns()
    }

    /// Merge a partial update into a cell
    ///
    /// Returns `false` (and does nothing) when the coordinate is out of range.
    pub fn set_cell_data(&mut self, row: usize, column: usize, patch: CellPatch) -> bool {
        match self.get_mut(row, column) {
            Some(cell) => {
                cell.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Store a computed result
    pub fn set_result(&mut self, row: usize, column: usize, result: CellResult) -> bool {
        self.set_cell_data(row, column, CellPatch::result(result))
    }

    /// Clear a cell's value, result and entities
    pub fn clear_cell(&mut self, row: usize, column: usize) -> bool {
        match self.get_mut(row, column) {
            Some(cell) => {
                cell.clear();
                true
            }
            None => false,
        }
    }

    /// Insert one row of empty cells next to `index`
    ///
    /// The splice index is clamped to the row count, so inserting after the
    /// last row appends.
    pub fn insert_row_at(&mut self, index: usize, position: InsertPosition) -> usize {
        let at = position.splice_index(index).min(self.rows());
        let row: Vec<Cell> = (0..self.columns()).map(|col| self.new_cell(at, col)).collect();

        self.cells.insert(at, row);
        self.row_heights.insert(at, self.default_row_height);
        self.layout_rows_from(at);

        debug!(index, ?position, at, rows = self.rows(), "inserted row");
        at
    }

    /// Insert one column of empty cells next to `index`
    pub fn insert_column_at(&mut self, index: usize, position: InsertPosition) -> usize {
        let at = position.splice_index(index).min(self.columns());

        self.column_widths.insert(at, self.default_column_width);
        for row in 0..self.cells.len() {
            let cell = self.new_cell(row, at);
            self.cells[row].insert(at, cell);
        }
        self.layout_columns_from(at);

        debug!(index, ?position, at, columns = self.columns(), "inserted column");
        at
    }

    /// Width of a column, or `None` when out of range
    pub fn column_width(&self, index: usize) -> Option<f64> {
        self.column_widths.get(index).copied()
    }

    /// Resize one column; other columns keep their width
    ///
    /// Returns `false` for an out-of-range index or an unusable width.
    pub fn set_column_width(&mut self, index: usize, width: f64) -> bool {
        if index >= self.columns() || !is_valid_size(width) {
            return false;
        }
        self.column_widths[index] = width;
        self.layout_columns_from(index);
        debug!(index, width, "resized column");
        true
    }

    /// Height of a row, or `None` when out of range
    pub fn row_height(&self, index: usize) -> Option<f64> {
        self.row_heights.get(index).copied()
    }

    /// Resize one row; other rows keep their height
    pub fn set_row_height(&mut self, index: usize, height: f64) -> bool {
        if index >= self.rows() || !is_valid_size(height) {
            return false;
        }
        self.row_heights[index] = height;
        self.layout_rows_from(index);
        debug!(index, height, "resized row");
        true
    }

    /// All column widths, left to right
    pub fn column_widths(&self) -> &[f64] {
        &self.column_widths
    }

    /// All row heights, top to bottom
    pub fn row_heights(&self) -> &[f64] {
        &self.row_heights
    }

    /// Raw cell values as a matrix, for formula evaluation
    pub fn snapshot_values(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.value.clone()).collect())
            .collect()
    }

    /// Iterate over every cell in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &Cell)> {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, cell)| (CellAddress::new(row, col), cell))
        })
    }

    /// Iterate over the rows of the grid
    pub fn row_cells(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }

    fn new_cell(&self, row: usize, col: usize) -> Cell {
        Cell::empty(
            0.0,
            0.0,
            self.column_widths.get(col).copied().unwrap_or(self.default_column_width),
            self.row_heights.get(row).copied().unwrap_or(self.default_row_height),
        )
    }

    fn relayout(&mut self) {
        self.layout_rows_from(0);
        self.layout_columns_from(0);
    }

    // Columns before `from` keep their x; everything right of it shifts.
    fn layout_columns_from(&mut self, from: usize) {
        let mut x: f64 = self.column_widths[..from.min(self.columns())].iter().sum();
        for (col, &width) in self.column_widths.iter().enumerate().skip(from) {
            for row in self.cells.iter_mut() {
                if let Some(cell) = row.get_mut(col) {
                    cell.x = x;
                    cell.width = width;
                }
            }
            x += width;
        }
    }

    fn layout_rows_from(&mut self, from: usize) {
        let mut y: f64 = self.row_heights[..from.min(self.rows())].iter().sum();
        for (row, &height) in self.row_heights.iter().enumerate().skip(from) {
            if let Some(cells) = self.cells.get_mut(row) {
                for cell in cells.iter_mut() {
                    cell.y = y;
                    cell.height = height;
                }
            }
            y += height;
        }
    }
}

impl Layout for CellStore {
    fn column_width(&self, column: usize) -> Option<f64> {
        CellStore::column_width(self, column)
    }

    fn row_height(&self, row: usize) -> Option<f64> {
        CellStore::row_height(self, row)
    }

    fn cell_origin(&self, row: usize, column: usize) -> Option<(f64, f64)> {
        self.get(row, column).map(|cell| (cell.x, cell.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::FormulaEntity;
    use pretty_assertions::assert_eq;

    fn store(rows: usize, columns: usize) -> CellStore {
        CellStore::new(&GridConfig::new(rows, columns))
    }

    #[test]
    fn test_allocation() {
        let store = store(50, 30);
        assert_eq!(store.rows(), 50);
        assert_eq!(store.columns(), 30);
        assert!(store.cells().all(|(_, cell)| cell.is_empty()));

        let cell = store.get(2, 3).unwrap();
        assert_eq!(cell.x, 300.0);
        assert_eq!(cell.y, 50.0);
    }

    #[test]
    fn test_get_out_of_range() {
        let store = store(3, 3);
        assert!(store.get(3, 0).is_none());
        assert!(store.get(0, 3).is_none());
        assert!(store.get(usize::MAX, usize::MAX).is_none());
    }

    #[test]
    fn test_set_cell_data() {
        let mut store = store(3, 3);
        assert!(store.set_cell_data(1, 1, CellPatch::value("42")));
        assert_eq!(store.get(1, 1).unwrap().value, "42");
        assert!(!store.set_cell_data(5, 5, CellPatch::value("x")));
    }

    #[test]
    fn test_empty_value_invariant() {
        let mut store = store(3, 3);
        store.set_cell_data(
            0,
            0,
            CellPatch::value("=B1")
                .with_result(7.0)
                .with_entities(vec![FormulaEntity::variable(0, 1, "123456")]),
        );
        store.set_cell_data(0, 0, CellPatch::value(""));

        let cell = store.get(0, 0).unwrap();
        assert!(cell.formula_entities.is_empty());
        assert_eq!(cell.result, CellResult::Empty);
    }

    #[test]
    fn test_insert_row_before_and_after() {
        let mut store = store(3, 2);
        store.set_cell_data(1, 0, CellPatch::value("middle"));

        assert_eq!(store.insert_row_at(1, InsertPosition::Before), 1);
        assert_eq!(store.rows(), 4);
        assert_eq!(store.get(2, 0).unwrap().value, "middle");
        assert!(store.get(1, 0).unwrap().is_empty());

        assert_eq!(store.insert_row_at(2, InsertPosition::After), 3);
        assert_eq!(store.rows(), 5);
        assert_eq!(store.get(2, 0).unwrap().value, "middle");
        assert_eq!(store.get(3, 0).unwrap().y, 75.0);
        assert_eq!(store.get(4, 1).unwrap().y, 100.0);
    }

    #[test]
    fn test_insert_row_past_end_appends() {
        let mut store = store(2, 2);
        assert_eq!(store.insert_row_at(10, InsertPosition::After), 2);
        assert_eq!(store.rows(), 3);
        assert_eq!(store.row_cells().last().unwrap().len(), 2);
    }

    #[test]
    fn test_insert_at_max_index_appends() {
        assert_eq!(InsertPosition::After.splice_index(usize::MAX), usize::MAX);

        let mut store = store(2, 2);
        assert_eq!(store.insert_row_at(usize::MAX, InsertPosition::After), 2);
        assert_eq!(store.insert_column_at(usize::MAX, InsertPosition::After), 2);
        assert_eq!(store.insert_row_at(usize::MAX, InsertPosition::Before), 3);
        assert_eq!(store.rows(), 4);
        assert_eq!(store.columns(), 3);
    }

    #[test]
    fn test_insert_column() {
        let mut store = store(2, 3);
        store.set_cell_data(0, 1, CellPatch::value("b"));
        store.set_column_width(1, 40.0);

        assert_eq!(store.insert_column_at(1, InsertPosition::Before), 1);
        assert_eq!(store.columns(), 4);
        assert!(store.row_cells().all(|row| row.len() == 4));
        assert_eq!(store.get(0, 2).unwrap().value, "b");
        assert_eq!(store.column_widths(), &[100.0, 100.0, 40.0, 100.0]);
        assert_eq!(store.get(1, 3).unwrap().x, 240.0);
    }

    #[test]
    fn test_column_resize_is_independent() {
        let mut store = store(2, 4);
        assert!(store.set_column_width(1, 250.0));

        assert_eq!(store.column_width(0), Some(100.0));
        assert_eq!(store.column_width(1), Some(250.0));
        assert_eq!(store.column_width(2), Some(100.0));
        assert_eq!(store.column_width(3), Some(100.0));

        // Geometry to the right shifts, widths do not
        assert_eq!(store.get(0, 2).unwrap().x, 350.0);
        assert_eq!(store.get(1, 1).unwrap().width, 250.0);
    }

    #[test]
    fn test_resize_rejects_bad_input() {
        let mut store = store(2, 2);
        assert!(!store.set_column_width(2, 10.0));
        assert!(!store.set_column_width(0, f64::INFINITY));
        assert!(!store.set_row_height(0, -5.0));
        assert_eq!(store.column_width(0), Some(100.0));
    }

    #[test]
    fn test_row_resize() {
        let mut store = store(3, 1);
        assert!(store.set_row_height(0, 60.0));
        assert_eq!(store.get(1, 0).unwrap().y, 60.0);
        assert_eq!(store.get(2, 0).unwrap().y, 85.0);
        assert_eq!(store.row_height(1), Some(25.0));
    }

    #[test]
    fn test_snapshot_values() {
        let mut store = store(2, 2);
        store.set_cell_data(0, 0, CellPatch::value("5"));
        store.set_cell_data(1, 1, CellPatch::value("=A1"));

        assert_eq!(
            store.snapshot_values(),
            vec![
                vec!["5".to_string(), String::new()],
                vec![String::new(), "=A1".to_string()],
            ]
        );
    }

    #[test]
    fn test_clear_cell() {
        let mut store = store(1, 1);
        store.set_cell_data(0, 0, CellPatch::value("x").with_result("x"));
        assert!(store.clear_cell(0, 0));
        assert!(store.get(0, 0).unwrap().is_empty());
        assert!(!store.clear_cell(1, 1));
    }
}
