//! Session save/restore boundary
//!
//! A [`SessionSnapshot`] holds what outlives an editing session: cell values,
//! results and formula entities, plus the column width and row height tables.
//! Selection, fill drag, formula markers and the active cell are ephemeral and
//! are never persisted. The storage medium is up to the caller; the snapshot
//! only converts to and from JSON.

use cellgrid_core::{CellPatch, CellResult, CellStore, Error, FormulaEntity, GridConfig, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Persisted form of one cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedCell {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub result: CellResult,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formula_entities: Vec<FormulaEntity>,
}

/// Persisted grid contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub rows: usize,
    pub columns: usize,
    pub cells: Vec<Vec<PersistedCell>>,
    pub column_widths: Vec<f64>,
    pub row_heights: Vec<f64>,
}

impl SessionSnapshot {
    /// Capture the persistent part of a store
    pub fn capture(store: &CellStore) -> Self {
        let cells = store
            .row_cells()
            .map(|row| {
                row.iter()
                    .map(|cell| PersistedCell {
                        value: cell.value.clone(),
                        result: cell.result.clone(),
                        formula_entities: cell.formula_entities.clone(),
                    })
                    .collect()
            })
            .collect();

        Self {
            rows: store.rows(),
            columns: store.columns(),
            cells,
            column_widths: store.column_widths().to_vec(),
            row_heights: store.row_heights().to_vec(),
        }
    }

    /// Check that every table matches the declared dimensions
    pub fn validate(&self) -> Result<()> {
        let mismatch = |detail: String| Error::ShapeMismatch {
            expected_rows: self.rows,
            expected_columns: self.columns,
            detail,
        };

        if self.cells.len() != self.rows {
            return Err(mismatch(format!("{} rows of cells", self.cells.len())));
        }
        if let Some((row, cells)) = self
            .cells
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != self.columns)
        {
            return Err(mismatch(format!("{} cells in row {}", cells.len(), row)));
        }
        if self.column_widths.len() != self.columns {
            return Err(mismatch(format!(
                "{} column widths",
                self.column_widths.len()
            )));
        }
        if self.row_heights.len() != self.rows {
            return Err(mismatch(format!("{} row heights", self.row_heights.len())));
        }
        Ok(())
    }

    /// Rebuild a store from this snapshot
    ///
    /// `config` supplies the default sizes for rows and columns inserted
    /// later; its dimensions are ignored in favor of the snapshot's.
    pub fn to_store(&self, config: &GridConfig) -> Result<CellStore> {
        self.validate()?;

        let config = GridConfig {
            rows: self.rows,
            columns: self.columns,
            ..config.clone()
        };
        let mut store = CellStore::new(&config);

        for (index, width) in self.column_widths.iter().enumerate() {
            if !store.set_column_width(index, *width) {
                return Err(Error::InvalidDimensions(format!(
                    "column {} has unusable width {}",
                    index, width
                )));
            }
        }
        for (index, height) in self.row_heights.iter().enumerate() {
            if !store.set_row_height(index, *height) {
                return Err(Error::InvalidDimensions(format!(
                    "row {} has unusable height {}",
                    index, height
                )));
            }
        }

        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if cell.value.is_empty() {
                    continue;
                }
                store.set_cell_data(
                    row,
                    col,
                    CellPatch::value(cell.value.clone())
                        .with_result(cell.result.clone())
                        .with_entities(cell.formula_entities.clone()),
                );
            }
        }

        debug!(rows = self.rows, columns = self.columns, "restored grid from snapshot");
        Ok(store)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::other(e.to_string()))
    }

    /// Parse from JSON and check the shape
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json).map_err(|e| Error::other(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
