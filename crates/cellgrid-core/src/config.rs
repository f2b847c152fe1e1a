//! Grid configuration

use crate::error::{Error, Result};

/// Default number of rows in a new grid
pub const DEFAULT_ROWS: usize = 100;

/// Default number of columns in a new grid
pub const DEFAULT_COLUMNS: usize = 26;

/// Default column width in pixels
pub const DEFAULT_COLUMN_WIDTH: f64 = 100.0;

/// Default row height in pixels
pub const DEFAULT_ROW_HEIGHT: f64 = 25.0;

/// Options used when allocating a grid
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig {
    /// Number of rows allocated at startup
    pub rows: usize,
    /// Number of columns allocated at startup
    pub columns: usize,
    /// Width given to every column (and to inserted columns)
    pub default_column_width: f64,
    /// Height given to every row (and to inserted rows)
    pub default_row_height: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            default_column_width: DEFAULT_COLUMN_WIDTH,
            default_row_height: DEFAULT_ROW_HEIGHT,
        }
    }
}

impl GridConfig {
    /// Create a config with the given dimensions and default sizes
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            ..Default::default()
        }
    }

    /// Set the default column width
    pub fn with_column_width(mut self, width: f64) -> Self {
        self.default_column_width = width;
        self
    }

    /// Set the default row height
    pub fn with_row_height(mut self, height: f64) -> Self {
        self.default_row_height = height;
        self
    }

    /// Check that the sizes are usable
    pub fn validate(&self) -> Result<()> {
        if !is_valid_size(self.default_column_width) {
            return Err(Error::InvalidDimensions(format!(
                "column width {} must be a finite, non-negative number",
                self.default_column_width
            )));
        }
        if !is_valid_size(self.default_row_height) {
            return Err(Error::InvalidDimensions(format!(
                "row height {} must be a finite, non-negative number",
                self.default_row_height
            )));
        }
        Ok(())
    }
}

pub(crate) fn is_valid_size(size: f64) -> bool {
    size.is_finite() && size >= 0.0
}
