//! The spreadsheet state
//!
//! [`SpreadsheetState`] owns the cell store, both selections, the formula
//! tracker and the active cell. Every mutation goes through a named operation
//! that updates all related fields together and then notifies listeners.

use crate::events::{EventCallback, Listeners, StateEvent};
use crate::snapshot::SessionSnapshot;
use cellgrid_core::{
    Cell, CellAddress, CellPatch, CellRange, CellStore, FillSelection, GridConfig, InsertPosition,
    RangeSelection, Result,
};
use cellgrid_formula::{
    recalculate, resolve, ArithmeticEvaluator, ColorSource, FoldOutcome, FormulaEvaluator,
    FormulaMarker, FormulaTracker, Resolution,
};
use std::fmt;
use tracing::{debug, trace};

/// Arrow-key movement of the active cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Up,
    Down,
    Left,
    Right,
}

impl Movement {
    fn apply(self, from: CellAddress) -> Option<CellAddress> {
        let (row, col) = match self {
            Movement::Up => (from.row.checked_sub(1)?, from.col),
            Movement::Down => (from.row.checked_add(1)?, from.col),
            Movement::Left => (from.row, from.col.checked_sub(1)?),
            Movement::Right => (from.row, from.col.checked_add(1)?),
        };
        Some(CellAddress::new(row, col))
    }
}

/// State behind a spreadsheet widget
pub struct SpreadsheetState {
    config: GridConfig,
    store: CellStore,
    active: Option<CellAddress>,
    /// Whether typed text appends to the active cell instead of replacing it
    editing: bool,
    range: RangeSelection,
    fill: FillSelection,
    tracker: FormulaTracker,
    evaluator: Box<dyn FormulaEvaluator>,
    listeners: Listeners,
}

impl fmt::Debug for SpreadsheetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpreadsheetState")
            .field("config", &self.config)
            .field("active", &self.active)
            .field("editing", &self.editing)
            .field("range", &self.range)
            .field("fill", &self.fill)
            .field("tracker", &self.tracker)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl Default for SpreadsheetState {
    fn default() -> Self {
        Self::build(GridConfig::default())
    }
}

impl SpreadsheetState {
    /// Allocate a grid of empty cells
    ///
    /// Uses the built-in [`ArithmeticEvaluator`] and random marker colors.
    pub fn new(config: GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: GridConfig) -> Self {
        Self {
            store: CellStore::new(&config),
            config,
            active: None,
            editing: false,
            range: RangeSelection::new(),
            fill: FillSelection::new(),
            tracker: FormulaTracker::new(),
            evaluator: Box::new(ArithmeticEvaluator::new()),
            listeners: Listeners::default(),
        }
    }

    /// Replace the formula evaluator
    pub fn with_evaluator<E: FormulaEvaluator + 'static>(mut self, evaluator: E) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    /// Replace the source of marker colors
    pub fn with_colors<C: ColorSource + 'static>(mut self, colors: C) -> Self {
        self.tracker = FormulaTracker::with_colors(colors);
        self
    }

    /// Register a listener for state changes
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&StateEvent) + 'static,
    {
        let callback: EventCallback = Box::new(listener);
        self.listeners.push(callback);
    }

    // === Read access ===

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn rows(&self) -> usize {
        self.store.rows()
    }

    pub fn columns(&self) -> usize {
        self.store.columns()
    }

    pub fn cell(&self, point: CellAddress) -> Option<&Cell> {
        self.store.get(point.row, point.col)
    }

    pub fn active_cell(&self) -> Option<CellAddress> {
        self.active
    }

    /// Whether typed text currently appends to the active cell
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Whether clicked cells are folded into the active formula
    pub fn is_selecting_for_formula(&self) -> bool {
        self.tracker.is_selecting()
    }

    pub fn formula_markers(&self) -> &[FormulaMarker] {
        self.tracker.markers()
    }

    pub fn range_selection(&self) -> &RangeSelection {
        &self.range
    }

    pub fn fill_selection(&self) -> &FillSelection {
        &self.fill
    }

    // === Active cell and text entry ===

    /// Move the active cell, leaving any edit in progress
    ///
    /// Returns `false` when `point` is outside the grid.
    pub fn set_active_cell(&mut self, point: CellAddress) -> bool {
        if !self.store.contains(point.row, point.col) {
            return false;
        }

        let previous = self.active.replace(point);
        self.editing = false;
        if self.fill.is_active() {
            self.fill.clear();
            self.listeners.emit(StateEvent::FillSelectionChanged);
        }
        if self.tracker.is_selecting() || !self.tracker.markers().is_empty() {
            self.tracker.cancel();
            self.listeners.emit(StateEvent::FormulaMarkersChanged);
        }

        if previous != Some(point) {
            trace!(?previous, %point, "active cell moved");
            self.listeners.emit(StateEvent::ActiveCellChanged {
                previous,
                current: Some(point),
            });
        }
        true
    }

    /// Arrow-key navigation; stays put at the grid edge
    pub fn move_active(&mut self, movement: Movement) -> bool {
        let Some(target) = self.active.and_then(|active| movement.apply(active)) else {
            return false;
        };
        self.set_active_cell(target)
    }

    /// Enter edit mode on the active cell
    ///
    /// Typed text appends from now on. A formula cell restores its reference
    /// markers and starts picking up clicked cells.
    pub fn edit_active(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let Some(cell) = self.store.get(active.row, active.col) else {
            return false;
        };

        self.editing = true;
        if cell.is_formula() {
            self.tracker.begin(&cell.formula_entities);
            self.listeners.emit(StateEvent::FormulaMarkersChanged);
        }
        true
    }

    /// Type text into the active cell
    ///
    /// The first input after the active cell moved replaces its value; later
    /// input appends. Formula text is re-parsed into entities on every call.
    pub fn type_text(&mut self, text: &str) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let Some(cell) = self.store.get(active.row, active.col) else {
            return false;
        };

        let value = if self.editing {
            format!("{}{}", cell.value, text)
        } else {
            text.to_string()
        };
        self.write_active(active, &value)
    }

    /// Replace the active cell's whole text, as a formula bar would
    pub fn set_active_text(&mut self, text: &str) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        self.write_active(active, text)
    }

    /// Delete the last character of the active cell's text
    pub fn backspace(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let Some(cell) = self.store.get(active.row, active.col) else {
            return false;
        };

        let mut value = cell.value.clone();
        value.pop();
        self.write_active(active, &value)
    }

    fn write_active(&mut self, active: CellAddress, text: &str) -> bool {
        let was_selecting = self.tracker.is_selecting();
        if !self.tracker.update_text(&mut self.store, active, text) {
            return false;
        }

        self.editing = true;
        self.listeners.emit(StateEvent::CellChanged(active));
        if was_selecting || self.tracker.is_selecting() {
            self.listeners.emit(StateEvent::FormulaMarkersChanged);
        }
        true
    }

    /// Merge a partial update into any cell
    pub fn set_cell_data(&mut self, point: CellAddress, patch: CellPatch) -> bool {
        if !self.store.set_cell_data(point.row, point.col, patch) {
            return false;
        }
        self.listeners.emit(StateEvent::CellChanged(point));
        true
    }

    /// Clear a cell's value, result and entities
    pub fn clear_cell(&mut self, point: CellAddress) -> bool {
        if !self.store.clear_cell(point.row, point.col) {
            return false;
        }
        self.listeners.emit(StateEvent::CellChanged(point));
        true
    }

    // === Formula editing ===

    /// Handle a click on a cell
    ///
    /// While a formula is being edited the cell becomes a reference in it;
    /// otherwise the click moves the active cell and anchors a new range
    /// selection there.
    pub fn click_cell(&mut self, point: CellAddress) -> bool {
        if self.tracker.is_selecting() {
            return self.pick_reference(point).is_some();
        }
        if !self.set_active_cell(point) {
            return false;
        }
        self.begin_range(point);
        true
    }

    /// Fold a clicked cell into the active cell's formula
    pub fn pick_reference(&mut self, point: CellAddress) -> Option<FoldOutcome> {
        let active = self.active?;
        let outcome = self
            .tracker
            .append_from_selection(&mut self.store, active, point)?;

        self.editing = true;
        self.listeners.emit(StateEvent::CellChanged(active));
        self.listeners.emit(StateEvent::FormulaMarkersChanged);
        Some(outcome)
    }

    /// Enter: resolve the active cell, then move one row down
    ///
    /// Formula cells are evaluated and every other formula is recalculated
    /// against the new values. Reference picking ends and the markers are
    /// dropped. Returns `None` when there is no active cell.
    pub fn commit(&mut self) -> Option<Resolution> {
        let active = self.active?;
        let resolution = self.resolve_cell(active)?;

        self.editing = false;
        self.tracker.cancel();
        self.listeners.emit(StateEvent::FormulaMarkersChanged);

        let below = CellAddress::new(active.row + 1, active.col);
        if self.store.contains(below.row, below.col) {
            self.set_active_cell(below);
        }
        Some(resolution)
    }

    /// Escape: stop picking references without evaluating
    pub fn escape(&mut self) {
        self.editing = false;
        self.tracker.cancel();
        self.listeners.emit(StateEvent::FormulaMarkersChanged);
    }

    /// Compute and store one cell's result, then recalculate dependents
    pub fn resolve_cell(&mut self, point: CellAddress) -> Option<Resolution> {
        let resolution = resolve(
            &mut self.store,
            point.row,
            point.col,
            self.evaluator.as_ref(),
        )?;
        debug!(%point, evaluated = resolution.evaluated, result = %resolution.result, "resolved cell");
        self.listeners.emit(StateEvent::CellChanged(point));
        self.recalculate();
        Some(resolution)
    }

    /// Re-evaluate every formula cell
    pub fn recalculate(&mut self) -> usize {
        let formulas = recalculate(&mut self.store, self.evaluator.as_ref());
        if formulas > 0 {
            self.listeners.emit(StateEvent::Recalculated { formulas });
        }
        formulas
    }

    // === Range selection ===

    /// Start a range selection gesture
    pub fn begin_range(&mut self, point: CellAddress) -> bool {
        if !self.store.contains(point.row, point.col) {
            return false;
        }
        self.range.anchor(point);
        self.listeners.emit(StateEvent::SelectionChanged);
        true
    }

    /// Drag the range selection's end; `None` clears the selection
    pub fn extend_range(&mut self, end: Option<CellAddress>) -> bool {
        if !self.range.extend(&self.store, end) {
            return false;
        }
        self.listeners.emit(StateEvent::SelectionChanged);
        true
    }

    pub fn clear_range(&mut self) {
        if !self.range.is_idle() {
            self.range.clear();
            self.listeners.emit(StateEvent::SelectionChanged);
        }
    }

    /// Cells covered by the range selection
    pub fn selected_range(&self) -> Option<CellRange> {
        self.range.range()
    }

    // === Fill drag ===

    /// Start a fill drag from the active cell's handle
    pub fn begin_fill(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        self.fill.anchor(active);
        self.listeners.emit(StateEvent::FillSelectionChanged);
        true
    }

    /// Drag the fill handle; off-axis points are ignored
    pub fn extend_fill(&mut self, end: CellAddress) -> bool {
        if !self.fill.extend(&self.store, end) {
            return false;
        }
        self.listeners.emit(StateEvent::FillSelectionChanged);
        true
    }

    /// Release the fill handle
    ///
    /// The covered cells become the range selection. Returns `false` when the
    /// drag never left the anchor; the fill preview is cleared either way.
    pub fn finish_fill(&mut self) -> bool {
        let was_active = self.fill.is_active();
        let finished = self.fill.finish();
        if was_active {
            self.listeners.emit(StateEvent::FillSelectionChanged);
        }

        let Some((start, end, rect)) = finished else {
            return false;
        };
        self.range.restore(start, end, rect);
        self.listeners.emit(StateEvent::SelectionChanged);
        true
    }

    // === Structure ===

    /// Insert a row next to `index`; returns the new row's index
    pub fn insert_row(&mut self, index: usize, position: InsertPosition) -> usize {
        let at = self.store.insert_row_at(index, position);
        self.after_structure_change();
        at
    }

    /// Insert a column next to `index`; returns the new column's index
    pub fn insert_column(&mut self, index: usize, position: InsertPosition) -> usize {
        let at = self.store.insert_column_at(index, position);
        self.after_structure_change();
        at
    }

    fn after_structure_change(&mut self) {
        // Stored rectangles no longer line up with the shifted cells
        self.clear_range();
        if self.fill.is_active() {
            self.fill.clear();
            self.listeners.emit(StateEvent::FillSelectionChanged);
        }
        self.listeners.emit(StateEvent::StructureChanged {
            rows: self.store.rows(),
            columns: self.store.columns(),
        });
    }

    /// Set one column's width
    pub fn resize_column(&mut self, column: usize, width: f64) -> bool {
        if !self.store.set_column_width(column, width) {
            return false;
        }
        self.listeners
            .emit(StateEvent::ColumnResized { column, width });
        self.refresh_range_rect();
        true
    }

    /// Set one row's height
    pub fn resize_row(&mut self, row: usize, height: f64) -> bool {
        if !self.store.set_row_height(row, height) {
            return false;
        }
        self.listeners.emit(StateEvent::RowResized { row, height });
        self.refresh_range_rect();
        true
    }

    fn refresh_range_rect(&mut self) {
        if let Some(end) = self.range.end() {
            if self.range.extend(&self.store, Some(end)) {
                self.listeners.emit(StateEvent::SelectionChanged);
            }
        }
    }

    // === Persistence ===

    /// Capture the persistent part of the state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.store)
    }

    /// Replace the grid with a saved session
    ///
    /// Selection, fill drag, markers and the active cell are reset. The
    /// current grid is kept when the snapshot is malformed.
    pub fn restore(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        self.store = snapshot.to_store(&self.config)?;
        self.config.rows = self.store.rows();
        self.config.columns = self.store.columns();
        self.active = None;
        self.editing = false;
        self.range.clear();
        self.fill.clear();
        self.tracker.cancel();

        debug!(rows = self.store.rows(), columns = self.store.columns(), "session restored");
        self.listeners.emit(StateEvent::Restored);
        Ok(())
    }
}
