//! Formula entity tracker
//!
//! While a formula is being edited the user alternates between typing
//! operators and clicking cells. The tracker folds each clicked cell into the
//! active cell's formula text and entity list, and keeps the list of colored
//! markers (the cells highlighted on the grid) in step with both.

use crate::color::{ColorSource, RandomColors};
use crate::tokenizer::{entities_from_formula, tokenize, TokenKind};
use cellgrid_core::{CellAddress, CellPatch, CellStore, FormulaEntity};
use tracing::trace;

/// A highlighted cell referenced by the formula being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaMarker {
    pub point: CellAddress,
    pub border_color: String,
}

impl FormulaMarker {
    fn from_entity(entity: &FormulaEntity) -> Option<Self> {
        match entity {
            FormulaEntity::Variable {
                row,
                column,
                border_color,
                ..
            } => Some(Self {
                point: CellAddress::new(*row, *column),
                border_color: border_color.clone(),
            }),
            FormulaEntity::Operation { .. } => None,
        }
    }
}

/// How a picked cell was folded into the formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldOutcome {
    /// First reference of the formula
    First,
    /// Replaced the previous reference (no operator typed in between)
    Replaced,
    /// Added after an operator
    Appended,
}

/// Tracks formula references while a formula cell is being edited
#[derive(Debug)]
pub struct FormulaTracker {
    selecting: bool,
    markers: Vec<FormulaMarker>,
    colors: Box<dyn ColorSource>,
}

impl Default for FormulaTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaTracker {
    /// Tracker with random marker colors
    pub fn new() -> Self {
        Self::with_colors(RandomColors::new())
    }

    /// Tracker with an injected color source
    pub fn with_colors<C: ColorSource + 'static>(colors: C) -> Self {
        Self {
            selecting: false,
            markers: Vec::new(),
            colors: Box::new(colors),
        }
    }

    /// Whether cell clicks are currently picked up as formula references
    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Current markers, in formula order
    pub fn markers(&self) -> &[FormulaMarker] {
        &self.markers
    }

    /// Enter selecting mode for a formula cell, restoring its markers
    pub fn begin(&mut self, entities: &[FormulaEntity]) {
        self.selecting = true;
        self.sync_markers_from_entities(entities);
    }

    /// Leave selecting mode and drop every marker
    pub fn cancel(&mut self) {
        self.selecting = false;
        self.markers.clear();
    }

    /// Rebuild the markers from an explicit entity list
    ///
    /// One marker per variable entity; operations are discarded.
    pub fn sync_markers_from_entities(&mut self, entities: &[FormulaEntity]) {
        self.markers = entities.iter().filter_map(FormulaMarker::from_entity).collect();
    }

    /// Replace the active cell's text and re-derive its entities
    ///
    /// Used on every keystroke while editing. Returns `false` when `active` is
    /// outside the grid.
    pub fn update_text(&mut self, store: &mut CellStore, active: CellAddress, text: &str) -> bool {
        let Some(cell) = store.get(active.row, active.col) else {
            return false;
        };

        let entities = if text.trim_start().starts_with('=') {
            entities_from_formula(text, &cell.formula_entities, self.colors.as_mut())
        } else {
            Vec::new()
        };

        if text.trim_start().starts_with('=') {
            self.selecting = true;
            self.sync_markers_from_entities(&entities);
        } else {
            self.cancel();
        }

        store.set_cell_data(
            active.row,
            active.col,
            CellPatch::value(text).with_entities(entities),
        )
    }

    /// Fold a clicked cell into the active cell's formula
    ///
    /// Operators and operands (references, numbers, names) are counted from
    /// the formula text:
    ///
    /// - no operand yet: the address is appended and becomes the only marker
    /// - one more operand than operators, so the formula ends in an operand
    ///   with no operator after it: that operand is replaced, so clicking
    ///   around changes the pick
    /// - otherwise: the address is appended as another reference
    ///
    /// Text, entities and markers change together or not at all. Nothing
    /// happens when the active cell does not hold a formula or either point is
    /// outside the grid.
    pub fn append_from_selection(
        &mut self,
        store: &mut CellStore,
        active: CellAddress,
        point: CellAddress,
    ) -> Option<FoldOutcome> {
        if !store.contains(point.row, point.col) {
            return None;
        }
        let cell = store.get(active.row, active.col)?;
        if !cell.is_formula() {
            return None;
        }

        let mut text = cell.value.clone();
        let mut entities = cell.formula_entities.clone();
        let mut markers = self.markers.clone();

        let tokens = tokenize(&text);
        let operators = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .count();
        let operands = tokens.len() - operators;

        let outcome = if operands == 0 {
            markers.clear();
            FoldOutcome::First
        } else if operators + 1 == operands {
            let last = tokens.iter().rfind(|t| t.kind == TokenKind::Variable)?;
            if let Ok(replaced) = CellAddress::parse(&last.value) {
                if let Some(at) = entities.iter().rposition(|e| {
                    matches!(e, FormulaEntity::Variable { row, column, .. }
                        if *row == replaced.row && *column == replaced.col)
                }) {
                    entities.remove(at);
                }
                if let Some(at) = markers.iter().rposition(|m| m.point == replaced) {
                    markers.remove(at);
                }
            }
            text.replace_range(last.span.clone(), "");
            FoldOutcome::Replaced
        } else {
            FoldOutcome::Appended
        };

        let previous = entities
            .iter()
            .rev()
            .find_map(FormulaEntity::border_color)
            .or_else(|| markers.last().map(|m| m.border_color.as_str()))
            .map(str::to_string);
        let color = self.colors.next_color(previous.as_deref());
        let entity = FormulaEntity::variable(point.row, point.col, color);

        if let Some(address) = entity.address() {
            text.push_str(address);
        }
        if let Some(marker) = FormulaMarker::from_entity(&entity) {
            markers.push(marker);
        }
        entities.push(entity);

        trace!(%active, %point, ?outcome, formula = %text, "folded reference into formula");
        store.set_cell_data(
            active.row,
            active.col,
            CellPatch::value(text).with_entities(entities),
        );
        self.markers = markers;
        self.selecting = true;
        Some(outcome)
    }
}
