//! Change notifications emitted by [`SpreadsheetState`](crate::SpreadsheetState).
//!
//! A renderer registers a listener with
//! [`SpreadsheetState::on_change`](crate::SpreadsheetState::on_change) and
//! re-reads whatever part of the state an event names. Events are emitted
//! after the mutation completed, so the state is always consistent when a
//! listener runs.

use cellgrid_core::CellAddress;

/// Events emitted by the spreadsheet state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    /// A cell's value, result or formula entities changed.
    CellChanged(CellAddress),

    /// The active cell moved.
    ActiveCellChanged {
        previous: Option<CellAddress>,
        current: Option<CellAddress>,
    },

    /// The range selection changed (anchored, extended, cleared or promoted).
    SelectionChanged,

    /// The fill-drag preview changed.
    FillSelectionChanged,

    /// The formula reference markers or the selecting flag changed.
    FormulaMarkersChanged,

    /// A row or column was inserted.
    StructureChanged { rows: usize, columns: usize },

    /// One column got a new width.
    ColumnResized { column: usize, width: f64 },

    /// One row got a new height.
    RowResized { row: usize, height: f64 },

    /// Formula cells were re-evaluated.
    Recalculated { formulas: usize },

    /// The whole grid was replaced from a saved session.
    Restored,
}

/// Callback type for receiving state events.
pub type EventCallback = Box<dyn FnMut(&StateEvent)>;

/// Registered listeners, notified in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    callbacks: Vec<EventCallback>,
}

impl Listeners {
    pub(crate) fn push(&mut self, callback: EventCallback) {
        self.callbacks.push(callback);
    }

    pub(crate) fn emit(&mut self, event: StateEvent) {
        for callback in &mut self.callbacks {
            callback(&event);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.callbacks.len())
            .finish()
    }
}
