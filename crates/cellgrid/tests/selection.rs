//! Tests for range selection, fill drag and formula reference picking

use cellgrid::prelude::*;
use cellgrid::{FillDirection, FoldOutcome, PaletteColors};
use pretty_assertions::assert_eq;

fn at(label: &str) -> CellAddress {
    CellAddress::parse(label).unwrap()
}

fn grid() -> SpreadsheetState {
    SpreadsheetState::new(GridConfig::new(10, 10))
        .unwrap()
        .with_colors(PaletteColors::default())
}

/// Test that dragging in any direction yields the same normalized rectangle
#[test]
fn test_range_rect_is_normalized() {
    let mut state = grid();
    state.resize_column(2, 60.0);

    state.begin_range(at("D4"));
    state.extend_range(Some(at("B2")));
    let backwards = state.range_selection().rect().unwrap();

    state.begin_range(at("B2"));
    state.extend_range(Some(at("D4")));
    let forwards = state.range_selection().rect().unwrap();

    assert_eq!(backwards, forwards);
    assert_eq!(
        forwards,
        SelectionRect {
            top: 25.0,
            left: 100.0,
            width: 260.0,
            height: 75.0,
        }
    );
    assert_eq!(
        state.selected_range(),
        Some(CellRange::new(at("B2"), at("D4")))
    );
}

/// Test that a null end point clears the whole selection
#[test]
fn test_extend_to_none_clears() {
    let mut state = grid();
    state.begin_range(at("A1"));
    state.extend_range(Some(at("C3")));

    assert!(state.extend_range(None));
    let range = state.range_selection();
    assert_eq!(range.start(), None);
    assert_eq!(range.end(), None);
    assert_eq!(range.rect(), None);
}

/// Test that extending outside the grid leaves the selection as it was
#[test]
fn test_extend_outside_grid_is_ignored() {
    let mut state = grid();
    state.begin_range(at("A1"));
    state.extend_range(Some(at("B2")));
    let before = state.range_selection().clone();

    assert!(!state.extend_range(Some(CellAddress::new(40, 40))));
    assert_eq!(state.range_selection(), &before);
}

/// Test the fill drag axis constraint and directions
#[test]
fn test_fill_drag_directions() {
    let mut state = grid();
    state.set_active_cell(at("C3"));
    state.begin_fill();

    assert!(state.extend_fill(at("F3")));
    assert_eq!(
        state.fill_selection().rect().unwrap().direction,
        FillDirection::Right
    );

    // Diagonal points are rejected, the previous preview stays
    assert!(!state.extend_fill(at("D4")));
    assert_eq!(state.fill_selection().end(), Some(at("F3")));

    assert!(state.extend_fill(at("C1")));
    let fill = state.fill_selection().rect().unwrap();
    assert_eq!(fill.direction, FillDirection::Top);
    assert_eq!(fill.rect.top, 0.0);
    assert_eq!(fill.rect.height, 50.0);

    assert!(state.extend_fill(at("A3")));
    assert_eq!(
        state.fill_selection().rect().unwrap().direction,
        FillDirection::Left
    );

    assert!(state.extend_fill(at("C3")));
    let fill = state.fill_selection().rect().unwrap();
    assert_eq!(fill.direction, FillDirection::None);
    assert_eq!(fill.rect.width, 0.0);
    assert_eq!(fill.rect.height, 0.0);
}

/// Test that releasing the fill handle promotes the drag to a range selection
#[test]
fn test_fill_finish_promotes_to_range() {
    let mut state = grid();
    state.set_active_cell(at("B2"));
    state.begin_fill();
    state.extend_fill(at("B5"));
    let fill_rect = state.fill_selection().rect().unwrap().rect;

    assert!(state.finish_fill());
    assert!(!state.fill_selection().is_active());
    assert_eq!(state.range_selection().start(), Some(at("B2")));
    assert_eq!(state.range_selection().end(), Some(at("B5")));
    assert_eq!(state.range_selection().rect(), Some(fill_rect));
    assert_eq!(fill_rect.top, 50.0);
    assert_eq!(fill_rect.height, 75.0);
}

/// Test that a drag released on its own anchor selects nothing
#[test]
fn test_fill_finish_on_anchor() {
    let mut state = grid();
    state.set_active_cell(at("B2"));
    state.begin_fill();
    state.extend_fill(at("B2"));

    assert!(!state.finish_fill());
    assert!(!state.fill_selection().is_active());
    assert!(state.range_selection().is_idle());
}

/// Test replace-then-append when picking references for a formula
#[test]
fn test_pick_replace_then_append() {
    let mut state = grid();
    state.set_active_cell(at("E5"));
    state.type_text("=");

    assert_eq!(state.pick_reference(at("A1")), Some(FoldOutcome::First));
    assert_eq!(state.pick_reference(at("B2")), Some(FoldOutcome::Replaced));
    assert_eq!(state.cell(at("E5")).unwrap().value, "=B2");
    assert_eq!(state.formula_markers().len(), 1);

    state.type_text("+");
    assert_eq!(state.pick_reference(at("C3")), Some(FoldOutcome::Appended));
    assert_eq!(state.cell(at("E5")).unwrap().value, "=B2+C3");

    let markers: Vec<_> = state.formula_markers().iter().map(|m| m.point).collect();
    assert_eq!(markers, [at("B2"), at("C3")]);
    let colors: Vec<_> = state
        .formula_markers()
        .iter()
        .map(|m| m.border_color.as_str())
        .collect();
    assert_ne!(colors[0], colors[1]);
}

/// Test that picking replaces a typed reference however it was spelled
#[test]
fn test_pick_replaces_typed_reference() {
    let mut state = grid();
    state.set_active_cell(at("E5"));
    state.type_text("=a1");

    assert_eq!(state.pick_reference(at("B2")), Some(FoldOutcome::Replaced));
    let cell = state.cell(at("E5")).unwrap();
    assert_eq!(cell.value, "=B2");
    assert_eq!(cell.formula_entities.len(), 1);
    assert_eq!(cell.formula_entities[0].address(), Some("B2"));

    state.set_active_text("=A1*3");
    assert_eq!(state.pick_reference(at("C3")), Some(FoldOutcome::Replaced));
    assert_eq!(state.cell(at("E5")).unwrap().value, "=A1*C3");
    assert_eq!(state.formula_markers().len(), 2);
}

/// Test that escape drops the markers without evaluating
#[test]
fn test_escape_keeps_result() {
    let mut state = grid();
    state.set_active_cell(at("A1"));
    state.type_text("3");
    state.commit();

    state.set_active_cell(at("B1"));
    state.type_text("=");
    state.pick_reference(at("A1"));
    assert!(state.is_selecting_for_formula());

    state.escape();
    assert!(!state.is_selecting_for_formula());
    assert!(state.formula_markers().is_empty());

    let cell = state.cell(at("B1")).unwrap();
    assert_eq!(cell.value, "=A1");
    assert_eq!(cell.result, CellResult::Empty);
}

/// Test that inserting before and after splices at the documented index
#[test]
fn test_insert_positions() {
    let mut state = grid();
    state.set_cell_data(at("B2"), CellPatch::value("x"));

    assert_eq!(state.insert_row(1, InsertPosition::Before), 1);
    assert_eq!(state.cell(at("B3")).unwrap().value, "x");

    assert_eq!(state.insert_column(1, InsertPosition::After), 2);
    assert_eq!(state.cell(at("B3")).unwrap().value, "x");
    assert_eq!(state.rows(), 11);
    assert_eq!(state.columns(), 11);
}
