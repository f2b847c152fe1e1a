//! Selection geometry
//!
//! Two selection modes share one geometry routine: a range selection spanned
//! by an anchor and a moving end point, and a fill selection that extends the
//! active cell along a single row or column. Rectangles are computed from the
//! [`Layout`] tables, never from a rendered surface.

use crate::cell::{CellAddress, CellRange};
use tracing::trace;

/// Source of pixel geometry for grid coordinates
///
/// Any answer may be `None` while layout lags behind input (for example in a
/// virtualized viewport). Missing widths and heights contribute zero; a
/// missing cell origin makes the selection update a no-op.
pub trait Layout {
    /// Width of a column in pixels
    fn column_width(&self, column: usize) -> Option<f64>;

    /// Height of a row in pixels
    fn row_height(&self, row: usize) -> Option<f64>;

    /// `(left, top)` of a cell in pixels
    fn cell_origin(&self, row: usize, column: usize) -> Option<(f64, f64)>;
}

/// A selection rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    /// Rectangle covering every cell of `range`
    ///
    /// Returns `None` when the layout has no origin for the top-left cell.
    pub fn covering<L: Layout + ?Sized>(layout: &L, range: &CellRange) -> Option<Self> {
        let (left, top) = layout.cell_origin(range.start.row, range.start.col)?;
        let width = (range.start.col..=range.end.col)
            .map(|col| layout.column_width(col).unwrap_or(0.0))
            .sum();
        let height = (range.start.row..=range.end.row)
            .map(|row| layout.row_height(row).unwrap_or(0.0))
            .sum();

        Some(Self {
            top,
            left,
            width,
            height,
        })
    }
}

/// Direction of a fill drag relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillDirection {
    Left,
    Right,
    Top,
    Bottom,
    #[default]
    None,
}

/// A fill preview rectangle and the direction it grows in
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FillRect {
    pub rect: SelectionRect,
    pub direction: FillDirection,
}

/// Range selection state: idle, anchored, or extending
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeSelection {
    start: Option<CellAddress>,
    end: Option<CellAddress>,
    rect: Option<SelectionRect>,
}

impl RangeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor point of the selection
    pub fn start(&self) -> Option<CellAddress> {
        self.start
    }

    /// Moving end point of the selection
    pub fn end(&self) -> Option<CellAddress> {
        self.end
    }

    /// Current rectangle, if the selection has been extended
    pub fn rect(&self) -> Option<SelectionRect> {
        self.rect
    }

    /// Normalized cell range between anchor and end
    pub fn range(&self) -> Option<CellRange> {
        Some(CellRange::new(self.start?, self.end?))
    }

    /// Check if nothing is selected
    pub fn is_idle(&self) -> bool {
        self.start.is_none()
    }

    /// Start a new gesture at `point`
    pub fn anchor(&mut self, point: CellAddress) {
        trace!(%point, "range selection anchored");
        self.start = Some(point);
        self.end = None;
        self.rect = None;
    }

    /// Move the end point and recompute the rectangle
    ///
    /// `None` clears anchor, end and rectangle together. Extending without an
    /// anchor, or to a point the layout does not know yet, changes nothing.
    /// Returns whether the state changed.
    pub fn extend<L: Layout + ?Sized>(&mut self, layout: &L, end: Option<CellAddress>) -> bool {
        let Some(end) = end else {
            let changed = !self.is_idle() || self.rect.is_some();
            self.clear();
            return changed;
        };
        let Some(start) = self.start else {
            return false;
        };
        if layout.cell_origin(end.row, end.col).is_none() {
            trace!(%end, "range end outside layout, ignored");
            return false;
        }

        let range = CellRange::new(start, end);
        let Some(rect) = SelectionRect::covering(layout, &range) else {
            return false;
        };

        trace!(%range, ?rect, "range selection extended");
        self.end = Some(end);
        self.rect = Some(rect);
        true
    }

    /// Reset to idle
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Replace the whole selection with an already computed one
    pub fn restore(&mut self, start: CellAddress, end: CellAddress, rect: SelectionRect) {
        self.start = Some(start);
        self.end = Some(end);
        self.rect = Some(rect);
    }
}

/// Fill-drag selection, constrained to the anchor's row or column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillSelection {
    start: Option<CellAddress>,
    end: Option<CellAddress>,
    rect: Option<FillRect>,
}

impl FillSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<CellAddress> {
        self.start
    }

    pub fn end(&self) -> Option<CellAddress> {
        self.end
    }

    pub fn rect(&self) -> Option<FillRect> {
        self.rect
    }

    /// Check if a fill drag is in progress
    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    /// Cells newly covered by the drag (the anchor itself excluded)
    pub fn covered_range(&self) -> Option<CellRange> {
        covered_range(self.start?, self.end?)
    }

    /// Start a fill drag from the active cell
    pub fn anchor(&mut self, point: CellAddress) {
        trace!(%point, "fill selection anchored");
        self.start = Some(point);
        self.end = None;
        self.rect = None;
    }

    /// Move the drag end point
    ///
    /// A point that differs from the anchor in both row and column is
    /// rejected rather than snapped. Returns whether the state changed.
    pub fn extend<L: Layout + ?Sized>(&mut self, layout: &L, end: CellAddress) -> bool {
        let Some(start) = self.start else {
            return false;
        };
        if start.row != end.row && start.col != end.col {
            trace!(%start, %end, "fill drag off axis, ignored");
            return false;
        }
        if layout.cell_origin(end.row, end.col).is_none() {
            return false;
        }

        let direction = fill_direction(start, end);
        let rect = match covered_range(start, end) {
            Some(range) => match SelectionRect::covering(layout, &range) {
                Some(rect) => rect,
                None => return false,
            },
            None => {
                // Back on the anchor: an empty preview at the anchor's origin
                let Some((left, top)) = layout.cell_origin(start.row, start.col) else {
                    return false;
                };
                SelectionRect {
                    top,
                    left,
                    ..Default::default()
                }
            }
        };

        trace!(%start, %end, ?direction, ?rect, "fill selection extended");
        self.end = Some(end);
        self.rect = Some(FillRect { rect, direction });
        true
    }

    /// End the drag, returning what should become the range selection
    ///
    /// The fill state is cleared either way. Nothing is returned when the drag
    /// never left the anchor.
    pub fn finish(&mut self) -> Option<(CellAddress, CellAddress, SelectionRect)> {
        let taken = std::mem::take(self);
        let fill = taken.rect?;
        if fill.direction == FillDirection::None {
            return None;
        }
        Some((taken.start?, taken.end?, fill.rect))
    }

    /// Abandon the drag
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn fill_direction(start: CellAddress, end: CellAddress) -> FillDirection {
    if start == end {
        FillDirection::None
    } else if start.row == end.row {
        if end.col > start.col {
            FillDirection::Right
        } else {
            FillDirection::Left
        }
    } else if end.row > start.row {
        FillDirection::Bottom
    } else {
        FillDirection::Top
    }
}

// The anchor-side bound is nudged one cell toward the end point.
fn covered_range(start: CellAddress, end: CellAddress) -> Option<CellRange> {
    let near = match fill_direction(start, end) {
        FillDirection::Right => CellAddress::new(start.row, start.col + 1),
        FillDirection::Left => CellAddress::new(start.row, start.col - 1),
        FillDirection::Bottom => CellAddress::new(start.row + 1, start.col),
        FillDirection::Top => CellAddress::new(start.row - 1, start.col),
        FillDirection::None => return None,
    };
    Some(CellRange::new(near, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::store::CellStore;
    use pretty_assertions::assert_eq;

    fn store() -> CellStore {
        CellStore::new(&GridConfig::new(10, 10))
    }

    fn at(row: usize, col: usize) -> CellAddress {
        CellAddress::new(row, col)
    }

    /// Layout that only knows the first `visible` rows
    struct Viewport {
        visible: usize,
    }

    impl Layout for Viewport {
        fn column_width(&self, _column: usize) -> Option<f64> {
            Some(100.0)
        }

        fn row_height(&self, row: usize) -> Option<f64> {
            (row < self.visible).then_some(25.0)
        }

        fn cell_origin(&self, row: usize, column: usize) -> Option<(f64, f64)> {
            (row < self.visible).then(|| (column as f64 * 100.0, row as f64 * 25.0))
        }
    }

    #[test]
    fn test_range_rect() {
        let store = store();
        let mut selection = RangeSelection::new();
        selection.anchor(at(1, 1));
        assert!(selection.extend(&store, Some(at(2, 3))));

        assert_eq!(
            selection.rect(),
            Some(SelectionRect {
                top: 25.0,
                left: 100.0,
                width: 300.0,
                height: 50.0,
            })
        );
        assert_eq!(selection.range().unwrap().to_string(), "B2:D3");
    }

    #[test]
    fn test_range_rect_is_symmetric() {
        let store = store();

        let mut forward = RangeSelection::new();
        forward.anchor(at(2, 2));
        forward.extend(&store, Some(at(5, 5)));

        let mut backward = RangeSelection::new();
        backward.anchor(at(5, 5));
        backward.extend(&store, Some(at(2, 2)));

        assert_eq!(forward.rect(), backward.rect());
        assert!(forward.rect().is_some());
    }

    #[test]
    fn test_range_uses_resized_columns() {
        let mut store = store();
        store.set_column_width(2, 40.0);

        let mut selection = RangeSelection::new();
        selection.anchor(at(0, 1));
        selection.extend(&store, Some(at(0, 3)));
        assert_eq!(selection.rect().unwrap().width, 240.0);
    }

    #[test]
    fn test_extend_without_anchor_is_noop() {
        let store = store();
        let mut selection = RangeSelection::new();
        assert!(!selection.extend(&store, Some(at(3, 3))));
        assert_eq!(selection, RangeSelection::new());
    }

    #[test]
    fn test_extend_none_clears_everything() {
        let store = store();
        let mut selection = RangeSelection::new();
        selection.anchor(at(1, 1));
        selection.extend(&store, Some(at(4, 4)));

        assert!(selection.extend(&store, None));
        assert_eq!(selection.start(), None);
        assert_eq!(selection.end(), None);
        assert_eq!(selection.rect(), None);
    }

    #[test]
    fn test_extend_outside_layout_keeps_state() {
        let viewport = Viewport { visible: 5 };
        let mut selection = RangeSelection::new();
        selection.anchor(at(0, 0));
        assert!(selection.extend(&viewport, Some(at(2, 2))));
        let before = selection.clone();

        assert!(!selection.extend(&viewport, Some(at(8, 2))));
        assert_eq!(selection, before);
    }

    #[test]
    fn test_fill_right_excludes_anchor() {
        let store = store();
        let mut fill = FillSelection::new();
        fill.anchor(at(3, 3));
        assert!(fill.extend(&store, at(3, 5)));

        let rect = fill.rect().unwrap();
        assert_eq!(rect.direction, FillDirection::Right);
        assert_eq!(
            rect.rect,
            SelectionRect {
                top: 75.0,
                left: 400.0,
                width: 200.0,
                height: 25.0,
            }
        );
        assert_eq!(fill.covered_range().unwrap().to_string(), "E4:F4");
    }

    #[test]
    fn test_fill_directions() {
        let store = store();
        let mut fill = FillSelection::new();
        fill.anchor(at(3, 3));

        fill.extend(&store, at(3, 1));
        let rect = fill.rect().unwrap();
        assert_eq!(rect.direction, FillDirection::Left);
        assert_eq!(rect.rect.left, 100.0);
        assert_eq!(rect.rect.width, 200.0);

        fill.extend(&store, at(6, 3));
        let rect = fill.rect().unwrap();
        assert_eq!(rect.direction, FillDirection::Bottom);
        assert_eq!(rect.rect.top, 100.0);
        assert_eq!(rect.rect.height, 75.0);

        fill.extend(&store, at(0, 3));
        let rect = fill.rect().unwrap();
        assert_eq!(rect.direction, FillDirection::Top);
        assert_eq!(rect.rect.top, 0.0);
        assert_eq!(rect.rect.height, 75.0);
    }

    #[test]
    fn test_fill_rejects_cross_axis() {
        let store = store();
        let mut fill = FillSelection::new();
        fill.anchor(at(3, 3));
        fill.extend(&store, at(3, 4));
        let before = fill.clone();

        assert!(!fill.extend(&store, at(5, 6)));
        assert_eq!(fill, before);
    }

    #[test]
    fn test_fill_back_on_anchor() {
        let store = store();
        let mut fill = FillSelection::new();
        fill.anchor(at(2, 2));
        fill.extend(&store, at(2, 2));

        let rect = fill.rect().unwrap();
        assert_eq!(rect.direction, FillDirection::None);
        assert_eq!(rect.rect.width, 0.0);
        assert_eq!(fill.finish(), None);
        assert!(!fill.is_active());
    }

    #[test]
    fn test_fill_finish_hands_over_rect() {
        let store = store();
        let mut fill = FillSelection::new();
        fill.anchor(at(1, 1));
        fill.extend(&store, at(4, 1));
        let expected = fill.rect().unwrap().rect;

        let (start, end, rect) = fill.finish().unwrap();
        assert_eq!(start, at(1, 1));
        assert_eq!(end, at(4, 1));
        assert_eq!(rect, expected);
        assert_eq!(fill, FillSelection::new());
    }
}
