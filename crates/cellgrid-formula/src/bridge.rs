//! Formula evaluation bridge
//!
//! Connects the cell store to a formula evaluator. The evaluator only sees
//! the formula text (without `=`) and a read-only accessor over a snapshot of
//! the raw cell values, addressed with 1-based row and column numbers.

use cellgrid_core::{CellResult, CellStore};
use tracing::debug;

/// A raw cell value as handed to an evaluator
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Empty,
    Number(f64),
    Text(String),
    /// Formula text without the leading `=`
    Formula(String),
}

impl Scalar {
    /// Classify raw cell text
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Scalar::Empty;
        }
        if let Some(formula) = raw.strip_prefix('=') {
            return Scalar::Formula(formula.to_string());
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Scalar::Number(n),
            _ => Scalar::Text(raw.to_string()),
        }
    }
}

/// Read access to cell values, 1-based
pub trait CellLookup {
    /// Value at 1-based `(row, col)`, or `None` outside the grid
    fn cell_value(&self, row: usize, col: usize) -> Option<Scalar>;
}

/// A formula evaluator
///
/// Errors are part of the returned value ([`CellResult::Error`]); an evaluator
/// never fails out of band.
pub trait FormulaEvaluator {
    fn evaluate(&self, formula: &str, cells: &dyn CellLookup) -> CellResult;
}

impl<F> FormulaEvaluator for F
where
    F: Fn(&str, &dyn CellLookup) -> CellResult,
{
    fn evaluate(&self, formula: &str, cells: &dyn CellLookup) -> CellResult {
        self(formula, cells)
    }
}

/// Accessor over a snapshot of raw store values
#[derive(Debug, Clone)]
pub struct SnapshotLookup {
    values: Vec<Vec<String>>,
}

impl SnapshotLookup {
    pub fn new(values: Vec<Vec<String>>) -> Self {
        Self { values }
    }

    /// Snapshot the current values of a store
    pub fn of(store: &CellStore) -> Self {
        Self::new(store.snapshot_values())
    }
}

impl CellLookup for SnapshotLookup {
    fn cell_value(&self, row: usize, col: usize) -> Option<Scalar> {
        let raw = self
            .values
            .get(row.checked_sub(1)?)?
            .get(col.checked_sub(1)?)?;
        Some(Scalar::from_raw(raw))
    }
}

/// Outcome of resolving a cell
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Whether the value was a formula handed to the evaluator
    pub evaluated: bool,
    /// The result now stored in the cell
    pub result: CellResult,
}

/// Compute and store the result of one cell
///
/// Plain values are stored as their own result. Formula values are evaluated
/// against a snapshot of the store; an error result is stored like any other.
/// Returns `None` when the coordinate is outside the grid.
pub fn resolve<E: FormulaEvaluator + ?Sized>(
    store: &mut CellStore,
    row: usize,
    col: usize,
    evaluator: &E,
) -> Option<Resolution> {
    let value = store.get(row, col)?.value.clone();
    let resolution = match value.trim().strip_prefix('=') {
        Some(formula) => {
            let lookup = SnapshotLookup::of(store);
            let result = evaluator.evaluate(formula, &lookup);
            debug!(row, col, formula, %result, "evaluated formula");
            Resolution {
                evaluated: true,
                result,
            }
        }
        None => Resolution {
            evaluated: false,
            result: CellResult::from_plain(&value),
        },
    };

    store.set_result(row, col, resolution.result.clone());
    Some(resolution)
}

/// Re-evaluate every formula cell against one snapshot
///
/// Returns the number of formulas evaluated.
pub fn recalculate<E: FormulaEvaluator + ?Sized>(store: &mut CellStore, evaluator: &E) -> usize {
    let lookup = SnapshotLookup::of(store);
    let results: Vec<_> = store
        .cells()
        .filter_map(|(addr, cell)| {
            let formula = cell.value.trim().strip_prefix('=')?;
            Some((addr, evaluator.evaluate(formula, &lookup)))
        })
        .collect();

    let count = results.len();
    for (addr, result) in results {
        store.set_result(addr.row, addr.col, result);
    }
    debug!(count, "recalculated formulas");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgrid_core::{CellError, CellPatch, GridConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalar_from_raw() {
        assert_eq!(Scalar::from_raw(""), Scalar::Empty);
        assert_eq!(Scalar::from_raw(" 4 "), Scalar::Number(4.0));
        assert_eq!(Scalar::from_raw("=A1"), Scalar::Formula("A1".into()));
        assert_eq!(Scalar::from_raw("abc"), Scalar::Text("abc".into()));
    }

    #[test]
    fn test_snapshot_lookup_is_one_based() {
        let lookup = SnapshotLookup::new(vec![
            vec!["1".into(), "2".into()],
            vec!["3".into(), "4".into()],
        ]);
        assert_eq!(lookup.cell_value(1, 1), Some(Scalar::Number(1.0)));
        assert_eq!(lookup.cell_value(2, 1), Some(Scalar::Number(3.0)));
        assert_eq!(lookup.cell_value(1, 2), Some(Scalar::Number(2.0)));
        assert_eq!(lookup.cell_value(0, 1), None);
        assert_eq!(lookup.cell_value(3, 1), None);
    }

    #[test]
    fn test_resolve_plain_value() {
        let mut store = CellStore::new(&GridConfig::new(2, 2));
        store.set_cell_data(0, 0, CellPatch::value("42"));

        let never = |_: &str, _: &dyn CellLookup| -> CellResult { unreachable!() };
        let resolution = resolve(&mut store, 0, 0, &never).unwrap();

        assert!(!resolution.evaluated);
        assert_eq!(resolution.result, CellResult::Number(42.0));
        assert_eq!(store.get(0, 0).unwrap().result, CellResult::Number(42.0));
    }

    #[test]
    fn test_resolve_passes_formula_without_prefix() {
        let mut store = CellStore::new(&GridConfig::new(2, 2));
        store.set_cell_data(1, 0, CellPatch::value("7"));
        store.set_cell_data(0, 1, CellPatch::value("=second row"));

        let evaluator = |formula: &str, cells: &dyn CellLookup| {
            assert_eq!(formula, "second row");
            match cells.cell_value(2, 1) {
                Some(Scalar::Number(n)) => CellResult::Number(n),
                _ => CellResult::Error(CellError::Ref),
            }
        };
        let resolution = resolve(&mut store, 0, 1, &evaluator).unwrap();

        assert!(resolution.evaluated);
        assert_eq!(resolution.result, CellResult::Number(7.0));
    }

    #[test]
    fn test_resolve_stores_error_result() {
        let mut store = CellStore::new(&GridConfig::new(1, 1));
        store.set_cell_data(0, 0, CellPatch::value("=boom"));

        let failing = |_: &str, _: &dyn CellLookup| CellResult::Error(CellError::Value);
        let resolution = resolve(&mut store, 0, 0, &failing).unwrap();

        assert_eq!(resolution.result, CellResult::Error(CellError::Value));
        assert_eq!(
            store.get(0, 0).unwrap().result,
            CellResult::Error(CellError::Value)
        );
    }

    #[test]
    fn test_resolve_out_of_range() {
        let mut store = CellStore::new(&GridConfig::new(1, 1));
        let failing = |_: &str, _: &dyn CellLookup| CellResult::Empty;
        assert_eq!(resolve(&mut store, 4, 4, &failing), None);
    }
}
