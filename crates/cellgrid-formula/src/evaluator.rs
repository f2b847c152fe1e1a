//! Built-in arithmetic evaluator
//!
//! Evaluates `+ - * / ^`, unary minus, postfix `%`, parentheses, numeric
//! literals and single-cell references. Referenced formula cells are evaluated
//! first, dependencies before dependents; a reference cycle yields `#REF!`.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::bridge::{CellLookup, FormulaEvaluator, Scalar};
use crate::error::{FormulaError, FormulaResult};
use crate::parser::parse_formula;
use cellgrid_core::{CellAddress, CellError, CellResult};
use std::collections::HashMap;
use tracing::trace;

/// Evaluator for plain arithmetic over cell references
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticEvaluator;

impl ArithmeticEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl FormulaEvaluator for ArithmeticEvaluator {
    fn evaluate(&self, formula: &str, cells: &dyn CellLookup) -> CellResult {
        let mut ctx = Evaluation {
            cells,
            settled: HashMap::new(),
        };
        let result = parse_formula(formula).and_then(|expr| ctx.eval(&expr));

        match result {
            // A bare reference to an empty cell reads as zero
            Ok(CellResult::Empty) => CellResult::Number(0.0),
            Ok(value) => value,
            Err(e) => {
                trace!(formula, error = %e, "formula evaluation failed");
                CellResult::Error(e.to_cell_error())
            }
        }
    }
}

struct Evaluation<'a> {
    cells: &'a dyn CellLookup,
    /// Results of referenced formula cells evaluated so far
    settled: HashMap<CellAddress, FormulaResult<CellResult>>,
}

impl Evaluation<'_> {
    fn eval(&mut self, expr: &FormulaExpr) -> FormulaResult<CellResult> {
        match expr {
            FormulaExpr::Number(n) => Ok(CellResult::Number(*n)),
            FormulaExpr::CellRef(addr) => self.reference(*addr),
            FormulaExpr::Name(_) => Ok(CellResult::Error(CellError::Name)),
            FormulaExpr::BinaryOp { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(binary(*op, &left, &right))
            }
            FormulaExpr::UnaryOp { op, operand } => {
                let value = self.eval(operand)?;
                Ok(unary(*op, &value))
            }
        }
    }

    fn scalar(&self, addr: CellAddress) -> Option<Scalar> {
        self.cells.cell_value(addr.row + 1, addr.col + 1)
    }

    fn reference(&mut self, addr: CellAddress) -> FormulaResult<CellResult> {
        let scalar = self
            .scalar(addr)
            .ok_or_else(|| FormulaError::InvalidReference(addr.to_string()))?;

        match scalar {
            Scalar::Empty => Ok(CellResult::Empty),
            Scalar::Number(n) => Ok(CellResult::Number(n)),
            Scalar::Text(s) => Ok(CellResult::Text(s)),
            Scalar::Formula(_) => {
                self.settle(addr)?;
                match self.settled.get(&addr) {
                    Some(result) => result.clone(),
                    None => Err(FormulaError::CircularReference(addr.to_string())),
                }
            }
        }
    }

    /// Evaluate the formula cell at `root` after every formula cell it
    /// depends on, walking the dependencies with an explicit stack
    ///
    /// Chains of any length settle without deepening the call stack. A cell
    /// reached again while its own dependencies are still pending closes a
    /// cycle.
    fn settle(&mut self, root: CellAddress) -> FormulaResult<()> {
        let mut pending = vec![root];
        let mut expanded: HashMap<CellAddress, FormulaResult<FormulaExpr>> = HashMap::new();

        while let Some(&addr) = pending.last() {
            if self.settled.contains_key(&addr) {
                pending.pop();
                continue;
            }

            // Dependencies pushed above this cell are all settled now
            if let Some(parsed) = expanded.remove(&addr) {
                pending.pop();
                let value = match parsed {
                    Ok(expr) => self.eval(&expr),
                    Err(e) => Ok(CellResult::Error(e.to_cell_error())),
                };
                self.settled.insert(addr, value);
                continue;
            }

            let parsed = match self.scalar(addr) {
                Some(Scalar::Formula(formula)) => parse_formula(&formula),
                _ => {
                    pending.pop();
                    continue;
                }
            };

            if let Ok(expr) = &parsed {
                let mut references = Vec::new();
                collect_references(expr, &mut references);
                for dep in references {
                    if self.settled.contains_key(&dep)
                        || !matches!(self.scalar(dep), Some(Scalar::Formula(_)))
                    {
                        continue;
                    }
                    if dep == addr || expanded.contains_key(&dep) {
                        return Err(FormulaError::CircularReference(dep.to_string()));
                    }
                    pending.push(dep);
                }
            }
            expanded.insert(addr, parsed);
        }

        Ok(())
    }
}

fn collect_references(expr: &FormulaExpr, out: &mut Vec<CellAddress>) {
    match expr {
        FormulaExpr::CellRef(addr) => out.push(*addr),
        FormulaExpr::Number(_) | FormulaExpr::Name(_) => {}
        FormulaExpr::BinaryOp { left, right, .. } => {
            collect_references(left, out);
            collect_references(right, out);
        }
        FormulaExpr::UnaryOp { operand, .. } => collect_references(operand, out),
    }
}

fn operand(value: &CellResult) -> Result<f64, CellError> {
    match value {
        CellResult::Empty => Ok(0.0),
        CellResult::Number(n) => Ok(*n),
        CellResult::Text(_) => Err(CellError::Value),
        CellResult::Error(e) => Err(*e),
    }
}

fn binary(op: BinaryOperator, left: &CellResult, right: &CellResult) -> CellResult {
    let (l, r) = match (operand(left), operand(right)) {
        (Ok(l), Ok(r)) => (l, r),
        (Err(e), _) | (_, Err(e)) => return CellResult::Error(e),
    };

    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return CellResult::Error(CellError::Div0);
            }
            l / r
        }
        BinaryOperator::Power => l.powf(r),
    };

    if result.is_finite() {
        CellResult::Number(result)
    } else {
        CellResult::Error(CellError::Num)
    }
}

fn unary(op: UnaryOperator, value: &CellResult) -> CellResult {
    match operand(value) {
        Ok(n) => match op {
            UnaryOperator::Negate => CellResult::Number(-n),
            UnaryOperator::Percent => CellResult::Number(n / 100.0),
        },
        Err(e) => CellResult::Error(e),
    }
}
