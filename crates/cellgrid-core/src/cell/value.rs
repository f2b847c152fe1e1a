//! Computed cell results and error markers

use std::fmt;

/// The last computed display value of a cell
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellResult {
    /// No result (the cell value is empty)
    #[default]
    Empty,

    /// Numeric result
    Number(f64),

    /// Text result
    Text(String),

    /// Error marker produced by the evaluator (#DIV/0!, #REF!, etc.)
    Error(CellError),
}

impl CellResult {
    /// Check if there is no result
    pub fn is_empty(&self) -> bool {
        matches!(self, CellResult::Empty)
    }

    /// Check if the result is an error marker
    pub fn is_error(&self) -> bool {
        matches!(self, CellResult::Error(_))
    }

    /// Try to get the result as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellResult::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Interpret raw cell text as a plain (non-formula) result
    ///
    /// Numeric text becomes a number, anything else is kept as text.
    pub fn from_plain(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            return CellResult::Empty;
        }
        match value.parse::<f64>() {
            Ok(n) if n.is_finite() => CellResult::Number(n),
            _ => CellResult::Text(value.to_string()),
        }
    }
}

impl fmt::Display for CellResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellResult::Empty => Ok(()),
            CellResult::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellResult::Text(s) => write!(f, "{}", s),
            CellResult::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<f64> for CellResult {
    fn from(n: f64) -> Self {
        CellResult::Number(n)
    }
}

impl From<&str> for CellResult {
    fn from(s: &str) -> Self {
        CellResult::Text(s.to_string())
    }
}

impl From<CellError> for CellResult {
    fn from(e: CellError) -> Self {
        CellResult::Error(e)
    }
}

/// Spreadsheet error values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellError {
    /// #DIV/0! - Division by zero
    Div0,
    /// #VALUE! - Wrong type of argument or operand
    Value,
    /// #REF! - Invalid or circular cell reference
    Ref,
    /// #NAME? - Unrecognized name
    Name,
    /// #NUM! - Invalid numeric value
    Num,
    /// #ERROR! - Formula could not be parsed
    Parse,
}

impl CellError {
    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::Parse => "#ERROR!",
        }
    }

    /// Parse an error string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "#DIV/0!" => Some(CellError::Div0),
            "#VALUE!" => Some(CellError::Value),
            "#REF!" => Some(CellError::Ref),
            "#NAME?" => Some(CellError::Name),
            "#NUM!" => Some(CellError::Num),
            "#ERROR!" => Some(CellError::Parse),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
