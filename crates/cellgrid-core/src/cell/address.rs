//! Cell address and range types, plus the A1 label codec

use crate::error::{Error, Result};
use lazy_regex::regex_captures;
use std::fmt;
use std::str::FromStr;

const COLUMN_LETTERS: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Convert a zero-based `(row, column)` pair to an A1-style label
///
/// # Examples
/// ```
/// use cellgrid_core::to_label;
///
/// assert_eq!(to_label(0, 0), "A1");
/// assert_eq!(to_label(0, 26), "AA1");
/// assert_eq!(to_label(4, 27), "AB5");
/// ```
pub fn to_label(row: usize, column: usize) -> String {
    let mut label = column_label(column);
    label.push_str(&(row + 1).to_string());
    label
}

/// Parse an A1-style label back into a zero-based `(row, column)` pair
///
/// The letter run and digit run are pattern matched, so surrounding noise
/// such as `$` markers or a leading `=` is ignored. Returns `None` when either
/// run is missing or the row number is zero.
pub fn from_label(label: &str) -> Option<(usize, usize)> {
    let (_, letters, digits) = regex_captures!(r"([A-Za-z]+)[^A-Za-z0-9]*([0-9]+)", label)?;

    let column = letters_to_index(letters)?;
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((row - 1, column - 1))
}

/// Column header letters for a zero-based column index (0 = A, 26 = AA)
pub fn column_label(column: usize) -> String {
    let mut letters = String::new();
    push_letters(&mut letters, column + 1);
    letters
}

/// Header letters for the first `count` columns
pub fn column_labels(count: usize) -> Vec<String> {
    (0..count).map(column_label).collect()
}

// Base-26 without a zero digit: the quotient is converted first, then the
// remainder letter is appended.
fn push_letters(out: &mut String, index: usize) {
    let current = index - 1;
    let quotient = current / 26;
    if quotient > 0 {
        push_letters(out, quotient);
    }
    out.push(COLUMN_LETTERS[current % 26]);
}

/// Fold a letter run into a 1-based column index
fn letters_to_index(letters: &str) -> Option<usize> {
    letters.chars().try_fold(0usize, |index, c| {
        let digit = (c.to_ascii_uppercase() as usize).checked_sub('A' as usize)? + 1;
        index.checked_mul(26)?.checked_add(digit)
    })
}

/// A cell address (e.g., "A1")
///
/// Row and column are zero-based; the label form is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: usize,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: usize,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// Unlike [`from_label`], this is strict: the whole input must be a label,
    /// optionally with `$` markers.
    ///
    /// # Examples
    /// ```
    /// use cellgrid_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("B2").unwrap();
    /// assert_eq!(addr, CellAddress::new(1, 1));
    /// assert!(CellAddress::parse("B").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let (_, letters, digits) = regex_captures!(r"^\$?([A-Za-z]+)\$?([0-9]+)$", s)
            .ok_or_else(|| Error::InvalidAddress(format!("'{}' is not an A1 label", s)))?;

        let column = letters_to_index(letters)
            .ok_or_else(|| Error::InvalidAddress(format!("column '{}' is too large", letters)))?;

        let row: usize = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        // Labels are 1-based, we use 0-based internally
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self::new(row - 1, column - 1))
    }

    /// Format as A1-style string
    pub fn to_label(&self) -> String {
        to_label(self.row, self.col)
    }
}

impl From<(usize, usize)> for CellAddress {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_label())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A normalized rectangular block of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range from two arbitrary corners
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    /// Iterate over all cell addresses in the range (row by row)
    pub fn cells(&self) -> impl Iterator<Item = CellAddress> {
        let (start, end) = (self.start, self.end);
        (start.row..=end.row)
            .flat_map(move |row| (start.col..=end.col).map(move |col| CellAddress::new(row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_label_known_values() {
        assert_eq!(to_label(0, 0), "A1");
        assert_eq!(to_label(0, 25), "Z1");
        assert_eq!(to_label(0, 26), "AA1");
        assert_eq!(to_label(4, 27), "AB5");
        assert_eq!(to_label(36, 51), "AZ37");
    }

    #[test]
    fn test_column_label() {
        assert_eq!(column_label(0), "A");
        assert_eq!(column_label(25), "Z");
        assert_eq!(column_label(26), "AA");
        assert_eq!(column_label(701), "ZZ");
        assert_eq!(column_label(702), "AAA");
        assert_eq!(column_label(16383), "XFD");
        assert_eq!(column_labels(3), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_from_label() {
        assert_eq!(from_label("A1"), Some((0, 0)));
        assert_eq!(from_label("AB5"), Some((4, 27)));
        assert_eq!(from_label("ab5"), Some((4, 27)));
        assert_eq!(from_label("$B$2"), Some((1, 1)));
        assert_eq!(from_label("=C3"), Some((2, 2)));
    }

    #[test]
    fn test_from_label_malformed() {
        assert_eq!(from_label(""), None);
        assert_eq!(from_label("A"), None);
        assert_eq!(from_label("12"), None);
        assert_eq!(from_label("A0"), None);
        assert_eq!(from_label("+"), None);
    }

    #[test]
    fn test_cell_address_parse() {
        assert_eq!(CellAddress::parse("A1").unwrap(), CellAddress::new(0, 0));
        assert_eq!(CellAddress::parse(" $C$10 ").unwrap(), CellAddress::new(9, 2));
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("1A").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("A1+").is_err());
    }

    #[test]
    fn test_cell_address_display() {
        assert_eq!(CellAddress::new(0, 0).to_string(), "A1");
        assert_eq!(CellAddress::new(99, 2).to_string(), "C100");
        assert_eq!("D4".parse::<CellAddress>().unwrap(), CellAddress::new(3, 3));
    }

    #[test]
    fn test_cell_range_normalizes() {
        let range = CellRange::new(CellAddress::new(5, 5), CellAddress::new(2, 2));
        assert_eq!(range.start, CellAddress::new(2, 2));
        assert_eq!(range.end, CellAddress::new(5, 5));
        assert_eq!(range.row_count(), 4);
        assert_eq!(range.col_count(), 4);
        assert!(range.contains(&CellAddress::new(3, 4)));
        assert!(!range.contains(&CellAddress::new(6, 4)));
        assert_eq!(range.to_string(), "C3:F6");
    }

    #[test]
    fn test_cell_range_iterator() {
        let range = CellRange::new(CellAddress::new(0, 0), CellAddress::new(1, 1));
        let cells: Vec<_> = range.cells().collect();

        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0], CellAddress::new(0, 0)); // A1
        assert_eq!(cells[1], CellAddress::new(0, 1)); // B1
        assert_eq!(cells[2], CellAddress::new(1, 0)); // A2
        assert_eq!(cells[3], CellAddress::new(1, 1)); // B2
    }

    proptest! {
        #[test]
        fn label_round_trip(row in 0usize..2_000_000, column in 0usize..100_000) {
            prop_assert_eq!(from_label(&to_label(row, column)), Some((row, column)));
        }
    }
}
