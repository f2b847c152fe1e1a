//! Formula tokenizer
//!
//! Splits formula text into operators and operands. This is deliberately
//! shallow: it only needs to find cell references and the operators between
//! them so the editor can track which cells a formula points at.

use crate::color::ColorSource;
use cellgrid_core::{CellAddress, FormulaEntity};
use lazy_regex::regex;
use std::ops::Range;

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// One of `+ - * / ( )`
    Operator,
    /// An identifier, cell label or number
    Variable,
}

/// A token of formula text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    /// Byte range of the token in the text it was scanned from
    pub span: Range<usize>,
}

/// Operator and variable counts of an entity list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityCounts {
    pub operation_count: usize,
    pub variable_count: usize,
}

/// Check if a token is a single operator character
pub fn is_operator(token: &str) -> bool {
    regex!(r"^[-+*/()]$").is_match(token)
}

/// Split formula text into tokens, ignoring whitespace and a leading `=`
///
/// # Example
/// ```
/// use cellgrid_formula::{tokenize, TokenKind};
///
/// let tokens = tokenize("=A1 + 10");
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, [TokenKind::Variable, TokenKind::Operator, TokenKind::Variable]);
/// ```
pub fn tokenize(text: &str) -> Vec<Token> {
    // Byte offset in `text` of every byte kept in `compact`
    let mut offsets = Vec::with_capacity(text.len());
    let mut compact = String::with_capacity(text.len());
    for (at, c) in text.char_indices().filter(|(_, c)| !c.is_whitespace()) {
        offsets.extend(at..at + c.len_utf8());
        compact.push(c);
    }
    let skip = usize::from(compact.starts_with('='));

    regex!(r"[A-Za-z_][A-Za-z0-9_]*|[0-9]+(?:\.[0-9]+)?|[-+*/()]")
        .find_iter(&compact[skip..])
        .map(|m| {
            let value = m.as_str().to_string();
            let kind = if is_operator(&value) {
                TokenKind::Operator
            } else {
                TokenKind::Variable
            };
            // Matches are ASCII, so the last byte closes the span
            let span = offsets[skip + m.start()]..offsets[skip + m.end() - 1] + 1;
            Token { value, kind, span }
        })
        .collect()
}

/// Partition an entity list into operator and variable counts
pub fn count_by_kind(entities: &[FormulaEntity]) -> EntityCounts {
    entities
        .iter()
        .fold(EntityCounts::default(), |mut counts, entity| {
            match entity {
                FormulaEntity::Operation { .. } => counts.operation_count += 1,
                FormulaEntity::Variable { .. } => counts.variable_count += 1,
            }
            counts
        })
}

/// Rebuild the entity list of typed formula text
///
/// Operators become operation entities and cell labels become variable
/// entities; other operands (numbers, names) carry no entity. A reference that
/// already appears in `previous` keeps its color, new ones draw from `colors`.
pub fn entities_from_formula(
    text: &str,
    previous: &[FormulaEntity],
    colors: &mut dyn ColorSource,
) -> Vec<FormulaEntity> {
    let mut entities: Vec<FormulaEntity> = Vec::new();

    for token in tokenize(text) {
        match token.kind {
            TokenKind::Operator => entities.push(FormulaEntity::operation(token.value)),
            TokenKind::Variable => {
                let Ok(addr) = CellAddress::parse(&token.value) else {
                    continue;
                };
                let label = addr.to_label();
                let color = previous
                    .iter()
                    .chain(entities.iter())
                    .find(|e| e.address() == Some(label.as_str()))
                    .and_then(|e| e.border_color())
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        let last = entities.iter().rev().find_map(|e| e.border_color());
                        colors.next_color(last)
                    });
                entities.push(FormulaEntity::variable(addr.row, addr.col, color));
            }
        }
    }

    entities
}
