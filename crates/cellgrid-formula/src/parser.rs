//! Formula parser
//!
//! A recursive descent parser for arithmetic formulas with operator
//! precedence: `^` binds tighter than `* /`, which bind tighter than `+ -`.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use cellgrid_core::CellAddress;

/// Deepest nesting of parentheses, signs and `^` operands in one formula
pub const MAX_NESTING: usize = 64;

/// Most operators one formula may contain
pub const MAX_OPERATORS: usize = 1024;

/// Parse formula text into an AST; a leading `=` is optional
///
/// # Example
/// ```rust
/// use cellgrid_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("A1*(B2-3)").unwrap();
/// assert!(parse_formula("1+").is_err());
/// ```
///
/// Formulas nested deeper than [`MAX_NESTING`] or with more than
/// [`MAX_OPERATORS`] operators are rejected as parse errors.
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let formula = formula.trim();
    let formula = formula.strip_prefix('=').unwrap_or(formula);

    let mut parser = FormulaParser::new(formula)?;
    let expr = parser.parse_additive()?;

    if parser.current != Token::Eof {
        return Err(FormulaError::Parse(format!(
            "Unexpected input after expression: '{}'",
            &parser.input[parser.token_start..]
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,
    LeftParen,
    RightParen,
    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    token_start: usize,
    current: Token,
    depth: usize,
    operators: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            token_start: 0,
            current: Token::Eof,
            depth: 0,
            operators: 0,
        };
        parser.consume()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn consume(&mut self) -> FormulaResult<()> {
        self.skip_whitespace();
        self.token_start = self.pos;
        self.current = self.scan_token()?;
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '^' => Some(Token::Caret),
            '%' => Some(Token::Percent),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.pos += 1;
            return Ok(token);
        }

        if c.is_ascii_digit() || c == '.' {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() || c == '$' || c == '_' {
            let start = self.pos;
            while let Some(c) = self.peek_char() {
                if !(c.is_ascii_alphanumeric() || c == '$' || c == '_') {
                    break;
                }
                self.pos += 1;
            }
            return Ok(Token::Identifier(self.input[start..self.pos].to_string()));
        }

        Err(FormulaError::Parse(format!("Unexpected character '{}'", c)))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !(c.is_ascii_digit() || c == '.') {
                break;
            }
            self.pos += 1;
        }
        let text = &self.input[start..self.pos];
        text.parse()
            .map(Token::Number)
            .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", text)))
    }

    // === Limits ===

    fn enter(&mut self) -> FormulaResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(FormulaError::Parse(format!(
                "Formula is nested deeper than {} levels",
                MAX_NESTING
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn count_operator(&mut self) -> FormulaResult<()> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(FormulaError::Parse(format!(
                "Formula has more than {} operators",
                MAX_OPERATORS
            )));
        }
        Ok(())
    }

    // === Grammar ===

    fn parse_additive(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.count_operator()?;
            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_exponent()?;

        loop {
            let op = match self.current {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.count_operator()?;
            self.consume()?;
            let right = self.parse_exponent()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_exponent(&mut self) -> FormulaResult<FormulaExpr> {
        let left = self.parse_unary()?;

        if self.current == Token::Caret {
            self.count_operator()?;
            self.enter()?;
            self.consume()?;
            let right = self.parse_exponent()?; // Right associative
            self.leave();
            return Ok(FormulaExpr::BinaryOp {
                op: BinaryOperator::Power,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<FormulaExpr> {
        match self.current {
            Token::Minus => {
                self.count_operator()?;
                self.enter()?;
                self.consume()?;
                let operand = self.parse_unary()?;
                self.leave();
                return Ok(FormulaExpr::UnaryOp {
                    op: UnaryOperator::Negate,
                    operand: Box::new(operand),
                });
            }
            Token::Plus => {
                self.enter()?;
                self.consume()?;
                let operand = self.parse_unary()?;
                self.leave();
                return Ok(operand);
            }
            _ => {}
        }

        let mut expr = self.parse_primary()?;

        while self.current == Token::Percent {
            self.count_operator()?;
            self.consume()?;
            expr = FormulaExpr::UnaryOp {
                op: UnaryOperator::Percent,
                operand: Box::new(expr),
            };
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        match std::mem::replace(&mut self.current, Token::Eof) {
            Token::Number(n) => {
                self.consume()?;
                Ok(FormulaExpr::Number(n))
            }
            Token::Identifier(name) => {
                self.consume()?;
                match CellAddress::parse(&name) {
                    Ok(addr) => Ok(FormulaExpr::CellRef(addr)),
                    Err(_) => Ok(FormulaExpr::Name(name)),
                }
            }
            Token::LeftParen => {
                self.enter()?;
                self.consume()?;
                let expr = self.parse_additive()?;
                self.leave();
                if self.current != Token::RightParen {
                    return Err(FormulaError::Parse("Expected ')'".into()));
                }
                self.consume()?;
                Ok(expr)
            }
            Token::Eof => Err(FormulaError::Parse("Unexpected end of formula".into())),
            other => Err(FormulaError::Parse(format!("Unexpected token {:?}", other))),
        }
    }
}
