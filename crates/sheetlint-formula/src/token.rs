//! Token types produced by the [`tokenize`](crate::tokenize) pass

use std::fmt;

/// Byte offsets `[start, end)` of a token in the formula text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TokenKind {
    /// Numeric literal (`42`, `1.5E+5`)
    Number,
    /// Quoted literal, delimiters excluded
    Text,
    /// Arithmetic, comparison, concatenation or range operator, and `(` `)` `,`
    Operator,
    /// Identifier immediately followed by `(`
    Function,
    /// Identifier without `:` (`A1`, `$B$2`, also bare names like `TRUE`)
    CellRef,
    /// Identifier containing `:` (`A1:B10`)
    RangeRef,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Number => "number",
            TokenKind::Text => "text",
            TokenKind::Operator => "operator",
            TokenKind::Function => "function",
            TokenKind::CellRef => "cell-ref",
            TokenKind::RangeRef => "range-ref",
        };
        f.write_str(name)
    }
}

/// A lexed token
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            span: Span::new(start, end),
        }
    }

    /// True for an operator token with exactly this text
    pub fn is_operator(&self, text: &str) -> bool {
        self.kind == TokenKind::Operator && self.value == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {}..{}",
            self.kind, self.value, self.span.start, self.span.end
        )
    }
}
