//! Formula tokenizer
//!
//! Lexes formula text (leading `=` already removed) into a flat token stream.
//! The tokenizer is lenient: characters it does not recognize are skipped and
//! it never fails.

use crate::token::{Token, TokenKind};

/// Split formula text into tokens.
///
/// # Example
/// ```rust
/// use sheetlint_formula::{tokenize, TokenKind};
///
/// let tokens = tokenize("SUM(A1:A10)");
/// assert_eq!(tokens[0].kind, TokenKind::Function);
/// assert_eq!(tokens[2].kind, TokenKind::RangeRef);
/// ```
pub fn tokenize(formula: &str) -> Vec<Token> {
    Tokenizer::new(formula).run()
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.peek_char() {
            match c {
                c if c.is_whitespace() => self.advance(),
                ',' | '(' | ')' => self.single_operator(),
                '+' | '-' | '*' | '/' | '^' | '&' | '=' | ':' => self.single_operator(),
                '<' | '>' => self.comparison(),
                '"' | '\'' => self.text(c),
                c if c.is_ascii_digit() => self.number(),
                c if c.is_ascii_alphabetic() || c == '$' => self.identifier(),
                _ => self.advance(),
            }
        }
        self.tokens
    }

    // === Token scanning ===

    fn single_operator(&mut self) {
        let start = self.pos;
        self.advance();
        self.push(TokenKind::Operator, start);
    }

    fn comparison(&mut self) {
        let start = self.pos;
        let first = self.peek_char();
        self.advance();
        match (first, self.peek_char()) {
            (Some('<'), Some('=' | '>')) | (Some('>'), Some('=')) => self.advance(),
            _ => {}
        }
        self.push(TokenKind::Operator, start);
    }

    fn text(&mut self, quote: char) {
        let start = self.pos;
        self.advance();
        let body_start = self.pos;
        while self.peek_char().map_or(false, |c| c != quote) {
            self.advance();
        }
        let body = self.input[body_start..self.pos].to_string();
        // Closing quote, if present
        self.advance();
        self.tokens
            .push(Token::new(TokenKind::Text, body, start, self.pos));
    }

    fn number(&mut self) {
        let start = self.pos;
        let mut seen_decimal = false;
        let mut seen_exponent = false;

        while let Some(c) = self.peek_char() {
            match c {
                c if c.is_ascii_digit() => self.advance(),
                '.' if !seen_decimal => {
                    seen_decimal = true;
                    self.advance();
                }
                'e' | 'E' if !seen_exponent => {
                    seen_exponent = true;
                    self.advance();
                    if matches!(self.peek_char(), Some('+' | '-')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }

        self.push(TokenKind::Number, start);
    }

    fn identifier(&mut self) {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || matches!(c, '$' | '_' | ':'))
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];
        let kind = if text.contains(':') {
            TokenKind::RangeRef
        } else if self.peek_char() == Some('(') {
            TokenKind::Function
        } else {
            TokenKind::CellRef
        };
        self.push(kind, start);
    }

    // === Helper methods ===

    fn push(&mut self, kind: TokenKind, start: usize) {
        let value = &self.input[start..self.pos];
        self.tokens.push(Token::new(kind, value, start, self.pos));
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }
}
