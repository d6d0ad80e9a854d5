//! A1 references: single cells and rectangular ranges
//!
//! References are read the way they appear inside formulas. Column letters are
//! case-insensitive, and a `$` before the column or the row marks that part as
//! absolute. Indexes are stored 0-based.

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// One cell, e.g. `C7` or `$C$7`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CellAddress {
    /// 0-based row (`C7` has row 6)
    pub row: u32,
    /// 0-based column (`C7` has column 2)
    pub col: u16,
    pub row_absolute: bool,
    pub col_absolute: bool,
}

impl CellAddress {
    /// Relative reference to `(row, col)`
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Read a reference such as `b12`, `$B12` or `$B$12`.
    ///
    /// ```
    /// use sheetlint_core::CellAddress;
    ///
    /// let cell = CellAddress::parse("c$7").unwrap();
    /// assert_eq!((cell.row, cell.col), (6, 2));
    /// assert!(cell.row_absolute && !cell.col_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let text = s.trim();
        let (col_absolute, letters, rest) = split_column(text);
        if letters.is_empty() {
            return Err(Error::InvalidAddress(format!("'{}' has no column", text)));
        }
        let col = Self::column_index(letters)?;

        let (row_absolute, digits) = match rest.strip_prefix('$') {
            Some(digits) => (true, digits),
            None => (false, rest),
        };
        let row = parse_row(digits).map_err(|e| match e {
            Error::InvalidAddress(reason) => {
                Error::InvalidAddress(format!("'{}': {}", text, reason))
            }
            other => other,
        })?;

        Ok(Self {
            row,
            col,
            row_absolute,
            col_absolute,
        })
    }

    /// Letters for a 0-based column: 0 → `A`, 27 → `AB`
    pub fn column_name(col: u16) -> String {
        let mut letters = Vec::new();
        let mut remaining = u32::from(col) + 1;
        while remaining > 0 {
            remaining -= 1;
            letters.push(b'A' + (remaining % 26) as u8);
            remaining /= 26;
        }
        letters.iter().rev().map(|&b| b as char).collect()
    }

    /// 0-based column for its letters, case-insensitive: `ab` → 27
    pub fn column_index(letters: &str) -> Result<u16> {
        if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(Error::InvalidAddress(format!(
                "'{}' is not a column name",
                letters
            )));
        }

        let number = letters.bytes().fold(0u32, |acc, b| {
            acc.saturating_mul(26)
                .saturating_add(u32::from(b.to_ascii_uppercase() - b'A') + 1)
        });
        if number > u32::from(MAX_COLS) {
            return Err(Error::ColumnOutOfBounds(number - 1, MAX_COLS - 1));
        }
        Ok((number - 1) as u16)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let col_marker = if self.col_absolute { "$" } else { "" };
        let row_marker = if self.row_absolute { "$" } else { "" };
        write!(
            f,
            "{}{}{}{}",
            col_marker,
            Self::column_name(self.col),
            row_marker,
            self.row + 1
        )
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Rectangle of cells with `start` at the top-left and `end` at the bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    /// Range spanned by two corners given in any order
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        let start = CellAddress {
            row: a.row.min(b.row),
            col: a.col.min(b.col),
            ..a
        };
        let end = CellAddress {
            row: a.row.max(b.row),
            col: a.col.max(b.col),
            ..b
        };
        Self { start, end }
    }

    /// Read a range reference.
    ///
    /// `B3:D9` and `D9:B3` name the same rectangle. Column-only ranges such as
    /// `A:A` or `$B:$D` cover every row of the sheet. Chained text like
    /// `A1:B2:C3` is read from its outermost endpoints.
    pub fn parse(s: &str) -> Result<Self> {
        let text = s.trim();
        let (first, last) = range_endpoints(text)
            .ok_or_else(|| Error::InvalidRange(format!("'{}' has no ':'", text)))?;

        if is_column_only(first) && is_column_only(last) {
            let from = CellAddress::column_index(first.trim_start_matches('$'))?;
            let to = CellAddress::column_index(last.trim_start_matches('$'))?;
            return Ok(Self::new(
                CellAddress::new(0, from),
                CellAddress::new(MAX_ROWS - 1, to),
            ));
        }

        let corner = |part: &str| {
            CellAddress::parse(part).map_err(|e| Error::InvalidRange(format!("'{}': {}", text, e)))
        };
        Ok(Self::new(corner(first)?, corner(last)?))
    }

    /// Rows covered, inclusive of both ends
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Columns covered, inclusive of both ends
    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    pub fn contains(&self, cell: &CellAddress) -> bool {
        (self.start.row..=self.end.row).contains(&cell.row)
            && (self.start.col..=self.end.col).contains(&cell.col)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// First and last `:`-separated parts of a range text, or `None` without a `:`
pub fn range_endpoints(range: &str) -> Option<(&str, &str)> {
    let (first, _) = range.split_once(':')?;
    let (_, last) = range.rsplit_once(':')?;
    Some((first, last))
}

/// Canonical form of an address as written in a formula: `$` markers removed,
/// letters uppercased. `$a$1`, `A$1` and `A1` all normalize to `A1`.
pub fn normalize_address(address: &str) -> String {
    address
        .trim()
        .chars()
        .filter(|&c| c != '$')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// `(absolute, letters, remainder)` for the column part of a reference
fn split_column(text: &str) -> (bool, &str, &str) {
    let (absolute, body) = match text.strip_prefix('$') {
        Some(body) => (true, body),
        None => (false, text),
    };
    let split = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());
    (absolute, &body[..split], &body[split..])
}

/// 0-based row for the 1-based digits of a reference
fn parse_row(digits: &str) -> Result<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidAddress("row must be a number".into()));
    }
    match digits.parse::<u32>() {
        Ok(0) => Err(Error::InvalidAddress("rows start at 1".into())),
        Ok(row) if row <= MAX_ROWS => Ok(row - 1),
        Ok(row) => Err(Error::RowOutOfBounds(row - 1, MAX_ROWS - 1)),
        Err(_) => Err(Error::RowOutOfBounds(u32::MAX, MAX_ROWS - 1)),
    }
}

fn is_column_only(part: &str) -> bool {
    let letters = part.strip_prefix('$').unwrap_or(part);
    !letters.is_empty() && letters.bytes().all(|b| b.is_ascii_alphabetic())
}
