//! Errors for reading cell references

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a reference could not be read
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid cell reference {0}")]
    InvalidAddress(String),

    #[error("Invalid range reference {0}")]
    InvalidRange(String),

    /// 0-based row and the largest allowed row
    #[error("Row index {0} is past the last row index {1}")]
    RowOutOfBounds(u32, u32),

    /// 0-based column and the largest allowed column
    #[error("Column index {0} is past the last column index {1}")]
    ColumnOutOfBounds(u32, u16),
}
