//! # sheetlint-core
//!
//! Cell addressing primitives shared by the sheetlint crates.
//!
//! - [`CellAddress`] and [`CellRange`] - A1-style addresses and ranges
//! - [`normalize_address`] - canonical form used to key dependency graphs
//!
//! ## Example
//!
//! ```rust
//! use sheetlint_core::{CellAddress, CellRange};
//!
//! let addr = CellAddress::parse("$B$2").unwrap();
//! assert_eq!(addr.row, 1);
//!
//! let range = CellRange::parse("A1:A5000").unwrap();
//! assert_eq!(range.row_count(), 5000);
//! ```

pub mod address;
pub mod error;

pub use address::{normalize_address, CellAddress, CellRange};
pub use error::{Error, Result};

/// Rows in a sheet; `XFD1048576` is the last cell
pub const MAX_ROWS: u32 = 1_048_576;

/// Columns in a sheet (`A` through `XFD`)
pub const MAX_COLS: u16 = 16_384;
