//! # sheetlint
//!
//! Static quality analysis for spreadsheet formulas.
//!
//! sheetlint reads formula text only; it never evaluates anything. For each
//! formula it reports syntax problems, complexity, volatile function usage,
//! oversized ranges, repeated references and unguarded division. For each sheet
//! it reports the cells that lie on a circular reference.
//!
//! ## Features
//!
//! - Formula tokenizer and parser with position-carrying errors
//! - Per-formula metrics ([`FormulaAnalysis`])
//! - Circular reference detection per sheet
//! - Issue records and a workbook report, serializable to JSON
//! - TOML configuration ([`LintOptions`])
//!
//! ## Example
//!
//! ```rust
//! use sheetlint::prelude::*;
//!
//! let sheet = Sheet::new("Sheet1")
//!     .with_formula("A1", "=B1+1")
//!     .with_formula("B1", "=A1*2")
//!     .with_formula("C1", "=D1/0");
//!
//! let workbook: Workbook = [sheet].into_iter().collect();
//! let report = Linter::default().lint_workbook(&workbook);
//!
//! assert_eq!(report.metadata.circular_reference_count, 2);
//! assert!(report
//!     .issues
//!     .iter()
//!     .any(|issue| issue.cell == "C1" && issue.message == "Possible division by zero"));
//! ```

pub mod config;
pub mod error;
pub mod issue;
pub mod linter;
pub mod prelude;
pub mod rules;
pub mod sheet;

pub use config::{CycleSearch, LintOptions};
pub use error::{LintError, LintResult};
pub use issue::{Issue, IssueType, Severity};
pub use linter::{LintReport, Linter, ReportMetadata};
pub use sheet::{Sheet, Workbook};

// Re-export the formula analysis API
pub use sheetlint_formula::{
    analyze_formula, parse_formula, tokenize, CircularReferenceReport, CycleStrategy,
    DependencyGraph, FormulaAnalysis, FormulaError, FormulaNode, RepeatedReference, Token,
    TokenKind,
};

// Re-export addressing types
pub use sheetlint_core::{CellAddress, CellRange};
