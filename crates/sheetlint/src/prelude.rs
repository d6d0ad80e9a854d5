//! Prelude module - common imports for sheetlint users
//!
//! ```rust
//! use sheetlint::prelude::*;
//! ```

pub use crate::{
    analyze_formula,
    // Addressing
    CellAddress,
    CellRange,
    // Configuration
    CycleSearch,
    FormulaAnalysis,
    // Issues
    Issue,
    IssueType,
    LintOptions,
    LintReport,
    Linter,
    Severity,
    // Input model
    Sheet,
    Workbook,
};
