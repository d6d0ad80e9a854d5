//! # sheetlint-formula
//!
//! Static analysis of spreadsheet formulas, without evaluating them.
//!
//! This crate provides:
//! - Tokenizing (text → tokens) and parsing (tokens → AST)
//! - Per-formula analysis: complexity, volatile functions, references, validity
//! - A sheet-level dependency graph with circular reference detection
//!
//! ## Example
//!
//! ```rust
//! use sheetlint_formula::{analyze_formula, DependencyGraph};
//!
//! let analysis = analyze_formula("=IF(A1>0,SUM(B1:B10),0)");
//! assert!(analysis.is_valid);
//! assert_eq!(analysis.used_ranges, vec!["B1:B10"]);
//!
//! let graph = DependencyGraph::from_formulas([("A1", "B1+1"), ("B1", "A1*2")]);
//! assert_eq!(graph.find_circular_references().len(), 2);
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod functions;
pub mod inspector;
pub mod parser;
pub mod token;
pub mod tokenizer;

pub use ast::{FormulaNode, NodeKind};
pub use dependency::{CircularReferenceReport, CycleStrategy, DependencyGraph};
pub use error::{FormulaError, FormulaResult};
pub use inspector::{analyze_formula, inspect, FormulaAnalysis, RepeatedReference};
pub use parser::{parse_formula, parse_tokens};
pub use token::{Span, Token, TokenKind};
pub use tokenizer::tokenize;
