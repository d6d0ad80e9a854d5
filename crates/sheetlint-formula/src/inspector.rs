//! Single-formula analysis
//!
//! Derives quality metrics from a parsed formula: a weighted complexity score,
//! volatile function usage, referenced cells and ranges, and validity errors.
//! [`analyze_formula`] never fails; parse errors are folded into the result.

use crate::ast::FormulaNode;
use crate::error::FormulaError;
use crate::functions;
use crate::parser::parse_formula;
use ahash::{AHashMap, AHashSet};

/// Message recorded when `(` and `)` counts differ in the raw text
pub const UNMATCHED_PARENTHESES: &str = "Unmatched parentheses";

/// Result of analyzing one formula
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FormulaAnalysis {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub complexity: f64,
    /// Uppercased volatile function names in traversal order, duplicates kept
    pub volatile_functions: Vec<String>,
    /// Distinct cell references as written (including `$`), in discovery order
    pub dependencies: Vec<String>,
    /// Distinct range references as written, in discovery order
    pub used_ranges: Vec<String>,
    /// Cell references written more than once in this formula
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub repeated_references: Vec<RepeatedReference>,
}

/// A cell reference occurring several times within one formula
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RepeatedReference {
    pub reference: String,
    pub occurrences: usize,
}

impl FormulaAnalysis {
    /// Result for a formula that could not be parsed: every metric empty or zero
    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            ..Self::default()
        }
    }

    pub fn has_volatile_functions(&self) -> bool {
        !self.volatile_functions.is_empty()
    }
}

/// Parse and analyze a formula (leading `=` optional).
///
/// # Example
/// ```rust
/// use sheetlint_formula::analyze_formula;
///
/// let analysis = analyze_formula("NOW() + A1");
/// assert!(analysis.is_valid);
/// assert_eq!(analysis.volatile_functions, vec!["NOW"]);
/// assert_eq!(analysis.dependencies, vec!["A1"]);
/// ```
pub fn analyze_formula(formula: &str) -> FormulaAnalysis {
    let unbalanced = formula.matches('(').count() != formula.matches(')').count();

    match parse_formula(formula) {
        Ok(root) => {
            let mut analysis = inspect(&root);
            if unbalanced {
                analysis.errors.push(UNMATCHED_PARENTHESES.to_string());
                analysis.is_valid = false;
            }
            analysis
        }
        Err(err) => {
            tracing::trace!("formula {formula:?} failed to parse: {err}");
            let mut errors = vec![err.to_string()];
            if unbalanced && !matches!(err, FormulaError::UnmatchedParentheses { .. }) {
                errors.push(UNMATCHED_PARENTHESES.to_string());
            }
            FormulaAnalysis::invalid(errors)
        }
    }
}

/// Analyze an already parsed formula
pub fn inspect(root: &FormulaNode) -> FormulaAnalysis {
    let repeated_references = repeated_references(root);
    let errors = repeated_references
        .iter()
        .map(|r| {
            format!(
                "Reference {} appears {} times in the same formula",
                r.reference, r.occurrences
            )
        })
        .collect();

    FormulaAnalysis {
        is_valid: true,
        errors,
        complexity: complexity(root),
        volatile_functions: volatile_functions(root),
        dependencies: dependencies(root),
        used_ranges: used_ranges(root),
        repeated_references,
    }
}

/// Weighted size of the tree: each call adds `1 + 0.5 × depth`, each operator `0.5`
pub fn complexity(root: &FormulaNode) -> f64 {
    root.walk()
        .map(|(depth, node)| match node {
            FormulaNode::Function { .. } => 1.0 + 0.5 * depth as f64,
            FormulaNode::Operator { .. } => 0.5,
            _ => 0.0,
        })
        .sum()
}

/// Volatile function names, uppercased, in traversal order
pub fn volatile_functions(root: &FormulaNode) -> Vec<String> {
    root.walk()
        .filter_map(|(_, node)| match node {
            FormulaNode::Function { token, .. } if functions::is_volatile(&token.value) => {
                Some(token.value.to_ascii_uppercase())
            }
            _ => None,
        })
        .collect()
}

/// Distinct cell references in discovery order
pub fn dependencies(root: &FormulaNode) -> Vec<String> {
    distinct(root.walk().filter_map(|(_, node)| match node {
        FormulaNode::CellRef(token) => Some(token.value.as_str()),
        _ => None,
    }))
}

/// Distinct range references in discovery order
pub fn used_ranges(root: &FormulaNode) -> Vec<String> {
    distinct(root.walk().filter_map(|(_, node)| match node {
        FormulaNode::RangeRef(token) => Some(token.value.as_str()),
        _ => None,
    }))
}

/// Cell references written more than once, in order of first appearance
pub fn repeated_references(root: &FormulaNode) -> Vec<RepeatedReference> {
    let mut counts: AHashMap<&str, usize> = AHashMap::new();
    let mut order = Vec::new();
    for (_, node) in root.walk() {
        if let FormulaNode::CellRef(token) = node {
            let count = counts.entry(token.value.as_str()).or_insert(0);
            if *count == 0 {
                order.push(token.value.as_str());
            }
            *count += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|reference| {
            let occurrences = counts.get(reference).copied().unwrap_or(0);
            (occurrences > 1).then(|| RepeatedReference {
                reference: reference.to_string(),
                occurrences,
            })
        })
        .collect()
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: AHashSet<&'a str> = AHashSet::new();
    values
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_formula() {
        let analysis = analyze_formula("A1+B1*2");
        assert!(analysis.is_valid);
        assert!(analysis.errors.is_empty());
        assert_eq!(analysis.complexity, 1.0);
        assert!(analysis.complexity <= 3.0);
        assert!(analysis.volatile_functions.is_empty());
        assert_eq!(analysis.dependencies, vec!["A1", "B1"]);
        assert!(analysis.used_ranges.is_empty());
    }

    #[test]
    fn test_nested_if_complexity() {
        let analysis = analyze_formula("IF(A1>0,IF(A1<10,IF(A1<5,\"Low\",\"Medium\"),\"High\"))");
        assert!(analysis.is_valid, "{:?}", analysis.errors);
        // IF@0 + '>' + IF@1 + '<' + IF@2 + '<'
        assert_eq!(analysis.complexity, 1.0 + 0.5 + 1.5 + 0.5 + 2.0 + 0.5);
        assert!(analysis.complexity > 5.0);
    }

    #[test]
    fn test_function_depth_weighting() {
        assert_eq!(analyze_formula("SUM(A1:A10)").complexity, 1.0);
        assert_eq!(analyze_formula("SUM(MAX(A1:A10))").complexity, 2.5);
        assert_eq!(analyze_formula("1+SUM(A1:A10)").complexity, 2.0);
    }

    #[test]
    fn test_volatile_functions() {
        let analysis = analyze_formula("NOW() + A1");
        assert_eq!(analysis.volatile_functions, vec!["NOW"]);
        assert!(analysis.errors.is_empty());

        let analysis = analyze_formula("rand()*today()+RAND()");
        assert_eq!(analysis.volatile_functions, vec!["RAND", "TODAY", "RAND"]);
    }

    #[test]
    fn test_dependencies_and_ranges() {
        let analysis = analyze_formula("SUM($A$1:A10, B2) + VLOOKUP(C3, D1:E5, 2) + SUM(D1:E5)");
        assert_eq!(analysis.dependencies, vec!["B2", "C3"]);
        assert_eq!(analysis.used_ranges, vec!["$A$1:A10", "D1:E5"]);
    }

    #[test]
    fn test_repeated_reference() {
        let analysis = analyze_formula("A1 + B1 + A1");
        assert!(analysis.is_valid);
        assert_eq!(analysis.dependencies, vec!["A1", "B1"]);
        assert_eq!(
            analysis.repeated_references,
            vec![RepeatedReference {
                reference: "A1".into(),
                occurrences: 2,
            }]
        );
        assert_eq!(
            analysis.errors,
            vec!["Reference A1 appears 2 times in the same formula"]
        );
    }

    #[test]
    fn test_unclosed_call() {
        let analysis = analyze_formula("SUM(A1:A10");
        assert!(!analysis.is_valid);
        assert_eq!(analysis.errors, vec![UNMATCHED_PARENTHESES]);
        assert_eq!(analysis.complexity, 0.0);
        assert!(analysis.dependencies.is_empty());
        assert!(analysis.used_ranges.is_empty());
    }

    #[test]
    fn test_parse_failure_resets_metrics() {
        let analysis = analyze_formula("NOW() + + A1");
        assert!(!analysis.is_valid);
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.volatile_functions.is_empty());
        assert!(analysis.dependencies.is_empty());
    }

    #[test]
    fn test_parse_failure_with_raw_paren_mismatch() {
        let analysis = analyze_formula("SUM(A1 B1))");
        assert!(!analysis.is_valid);
        assert_eq!(
            analysis.errors,
            vec![
                "Missing operator or ',' between arguments of SUM".to_string(),
                UNMATCHED_PARENTHESES.to_string(),
            ]
        );
    }

    #[test]
    fn test_raw_paren_check_runs_on_valid_parse() {
        // Parentheses inside a text literal still count in the raw check
        let analysis = analyze_formula("\"(\" & A1");
        assert!(!analysis.is_valid);
        assert_eq!(analysis.errors, vec![UNMATCHED_PARENTHESES]);
        assert_eq!(analysis.dependencies, vec!["A1"]);
    }

    #[test]
    fn test_many_references_keep_discovery_order() {
        let cells: Vec<String> = (1..=3000).rev().map(|row| format!("B{row}")).collect();
        let formula = format!("SUM({},{})", cells.join(","), cells.join(","));
        let analysis = analyze_formula(&formula);
        assert!(analysis.is_valid);
        assert_eq!(analysis.dependencies, cells);
        assert_eq!(analysis.repeated_references.len(), 3000);
    }

    #[test]
    fn test_empty_formula() {
        let analysis = analyze_formula("");
        assert!(!analysis.is_valid);
        assert_eq!(analysis.errors, vec!["Empty formula"]);
    }

    #[test]
    fn test_large_formula() {
        let analysis =
            analyze_formula("IF(AND(A1>0,B1>0,C1>0),SUM(D1:D100),AVERAGE(E1:E100))");
        assert!(analysis.is_valid);
        assert_eq!(analysis.dependencies, vec!["A1", "B1", "C1"]);
        assert_eq!(analysis.used_ranges, vec!["D1:D100", "E1:E100"]);
    }
}
