//! Per-formula issue rules
//!
//! Structural rules read the [`FormulaAnalysis`]; the division check reads the
//! raw formula text, so it also fires for formulas that failed to parse.

use crate::config::LintOptions;
use crate::issue::{Issue, Severity};
use lazy_regex::regex_is_match;
use sheetlint_core::CellRange;
use sheetlint_formula::FormulaAnalysis;

/// Issues for one formula, in rule order
pub fn formula_issues(
    options: &LintOptions,
    analysis: &FormulaAnalysis,
    formula: &str,
    sheet: &str,
    cell: &str,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    if !analysis.is_valid {
        let first = analysis.errors.first().map(String::as_str).unwrap_or("unknown error");
        issues.push(
            Issue::formula(Severity::Error, sheet, cell, format!("Invalid formula: {first}"))
                .with_suggestion("Check the formula syntax"),
        );
    } else {
        structural_issues(options, analysis, sheet, cell, &mut issues);
    }

    if has_zero_division(formula) {
        issues.push(
            Issue::formula(Severity::Error, sheet, cell, "Possible division by zero")
                .with_suggestion("Add error handling with IFERROR()"),
        );
    }

    issues
}

fn structural_issues(
    options: &LintOptions,
    analysis: &FormulaAnalysis,
    sheet: &str,
    cell: &str,
    issues: &mut Vec<Issue>,
) {
    if analysis.complexity > options.complexity_threshold {
        issues.push(
            Issue::formula(Severity::Warning, sheet, cell, "Complex formula detected")
                .with_suggestion("Consider breaking this formula into smaller parts"),
        );
    }

    if options.report_volatile && analysis.has_volatile_functions() {
        let mut names: Vec<&str> = Vec::new();
        for name in &analysis.volatile_functions {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        issues.push(
            Issue::formula(
                Severity::Warning,
                sheet,
                cell,
                format!("Volatile functions used: {}", names.join(", ")),
            )
            .with_suggestion(
                "Avoid volatile functions where possible; they recalculate on every change",
            ),
        );
    }

    for range in &analysis.used_ranges {
        match range_row_span(range) {
            Some(rows) if rows > options.large_range_rows => issues.push(Issue::formula(
                Severity::Warning,
                sheet,
                cell,
                format!("Large range reference {range} spans {rows} rows"),
            )),
            Some(_) => {}
            None => tracing::trace!("{sheet}!{cell}: range {range} has no row extent"),
        }
    }

    if options.report_repeated_references {
        for repeated in &analysis.repeated_references {
            issues.push(Issue::formula(
                Severity::Info,
                sheet,
                cell,
                format!(
                    "Reference {} appears {} times in the same formula",
                    repeated.reference, repeated.occurrences
                ),
            ));
        }
    }
}

/// Whether the text divides by a zero literal, a cell, or a parenthesized
/// expression without an `IFERROR`/`IFNA` guard anywhere in the formula
pub fn has_zero_division(formula: &str) -> bool {
    regex_is_match!(
        r"/\s*(?:0+(?:\.0*)?(?:[^\d.]|$)|\$?[A-Za-z]+\$?\d+|\()",
        formula
    ) && !regex_is_match!(r"(?i)\bIF(?:ERROR|NA)\s*\(", formula)
}

/// Number of rows a range reference covers; column-only ranges cover the whole sheet
pub fn range_row_span(range: &str) -> Option<u32> {
    CellRange::parse(range).ok().map(|r| r.row_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetlint_formula::analyze_formula;

    fn messages(formula: &str) -> Vec<String> {
        formula_issues(
            &LintOptions::default(),
            &analyze_formula(formula),
            formula,
            "Sheet1",
            "A1",
        )
        .into_iter()
        .map(|issue| issue.message)
        .collect()
    }

    #[test]
    fn test_zero_division_patterns() {
        assert!(has_zero_division("=A1/0"));
        assert!(has_zero_division("A1 / 0.0"));
        assert!(has_zero_division("A1/B1"));
        assert!(has_zero_division("A1/$B$1"));
        assert!(has_zero_division("A1/(B1-C1)"));
        assert!(has_zero_division("sum(a1)/b2"));

        assert!(!has_zero_division("A1/2"));
        assert!(!has_zero_division("A1/0.5"));
        assert!(!has_zero_division("A1/05"));
        assert!(!has_zero_division("A1*0"));
    }

    #[test]
    fn test_zero_division_guarded() {
        assert!(!has_zero_division("IFERROR(A1/B1,0)"));
        assert!(!has_zero_division("iferror(A1/0, \"\")"));
        assert!(!has_zero_division("IFNA(A1/B1, 0)"));
    }

    #[test]
    fn test_range_row_span() {
        assert_eq!(range_row_span("A1:A10"), Some(10));
        assert_eq!(range_row_span("$B$20:C5"), Some(16));
        assert_eq!(range_row_span("A:C"), Some(sheetlint_core::MAX_ROWS));
        assert_eq!(range_row_span("A1"), None);
    }

    #[test]
    fn test_clean_formula() {
        assert!(messages("=SUM(A1:A10)").is_empty());
    }

    #[test]
    fn test_invalid_formula_reports_first_error() {
        assert_eq!(
            messages("=SUM(A1:A10"),
            vec!["Invalid formula: Unmatched parentheses"]
        );
        // Division still checked on raw text
        assert_eq!(
            messages("=A1/0 +"),
            vec![
                "Invalid formula: Operator '+' at position 5 is missing an operand",
                "Possible division by zero",
            ]
        );
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(
            messages("IF(A1>0,IF(A1<10,IF(A1<5,NOW(),RAND()),A:A),B1/C1)"),
            vec![
                "Complex formula detected".to_string(),
                "Volatile functions used: NOW, RAND".to_string(),
                "Large range reference A:A spans 1048576 rows".to_string(),
                "Reference A1 appears 3 times in the same formula".to_string(),
                "Possible division by zero".to_string(),
            ]
        );
    }

    #[test]
    fn test_options_silence_rules() {
        let options = LintOptions {
            report_volatile: false,
            report_repeated_references: false,
            large_range_rows: 5000,
            ..LintOptions::default()
        };
        let formula = "A1 + A1 + SUM(B1:B2000, NOW())";
        let issues = formula_issues(&options, &analyze_formula(formula), formula, "S", "C1");
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn test_issue_fields() {
        let formula = "A1/0";
        let issues = formula_issues(
            &LintOptions::default(),
            &analyze_formula(formula),
            formula,
            "Budget",
            "D4",
        );
        assert_eq!(
            issues,
            vec![Issue::formula(Severity::Error, "Budget", "D4", "Possible division by zero")
                .with_suggestion("Add error handling with IFERROR()")]
        );
    }
}
