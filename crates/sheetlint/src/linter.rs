//! Sheet and workbook linting

use crate::config::LintOptions;
use crate::issue::{Issue, Severity};
use crate::rules::formula_issues;
use crate::sheet::{Sheet, Workbook};
use ahash::AHashMap;
use serde::Serialize;
use sheetlint_core::normalize_address;
use sheetlint_formula::{analyze_formula, DependencyGraph};

/// Counters gathered over a lint run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Non-blank formulas analyzed
    pub formula_count: usize,
    pub sheet_count: usize,
    /// Formulas calling at least one volatile function
    pub volatile_formula_count: usize,
    /// Cells found on a dependency cycle
    pub circular_reference_count: usize,
    pub invalid_formula_count: usize,
}

/// Issues and counters for a whole workbook
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LintReport {
    pub issues: Vec<Issue>,
    pub metadata: ReportMetadata,
}

impl LintReport {
    /// Number of issues with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }
}

/// Runs the formula rules and the circular reference check
#[derive(Debug, Clone, Default)]
pub struct Linter {
    options: LintOptions,
}

impl Linter {
    pub fn new(options: LintOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LintOptions {
        &self.options
    }

    /// Issues for a single formula, without circular reference checks
    pub fn lint_formula(&self, formula: &str, cell: &str, sheet: &str) -> Vec<Issue> {
        formula_issues(&self.options, &analyze_formula(formula), formula, sheet, cell)
    }

    /// Issues for every formula of a sheet, followed by its circular references
    pub fn lint_sheet(&self, sheet: &Sheet) -> Vec<Issue> {
        let mut metadata = ReportMetadata::default();
        self.lint_sheet_into(sheet, &mut metadata)
    }

    /// Lint every sheet and collect the counters
    pub fn lint_workbook(&self, workbook: &Workbook) -> LintReport {
        let mut metadata = ReportMetadata {
            sheet_count: workbook.sheet_count(),
            ..ReportMetadata::default()
        };
        let mut issues = Vec::new();
        for sheet in &workbook.sheets {
            issues.extend(self.lint_sheet_into(sheet, &mut metadata));
        }

        tracing::debug!(
            "linted {} formulas in {} sheets: {} issues",
            metadata.formula_count,
            metadata.sheet_count,
            issues.len()
        );
        LintReport { issues, metadata }
    }

    fn lint_sheet_into(&self, sheet: &Sheet, metadata: &mut ReportMetadata) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut graph = DependencyGraph::new();
        // Graph key → cell as written in the sheet
        let mut written: AHashMap<String, &str> = AHashMap::new();

        for (cell, formula) in sheet.formulas() {
            // Blank cells carry no formula
            if formula.trim().is_empty() {
                continue;
            }
            tracing::trace!("{}!{cell}: {formula}", sheet.name);

            let analysis = analyze_formula(formula);
            metadata.formula_count += 1;
            if !analysis.is_valid {
                metadata.invalid_formula_count += 1;
            }
            if analysis.has_volatile_functions() {
                metadata.volatile_formula_count += 1;
            }

            issues.extend(formula_issues(
                &self.options,
                &analysis,
                formula,
                &sheet.name,
                cell,
            ));
            graph.add_formula(cell, &analysis);
            written.entry(normalize_address(cell)).or_insert(cell);
        }

        let cycles = graph.find_circular_references_with(self.options.strategy());
        metadata.circular_reference_count += cycles.len();
        for key in cycles {
            let cell = written.get(&key).map_or(key.as_str(), |cell| *cell);
            issues.push(
                Issue::formula(Severity::Error, &sheet.name, cell, "Circular reference detected")
                    .with_suggestion("Break the dependency cycle"),
            );
        }

        tracing::debug!(
            "sheet {}: {} formulas, {} issues",
            sheet.name,
            graph.len(),
            issues.len()
        );
        issues
    }
}
