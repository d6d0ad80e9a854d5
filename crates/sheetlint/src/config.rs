//! Lint configuration
//!
//! Options are plain data with defaults for every field, so a configuration
//! file only has to name the values it changes:
//!
//! ```toml
//! complexity_threshold = 8.0
//! cycle_strategy = "scc"
//! ```

use crate::error::LintResult;
use serde::{Deserialize, Serialize};
use sheetlint_formula::dependency::DEFAULT_VISIT_BUDGET;
use sheetlint_formula::CycleStrategy;
use std::path::Path;

/// Which circular reference search to run over each sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CycleSearch {
    /// Per-cell path-copying search, bounded by `cycle_visit_budget`
    #[default]
    PathCopy,
    /// Strongly connected components
    #[serde(alias = "scc")]
    StronglyConnected,
}

/// Options for a lint run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintOptions {
    /// Formulas scoring strictly above this are reported as complex (default: 5.0)
    pub complexity_threshold: f64,
    /// Ranges spanning strictly more rows than this are reported (default: 1000)
    pub large_range_rows: u32,
    /// Circular reference search (default: path-copy)
    pub cycle_strategy: CycleSearch,
    /// Work allowed per start cell in the path-copying search (default: 100000)
    pub cycle_visit_budget: usize,
    /// Report cell references written more than once in one formula
    pub report_repeated_references: bool,
    /// Report volatile function usage
    pub report_volatile: bool,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            complexity_threshold: 5.0,
            large_range_rows: 1000,
            cycle_strategy: CycleSearch::PathCopy,
            cycle_visit_budget: DEFAULT_VISIT_BUDGET,
            report_repeated_references: true,
            report_volatile: true,
        }
    }
}

impl LintOptions {
    /// Parse options from TOML text; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> LintResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read options from a TOML file
    pub fn load(path: impl AsRef<Path>) -> LintResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let options = Self::from_toml_str(&text)?;
        tracing::debug!("loaded lint options from {}", path.display());
        Ok(options)
    }

    /// The dependency graph search these options select
    pub fn strategy(&self) -> CycleStrategy {
        match self.cycle_strategy {
            CycleSearch::PathCopy => CycleStrategy::PathCopy {
                visit_budget: self.cycle_visit_budget,
            },
            CycleSearch::StronglyConnected => CycleStrategy::StronglyConnected,
        }
    }
}
