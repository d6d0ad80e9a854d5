//! Input model: formula text keyed by cell, grouped into sheets

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The formulas of one sheet, keyed by cell address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    /// Cell address → formula text (leading `=` optional)
    #[serde(default)]
    pub formulas: BTreeMap<String, String>,
}

impl Sheet {
    /// Create an empty sheet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formulas: BTreeMap::new(),
        }
    }

    /// Builder form of [`Sheet::set_formula`]
    pub fn with_formula(mut self, cell: impl Into<String>, formula: impl Into<String>) -> Self {
        self.set_formula(cell, formula);
        self
    }

    /// Set the formula of a cell, replacing any previous one
    pub fn set_formula(&mut self, cell: impl Into<String>, formula: impl Into<String>) {
        self.formulas.insert(cell.into(), formula.into());
    }

    pub fn formula(&self, cell: &str) -> Option<&str> {
        self.formulas.get(cell).map(String::as_str)
    }

    /// `(cell, formula)` pairs in address-text order
    pub fn formulas(&self) -> impl Iterator<Item = (&str, &str)> {
        self.formulas.iter().map(|(c, f)| (c.as_str(), f.as_str()))
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }
}

/// A collection of sheets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create a workbook with no sheets
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Get a sheet by name (case-insensitive)
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Get a sheet by name (case-insensitive), appending an empty one if missing
    pub fn sheet_mut_or_insert(&mut self, name: &str) -> &mut Sheet {
        let index = match self
            .sheets
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
        {
            Some(index) => index,
            None => {
                self.sheets.push(Sheet::new(name));
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[index]
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Total formulas across all sheets
    pub fn formula_count(&self) -> usize {
        self.sheets.iter().map(Sheet::len).sum()
    }
}

impl FromIterator<Sheet> for Workbook {
    fn from_iter<I: IntoIterator<Item = Sheet>>(iter: I) -> Self {
        Self {
            sheets: iter.into_iter().collect(),
        }
    }
}
