//! Formula dump readers

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sheetlint::Workbook;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One row of a CSV formula dump
#[derive(Debug, Deserialize)]
struct FormulaRow {
    #[serde(default)]
    sheet: Option<String>,
    cell: String,
    formula: String,
}

/// Read a `.csv` or `.json` formula dump
pub fn read_workbook(path: &Path, default_sheet: &str) -> Result<Workbook> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let is_csv = match extension.as_deref() {
        Some("csv") => true,
        Some("json") => false,
        _ => bail!(
            "Unsupported input '{}': expected a .csv or .json file",
            path.display()
        ),
    };

    let file =
        File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    let workbook = if is_csv {
        read_csv(file, default_sheet)
    } else {
        read_json(file)
    }
    .with_context(|| format!("Failed to read '{}'", path.display()))?;

    tracing::debug!(
        "read {} formulas in {} sheets from {}",
        workbook.formula_count(),
        workbook.sheet_count(),
        path.display()
    );
    Ok(workbook)
}

/// Read CSV with a `cell,formula` header and an optional `sheet` column
pub fn read_csv<R: Read>(reader: R, default_sheet: &str) -> Result<Workbook> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut workbook = Workbook::new();
    for (index, row) in reader.deserialize::<FormulaRow>().enumerate() {
        // Header is line 1
        let row = row.with_context(|| format!("CSV parse error at line {}", index + 2))?;
        let sheet = row
            .sheet
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(default_sheet);
        workbook
            .sheet_mut_or_insert(sheet)
            .set_formula(row.cell, row.formula);
    }
    Ok(workbook)
}

/// Read `{ "sheets": [ { "name": ..., "formulas": { cell: formula } } ] }`
pub fn read_json<R: Read>(reader: R) -> Result<Workbook> {
    serde_json::from_reader(reader).context("Invalid workbook JSON")
}
