use tracing::{debug, info, instrument};

use crate::kidy::coverage::error::{CoverageError, Result};
use crate::kidy::coverage::layout::ColumnSchema;
use crate::kidy::coverage::model::{CellValue, Dataset, RawRow, RawSheet, Record};

/// Turns the raw primary table into validated records.
///
/// Column names are trimmed before lookup. Missing required columns fail the
/// whole sheet. Rows whose rep id, balance or coverage is null are dropped and
/// counted in [`Dataset::dropped_rows`]. Records come back sorted by
/// descending balance; ties keep sheet order.
#[instrument(level = "info", skip_all, fields(rows = sheet.rows.len()))]
pub fn validate(sheet: &RawSheet, schema: &ColumnSchema) -> Result<Dataset> {
    let columns: Vec<String> = sheet
        .columns
        .iter()
        .map(|name| name.trim().to_string())
        .collect();
    let position = |name: &str| columns.iter().position(|column| column == name);

    let missing: Vec<String> = schema
        .required()
        .into_iter()
        .filter(|&name| position(name).is_none())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(CoverageError::Schema {
            required: schema.required().into_iter().map(str::to_string).collect(),
            present: columns.clone(),
            missing,
        });
    }

    let layout = ColumnIndex {
        rep_id: position(&schema.rep_id).unwrap_or_default(),
        rep_name: position(&schema.rep_name).unwrap_or_default(),
        balance: position(&schema.balance).unwrap_or_default(),
        covered: position(&schema.covered).unwrap_or_default(),
        supervisor: position(&schema.supervisor),
    };

    let mut records = Vec::with_capacity(sheet.rows.len());
    let mut dropped_rows = 0;
    for row in &sheet.rows {
        let rep_id = cell(row, layout.rep_id);
        let balance = cell(row, layout.balance);
        let covered = cell(row, layout.covered);
        if rep_id.is_null() || balance.is_null() || covered.is_null() {
            debug!(sheet_row = row.sheet_row, "dropping row with null key field");
            dropped_rows += 1;
            continue;
        }

        let supervisor = layout
            .supervisor
            .map(|idx| cell(row, idx))
            .filter(|value| !value.is_null())
            .map(CellValue::to_text);

        records.push(Record {
            rep_id: rep_id.to_text(),
            rep_name: cell(row, layout.rep_name).to_text(),
            supervisor,
            balance: quantity(row, &schema.balance, balance)?,
            covered: quantity(row, &schema.covered, covered)?,
        });
    }

    records.sort_by(|lhs, rhs| rhs.balance.total_cmp(&lhs.balance));
    info!(
        records = records.len(),
        dropped_rows, "validated coverage records"
    );

    Ok(Dataset {
        records,
        has_supervisor: layout.supervisor.is_some(),
        columns,
        dropped_rows,
    })
}

struct ColumnIndex {
    rep_id: usize,
    rep_name: usize,
    balance: usize,
    covered: usize,
    supervisor: Option<usize>,
}

static EMPTY: CellValue = CellValue::Empty;

fn cell(row: &RawRow, idx: usize) -> &CellValue {
    row.cells.get(idx).unwrap_or(&EMPTY)
}

/// Reads a non-negative count. Numeric text is accepted.
fn quantity(row: &RawRow, column: &str, value: &CellValue) -> Result<f64> {
    let parsed = match value {
        CellValue::Number(number) => Some(*number),
        CellValue::Text(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(number) if number.is_finite() && number >= 0.0 => Ok(number),
        _ => Err(CoverageError::InvalidValue {
            row: row.sheet_row,
            column: column.to_string(),
            value: value.to_text(),
        }),
    }
}
