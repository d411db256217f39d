use std::collections::HashSet;
use std::io::Cursor;

use calamine::{DataType, Range, Reader, Xlsx};
use tracing::{debug, instrument};

use crate::kidy::coverage::error::{CoverageError, Result};
use crate::kidy::coverage::model::{CellValue, RawRow, RawSheet};

type Workbook<'a> = Xlsx<Cursor<&'a [u8]>>;

/// Reads the primary table from the first sheet of the workbook.
///
/// `header_row_offset` counts physical rows from the top of the sheet, blank
/// rows included. Rows above it are discarded, the row at the offset supplies
/// the column names and everything below it down to the last populated row is
/// data. Columns are numbered from column `A`, so blank leading columns still
/// take a position. Fully blank data rows are skipped.
#[instrument(level = "debug", skip(bytes), fields(bytes = bytes.len()))]
pub fn parse_primary(bytes: &[u8], header_row_offset: u32) -> Result<RawSheet> {
    let mut workbook = open(bytes)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CoverageError::InvalidWorkbook("workbook has no sheets".into()))??;

    let Some((last_row, last_col)) = range.end() else {
        return Ok(RawSheet::default());
    };
    if header_row_offset > last_row {
        debug!(last_row, "header row lies below the populated area");
        return Ok(RawSheet::default());
    }

    let header: Vec<CellValue> = (0..=last_col)
        .map(|col| cell_at(&range, header_row_offset, col))
        .collect();
    let columns = column_names(&header);

    let rows: Vec<RawRow> = (header_row_offset + 1..=last_row)
        .filter_map(|row| {
            let cells: Vec<CellValue> = (0..=last_col)
                .map(|col| cell_at(&range, row, col))
                .collect();
            if cells.iter().all(CellValue::is_null) {
                return None;
            }
            Some(RawRow {
                sheet_row: row + 1,
                cells,
            })
        })
        .collect();

    debug!(columns = columns.len(), rows = rows.len(), "primary sheet decoded");
    Ok(RawSheet { columns, rows })
}

/// Reads the raw numeric value stored at `(row, column)` of `sheet_name`.
///
/// The coordinate is zero-based and absolute. The value is returned as
/// stored; callers format it for display.
#[instrument(level = "debug", skip(bytes), fields(bytes = bytes.len()))]
pub fn parse_target(bytes: &[u8], sheet_name: &str, row: u32, column: u32) -> Result<f64> {
    let mut workbook = open(bytes)?;
    let range = match workbook.worksheet_range(sheet_name) {
        Some(range) => range?,
        None => {
            return Err(CoverageError::SheetNotFound {
                sheet: sheet_name.to_string(),
                available: workbook.sheet_names().to_vec(),
            });
        }
    };

    let out_of_range = || CoverageError::CellOutOfRange {
        sheet: sheet_name.to_string(),
        row,
        column,
    };
    let (last_row, last_col) = range.end().ok_or_else(out_of_range)?;
    if row > last_row || column > last_col {
        return Err(out_of_range());
    }

    match cell_at(&range, row, column) {
        CellValue::Number(value) => Ok(value),
        other => Err(CoverageError::TypeMismatch {
            sheet: sheet_name.to_string(),
            row,
            column,
            found: describe(&other),
        }),
    }
}

fn open(bytes: &[u8]) -> Result<Workbook<'_>> {
    Ok(Xlsx::new(Cursor::new(bytes))?)
}

fn cell_at(range: &Range<DataType>, row: u32, column: u32) -> CellValue {
    match range.get_value((row, column)) {
        Some(DataType::String(value)) => CellValue::Text(value.clone()),
        Some(DataType::Float(value)) => CellValue::Number(*value),
        Some(DataType::Int(value)) => CellValue::Number(*value as f64),
        Some(DataType::Bool(value)) => CellValue::Bool(*value),
        Some(DataType::DateTime(value)) => CellValue::Number(*value),
        Some(DataType::Error(_)) | Some(DataType::Empty) | None => CellValue::Empty,
        #[allow(unreachable_patterns)]
        Some(other) => CellValue::Text(other.to_string()),
    }
}

/// Names blank headers `Unnamed: <i>` and suffixes repeated names with
/// `.1`, `.2`, ... in order of appearance.
fn column_names(header: &[CellValue]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = match cell {
                CellValue::Text(text) if !text.is_empty() => text.clone(),
                CellValue::Text(_) | CellValue::Empty => format!("Unnamed: {idx}"),
                other => other.to_text(),
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            name
        })
        .collect()
}

fn describe(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => "an empty cell".to_string(),
        CellValue::Text(text) => format!("text '{text}'"),
        CellValue::Bool(value) => format!("boolean {value}"),
        CellValue::Number(value) => format!("number {value}"),
    }
}
