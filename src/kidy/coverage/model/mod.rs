use std::collections::BTreeSet;

use serde::Serialize;

/// Value of a single spreadsheet cell after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Blank cell, error cell, or a cell past the end of a short row.
    Empty,
    /// Text literal, kept verbatim.
    Text(String),
    /// Any numeric cell, including date serials.
    Number(f64),
    /// Boolean literal.
    Bool(bool),
}

impl CellValue {
    /// Returns `true` for blank cells and whitespace-only text.
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Renders the cell the way it reads in the sheet. Whole numbers drop
    /// their fractional part so numeric ids read as `101`, not `101.0`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.trim().to_string(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Bool(value) => value.to_string(),
        }
    }
}

/// One data row of the primary sheet, aligned with [`RawSheet::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// One-based row number in the source sheet, for error messages.
    pub sheet_row: u32,
    pub cells: Vec<CellValue>,
}

/// The primary table exactly as read from the workbook.
///
/// Column names are the header row's cell values; trimming happens in the
/// validator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSheet {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawSheet {
    /// Builds a sheet from in-memory rows, numbering them as if the first
    /// data row sat directly below a header at the top of the sheet.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(idx, cells)| RawRow {
                sheet_row: idx as u32 + 2,
                cells,
            })
            .collect();
        Self { columns, rows }
    }
}

/// A validated row of the coverage table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub rep_id: String,
    pub rep_name: String,
    pub supervisor: Option<String>,
    /// Portfolio size: active customers assigned to the representative.
    pub balance: f64,
    /// Customers in the portfolio that have transacted.
    pub covered: f64,
}

/// Validated records plus what the validator learned about the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Records ordered by descending balance.
    pub records: Vec<Record>,
    /// Trimmed column names as read from the sheet.
    pub columns: Vec<String>,
    pub has_supervisor: bool,
    /// Rows discarded because a key field was null.
    pub dropped_rows: usize,
}

/// One filter dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Every option is selected; the dimension does not filter.
    #[default]
    All,
    /// Only these options are selected. An empty set selects nothing.
    Only(BTreeSet<String>),
}

impl Selection {
    /// Converts a widget-style choice into a selection. Choosing every
    /// available option is the same as not filtering.
    pub fn narrowed<I, S>(chosen: I, available: &[String]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chosen: BTreeSet<String> = chosen.into_iter().map(Into::into).collect();
        if !available.is_empty() && available.iter().all(|option| chosen.contains(option)) {
            Selection::All
        } else {
            Selection::Only(chosen)
        }
    }

    /// Returns whether a record with this facet value passes the dimension.
    pub fn admits(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(options) => value.is_some_and(|value| options.contains(value)),
        }
    }
}

/// Selected supervisors and representatives, combined with AND.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub supervisors: Selection,
    pub representatives: Selection,
}

impl FilterSelection {
    /// Selection that excludes every record.
    pub fn nothing() -> Self {
        Self {
            supervisors: Selection::Only(BTreeSet::new()),
            representatives: Selection::Only(BTreeSet::new()),
        }
    }
}

/// Totals over the current record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub total_balance: f64,
    pub total_covered: f64,
    /// `None` when the total balance is zero.
    pub coverage_pct: Option<f64>,
    pub record_count: usize,
}

/// A record together with its own coverage percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerRecordMetric {
    #[serde(flatten)]
    pub record: Record,
    /// `None` when the record's balance is zero.
    pub coverage_pct: Option<f64>,
}
