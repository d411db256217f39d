use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, CoverageError>;

/// Error type covering the failure cases of a single pipeline refresh.
///
/// Every variant is terminal for the refresh that produced it. Rows with
/// null key fields are not errors; the validator drops them and counts them.
#[derive(Debug, Error)]
pub enum CoverageError {
    /// Network, DNS, timeout or non-2xx failure while fetching the workbook.
    #[error("failed to fetch {url}{}: {reason}", status_suffix(.status))]
    Transport {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// Raised when the sheet holding the target ratio does not exist.
    #[error("sheet '{sheet}' not found (available: {})", .available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    /// Raised when the target coordinate lies outside the sheet.
    #[error("cell (row {row}, column {column}) is outside sheet '{sheet}'")]
    CellOutOfRange { sheet: String, row: u32, column: u32 },

    /// Raised when the target cell does not hold a number.
    #[error("cell (row {row}, column {column}) of sheet '{sheet}' holds {found}, expected a number")]
    TypeMismatch {
        sheet: String,
        row: u32,
        column: u32,
        found: String,
    },

    /// Raised when required columns are missing after header trimming.
    #[error(
        "required columns not found: {} (required: {}; columns read: {})",
        .missing.join(", "),
        .required.join(", "),
        .present.join(", ")
    )]
    Schema {
        required: Vec<String>,
        present: Vec<String>,
        missing: Vec<String>,
    },

    /// Raised when a balance or coverage cell is present but not a
    /// non-negative number.
    #[error("invalid value '{value}' in column {column} at sheet row {row}")]
    InvalidValue {
        row: u32,
        column: String,
        value: String,
    },

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the payload has no usable primary sheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl CoverageError {
    /// HTTP status carried by a transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            CoverageError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" (HTTP {code})")).unwrap_or_default()
}
