//! Central declaration of every assumption made about the remote workbook.
//!
//! The source file is maintained by hand, so its layout (how many banner rows
//! precede the table, where the target ratio lives, what the columns are
//! called) is fixed here rather than scattered through the parsers.

use std::time::Duration;

/// Location of the published coverage workbook.
pub const SOURCE_URL: &str =
    "https://raw.githubusercontent.com/carlinhosg7/cob_cart/main/Cobertura_de_Carteira.xlsx";

/// Zero-based physical row of the primary sheet holding the column names.
pub const HEADER_ROW_OFFSET: u32 = 7;

/// Name of the secondary sheet holding the target coverage ratio.
pub const TARGET_SHEET: &str = "Meta";
/// Zero-based row of the target ratio cell (`B2`).
pub const TARGET_ROW: u32 = 1;
/// Zero-based column of the target ratio cell (`B2`).
pub const TARGET_COLUMN: u32 = 1;

/// Upper bound for a single HTTP attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Representative id column.
pub const REP_COLUMN: &str = "Rep";
/// Representative display name column.
pub const REP_NAME_COLUMN: &str = "Nome Rep.";
/// Optional supervisor facet column.
pub const SUPERVISOR_COLUMN: &str = "Supervisor";
/// Portfolio balance column.
pub const BALANCE_COLUMN: &str = "Saldo de Carteira";
/// Covered customers column.
pub const COVERED_COLUMN: &str = "cobertura";

/// Physical layout of the workbook: where the primary table starts and where
/// the target ratio is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub header_row_offset: u32,
    pub target_sheet: String,
    pub target_row: u32,
    pub target_column: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row_offset: HEADER_ROW_OFFSET,
            target_sheet: TARGET_SHEET.to_string(),
            target_row: TARGET_ROW,
            target_column: TARGET_COLUMN,
        }
    }
}

/// Column names of the primary table, compared after whitespace trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub rep_id: String,
    pub rep_name: String,
    pub balance: String,
    pub covered: String,
    /// Optional facet; filtering by supervisor is skipped when absent.
    pub supervisor: String,
}

impl ColumnSchema {
    /// Columns that must exist for the sheet to be usable, in display order.
    pub fn required(&self) -> Vec<&str> {
        vec![
            self.rep_id.as_str(),
            self.rep_name.as_str(),
            self.balance.as_str(),
            self.covered.as_str(),
        ]
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            rep_id: REP_COLUMN.to_string(),
            rep_name: REP_NAME_COLUMN.to_string(),
            balance: BALANCE_COLUMN.to_string(),
            covered: COVERED_COLUMN.to_string(),
            supervisor: SUPERVISOR_COLUMN.to_string(),
        }
    }
}
