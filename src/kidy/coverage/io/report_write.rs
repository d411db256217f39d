use std::path::Path;

use rust_xlsxwriter::{Table, TableColumn, Workbook, Worksheet};
use tracing::instrument;

use crate::kidy::coverage::error::Result;
use crate::kidy::coverage::layout::{
    BALANCE_COLUMN, COVERED_COLUMN, REP_COLUMN, REP_NAME_COLUMN, SUPERVISOR_COLUMN,
};
use crate::kidy::coverage::pipeline::DashboardView;

/// Sheet holding one row per representative.
pub const DETAIL_SHEET: &str = "Cobertura";
/// Sheet holding the totals and the target ratio.
pub const SUMMARY_SHEET: &str = "Resumo";
/// Header of the per-representative percentage column.
pub const PCT_COLUMN: &str = "% Cobertura";

/// Writes the filtered view to an Excel workbook at `path`.
///
/// Undefined percentages are left blank.
#[instrument(level = "info", skip(view), fields(output = %path.display(), records = view.records.len()))]
pub fn write_report(path: &Path, view: &DashboardView) -> Result<()> {
    let mut workbook = Workbook::new();
    write_detail(workbook.add_worksheet(), view)?;
    write_summary(workbook.add_worksheet(), view)?;
    workbook.save(path)?;
    Ok(())
}

fn write_detail(worksheet: &mut Worksheet, view: &DashboardView) -> Result<()> {
    worksheet.set_name(DETAIL_SHEET)?;

    let headers = [
        REP_COLUMN,
        REP_NAME_COLUMN,
        SUPERVISOR_COLUMN,
        BALANCE_COLUMN,
        COVERED_COLUMN,
        PCT_COLUMN,
    ];
    for (col_idx, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, *header)?;
    }

    for (row_idx, metric) in view.records.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        let record = &metric.record;
        worksheet.write_string(row, 0, &record.rep_id)?;
        worksheet.write_string(row, 1, &record.rep_name)?;
        if let Some(supervisor) = &record.supervisor {
            worksheet.write_string(row, 2, supervisor)?;
        }
        worksheet.write_number(row, 3, record.balance)?;
        worksheet.write_number(row, 4, record.covered)?;
        if let Some(pct) = metric.coverage_pct {
            worksheet.write_number(row, 5, pct)?;
        }
    }

    if !view.records.is_empty() {
        let columns: Vec<TableColumn> = headers
            .iter()
            .map(|header| TableColumn::new().set_header(*header))
            .collect();
        let mut table = Table::new();
        table.set_autofilter(true).set_columns(&columns);
        let col_end = (headers.len() as u16).saturating_sub(1);
        worksheet.add_table(0, 0, view.records.len() as u32, col_end, &table)?;
    }

    Ok(())
}

fn write_summary(worksheet: &mut Worksheet, view: &DashboardView) -> Result<()> {
    worksheet.set_name(SUMMARY_SHEET)?;

    let aggregate = &view.aggregate;
    let rows: [(&str, Option<f64>); 5] = [
        ("Carteira", Some(aggregate.total_balance)),
        ("Cobertura", Some(aggregate.total_covered)),
        (PCT_COLUMN, aggregate.coverage_pct),
        ("Representantes", Some(aggregate.record_count as f64)),
        ("Meta", view.target_fraction),
    ];
    for (row_idx, (label, value)) in rows.iter().enumerate() {
        let row = row_idx as u32;
        worksheet.write_string(row, 0, *label)?;
        if let Some(value) = value {
            worksheet.write_number(row, 1, *value)?;
        }
    }

    Ok(())
}
