use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::kidy::coverage::aggregate::{aggregate, per_record};
use crate::kidy::coverage::error::{CoverageError, Result};
use crate::kidy::coverage::io::fetch::Fetcher;
use crate::kidy::coverage::io::sheet_read::{parse_primary, parse_target};
use crate::kidy::coverage::layout::{ColumnSchema, SheetLayout};
use crate::kidy::coverage::model::{AggregateResult, Dataset, FilterSelection, PerRecordMetric};
use crate::kidy::coverage::validate::validate;

/// One fetched snapshot of the workbook, validated and ready to be viewed
/// under any filter selection.
#[derive(Debug)]
pub struct Dashboard {
    dataset: Dataset,
    target: Result<f64>,
}

/// Everything the presentation layer needs for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub aggregate: AggregateResult,
    pub records: Vec<PerRecordMetric>,
    /// Raw target ratio in `[0, 1]`, not multiplied by 100.
    pub target_fraction: Option<f64>,
    pub target_error: Option<String>,
    pub dropped_rows: usize,
    pub supervisor_options: Vec<String>,
    pub representative_options: Vec<String>,
}

impl Dashboard {
    /// Fetches `url` and builds the dashboard. Nothing is parsed when the
    /// fetch fails.
    #[instrument(level = "info", skip(fetcher, layout, schema))]
    pub fn load(
        fetcher: &dyn Fetcher,
        url: &str,
        layout: &SheetLayout,
        schema: &ColumnSchema,
    ) -> Result<Self> {
        let bytes = fetcher.fetch(url)?;
        Self::from_bytes(&bytes, layout, schema)
    }

    /// Builds the dashboard from an already fetched payload.
    ///
    /// Primary sheet failures are returned. A missing or malformed target
    /// only disables the target metric.
    #[instrument(level = "info", skip_all, fields(bytes = bytes.len()))]
    pub fn from_bytes(bytes: &[u8], layout: &SheetLayout, schema: &ColumnSchema) -> Result<Self> {
        let raw = parse_primary(bytes, layout.header_row_offset)?;
        let dataset = validate(&raw, schema)?;

        let target = parse_target(
            bytes,
            &layout.target_sheet,
            layout.target_row,
            layout.target_column,
        );
        match &target {
            Ok(fraction) => info!(fraction, "target coverage read"),
            Err(error) => warn!(%error, "target coverage unavailable"),
        }

        Ok(Self { dataset, target })
    }

    /// Validated records of this snapshot, unfiltered.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Raw target ratio, or the error that prevented reading it.
    pub fn target(&self) -> std::result::Result<f64, &CoverageError> {
        self.target.as_ref().copied()
    }

    /// Recomputes the filtered records and their metrics from scratch.
    pub fn view(&self, selection: &FilterSelection) -> DashboardView {
        let filtered = self.dataset.filter(selection);
        DashboardView {
            aggregate: aggregate(&filtered),
            records: per_record(&filtered),
            target_fraction: self.target.as_ref().ok().copied(),
            target_error: self.target.as_ref().err().map(ToString::to_string),
            dropped_rows: self.dataset.dropped_rows,
            supervisor_options: self.dataset.supervisor_options(),
            representative_options: self
                .dataset
                .representative_options(&selection.supervisors),
        }
    }
}
