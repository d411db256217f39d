use std::collections::HashSet;

use crate::kidy::coverage::model::{Dataset, FilterSelection, Record, Selection};

/// Keeps the records admitted by both the supervisor and the representative
/// dimension, in input order.
///
/// [`Selection::All`] leaves a dimension unfiltered; an empty
/// [`Selection::Only`] admits nothing.
pub fn apply(records: &[Record], selection: &FilterSelection) -> Vec<Record> {
    records
        .iter()
        .filter(|record| {
            selection.supervisors.admits(record.supervisor.as_deref())
                && selection.representatives.admits(Some(&record.rep_id))
        })
        .cloned()
        .collect()
}

/// Distinct supervisors in first-appearance order, nulls excluded.
pub fn supervisor_options(records: &[Record]) -> Vec<String> {
    distinct(records.iter().filter_map(|record| record.supervisor.as_deref()))
}

/// Distinct representative ids in first-appearance order.
pub fn representative_options(records: &[Record]) -> Vec<String> {
    distinct(records.iter().map(|record| record.rep_id.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

impl Dataset {
    /// Applies `selection`, skipping the supervisor dimension when the sheet
    /// had no supervisor column.
    pub fn filter(&self, selection: &FilterSelection) -> Vec<Record> {
        if self.has_supervisor {
            apply(&self.records, selection)
        } else {
            let effective = FilterSelection {
                supervisors: Selection::All,
                representatives: selection.representatives.clone(),
            };
            apply(&self.records, &effective)
        }
    }

    /// Supervisors offered as filter options; empty without the column.
    pub fn supervisor_options(&self) -> Vec<String> {
        if self.has_supervisor {
            supervisor_options(&self.records)
        } else {
            Vec::new()
        }
    }

    /// Representatives offered once the supervisor dimension is applied.
    pub fn representative_options(&self, supervisors: &Selection) -> Vec<String> {
        let scoped = self.filter(&FilterSelection {
            supervisors: supervisors.clone(),
            representatives: Selection::All,
        });
        representative_options(&scoped)
    }
}
