use crate::kidy::coverage::model::{AggregateResult, PerRecordMetric, Record};

/// Totals the record set and derives its coverage percentage.
pub fn aggregate(records: &[Record]) -> AggregateResult {
    let total_balance = canonical_sum(records.iter().map(|record| record.balance));
    let total_covered = canonical_sum(records.iter().map(|record| record.covered));
    AggregateResult {
        total_balance,
        total_covered,
        coverage_pct: coverage_pct(total_covered, total_balance),
        record_count: records.len(),
    }
}

/// Pairs every record with its own coverage percentage, preserving order.
pub fn per_record(records: &[Record]) -> Vec<PerRecordMetric> {
    records
        .iter()
        .map(|record| PerRecordMetric {
            coverage_pct: coverage_pct(record.covered, record.balance),
            record: record.clone(),
        })
        .collect()
}

/// `covered / balance * 100` rounded to one decimal, or `None` when the
/// balance is zero.
pub fn coverage_pct(covered: f64, balance: f64) -> Option<f64> {
    if balance == 0.0 {
        return None;
    }
    Some(round_one_decimal(covered / balance * 100.0))
}

/// Rounds half to even on the exact binary value, which is what formatting
/// with one decimal place does.
fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Floating-point addition is not associative, so values are added in sorted
/// order to make the total independent of row order.
fn canonical_sum(values: impl Iterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.collect();
    values.sort_by(f64::total_cmp);
    values.into_iter().sum()
}
