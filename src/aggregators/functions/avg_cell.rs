use crate::{aggregators::CellAccumulator, executor::AggregationRow};

/// Support-weighted mean of partial averages:
/// `Σ(value × support) / Σ(support)`, 0 when there is no support.
#[derive(Debug, Default)]
pub struct AvgCell {
    weighted_total: f64,
    support: u64,
}

impl CellAccumulator for AvgCell {
    fn update(&mut self, row: &AggregationRow) {
        self.weighted_total += row.value * row.support_count as f64;
        self.support += row.support_count;
    }

    fn finalize(&self) -> f64 {
        if self.support == 0 {
            0.0
        } else {
            self.weighted_total / self.support as f64
        }
    }

    fn support(&self) -> u64 { self.support }
}
