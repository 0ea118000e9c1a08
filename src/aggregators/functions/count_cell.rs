use crate::{aggregators::CellAccumulator, executor::AggregationRow};

/// Counts records: the cell value is the accumulated support.
#[derive(Debug, Default)]
pub struct CountCell {
    support: u64,
}

impl CellAccumulator for CountCell {
    fn update(&mut self, row: &AggregationRow) {
        self.support += row.support_count;
    }

    fn finalize(&self) -> f64 { self.support as f64 }

    fn support(&self) -> u64 { self.support }
}
