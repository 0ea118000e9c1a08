use crate::{aggregators::CellAccumulator, executor::AggregationRow};

/// Used for functions without a dedicated cell: accumulates values and
/// divides by the number of partials that arrived.
#[derive(Debug, Default)]
pub struct FallbackCell {
    total: f64,
    occurrences: u64,
    support: u64,
}

impl CellAccumulator for FallbackCell {
    fn update(&mut self, row: &AggregationRow) {
        self.total += row.value;
        self.occurrences += 1;
        self.support += row.support_count;
    }

    fn finalize(&self) -> f64 {
        if self.occurrences == 0 {
            0.0
        } else {
            self.total / self.occurrences as f64
        }
    }

    fn support(&self) -> u64 { self.support }
}
