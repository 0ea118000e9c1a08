use crate::{aggregators::CellAccumulator, executor::AggregationRow};

#[derive(Debug, Default)]
pub struct SumCell {
    total: f64,
    support: u64,
}

impl CellAccumulator for SumCell {
    fn update(&mut self, row: &AggregationRow) {
        self.total += row.value;
        self.support += row.support_count;
    }

    fn finalize(&self) -> f64 { self.total }

    fn support(&self) -> u64 { self.support }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_values_and_support() {
        let mut cell = SumCell::default();
        cell.update(&AggregationRow::new("TX", 120.5, 3));
        cell.update(&AggregationRow::new("TX", 79.5, 2));
        assert_eq!(cell.finalize(), 200.0);
        assert_eq!(cell.support(), 5);
    }
}
