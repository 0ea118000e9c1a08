use crate::executor::AggregationRow;

/// Running state of one output cell.
///
/// The merger feeds every partial row that lands in a cell to `update`, then
/// reads the combined value from `finalize` once all partials are in.
pub trait CellAccumulator: Send {
    fn update(&mut self, row: &AggregationRow);

    fn finalize(&self) -> f64;

    /// Records behind the cell so far.
    fn support(&self) -> u64;
}
