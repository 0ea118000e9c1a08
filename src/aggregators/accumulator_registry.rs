use std::collections::HashMap;

use crate::aggregators::{AggregationFn, AvgCell, CellAccumulator, CountCell, FallbackCell, SumCell};

type CellFactory = fn() -> Box<dyn CellAccumulator>;

/// Maps aggregation functions to the cell that recombines their partials.
/// Functions without a registration get a [`FallbackCell`].
#[derive(Debug, Clone)]
pub struct AccumulatorRegistry {
    by_fn: HashMap<AggregationFn, CellFactory>,
}

impl Default for AccumulatorRegistry {
    fn default() -> Self {
        Self::default_registry()
    }
}

impl AccumulatorRegistry {
    pub fn new() -> Self {
        Self { by_fn: HashMap::new() }
    }

    pub fn register(&mut self, function: AggregationFn, factory: CellFactory) {
        self.by_fn.insert(function, factory);
    }

    pub fn create(&self, function: AggregationFn) -> Box<dyn CellAccumulator> {
        match self.by_fn.get(&function) {
            Some(factory) => factory(),
            None => Box::new(FallbackCell::default()),
        }
    }

    pub fn is_registered(&self, function: AggregationFn) -> bool {
        self.by_fn.contains_key(&function)
    }

    pub fn default_registry() -> Self {
        let mut registry = Self::new();
        registry.register(AggregationFn::Sum, || Box::new(SumCell::default()));
        registry.register(AggregationFn::Avg, || Box::new(AvgCell::default()));
        registry.register(AggregationFn::Count, || Box::new(CountCell::default()));
        registry
    }
}
