use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    aggregators::AggregationFn,
    parser::{
        filter_chain, multi_dimension_chain, time_range_chain, DimensionPair, FilterClause, FilterFinding,
        GeographicScope, Intent, ParseContext, ParsedQuery, RuleChain, TermExtractor, TermTable, TimeRange,
        Utterance, Vocabulary,
    },
};

/// Turns a free-text request into a [`ParsedQuery`].
///
/// Parsing never fails: anything not recognized falls back to a default
/// (intent `analyze`, the fallback metric, no dimensions). Callers decide
/// whether the defaults are good enough. The parser holds no mutable state, so
/// parsing the same text at the same instant always yields the same result.
#[derive(Debug)]
pub struct IntentParser {
    vocabulary: Vocabulary,
    extractor: TermExtractor,
    multi_dimension: RuleChain<DimensionPair>,
    time_ranges: RuleChain<TimeRange>,
    filters: RuleChain<Vec<FilterFinding>>,
}

impl Default for IntentParser {
    fn default() -> Self {
        Self::new(Vocabulary::default(), TermExtractor::default())
    }
}

impl IntentParser {
    pub fn new(vocabulary: Vocabulary, extractor: TermExtractor) -> Self {
        Self {
            vocabulary,
            extractor,
            multi_dimension: multi_dimension_chain(),
            time_ranges: time_range_chain(),
            filters: filter_chain(),
        }
    }

    pub fn with_terms(table: TermTable) -> Self {
        Self::new(Vocabulary::default(), TermExtractor::new(table))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn extractor(&self) -> &TermExtractor {
        &self.extractor
    }

    pub fn parse(&self, text: &str) -> ParsedQuery {
        self.parse_at(text, Utc::now())
    }

    /// Parse with relative time phrases anchored at `now`.
    pub fn parse_at(&self, text: &str, now: DateTime<Utc>) -> ParsedQuery {
        let utterance = Utterance::new(text);
        let term_hits = self.extractor.extract_hits(&utterance);
        let ctx = ParseContext::new(&utterance, &self.vocabulary, &term_hits, now);

        let intent = self.vocabulary.classify_intent(&utterance).unwrap_or_default();

        let mut metrics: Vec<String> = Vec::new();
        for hit in ctx.metric_hits() {
            if !metrics.iter().any(|m| m == hit.key) {
                metrics.push(hit.key.to_string());
            }
        }
        if metrics.is_empty() {
            metrics.push(self.vocabulary.fallback_metric.clone());
        }

        let mut dimensions: Vec<String> = Vec::new();
        for hit in ctx.dimension_hits() {
            if !dimensions.iter().any(|d| d == hit.key) {
                dimensions.push(hit.key.to_string());
            }
        }

        let aggregation = self.vocabulary.detect_aggregation(&utterance).unwrap_or_else(|| {
            if self.vocabulary.is_count_metric(&metrics[0]) { AggregationFn::Count } else { AggregationFn::Sum }
        });

        let multi_dimension = self.multi_dimension.first_match(&ctx).map(|(_, pair)| pair);
        let time_range = self.time_ranges.first_match(&ctx).map(|(_, range)| range);

        let mut filters = Vec::new();
        let mut region_codes = Vec::new();
        let mut limit = None;
        let mut sort = None;
        for finding in self.filters.collect_all(&ctx).into_iter().flatten() {
            match finding {
                FilterFinding::Region { dimension, code } => {
                    filters.push(FilterClause::eq(&dimension, &code));
                    if !region_codes.contains(&code) {
                        region_codes.push(code);
                    }
                }
                FilterFinding::Mode(value) => filters.push(FilterClause::eq("mode", &value)),
                FilterFinding::Rank { limit: n, sort: direction } => {
                    if limit.is_none() {
                        limit = Some(n);
                        sort = Some(direction);
                    }
                }
            }
        }

        let geo_dimension = multi_dimension
            .iter()
            .flat_map(|p| [p.primary.as_str(), p.secondary.as_str()])
            .chain(dimensions.iter().map(String::as_str))
            .find(|d| self.vocabulary.is_geographic(d))
            .map(str::to_string);
        let geographic = (!region_codes.is_empty() || geo_dimension.is_some())
            .then(|| GeographicScope { region_codes, dimension: geo_dimension });

        let terms: Vec<String> = term_hits.into_iter().map(|h| h.term).collect();
        let comparison_targets = if terms.len() >= 2 || intent == Intent::Compare { terms.clone() } else { Vec::new() };

        let parsed = ParsedQuery {
            intent,
            metrics,
            dimensions,
            filters,
            time_range,
            geographic,
            comparison_targets,
            aggregation,
            terms,
            multi_dimension,
            limit,
            sort,
        };
        debug!(
            intent = ?parsed.intent,
            metrics = ?parsed.metrics,
            dimensions = ?parsed.dimensions,
            terms = ?parsed.terms,
            aggregation = %parsed.aggregation,
            "parsed request"
        );
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{FilterOperator, Granularity, MultiDimensionStrategy, SortDirection};
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn scenario_average_cost_for_products_by_state() {
        let parser = IntentParser::default();
        let q = parser.parse_at("average cost for drawer system and cargoglide by state, last 30 days", now());

        assert_eq!(q.intent, Intent::Analyze);
        assert_eq!(q.metrics, vec!["cost"]);
        assert_eq!(q.dimensions, vec!["state"]);
        assert_eq!(q.aggregation, AggregationFn::Avg);
        assert_eq!(q.terms, vec!["Drawer System", "CargoGlide"]);
        assert_eq!(q.comparison_targets, q.terms);

        let pair = q.multi_dimension.clone().unwrap();
        assert_eq!(pair.primary, "product");
        assert_eq!(pair.secondary, "state");
        assert_eq!(pair.strategy, MultiDimensionStrategy::KeywordProximity);

        let range = q.time_range.unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 4, 14).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 5, 14).unwrap());
        assert_eq!(range.granularity, Granularity::Day);

        assert_eq!(q.geographic.unwrap().dimension.as_deref(), Some("state"));
    }

    #[test]
    fn defaults_when_nothing_is_recognized() {
        let q = IntentParser::default().parse_at("hello there", now());
        assert_eq!(q.intent, Intent::Analyze);
        assert_eq!(q.metrics, vec!["cost"]);
        assert!(q.dimensions.is_empty());
        assert!(q.filters.is_empty());
        assert!(q.time_range.is_none());
        assert!(q.multi_dimension.is_none());
        assert!(q.geographic.is_none());
        assert_eq!(q.aggregation, AggregationFn::Sum);
    }

    #[test]
    fn collects_every_dimension() {
        let q = IntentParser::default().parse_at("spend by carrier, mode and destination", now());
        assert_eq!(q.dimensions, vec!["carrier", "mode", "destination"]);
    }

    #[test]
    fn count_metrics_default_to_count() {
        let q = IntentParser::default().parse_at("shipments by carrier", now());
        assert_eq!(q.metrics, vec!["shipments"]);
        assert_eq!(q.aggregation, AggregationFn::Count);
    }

    #[test]
    fn filters_limit_and_sort() {
        let q = IntentParser::default().parse_at("top 5 carriers for LTL from TX", now());
        assert_eq!(q.intent, Intent::Find);
        assert_eq!(q.limit, Some(5));
        assert_eq!(q.sort, Some(SortDirection::Desc));
        assert_eq!(q.filters.len(), 2);
        assert_eq!(q.filters[0].field, "origin");
        assert_eq!(q.filters[0].operator, FilterOperator::Eq);
        assert_eq!(q.filters[1].field, "mode");
        assert_eq!(q.geographic.unwrap().region_codes, vec!["TX"]);
    }

    #[test]
    fn compare_intent_lists_targets() {
        let q = IntentParser::default().parse_at("compare drawer system to drawer", now());
        assert_eq!(q.intent, Intent::Compare);
        assert_eq!(q.terms, vec!["Drawer System"]);
        assert_eq!(q.comparison_targets, vec!["Drawer System"]);
    }

    #[test]
    fn parsing_is_idempotent() {
        let parser = IntentParser::default();
        let text = "total spend by carrier and mode for cargoglide from TX, this quarter";
        let a = parser.parse_at(text, now());
        let b = parser.parse_at(text, now());
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn configured_terms_flow_through() {
        let parser = IntentParser::with_terms(TermTable::new(vec![
            crate::parser::TermEntry::new("Pallet", &["pallet", "pallets"]),
        ]));
        let q = parser.parse_at("pallets by state", now());
        assert_eq!(q.terms, vec!["Pallet"]);
    }
}
