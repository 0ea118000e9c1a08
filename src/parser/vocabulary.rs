use crate::{
    aggregators::AggregationFn,
    parser::{scan_longest_first, Intent, KeywordHit, Utterance, WordComparer},
};

/// Phrases that all mean the same vocabulary id.
///
/// `tokens` are the single words that name the id on their own; the
/// multi-dimension templates resolve captured words through them.
#[derive(Debug, Clone)]
pub struct Synonyms {
    pub id: String,
    pub comparers: Vec<WordComparer>,
    pub tokens: Vec<String>,
}

impl Synonyms {
    pub fn new(id: &str, phrases: &[&str]) -> Self {
        let comparers: Vec<WordComparer> = phrases.iter().map(|p| WordComparer::new(p)).collect();
        let tokens = comparers
            .iter()
            .map(WordComparer::phrase)
            .filter(|p| !p.contains(' '))
            .collect();
        Self { id: id.to_string(), comparers, tokens }
    }

    pub fn with_tokens(mut self, tokens: &[&str]) -> Self {
        for t in tokens {
            let t = t.to_lowercase();
            if !self.tokens.contains(&t) {
                self.tokens.push(t);
            }
        }
        self
    }
}

/// Keyword tables the intent parser scans. Group order is significant:
/// intent and aggregation groups are tried first to last.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub intents: Vec<(Intent, Vec<WordComparer>)>,
    pub aggregations: Vec<(AggregationFn, Vec<WordComparer>)>,
    pub metrics: Vec<Synonyms>,
    pub dimensions: Vec<Synonyms>,
    pub fallback_metric: String,
    pub product_dimension: String,
    pub count_metrics: Vec<String>,
    pub geographic_dimensions: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::freight()
    }
}

fn words(list: &[&str]) -> Vec<WordComparer> {
    list.iter().map(|w| WordComparer::new(w)).collect()
}

impl Vocabulary {
    pub fn freight() -> Self {
        Self {
            intents: vec![
                (Intent::Analyze, words(&["analyze", "analyse", "analysis", "average", "avg", "mean", "insight", "insights"])),
                (Intent::Compare, words(&["compare", "comparison", "versus", "vs", "against"])),
                (Intent::Trend, words(&["trend", "trends", "trending", "over time", "growth", "month over month", "week over week"])),
                (Intent::Breakdown, words(&["breakdown", "break down", "broken down", "distribution", "split", "share of"])),
                (Intent::Find, words(&["find", "which", "list", "show me", "top", "bottom", "where"])),
                (Intent::Summarize, words(&["summarize", "summarise", "summary", "overview", "total"])),
            ],
            aggregations: vec![
                (AggregationFn::Avg, words(&["average", "avg", "mean", "per shipment"])),
                (AggregationFn::Count, words(&["how many", "number of", "count of", "count"])),
                (AggregationFn::Sum, words(&["total", "sum", "sum of", "overall"])),
                (AggregationFn::Min, words(&["minimum", "min", "lowest", "cheapest", "least"])),
                (AggregationFn::Max, words(&["maximum", "max", "highest", "most expensive", "largest", "biggest"])),
            ],
            metrics: vec![
                Synonyms::new("cost", &["cost", "costs", "spend", "spending", "charge", "charges", "freight cost", "expense", "expenses", "price"]),
                Synonyms::new("shipments", &["shipments", "shipment count", "number of shipments", "volume", "loads", "count"]),
                Synonyms::new("weight", &["weight", "pounds", "lbs", "tonnage"]),
                Synonyms::new("miles", &["miles", "mileage", "distance"]),
            ],
            dimensions: vec![
                Synonyms::new("state", &["state", "states"]),
                Synonyms::new("origin", &["origin", "origins", "origin state", "shipper state", "pickup state", "from state"]),
                Synonyms::new("destination", &["destination", "destinations", "destination state", "dest", "dest state", "consignee state", "delivery state", "to state"]),
                Synonyms::new("city", &["city", "cities"]),
                Synonyms::new("carrier", &["carrier", "carriers", "scac"]),
                Synonyms::new("mode", &["mode", "modes", "service type", "shipping mode"]),
                Synonyms::new("product", &["product", "products", "item", "items", "sku", "skus", "category", "categories"]),
                Synonyms::new("month", &["monthly", "by month", "per month", "each month"]).with_tokens(&["month", "months"]),
                Synonyms::new("week", &["weekly", "by week", "per week", "each week"]).with_tokens(&["week", "weeks"]),
                Synonyms::new("customer", &["customer", "customers", "account", "accounts"]),
            ],
            fallback_metric: "cost".to_string(),
            product_dimension: "product".to_string(),
            count_metrics: vec!["shipments".to_string()],
            geographic_dimensions: vec!["state".into(), "origin".into(), "destination".into(), "city".into()],
        }
    }

    pub fn with_fallback_metric(mut self, metric: &str) -> Self {
        self.fallback_metric = metric.to_string();
        self
    }

    /// First intent group (in table order) with any keyword present.
    pub fn classify_intent(&self, text: &Utterance) -> Option<Intent> {
        self.intents
            .iter()
            .find(|(_, comparers)| comparers.iter().any(|c| c.matches(text)))
            .map(|(intent, _)| *intent)
    }

    pub fn detect_aggregation(&self, text: &Utterance) -> Option<AggregationFn> {
        self.aggregations
            .iter()
            .find(|(_, comparers)| comparers.iter().any(|c| c.matches(text)))
            .map(|(f, _)| *f)
    }

    pub fn metric_hits(&self, text: &Utterance) -> Vec<KeywordHit<&str>> {
        Self::hits(&self.metrics, text)
    }

    pub fn dimension_hits(&self, text: &Utterance) -> Vec<KeywordHit<&str>> {
        Self::hits(&self.dimensions, text)
    }

    fn hits<'a>(table: &'a [Synonyms], text: &Utterance) -> Vec<KeywordHit<&'a str>> {
        scan_longest_first(
            text,
            table.iter().flat_map(|s| s.comparers.iter().map(move |c| (s.id.as_str(), c))),
        )
    }

    /// Resolve one captured word to a dimension id.
    pub fn dimension_for_token(&self, token: &str) -> Option<&str> {
        let token = token.trim().to_lowercase();
        self.dimensions
            .iter()
            .find(|s| s.id == token || s.tokens.contains(&token))
            .map(|s| s.id.as_str())
    }

    pub fn is_metric_token(&self, token: &str) -> bool {
        let token = token.trim().to_lowercase();
        self.metrics.iter().any(|s| s.id == token || s.tokens.contains(&token))
    }

    pub fn is_count_metric(&self, metric: &str) -> bool {
        self.count_metrics.iter().any(|m| m == metric)
    }

    pub fn is_geographic(&self, dimension: &str) -> bool {
        self.geographic_dimensions.iter().any(|d| d == dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(hits: Vec<KeywordHit<&str>>) -> Vec<String> {
        hits.into_iter().map(|h| h.key.to_string()).collect()
    }

    #[test]
    fn intent_groups_are_tried_in_order() {
        let v = Vocabulary::freight();
        // "average" (analyze) outranks "compare"
        assert_eq!(v.classify_intent(&Utterance::new("compare average cost")), Some(Intent::Analyze));
        assert_eq!(v.classify_intent(&Utterance::new("compare carriers")), Some(Intent::Compare));
        assert_eq!(v.classify_intent(&Utterance::new("cost by state")), None);
    }

    #[test]
    fn dimension_hits_prefer_longer_phrases() {
        let v = Vocabulary::freight();
        let hits = v.dimension_hits(&Utterance::new("spend by origin state and carrier"));
        assert_eq!(ids(hits), vec!["origin", "carrier"]);
    }

    #[test]
    fn time_words_are_not_dimensions() {
        let v = Vocabulary::freight();
        assert!(v.dimension_hits(&Utterance::new("cost this month")).is_empty());
        assert_eq!(ids(v.dimension_hits(&Utterance::new("cost by month"))), vec!["month"]);
    }

    #[test]
    fn tokens_resolve_to_dimensions() {
        let v = Vocabulary::freight();
        assert_eq!(v.dimension_for_token("Carriers"), Some("carrier"));
        assert_eq!(v.dimension_for_token("month"), Some("month"));
        assert_eq!(v.dimension_for_token("dest"), Some("destination"));
        assert_eq!(v.dimension_for_token("cost"), None);
        assert!(v.is_metric_token("spend"));
    }

    #[test]
    fn aggregation_words() {
        let v = Vocabulary::freight();
        assert_eq!(v.detect_aggregation(&Utterance::new("average cost")), Some(AggregationFn::Avg));
        assert_eq!(v.detect_aggregation(&Utterance::new("how many shipments")), Some(AggregationFn::Count));
        assert_eq!(v.detect_aggregation(&Utterance::new("cheapest carrier")), Some(AggregationFn::Min));
        assert_eq!(v.detect_aggregation(&Utterance::new("cost by state")), None);
    }
}
