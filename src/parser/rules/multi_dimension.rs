use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::parser::{DimensionPair, MultiDimensionStrategy, ParseContext, Rule, RuleChain, Span};

/// How far (in words) a dimension keyword may sit after a metric or product
/// mention and still count as its secondary grouping.
pub const PROXIMITY_WORDS: usize = 6;

// "X by Y and Z", "X per Y grouped by Z", "X by Y broken down by Z"
static TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b(?P<x>[a-z]+)\s+by\s+(?P<a>[a-z]+)\s+and\s+(?:by\s+)?(?P<b>[a-z]+)\b",
        r"\b(?P<x>[a-z]+)\s+per\s+(?P<a>[a-z]+)\s+grouped\s+by\s+(?P<b>[a-z]+)\b",
        r"\b(?P<x>[a-z]+)\s+by\s+(?P<a>[a-z]+)\s+(?:broken\s+down|split|then)\s+by\s+(?P<b>[a-z]+)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("multi-dimension template must compile"))
    .collect()
});

static BY_CONJUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bby\s+(?P<a>[a-z]+)\s*(?:,|&|\band\b)\s*(?:by\s+)?(?P<b>[a-z]+)\b")
        .expect("conjunction pattern must compile")
});

/// The multi-dimension rules in precedence order.
pub fn multi_dimension_chain() -> RuleChain<DimensionPair> {
    RuleChain::new("multi_dimension")
        .with(Rule::always("structured_template", structured_template))
        .with(Rule::new(
            "keyword_proximity",
            |ctx| !ctx.terms.is_empty() || !ctx.metric_hits().is_empty(),
            keyword_proximity,
        ))
        .with(Rule::always("by_conjunction", by_conjunction))
}

/// Both captured words must name distinct known dimensions; anything less is
/// not a two-dimensional request.
fn pair_from_tokens(ctx: &ParseContext, a: &str, b: &str, strategy: MultiDimensionStrategy) -> Option<DimensionPair> {
    let primary = ctx.vocabulary.dimension_for_token(a);
    let secondary = ctx.vocabulary.dimension_for_token(b);
    match (primary, secondary) {
        (Some(p), Some(s)) if p != s => Some(DimensionPair {
            primary: p.to_string(),
            secondary: s.to_string(),
            strategy,
        }),
        _ => {
            debug!(a, b, ?strategy, "discarding dimension pair candidate");
            None
        }
    }
}

fn structured_template(ctx: &ParseContext) -> Option<DimensionPair> {
    TEMPLATES.iter().find_map(|re| {
        re.captures_iter(ctx.text()).find_map(|caps| {
            if !ctx.vocabulary.is_metric_token(&caps["x"]) {
                return None;
            }
            pair_from_tokens(ctx, &caps["a"], &caps["b"], MultiDimensionStrategy::StructuredTemplate)
        })
    })
}

fn keyword_proximity(ctx: &ParseContext) -> Option<DimensionPair> {
    let product = ctx.vocabulary.product_dimension.as_str();
    let anchors: Vec<Span> = ctx.terms
        .iter()
        .map(|t| t.span)
        .chain(ctx.metric_hits().into_iter().map(|h| h.span))
        .collect();
    let dimensions = ctx.dimension_hits();

    let primary_is_product = !ctx.terms.is_empty();
    let near_anchor = |span: Span| {
        anchors.iter().any(|a| {
            ctx.utterance.words_between(*a, span).is_some_and(|n| n <= PROXIMITY_WORDS)
        })
    };

    let secondary = dimensions
        .iter()
        .find(|d| d.key != product && near_anchor(d.span))
        .map(|d| d.key)?;

    let primary = if primary_is_product {
        product
    } else {
        dimensions.iter().map(|d| d.key).find(|k| *k != secondary)?
    };

    Some(DimensionPair {
        primary: primary.to_string(),
        secondary: secondary.to_string(),
        strategy: MultiDimensionStrategy::KeywordProximity,
    })
}

fn by_conjunction(ctx: &ParseContext) -> Option<DimensionPair> {
    BY_CONJUNCTION.captures_iter(ctx.text()).find_map(|caps| {
        pair_from_tokens(ctx, &caps["a"], &caps["b"], MultiDimensionStrategy::ByConjunction)
    })
}
