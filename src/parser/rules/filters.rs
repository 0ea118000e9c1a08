use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::{scan_longest_first, ParseContext, Rule, RuleChain, SortDirection, WordComparer};

/// One structural qualifier found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterFinding {
    /// Region code bound to a dimension id ("origin", "destination", "state")
    Region { dimension: String, code: String },
    /// Transport mode value ("LTL", "FTL", ...)
    Mode(String),
    /// "top N" / "bottom N"
    Rank { limit: usize, sort: SortDirection },
}

pub const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM",
    "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY",
];

// codes that are also everyday words; only trusted after from/to/in
const AMBIGUOUS_CODES: &[&str] = &["IN", "OR", "ME", "OK", "HI", "OH", "DE", "PA", "MA", "LA", "CO", "ID", "MO", "AL"];

static DIRECTED_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<dir>(?i:from|to|in))\s+(?P<code>[A-Z]{2})\b").expect("directed region pattern must compile")
});

static STANDALONE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z]{2}\b").expect("region code pattern must compile")
});

static RANK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<dir>top|bottom)\s+(?P<n>\d{1,4})\b").expect("rank pattern must compile")
});

static MODES: Lazy<Vec<(&'static str, WordComparer)>> = Lazy::new(|| {
    [
        ("LTL", "ltl"),
        ("LTL", "less than truckload"),
        ("FTL", "ftl"),
        ("FTL", "full truckload"),
        ("FTL", "truckload"),
        ("Parcel", "parcel"),
        ("Intermodal", "intermodal"),
    ]
    .iter()
    .map(|(value, phrase)| (*value, WordComparer::new(phrase)))
    .collect()
});

pub fn is_state_code(code: &str) -> bool {
    US_STATE_CODES.contains(&code)
}

fn region_codes(ctx: &ParseContext) -> Option<Vec<FilterFinding>> {
    let text = ctx.utterance.original.as_str();
    let mut findings = Vec::new();
    let mut directed_spans = Vec::new();

    for caps in DIRECTED_CODE.captures_iter(text) {
        let code = &caps["code"];
        if !is_state_code(code) {
            continue;
        }
        let dimension = match caps["dir"].to_ascii_lowercase().as_str() {
            "from" => "origin",
            "to" => "destination",
            _ => "state",
        };
        if let Some(m) = caps.name("code") {
            directed_spans.push(m.range());
        }
        findings.push(FilterFinding::Region { dimension: dimension.to_string(), code: code.to_string() });
    }

    for m in STANDALONE_CODE.find_iter(text) {
        let code = m.as_str();
        if directed_spans.contains(&m.range()) || !is_state_code(code) || AMBIGUOUS_CODES.contains(&code) {
            continue;
        }
        findings.push(FilterFinding::Region { dimension: "state".to_string(), code: code.to_string() });
    }

    let mut unique: Vec<FilterFinding> = Vec::new();
    for f in findings {
        if !unique.contains(&f) {
            unique.push(f);
        }
    }
    (!unique.is_empty()).then_some(unique)
}

fn rank(ctx: &ParseContext) -> Option<Vec<FilterFinding>> {
    let caps = RANK.captures(ctx.text())?;
    let limit: usize = caps["n"].parse().ok().filter(|n| *n > 0)?;
    let sort = if &caps["dir"] == "top" { SortDirection::Desc } else { SortDirection::Asc };
    Some(vec![FilterFinding::Rank { limit, sort }])
}

fn transport_mode(ctx: &ParseContext) -> Option<Vec<FilterFinding>> {
    let hits = scan_longest_first(ctx.utterance, MODES.iter().map(|(value, cmp)| (*value, cmp)));
    let mut values: Vec<FilterFinding> = Vec::new();
    for hit in hits {
        let finding = FilterFinding::Mode(hit.key.to_string());
        if !values.contains(&finding) {
            values.push(finding);
        }
    }
    (!values.is_empty()).then_some(values)
}

/// Filter rules are additive: every rule's findings are kept.
pub fn filter_chain() -> RuleChain<Vec<FilterFinding>> {
    RuleChain::new("filters")
        .with(Rule::always("region_codes", region_codes))
        .with(Rule::always("rank", rank))
        .with(Rule::always("transport_mode", transport_mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Utterance, Vocabulary};
    use chrono::Utc;

    fn findings(text: &str) -> Vec<FilterFinding> {
        let u = Utterance::new(text);
        let v = Vocabulary::default();
        let ctx = ParseContext::new(&u, &v, &[], Utc::now());
        filter_chain().collect_all(&ctx).into_iter().flatten().collect()
    }

    fn region(dimension: &str, code: &str) -> FilterFinding {
        FilterFinding::Region { dimension: dimension.into(), code: code.into() }
    }

    #[test]
    fn directed_region_codes() {
        assert_eq!(
            findings("LTL cost from TX to CA"),
            vec![region("origin", "TX"), region("destination", "CA"), FilterFinding::Mode("LTL".into())]
        );
    }

    #[test]
    fn standalone_codes_skip_common_words() {
        // "OR" and "IN" read as words when not introduced by from/to/in
        assert_eq!(findings("cost for TX OR GA IN total"), vec![region("state", "TX"), region("state", "GA")]);
        assert_eq!(findings("shipments in OR"), vec![region("state", "OR")]);
    }

    #[test]
    fn lowercase_pairs_are_not_codes() {
        assert!(findings("send it to me in ca").is_empty());
    }

    #[test]
    fn top_and_bottom_n() {
        assert_eq!(findings("top 5 carriers by spend"), vec![FilterFinding::Rank { limit: 5, sort: SortDirection::Desc }]);
        assert_eq!(findings("Bottom 3 lanes"), vec![FilterFinding::Rank { limit: 3, sort: SortDirection::Asc }]);
        assert!(findings("top 0 lanes").is_empty());
    }

    #[test]
    fn truckload_words_map_to_modes() {
        assert_eq!(findings("full truckload vs ltl"), vec![FilterFinding::Mode("FTL".into()), FilterFinding::Mode("LTL".into())]);
    }
}
