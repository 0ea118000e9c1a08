use serde::{Deserialize, Serialize};

use crate::parser::{scan_longest_first, Span, Utterance, WordComparer};

/// One known entity: the display name reported to callers plus the phrases
/// that mention it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub term: String,
    pub keywords: Vec<String>,
}

impl TermEntry {
    pub fn new(term: &str, keywords: &[&str]) -> Self {
        Self {
            term: term.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Keyword table consumed by the [`TermExtractor`]. It is plain data so it
/// can come from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermTable {
    pub entries: Vec<TermEntry>,
}

impl Default for TermTable {
    fn default() -> Self {
        Self::freight_products()
    }
}

impl TermTable {
    pub fn new(entries: Vec<TermEntry>) -> Self {
        Self { entries }
    }

    pub fn freight_products() -> Self {
        Self::new(vec![
            TermEntry::new("Drawer System", &["drawer system", "drawer systems", "drawersystem"]),
            TermEntry::new("Drawer", &["drawer", "drawers"]),
            TermEntry::new("CargoGlide", &["cargoglide", "cargo glide", "cargo-glide"]),
            TermEntry::new("Bed Slide", &["bed slide", "bed slides", "bedslide", "truck bed slide"]),
            TermEntry::new("Tool Box", &["tool box", "toolbox", "toolboxes", "tool boxes"]),
            TermEntry::new("Loading Ramp", &["loading ramp", "loading ramps", "ramp", "ramps"]),
            TermEntry::new("Tie-Down", &["tie-down", "tie-downs", "tie down", "tie downs", "tiedown"]),
        ])
    }
}

/// A term found in the text together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermHit {
    pub term: String,
    pub span: Span,
}

/// Detects mentions of known entities (product categories) in free text.
///
/// Matching is case-insensitive and longest-match-first: once a phrase fires,
/// every shorter keyword contained in it (belonging to another entity) is
/// suppressed for the whole text. Output keeps first-mention order and has no
/// duplicates.
#[derive(Debug, Clone)]
pub struct TermExtractor {
    table: TermTable,
    comparers: Vec<(usize, WordComparer)>,
}

impl Default for TermExtractor {
    fn default() -> Self {
        Self::new(TermTable::default())
    }
}

impl TermExtractor {
    pub fn new(table: TermTable) -> Self {
        let comparers = table.entries
            .iter()
            .enumerate()
            .flat_map(|(idx, entry)| {
                entry.keywords.iter().map(move |k| (idx, WordComparer::new(k)))
            })
            .filter(|(_, cmp)| cmp.length > 0)
            .collect();
        Self { table, comparers }
    }

    pub fn table(&self) -> &TermTable {
        &self.table
    }

    pub fn extract_terms(&self, text: &str) -> Vec<String> {
        self.extract_hits(&Utterance::new(text))
            .into_iter()
            .map(|h| h.term)
            .collect()
    }

    /// Same as [`extract_terms`](Self::extract_terms) but keeps the span of
    /// the first mention of each term.
    pub fn extract_hits(&self, text: &Utterance) -> Vec<TermHit> {
        let hits = scan_longest_first(text, self.comparers.iter().map(|(idx, cmp)| ((*idx, cmp), cmp)));

        // a keyword swallowed by a longer keyword of another entity is a
        // variant of that entity, not a separate mention
        let fired: Vec<(usize, &WordComparer)> = hits.iter().map(|h| h.key).collect();
        let mut out: Vec<TermHit> = Vec::new();
        for hit in &hits {
            let (idx, cmp) = hit.key;
            let suppressed = fired.iter().any(|(other_idx, other)| {
                *other_idx != idx && cmp.is_contained_in(other)
            });
            if suppressed {
                continue;
            }
            let term = &self.table.entries[idx].term;
            if out.iter().any(|h| &h.term == term) {
                continue;
            }
            out.push(TermHit { term: term.clone(), span: hit.span });
        }
        out
    }
}
