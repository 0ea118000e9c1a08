use chrono::{DateTime, NaiveDate, Utc};

use crate::parser::{KeywordHit, TermHit, Utterance, Vocabulary};

/// Everything a rule may look at. Built once per parse; rules never mutate it.
pub struct ParseContext<'a> {
    pub utterance: &'a Utterance,
    pub vocabulary: &'a Vocabulary,
    pub terms: &'a [TermHit],
    pub now: DateTime<Utc>,
}

impl<'a> ParseContext<'a> {
    pub fn new(utterance: &'a Utterance, vocabulary: &'a Vocabulary, terms: &'a [TermHit], now: DateTime<Utc>) -> Self {
        Self { utterance, vocabulary, terms, now }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    pub fn text(&self) -> &str {
        &self.utterance.text
    }

    pub fn metric_hits(&self) -> Vec<KeywordHit<&'a str>> {
        self.vocabulary.metric_hits(self.utterance)
    }

    pub fn dimension_hits(&self) -> Vec<KeywordHit<&'a str>> {
        self.vocabulary.dimension_hits(self.utterance)
    }
}
