use crate::parser::{Span, Utterance};

/// Case-insensitive, word-bounded phrase matcher.
///
/// A phrase only matches where it is not glued to other letters or digits on
/// either side, so `"mode"` does not fire inside `"modem"` and `"ltl"` does
/// fire inside `"ltl,"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordComparer {
    pub length: usize,
    pub word: Vec<char>,
}

impl WordComparer {
    pub fn new(word: &str) -> Self {
        let word: Vec<char> = Utterance::new(word).text_v;
        Self {
            length: word.len(),
            word,
        }
    }

    pub fn phrase(&self) -> String {
        self.word.iter().collect()
    }

    pub fn is_any_delimiter(ch: char) -> bool {
        !Utterance::is_word_char(ch)
    }

    /// Whether the phrase matches `text` at exactly `position`.
    pub fn compare(&self, text: &Utterance, position: usize) -> bool {
        if self.length == 0 || position + self.length > text.length {
            return false;
        }

        if position > 0
            && !Self::is_any_delimiter(text.text_v[position - 1])
            && !Self::is_any_delimiter(self.word[0]) {
            return false;
        }

        let mut offset = 0;
        while offset < self.length {
            if self.word[offset] != text.text_v[position + offset] {
                return false;
            }
            offset += 1;
        }

        let end = position + self.length;
        if end == text.length {
            return true;
        }

        Self::is_any_delimiter(text.text_v[end]) || Self::is_any_delimiter(self.word[self.length - 1])
    }

    /// All non-overlapping matches, left to right.
    pub fn find_all(&self, text: &Utterance) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut position = 0;
        while position + self.length <= text.length && self.length > 0 {
            if self.compare(text, position) {
                spans.push(Span::new(position, position + self.length));
                position += self.length;
            } else {
                position += 1;
            }
        }
        spans
    }

    pub fn find_first(&self, text: &Utterance) -> Option<Span> {
        (0..text.length).find(|&p| self.compare(text, p)).map(|p| Span::new(p, p + self.length))
    }

    pub fn matches(&self, text: &Utterance) -> bool {
        self.find_first(text).is_some()
    }

    /// Whether this phrase is a strict sub-phrase of `other`.
    pub fn is_contained_in(&self, other: &WordComparer) -> bool {
        if self.length >= other.length {
            return false;
        }
        let other_text = Utterance::new(&other.phrase());
        self.matches(&other_text)
    }
}

/// One keyword hit produced by [`scan_longest_first`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHit<K> {
    pub key: K,
    pub span: Span,
}

/// Scan `text` for every `(key, comparer)` pair, longest phrase first.
///
/// A character range claimed by a longer phrase can not be claimed again by
/// a shorter one, so "origin state" yields a single hit instead of both
/// "origin state" and "state". Hits come back ordered by position.
pub fn scan_longest_first<'a, K, I>(text: &Utterance, keywords: I) -> Vec<KeywordHit<K>>
where
    K: Clone,
    I: IntoIterator<Item = (K, &'a WordComparer)>,
{
    let mut ordered: Vec<(K, &WordComparer)> = keywords.into_iter().collect();
    // stable: equal lengths keep table order
    ordered.sort_by(|a, b| b.1.length.cmp(&a.1.length));

    let mut claimed: Vec<Span> = Vec::new();
    let mut hits = Vec::new();
    for (key, comparer) in ordered {
        for span in comparer.find_all(text) {
            if claimed.iter().any(|c| c.overlaps(&span)) {
                continue;
            }
            claimed.push(span);
            hits.push(KeywordHit { key: key.clone(), span });
        }
    }
    hits.sort_by_key(|h| h.span.start);
    hits
}
