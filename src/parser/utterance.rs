/// Half-open character range `[start, end)` inside an [`Utterance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self { Self { start, end } }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn len(&self) -> usize { self.end - self.start }

    pub fn is_empty(&self) -> bool { self.start == self.end }
}

/// A free-text request prepared for keyword scanning.
///
/// `text_v` is the lower-cased request with runs of whitespace collapsed to a
/// single space; all spans handed out by comparers index into it. The original
/// text is kept for the rules that care about letter case (region codes).
#[derive(Debug, Clone, Default)]
pub struct Utterance {
    pub original: String,
    pub text: String,
    pub text_v: Vec<char>,
    pub length: usize,
    word_starts: Vec<usize>,
}

impl Utterance {
    pub fn new(original: &str) -> Self {
        let mut text = String::with_capacity(original.len());
        let mut last_space = true;
        for ch in original.chars() {
            if ch.is_whitespace() {
                if !last_space { text.push(' '); }
                last_space = true;
            } else {
                text.extend(ch.to_lowercase());
                last_space = false;
            }
        }
        if text.ends_with(' ') { text.pop(); }

        let text_v: Vec<char> = text.chars().collect();
        let mut word_starts = Vec::new();
        for (i, ch) in text_v.iter().enumerate() {
            let prev_is_word = i > 0 && Self::is_word_char(text_v[i - 1]);
            if Self::is_word_char(*ch) && !prev_is_word {
                word_starts.push(i);
            }
        }

        Self {
            original: original.to_string(),
            length: text_v.len(),
            text,
            text_v,
            word_starts,
        }
    }

    pub fn is_word_char(ch: char) -> bool {
        ch.is_alphanumeric()
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn char_at(&self, position: usize) -> char {
        if position < self.length {
            return self.text_v[position];
        }

        '\0'
    }

    pub fn text_from_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.length);
        let start = start.min(end);
        self.text_v[start..end].iter().collect()
    }

    pub fn text_of(&self, span: Span) -> String {
        self.text_from_range(span.start, span.end)
    }

    /// Number of words that start strictly before `position`.
    pub fn word_index(&self, position: usize) -> usize {
        self.word_starts.partition_point(|&start| start < position)
    }

    /// Words between the end of `left` and the start of `right`, or `None`
    /// when `right` does not come after `left`.
    pub fn words_between(&self, left: Span, right: Span) -> Option<usize> {
        if right.start < left.end {
            return None;
        }
        Some(self.word_index(right.start) - self.word_index(left.end))
    }

    /// Lower-cased words of the utterance in order.
    pub fn words(&self) -> Vec<String> {
        self.text
            .split(|c: char| !Self::is_word_char(c))
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }
}
