use tracing::debug;

use crate::parser::ParseContext;

type Predicate = Box<dyn Fn(&ParseContext) -> bool + Send + Sync>;
type Extractor<T> = Box<dyn Fn(&ParseContext) -> Option<T> + Send + Sync>;

/// A `(predicate, extractor)` pair. The extractor only runs when the
/// predicate holds, and may still decline by returning `None`.
pub struct Rule<T> {
    pub name: String,
    applies: Predicate,
    extract: Extractor<T>,
}

impl<T> Rule<T> {
    pub fn new<P, E>(name: &str, applies: P, extract: E) -> Self
    where
        P: Fn(&ParseContext) -> bool + Send + Sync + 'static,
        E: Fn(&ParseContext) -> Option<T> + Send + Sync + 'static,
    {
        Self { name: name.to_string(), applies: Box::new(applies), extract: Box::new(extract) }
    }

    /// Rule whose extractor decides on its own.
    pub fn always<E>(name: &str, extract: E) -> Self
    where
        E: Fn(&ParseContext) -> Option<T> + Send + Sync + 'static,
    {
        Self::new(name, |_| true, extract)
    }

    pub fn evaluate(&self, ctx: &ParseContext) -> Option<T> {
        if (self.applies)(ctx) {
            (self.extract)(ctx)
        } else {
            None
        }
    }
}

impl<T> std::fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Ordered rules evaluated by a single dispatch loop, so precedence is just
/// the position in the list.
#[derive(Debug)]
pub struct RuleChain<T> {
    label: &'static str,
    rules: Vec<Rule<T>>,
}

impl<T> RuleChain<T> {
    pub fn new(label: &'static str) -> Self {
        Self { label, rules: Vec::new() }
    }

    pub fn with(mut self, rule: Rule<T>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: Rule<T>) {
        self.rules.push(rule);
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule that yields a value wins; later rules are not evaluated.
    pub fn first_match(&self, ctx: &ParseContext) -> Option<(&str, T)> {
        for rule in &self.rules {
            if let Some(value) = rule.evaluate(ctx) {
                debug!(chain = self.label, rule = %rule.name, "rule matched");
                return Some((rule.name.as_str(), value));
            }
        }
        None
    }

    /// Every rule's output, in rule order.
    pub fn collect_all(&self, ctx: &ParseContext) -> Vec<T> {
        self.rules.iter().filter_map(|r| r.evaluate(ctx)).collect()
    }
}
