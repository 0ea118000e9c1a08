pub mod utterance;
pub use utterance::*;

pub mod word_comparer;
pub use word_comparer::*;

pub mod term_extractor;
pub use term_extractor::*;

pub mod filter_clause;
pub use filter_clause::*;

pub mod parsed_query;
pub use parsed_query::*;

pub mod vocabulary;
pub use vocabulary::*;

pub mod rules;
pub use rules::*;

pub mod intent_parser;
pub use intent_parser::*;
