pub mod dataset;
pub mod filter;
pub mod parser;
pub mod query;
pub mod service;
pub mod summarizer;
pub mod vocab;

pub use dataset::{Dataset, Record};
pub use filter::filter_records;
pub use parser::{Negation, NegationPolicy, ParsedQuery, PhraseRule, PhraseTable, QueryParser};
pub use query::{NO_MATCH_SENTINEL, boolean_query};
pub use service::{SearchConfig, SearchOutcome, SearchService};
pub use summarizer::{
    HttpSummarizer, HttpSummarizerBuilder, IdentitySummarizer, Summarizer, SummarizerError,
};
pub use vocab::Vocabulary;
