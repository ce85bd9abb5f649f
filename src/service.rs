use log::{debug, warn};

use crate::{
    Dataset, NegationPolicy, ParsedQuery, QueryParser, Record, Summarizer, Vocabulary,
    boolean_query, filter_records, parser::DEFAULT_NEGATION_COLUMN,
};

/// Configuration for query parsing and filtering.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Categorical columns to extract vocabulary from, in declaration
    /// order. Columns missing from the dataset are skipped.
    pub columns: Vec<String>,
    /// Negation detection policy.
    pub policy: NegationPolicy,
    /// Column clause-split negations are checked against when filtering.
    pub negation_column: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            columns: ["Gender", "Symptoms", "Occupation"]
                .into_iter()
                .map(String::from)
                .collect(),
            policy: NegationPolicy::default(),
            negation_column: DEFAULT_NEGATION_COLUMN.to_string(),
        }
    }
}

/// Everything one query produces: the boolean expression, the parse it
/// was rendered from, and the matching records.
#[derive(Debug)]
pub struct SearchOutcome<'a> {
    pub query: String,
    pub parsed: ParsedQuery,
    pub records: Vec<&'a Record>,
}

/// Service layer tying the pipeline together.
///
/// `SearchService` owns the dataset and the vocabulary extracted from it
/// at construction; both are immutable afterwards, so queries share them
/// freely. An optional summarizer collaborator compresses query text
/// before parsing.
///
/// # Examples
///
/// ```
/// use medq::{Dataset, SearchService};
///
/// let dataset = Dataset::from_rows(
///     &["Gender", "Symptoms", "Occupation"],
///     vec![vec![Some("Female"), Some("fever, cough"), Some("Teacher")]],
/// );
/// let service = SearchService::new(dataset);
///
/// let outcome = service.search("female with fever");
/// assert_eq!(outcome.query, "(\"female\") AND (\"fever\")");
/// assert_eq!(outcome.records.len(), 1);
/// ```
pub struct SearchService {
    dataset: Dataset,
    vocabulary: Vocabulary,
    config: SearchConfig,
    summarizer: Option<Box<dyn Summarizer>>,
}

impl SearchService {
    /// Creates a service with the default configuration.
    pub fn new(dataset: Dataset) -> Self {
        Self::with_config(dataset, SearchConfig::default())
    }

    /// Creates a service with an explicit configuration. The vocabulary
    /// is extracted here, once.
    pub fn with_config(dataset: Dataset, config: SearchConfig) -> Self {
        let vocabulary = Vocabulary::build(&dataset, &config.columns);
        debug!(
            "vocabulary built: {} terms across {} requested columns",
            vocabulary.term_count(),
            config.columns.len()
        );
        Self {
            dataset,
            vocabulary,
            config,
            summarizer: None,
        }
    }

    /// Attaches a summarizer applied to query text before parsing.
    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Parses `text` and renders the boolean expression for it.
    pub fn boolean_query(&self, text: &str) -> (String, ParsedQuery) {
        let text = self.preprocess(text);
        let parsed = self.parser().parse(&text);
        (boolean_query(&parsed), parsed)
    }

    /// Runs the full pipeline: summarize (if configured), parse, render
    /// the boolean expression, and filter the dataset.
    pub fn search(&self, text: &str) -> SearchOutcome<'_> {
        let (query, parsed) = self.boolean_query(text);
        let records = filter_records(&self.dataset, &parsed);
        SearchOutcome {
            query,
            parsed,
            records,
        }
    }

    fn parser(&self) -> QueryParser<'_> {
        QueryParser::new(&self.vocabulary)
            .with_policy(self.config.policy.clone())
            .with_negation_column(self.config.negation_column.clone())
    }

    /// Applies the summarizer hook. Any failure (or a blank summary)
    /// degrades to the raw text rather than aborting the query.
    fn preprocess(&self, text: &str) -> String {
        let Some(summarizer) = &self.summarizer else {
            return text.to_string();
        };
        match summarizer.summarize(text) {
            Ok(summary) if !summary.trim().is_empty() => {
                debug!(
                    "summarized query from {} to {} chars",
                    text.len(),
                    summary.len()
                );
                summary
            }
            Ok(_) => {
                warn!("summarizer returned empty text, parsing raw query");
                text.to_string()
            }
            Err(e) => {
                warn!("summarizer failed ({e}), parsing raw query");
                text.to_string()
            }
        }
    }
}
