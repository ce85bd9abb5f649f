use once_cell::sync::Lazy;
use regex::Regex;

use crate::Vocabulary;

/// Column negations are checked against when no other target is configured.
pub const DEFAULT_NEGATION_COLUMN: &str = "Occupation";

/// The clause-split keyword, matched as a whole word.
static WITHOUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bwithout\b").expect("invalid clause-split pattern"));

/// A term the user wants excluded, together with the column it is
/// checked against when filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negation {
    pub term: String,
    pub column: String,
}

/// One phrase-negation rule: a literal phrase mapped to the term it
/// negates and the column that term is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseRule {
    pub phrase: String,
    pub term: String,
    pub column: String,
}

impl PhraseRule {
    pub fn new(
        phrase: impl Into<String>,
        term: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            phrase: phrase.into(),
            term: term.into(),
            column: column.into(),
        }
    }
}

/// The rule table for the phrase-negation policy.
///
/// Keeping the rules as data (rather than inline conditionals) makes the
/// policy auditable and testable on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseTable {
    rules: Vec<PhraseRule>,
}

impl PhraseTable {
    pub fn new(rules: Vec<PhraseRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PhraseRule] {
        &self.rules
    }
}

impl Default for PhraseTable {
    /// The stock rules: student-related negation phrases, all targeting
    /// the Occupation column.
    fn default() -> Self {
        let rules = ["not a student", "not in school", "doesn't study", "non-student"]
            .into_iter()
            .map(|phrase| PhraseRule::new(phrase, "student", DEFAULT_NEGATION_COLUMN))
            .collect();
        Self { rules }
    }
}

/// How negations are detected in the query text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NegationPolicy {
    /// Split the input on the first standalone `without`; everything
    /// before it is the positive clause, everything after the negative
    /// clause, and vocabulary terms are matched against each side
    /// independently. The canonical policy.
    #[default]
    ClauseSplit,
    /// Scan the input for fixed phrases from a rule table; each hit
    /// registers its target term as a negation and the phrase is excised
    /// before positive matching so its words cannot double-match.
    Phrases(PhraseTable),
}

/// The outcome of parsing one query.
///
/// `terms` maps each column (declaration order) to its matched terms,
/// hyphen variants rewritten back to spaces; columns with no matches are
/// omitted. Created fresh per query and discarded after use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedQuery {
    pub terms: Vec<(String, Vec<String>)>,
    pub negations: Vec<Negation>,
}

impl ParsedQuery {
    /// True when no positive terms matched.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Matched terms for one column, if any matched.
    pub fn terms_for(&self, column: &str) -> Option<&[String]> {
        self.terms
            .iter()
            .find(|(col, _)| col == column)
            .map(|(_, terms)| terms.as_slice())
    }
}

/// Matches vocabulary terms in free-text queries and detects negations.
///
/// Holds a reference to the immutable vocabulary; construction is cheap,
/// so a parser is typically built per call.
pub struct QueryParser<'a> {
    vocab: &'a Vocabulary,
    policy: NegationPolicy,
    negation_column: String,
}

impl<'a> QueryParser<'a> {
    /// Creates a parser with the clause-split policy and the default
    /// negation column.
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self {
            vocab,
            policy: NegationPolicy::default(),
            negation_column: DEFAULT_NEGATION_COLUMN.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: NegationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the column clause-split negations are checked against.
    pub fn with_negation_column(mut self, column: impl Into<String>) -> Self {
        self.negation_column = column.into();
        self
    }

    /// Parses a query into matched terms and negations.
    ///
    /// Matching is case-insensitive and whole-word, so "cardiology" does
    /// not fire for the term "cardio". Term sets are iterated in sorted
    /// order per column, which makes the output ordering deterministic.
    pub fn parse(&self, text: &str) -> ParsedQuery {
        let input = text.to_lowercase();

        match &self.policy {
            NegationPolicy::ClauseSplit => {
                let mut parts = WITHOUT_RE.splitn(&input, 2);
                let positive = parts.next().unwrap_or(&input).trim().to_string();
                let negative = parts.next().map(|s| s.trim().to_string());

                let terms = self.match_terms(&positive);
                let negations = match negative {
                    Some(clause) => self.match_negations(&clause),
                    None => Vec::new(),
                };
                ParsedQuery { terms, negations }
            }
            NegationPolicy::Phrases(table) => {
                let mut remaining = input;
                let mut negations: Vec<Negation> = Vec::new();
                for rule in table.rules() {
                    if !remaining.contains(&rule.phrase) {
                        continue;
                    }
                    remaining = remaining.replace(&rule.phrase, "");
                    let negation = Negation {
                        term: rule.term.clone(),
                        column: rule.column.clone(),
                    };
                    if !negations.contains(&negation) {
                        negations.push(negation);
                    }
                }
                let terms = self.match_terms(&remaining);
                ParsedQuery { terms, negations }
            }
        }
    }

    /// Matches every vocabulary term against `clause`, column by column.
    ///
    /// Hyphen variants are rewritten back to spaces on output, and the
    /// variants of one term collapse to a single entry.
    fn match_terms(&self, clause: &str) -> Vec<(String, Vec<String>)> {
        let mut out = Vec::new();
        for (col, terms) in self.vocab.iter() {
            let mut matched: Vec<String> = Vec::new();
            for term in terms {
                if !contains_word(clause, term) {
                    continue;
                }
                let display = term.replace('-', " ");
                if !matched.contains(&display) {
                    matched.push(display);
                }
            }
            if !matched.is_empty() {
                out.push((col.to_string(), matched));
            }
        }
        out
    }

    /// Matches vocabulary terms in the negative clause, deduplicated
    /// across columns (a term in several columns negates once).
    fn match_negations(&self, clause: &str) -> Vec<Negation> {
        let mut out: Vec<Negation> = Vec::new();
        for (_, terms) in self.match_terms(clause) {
            for term in terms {
                let negation = Negation {
                    term,
                    column: self.negation_column.clone(),
                };
                if !out.contains(&negation) {
                    out.push(negation);
                }
            }
        }
        out
    }
}

/// Whole-word, case-insensitive containment test.
fn contains_word(text: &str, term: &str) -> bool {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
    // The escaped pattern is always valid; a build failure means no match.
    Regex::new(&pattern).map(|re| re.is_match(text)).unwrap_or(false)
}
