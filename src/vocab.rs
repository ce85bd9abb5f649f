use std::collections::BTreeSet;

use crate::Dataset;

/// Normalized term sets extracted from the dataset's categorical columns.
///
/// For every comma-separated token in a tracked column, three lower-cased
/// variants are registered: the trimmed original, the original with
/// internal spaces removed, and the original with internal spaces replaced
/// by hyphens. This lets the parser recognize "chest pain", "chestpain"
/// and "chest-pain" alike.
///
/// Built once at startup and never mutated afterwards. Term sets are
/// sorted (`BTreeSet`), so iteration order is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    columns: Vec<(String, BTreeSet<String>)>,
}

impl Vocabulary {
    /// Extracts the vocabulary for the requested columns.
    ///
    /// Columns absent from the dataset are skipped. Missing cells are
    /// ignored; empty tokens produced by stray commas are discarded.
    pub fn build(dataset: &Dataset, columns: &[String]) -> Self {
        let mut out = Vec::new();
        for col in columns {
            if !dataset.has_column(col) {
                continue;
            }
            let mut terms = BTreeSet::new();
            for record in dataset.records() {
                let Some(value) = record.get(col) else {
                    continue;
                };
                for token in value.to_lowercase().split(',') {
                    let token = token.trim();
                    if token.is_empty() {
                        continue;
                    }
                    terms.insert(token.to_string());
                    terms.insert(token.replace(' ', ""));
                    terms.insert(token.replace(' ', "-"));
                }
            }
            out.push((col.clone(), terms));
        }
        Self { columns: out }
    }

    /// Iterates columns in declaration order with their sorted term sets.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.columns.iter().map(|(col, terms)| (col.as_str(), terms))
    }

    /// The term set for a column, if the column was extracted.
    pub fn terms_for(&self, column: &str) -> Option<&BTreeSet<String>> {
        self.columns
            .iter()
            .find(|(col, _)| col == column)
            .map(|(_, terms)| terms)
    }

    /// Total number of terms across all columns (variants included).
    pub fn term_count(&self) -> usize {
        self.columns.iter().map(|(_, terms)| terms.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(|(_, terms)| terms.is_empty())
    }
}
