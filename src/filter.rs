use log::debug;

use crate::{Dataset, ParsedQuery, Record};

/// Filters the dataset down to records matching a parse.
///
/// Positive filters are a progressive intersection: each parsed column
/// keeps only records whose value contains (case-insensitive substring)
/// at least one of that column's matched terms, so columns combine with
/// AND semantics and terms within a column with OR semantics. Negations
/// then drop remaining records whose value in the negation's target
/// column contains the negated term.
///
/// Records with a missing value in a filtered column never match; missing
/// values in a negation column leave the record untouched. Columns absent
/// from the dataset are skipped. The pass is idempotent.
pub fn filter_records<'a>(dataset: &'a Dataset, parsed: &ParsedQuery) -> Vec<&'a Record> {
    let mut kept: Vec<&Record> = dataset.records().iter().collect();

    for (col, terms) in &parsed.terms {
        if !dataset.has_column(col) {
            continue;
        }
        kept.retain(|record| {
            record.get(col).is_some_and(|value| {
                let value = value.to_lowercase();
                terms.iter().any(|term| value.contains(term.as_str()))
            })
        });
    }

    for negation in &parsed.negations {
        if !dataset.has_column(&negation.column) {
            continue;
        }
        kept.retain(|record| match record.get(&negation.column) {
            Some(value) => !value.to_lowercase().contains(negation.term.as_str()),
            None => true,
        });
    }

    debug!(
        "filter kept {} of {} records ({} column filters, {} negations)",
        kept.len(),
        dataset.len(),
        parsed.terms.len(),
        parsed.negations.len()
    );
    kept
}
