use crate::ParsedQuery;

/// Returned when parsing found no positive terms.
pub const NO_MATCH_SENTINEL: &str = "No matching terms found in the input.";

/// Renders a parse as a boolean search expression.
///
/// One parenthesized clause per matched column, terms quoted and joined
/// with `OR`; negations become a final `NOT (...)` clause; clauses are
/// joined with `AND`. An empty parse yields [`NO_MATCH_SENTINEL`].
pub fn boolean_query(parsed: &ParsedQuery) -> String {
    if parsed.is_empty() {
        return NO_MATCH_SENTINEL.to_string();
    }

    let mut clauses: Vec<String> = parsed
        .terms
        .iter()
        .map(|(_, terms)| format!("({})", or_join(terms)))
        .collect();

    if !parsed.negations.is_empty() {
        let terms: Vec<String> = parsed.negations.iter().map(|n| n.term.clone()).collect();
        clauses.push(format!("NOT ({})", or_join(&terms)));
    }

    clauses.join(" AND ")
}

fn or_join(terms: &[String]) -> String {
    let quoted: Vec<String> = terms.iter().map(|t| format!("\"{t}\"")).collect();
    quoted.join(" OR ")
}
