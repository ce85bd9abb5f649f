/// Integration tests for the full query pipeline over a CSV file on disk.
///
/// These cover the end-to-end flow: CSV load, vocabulary extraction,
/// parsing, boolean query rendering, and record filtering.
///
/// To run locally:
/// ```bash
/// cargo test --test query_pipeline_integration
/// ```
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use medq::{
    Dataset, NO_MATCH_SENTINEL, NegationPolicy, PhraseTable, SearchConfig, SearchService,
};
use tempfile::tempdir;

const SAMPLE_CSV: &str = "\
Name,Gender,Symptoms,Occupation
Anna,Female,\"Fever, Cough\",Teacher
Ben,Male,Headache,Student
Carla,Female,\"Chest Pain, Fever\",Nurse
Dan,Male,Cough,Student
Eve,Female,,Engineer
";

fn write_dataset(dir: &tempfile::TempDir) -> Result<PathBuf> {
    let path = dir.path().join("records.csv");
    let mut file = std::fs::File::create(&path)?;
    file.write_all(SAMPLE_CSV.as_bytes())?;
    Ok(path)
}

#[test]
fn csv_to_boolean_query_and_records() -> Result<()> {
    let dir = tempdir()?;
    let path = write_dataset(&dir)?;

    let dataset = Dataset::load(&path)?;
    assert_eq!(dataset.len(), 5);

    let service = SearchService::new(dataset);
    let outcome = service.search("female patient with fever");

    assert_eq!(outcome.query, "(\"female\") AND (\"fever\")");
    let names: Vec<_> = outcome.records.iter().map(|r| r.get("Name")).collect();
    assert_eq!(names, vec![Some("Anna"), Some("Carla")]);
    Ok(())
}

#[test]
fn clause_split_negation_end_to_end() -> Result<()> {
    let dir = tempdir()?;
    let path = write_dataset(&dir)?;
    let service = SearchService::new(Dataset::load(&path)?);

    let outcome = service.search("cough without student");

    assert_eq!(outcome.query, "(\"cough\") AND NOT (\"student\")");
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].get("Name"), Some("Anna"));
    Ok(())
}

#[test]
fn phrase_negation_end_to_end() -> Result<()> {
    let dir = tempdir()?;
    let path = write_dataset(&dir)?;
    let config = SearchConfig {
        policy: NegationPolicy::Phrases(PhraseTable::default()),
        ..Default::default()
    };
    let service = SearchService::with_config(Dataset::load(&path)?, config);

    let outcome = service.search("cough, not a student");

    assert_eq!(outcome.query, "(\"cough\") AND NOT (\"student\")");
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].get("Occupation"), Some("Teacher"));
    Ok(())
}

#[test]
fn hyphenated_query_matches_multi_word_terms() -> Result<()> {
    let dir = tempdir()?;
    let path = write_dataset(&dir)?;
    let service = SearchService::new(Dataset::load(&path)?);

    let outcome = service.search("chest-pain");

    assert_eq!(outcome.query, "(\"chest pain\")");
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].get("Name"), Some("Carla"));
    Ok(())
}

#[test]
fn unmatched_query_keeps_whole_dataset() -> Result<()> {
    let dir = tempdir()?;
    let path = write_dataset(&dir)?;
    let service = SearchService::new(Dataset::load(&path)?);

    let outcome = service.search("no vocabulary words here");

    assert_eq!(outcome.query, NO_MATCH_SENTINEL);
    assert_eq!(outcome.records.len(), 5);
    Ok(())
}

#[test]
fn missing_symptom_cell_is_never_matched() -> Result<()> {
    let dir = tempdir()?;
    let path = write_dataset(&dir)?;
    let service = SearchService::new(Dataset::load(&path)?);

    // every symptom term; Eve has an empty Symptoms cell and must not appear
    let outcome = service.search("fever cough headache chest pain");

    assert!(outcome.records.iter().all(|r| r.get("Name") != Some("Eve")));
    Ok(())
}

#[test]
fn untracked_columns_are_ignored_by_matching() -> Result<()> {
    let dir = tempdir()?;
    let path = write_dataset(&dir)?;
    let service = SearchService::new(Dataset::load(&path)?);

    // "anna" only occurs in the Name column, which is not categorical
    let outcome = service.search("anna");

    assert_eq!(outcome.query, NO_MATCH_SENTINEL);
    Ok(())
}

#[test]
fn requested_column_missing_from_csv_is_tolerated() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("partial.csv");
    std::fs::write(&path, "Gender,Symptoms\nFemale,fever\n")?;

    // default config also asks for Occupation
    let service = SearchService::new(Dataset::load(&path)?);
    let outcome = service.search("female with fever without teacher");

    assert_eq!(outcome.query, "(\"female\") AND (\"fever\")");
    assert_eq!(outcome.records.len(), 1);
    Ok(())
}
