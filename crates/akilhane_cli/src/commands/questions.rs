//! Question commands.

use super::{open_store, truncate};
use std::path::Path;

/// Lists questions, optionally only those of one subject.
pub fn list(path: &Path, subject: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let questions = match subject {
        Some(subject) => store.questions_by_subject(subject)?,
        None => store.questions()?,
    };

    for question in &questions {
        println!(
            "{:<36} {:<16} {:<10} {}",
            question.id,
            truncate(&question.subject, 16),
            truncate(&question.difficulty, 10),
            truncate(&question.text, 60)
        );
    }
    println!("{} questions", questions.len());
    Ok(())
}

/// Reports questions that break the model's invariants.
pub fn validate(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let report = store.validate_questions()?;

    println!("Valid:   {}", report.valid);
    println!("Invalid: {}", report.invalid);
    for error in &report.errors {
        println!("  - {error}");
    }

    if report.invalid > 0 {
        return Err(format!("{} invalid questions", report.invalid).into());
    }
    Ok(())
}

/// Drops questions whose id appeared earlier.
pub fn dedup(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let report = store.cleanup_duplicate_questions()?;
    store.flush()?;
    println!("Removed {} duplicates, {} questions remain", report.removed, report.total);
    Ok(())
}
