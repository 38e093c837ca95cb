//! Subject commands.

use super::{open_store, truncate};
use akilhane_core::NewSubject;
use std::path::Path;

/// Lists every subject.
pub fn list(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let subjects = store.subjects()?;
    if subjects.is_empty() {
        println!("No subjects");
        return Ok(());
    }

    println!("{:<36} {:<24} {:<12} {:>9}  synced", "ID", "NAME", "DIFFICULTY", "QUESTIONS");
    for subject in subjects {
        println!(
            "{:<36} {:<24} {:<12} {:>9}  {}",
            subject.id,
            truncate(&subject.name, 24),
            truncate(&subject.difficulty, 12),
            subject.question_count,
            if subject.remote_id.is_some() { "yes" } else { "no" }
        );
    }
    Ok(())
}

/// Adds a subject unless one with an equivalent name exists.
pub fn add(
    path: &Path,
    name: String,
    description: String,
    category: String,
    difficulty: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    if let Some(existing) = store.subject_by_name(&name)? {
        return Err(format!("subject '{}' already exists ({})", existing.name, existing.id).into());
    }

    let subject = store.add_subject(NewSubject {
        description,
        category,
        difficulty,
        ..NewSubject::named(name)
    })?;
    store.flush()?;
    println!("Added subject {} ({})", subject.name, subject.id);
    Ok(())
}
