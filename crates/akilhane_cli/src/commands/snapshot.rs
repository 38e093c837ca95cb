//! Export and import commands.

use super::open_store;
use akilhane_core::StoreSnapshot;
use std::fs;
use std::path::Path;
use tracing::info;

/// Writes a snapshot of every collection to `file`, or stdout.
pub fn export(path: &Path, file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    info!("Exporting snapshot of {:?}", path);
    let store = open_store(path)?;
    let snapshot = store.export_snapshot()?;
    let json = serde_json::to_string_pretty(&snapshot)?;

    match file {
        Some(file) => {
            fs::write(file, json)?;
            eprintln!(
                "Exported {} subjects, {} questions, {} flashcards, {} topics to {}",
                snapshot.subjects.len(),
                snapshot.questions.len(),
                snapshot.flashcards.len(),
                snapshot.topics.len(),
                file.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Merges a snapshot file into the store, skipping records already present.
pub fn import(path: &Path, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Importing snapshot {:?} into {:?}", file, path);
    let snapshot: StoreSnapshot = serde_json::from_str(&fs::read_to_string(file)?)?;
    let store = open_store(path)?;
    let report = store.import_snapshot(snapshot)?;
    store.flush()?;

    println!("Imported {} records:", report.added());
    println!("  Subjects:   {}", report.subjects);
    println!("  Questions:  {}", report.questions);
    println!("  Flashcards: {}", report.flashcards);
    println!("  Topics:     {}", report.topics);
    println!("  Skipped:    {}", report.skipped);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use akilhane_core::NewSubject;

    #[test]
    fn export_then_import_into_another_store() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let file = source.path().join("snapshot.json");

        {
            let store = open_store(source.path()).unwrap();
            store.add_subject(NewSubject::named("Fizik")).unwrap();
            store.flush().unwrap();
        }
        export(source.path(), Some(&file)).unwrap();
        import(target.path(), &file).unwrap();
        // a second import finds everything present
        import(target.path(), &file).unwrap();

        let store = open_store(target.path()).unwrap();
        assert_eq!(store.subjects().unwrap().len(), 1);
    }
}
