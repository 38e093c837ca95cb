//! Info command implementation.

use super::open_store;
use serde::Serialize;
use std::path::Path;

/// Store summary.
#[derive(Debug, Serialize)]
pub struct InfoResult {
    /// Data directory.
    pub path: String,
    /// Number of questions.
    pub questions: usize,
    /// Number of subjects.
    pub subjects: usize,
    /// Number of flashcards.
    pub flashcards: usize,
    /// Number of topic explanations.
    pub topics: usize,
    /// Bytes of live collection payloads.
    pub payload_bytes: u64,
    /// Journal size in bytes.
    pub disk_bytes: u64,
}

/// Runs the info command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let info = store.storage_info()?;
    let result = InfoResult {
        path: path.display().to_string(),
        questions: info.questions,
        subjects: info.subjects,
        flashcards: info.flashcards,
        topics: info.topics,
        payload_bytes: info.payload_bytes,
        disk_bytes: info.disk_bytes,
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "text" => {
            println!("Store at {}", result.path);
            println!();
            println!("  Subjects:   {}", result.subjects);
            println!("  Questions:  {}", result.questions);
            println!("  Flashcards: {}", result.flashcards);
            println!("  Topics:     {}", result.topics);
            println!();
            println!("  Payload:    {} bytes", result.payload_bytes);
            println!("  On disk:    {} bytes", result.disk_bytes);
        }
        other => return Err(format!("unknown format '{other}' (expected text or json)").into()),
    }
    Ok(())
}
