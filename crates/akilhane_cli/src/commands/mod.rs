//! CLI command implementations.

pub mod compact;
pub mod flashcards;
pub mod info;
pub mod questions;
pub mod remote;
pub mod snapshot;
pub mod subjects;
pub mod sync;

use akilhane_core::{LocalStore, StoreConfig};
use std::path::Path;

/// Opens the store in `dir`, creating it if missing.
pub fn open_store(dir: &Path) -> Result<LocalStore, Box<dyn std::error::Error>> {
    Ok(LocalStore::open(&StoreConfig::new(dir))?)
}

/// Shortens `text` to at most `max` characters for table output.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Fizik", 10), "Fizik");
        assert_eq!(truncate("Çözünürlük", 5), "Çözü…");
    }

    #[test]
    fn open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        let store = open_store(&path).unwrap();
        assert!(store.subjects().unwrap().is_empty());
        assert!(path.exists());
    }
}
