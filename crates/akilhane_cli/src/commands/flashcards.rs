//! Flashcard commands.

use super::{open_store, truncate};
use chrono::Utc;
use std::path::Path;

/// Lists flashcards due now, earliest first.
pub fn due(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let cards = store.due_flashcards(Utc::now())?;
    if cards.is_empty() {
        println!("Nothing to review");
        return Ok(());
    }

    for card in &cards {
        println!(
            "{:<36} {:<16} conf {}  reviews {:<3} {}",
            card.id,
            truncate(&card.subject, 16),
            card.confidence,
            card.review_count,
            truncate(&card.question, 50)
        );
    }
    println!("{} due", cards.len());
    Ok(())
}

/// Records a review and prints the next review time.
pub fn review(path: &Path, id: &str, confidence: u8) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let card = store.review_flashcard(id, confidence, Utc::now())?;
    store.flush()?;

    match card.next_review {
        Some(next) => println!(
            "Reviewed {} ({} reviews), next review {}",
            card.id,
            card.review_count,
            next.format("%Y-%m-%d %H:%M")
        ),
        None => println!("Reviewed {} ({} reviews)", card.id, card.review_count),
    }
    Ok(())
}
