//! Flashcard operations and review progress.

use super::LocalStore;
use crate::collection::{Record, FLASHCARDS_KEY};
use crate::error::{CoreError, CoreResult};
use crate::identity::normalize;
use crate::model::{Flashcard, FlashcardPatch, NewFlashcard};
use crate::review::{self, DEFAULT_CONFIDENCE};
use chrono::{DateTime, Utc};
use tracing::debug;

impl LocalStore {
    /// Returns every flashcard.
    pub fn flashcards(&self) -> CoreResult<Vec<Flashcard>> {
        self.inner.lock().load(FLASHCARDS_KEY)
    }

    /// Returns the flashcard with `id`.
    pub fn flashcard_by_id(&self, id: &str) -> CoreResult<Option<Flashcard>> {
        Ok(self.flashcards()?.into_iter().find(|f| f.id == id))
    }

    /// Returns flashcards whose subject matches `subject` ignoring case and
    /// surrounding whitespace.
    pub fn flashcards_by_subject(&self, subject: &str) -> CoreResult<Vec<Flashcard>> {
        let wanted = normalize(subject);
        let mut cards = self.flashcards()?;
        cards.retain(|f| normalize(&f.subject) == wanted);
        Ok(cards)
    }

    /// Returns flashcards due for review at `now`, soonest first.
    pub fn due_flashcards(&self, now: DateTime<Utc>) -> CoreResult<Vec<Flashcard>> {
        let mut cards = self.flashcards()?;
        cards.retain(|f| f.is_due(now));
        cards.sort_by_key(|f| f.next_review);
        Ok(cards)
    }

    /// Adds a flashcard with default progress (`review_count` 0, confidence 3).
    pub fn add_flashcard(&self, new: NewFlashcard) -> CoreResult<Flashcard> {
        let mut inner = self.inner.lock();
        let mut cards = inner.load_writable::<Flashcard>(FLASHCARDS_KEY)?;
        let card = new.into_flashcard(inner.fresh_id(&cards)?, Utc::now());
        cards.push(card.clone());
        inner.save(FLASHCARDS_KEY, &cards)?;
        debug!(id = %card.id, subject = %card.subject, "flashcard added");
        Ok(card)
    }

    /// Merges `patch` into the flashcard with `id`. Returns `false` if absent.
    pub fn update_flashcard(&self, id: &str, patch: FlashcardPatch) -> CoreResult<bool> {
        self.inner
            .lock()
            .modify::<Flashcard, _>(FLASHCARDS_KEY, id, |card| {
                patch.apply_to(card);
                Ok(())
            })
    }

    /// Deletes the flashcard with `id`. Returns `false` if absent.
    pub fn delete_flashcard(&self, id: &str) -> CoreResult<bool> {
        self.inner.lock().remove::<Flashcard>(FLASHCARDS_KEY, id)
    }

    /// Records a review and schedules the next one.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfidence`] if `confidence` is outside
    /// `1..=5` and [`CoreError::NotFound`] if there is no such flashcard.
    pub fn review_flashcard(
        &self,
        id: &str,
        confidence: u8,
        now: DateTime<Utc>,
    ) -> CoreResult<Flashcard> {
        let confidence = review::validate_confidence(confidence)?;

        let mut reviewed = None;
        self.inner
            .lock()
            .modify::<Flashcard, _>(FLASHCARDS_KEY, id, |card| {
                card.review_count = card.review_count.saturating_add(1);
                card.confidence = confidence;
                card.last_reviewed = Some(now);
                card.next_review = Some(review::next_review(now, confidence, card.review_count));
                reviewed = Some(card.clone());
                Ok(())
            })?;

        reviewed.ok_or_else(|| {
            CoreError::NotFound {
                kind: Flashcard::KIND,
                id: id.to_string(),
            }
        })
    }

    /// Clears a flashcard's review history. Returns `false` if absent.
    pub fn reset_flashcard_progress(&self, id: &str) -> CoreResult<bool> {
        self.inner
            .lock()
            .modify::<Flashcard, _>(FLASHCARDS_KEY, id, |card| {
                card.review_count = 0;
                card.confidence = DEFAULT_CONFIDENCE;
                card.last_reviewed = None;
                card.next_review = None;
                Ok(())
            })
    }
}
