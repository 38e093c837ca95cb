//! Identity and dedup resolution.
//!
//! The local store and the remote database mint identifiers independently,
//! so two records are "the same" entity when their normalized content
//! matches, not when their ids do:
//!
//! - Subjects: normalized name
//! - Questions and flashcards: normalized text plus normalized subject
//! - Topic content: normalized topic plus normalized subject
//!
//! A record that was already linked to a remote row (`remote_id`) is also
//! recognized by that link.

use std::collections::HashSet;

/// Normalizes a string for content comparison (trim + lowercase).
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normalized content used to decide whether two records are equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentKey {
    /// A subject, keyed by name.
    Subject {
        /// Normalized name.
        name: String,
    },
    /// A question or flashcard, keyed by its text and subject.
    Entry {
        /// Normalized question text.
        text: String,
        /// Normalized subject name.
        subject: String,
    },
    /// Topic content, keyed by topic and subject.
    Topic {
        /// Normalized topic.
        topic: String,
        /// Normalized subject name.
        subject: String,
    },
}

impl ContentKey {
    /// Builds a subject key.
    pub fn subject(name: &str) -> Self {
        Self::Subject {
            name: normalize(name),
        }
    }

    /// Builds a question/flashcard key.
    pub fn entry(text: &str, subject: &str) -> Self {
        Self::Entry {
            text: normalize(text),
            subject: normalize(subject),
        }
    }

    /// Builds a topic content key.
    pub fn topic(topic: &str, subject: &str) -> Self {
        Self::Topic {
            topic: normalize(topic),
            subject: normalize(subject),
        }
    }
}

/// A record that can be compared by content across stores.
pub trait Identity {
    /// Returns the normalized content key.
    fn content_key(&self) -> ContentKey;

    /// Returns the remote row id this record is known by, if any.
    ///
    /// For local records this is the recorded link to the remote row; for
    /// remote rows it is the row's own id.
    fn remote_id(&self) -> Option<&str> {
        None
    }
}

/// Returns true if `a` and `b` represent the same logical entity.
pub fn is_equivalent<A, B>(a: &A, b: &B) -> bool
where
    A: Identity + ?Sized,
    B: Identity + ?Sized,
{
    if let (Some(x), Some(y)) = (a.remote_id(), b.remote_id()) {
        if x == y {
            return true;
        }
    }
    a.content_key() == b.content_key()
}

/// Set of content keys (and remote ids) for one collection snapshot.
///
/// Building the index once per pass makes each presence check O(1) instead
/// of scanning the other collection.
#[derive(Debug, Default, Clone)]
pub struct ContentIndex {
    keys: HashSet<ContentKey>,
    remote_ids: HashSet<String>,
}

impl ContentIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index over `records`.
    pub fn build<'a, T, I>(records: I) -> Self
    where
        T: Identity + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Adds a record to the index.
    pub fn insert<T: Identity + ?Sized>(&mut self, record: &T) {
        self.keys.insert(record.content_key());
        if let Some(id) = record.remote_id() {
            self.remote_ids.insert(id.to_string());
        }
    }

    /// Returns true if an equivalent record is in the index.
    pub fn contains<T: Identity + ?Sized>(&self, candidate: &T) -> bool {
        if let Some(id) = candidate.remote_id() {
            if self.remote_ids.contains(id) {
                return true;
            }
        }
        self.keys.contains(&candidate.content_key())
    }

    /// Returns the number of distinct content keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
