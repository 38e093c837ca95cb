//! # Akilhane Core
//!
//! Local store for Akilhane study content: questions, subjects, flashcards
//! and generated topic explanations.
//!
//! This crate provides:
//! - The data model and its partial-update patches
//! - [`LocalStore`], the durable CRUD layer with self-healing reads
//! - The identity resolver ([`Identity`], [`ContentIndex`]) deciding when two
//!   records from different stores are the same entity
//! - Spaced-repetition scheduling for flashcards
//! - Snapshot export and import
//!
//! ## Example
//!
//! ```rust
//! use akilhane_core::{LocalStore, NewSubject};
//!
//! let store = LocalStore::in_memory();
//! let fizik = store.add_subject(NewSubject::named("Fizik")).unwrap();
//! assert_eq!(store.subject_by_name(" fizik ").unwrap(), Some(fizik));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod collection;
mod config;
mod dir;
mod error;
mod id;
pub mod identity;
mod model;
pub mod review;
mod store;

pub use collection::Record;
pub use config::{StoreConfig, DEFAULT_JOURNAL_FILE};
pub use dir::StoreDir;
pub use error::{CoreError, CoreResult};
pub use id::{IdGenerator, RandomIdGenerator};
pub use identity::{is_equivalent, normalize, ContentIndex, ContentKey, Identity};
pub use model::{
    Flashcard, FlashcardPatch, NewFlashcard, NewQuestion, NewSubject, NewTopicContent, Question,
    QuestionOption, QuestionPatch, Subject, SubjectPatch, TopicContent, TopicContentPatch,
    TopicStep,
};
pub use store::{
    DedupReport, ImportReport, LocalStore, StorageInfo, StoreSnapshot, ValidationReport,
};
