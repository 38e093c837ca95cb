//! # Akilhane Testkit
//!
//! Test utilities for the Akilhane store.
//!
//! This crate provides:
//! - Test fixtures: temporary stores and record builders
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use akilhane_testkit::prelude::*;
//!
//! with_temp_store(|store| {
//!     store.add_subject(new_subject("Fizik")).unwrap();
//!     assert_eq!(store.subjects().unwrap().len(), 1);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
