//! # Bird Quiz Library
//!
//! The quiz engine behind the bird sound quiz: a catalog of species with
//! their recordings, the filters that turn it into a quiz, and the session
//! state machine that plays clips and grades answers.

pub mod audio;
pub mod catalog;
pub mod clip;
pub mod error;
pub mod quiz;
pub mod species;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use catalog::{load_catalog, Difficulty, SpeciesCatalog};
pub use clip::{ClipFetcher, ClipInfo, HttpFetcher, SoundClip};
pub use error::{CatalogError, QuizError};
pub use quiz::{QuizOptions, QuizSession, Score, SessionState, Verdict};
pub use species::Species;
