use std::fmt::{Display, Formatter};

use crate::quiz::SessionState;

/// Error type for the quiz engine.
///
/// `Download` and the first `Playback` failure of a turn are absorbed inside
/// [`crate::species::Species`]; everything else reaches the caller.
#[derive(Debug)]
pub enum QuizError {
    /// A clip could not be downloaded or decoded.
    Download { url: String, reason: String },
    /// A clip could not be started on the audio output.
    Playback(String),
    /// Every candidate clip of a species failed to download.
    NoPlayableClip { species: String, attempted: usize },
    /// `advance` was called with no species left.
    SessionExhausted { visited: usize },
    /// Rejected quiz options.
    InvalidConfiguration(String),
    /// A species was built without any candidate clips.
    EmptyCandidatePool(String),
    /// A session operation was called out of order.
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
}

impl Display for QuizError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Download { url, reason } => write!(f, "download of {} failed: {}", url, reason),
            Self::Playback(reason) => write!(f, "playback error: {}", reason),
            Self::NoPlayableClip { species, attempted } => write!(
                f,
                "no playable clip for {} after {} attempt(s)",
                species, attempted
            ),
            Self::SessionExhausted { visited } => {
                write!(f, "quiz exhausted after {} species", visited)
            }
            Self::InvalidConfiguration(reason) => write!(f, "invalid configuration: {}", reason),
            Self::EmptyCandidatePool(species) => {
                write!(f, "species {} has no candidate clips", species)
            }
            Self::InvalidState { operation, state } => {
                write!(f, "cannot {} while session is {:?}", operation, state)
            }
        }
    }
}

impl std::error::Error for QuizError {}

/// Error type for loading a prepared species catalog.
#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Duplicate(String),
    Species(QuizError),
    Empty,
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Parse(err) => write!(f, "invalid catalog: {}", err),
            Self::Duplicate(name) => write!(f, "duplicate species in catalog: {}", name),
            Self::Species(err) => write!(f, "invalid species: {}", err),
            Self::Empty => write!(f, "catalog contains no playable species"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<QuizError> for CatalogError {
    fn from(value: QuizError) -> Self {
        Self::Species(value)
    }
}
