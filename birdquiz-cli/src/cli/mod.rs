//! Command-line surface of `birdquiz`.

pub mod args;
