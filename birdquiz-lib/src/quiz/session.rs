use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{
    AnswerRecord, QuizOptions, Score, SessionState, ValidOptions, Verdict, DEFAULT_LENGTH,
};
use crate::audio::AudioOutput;
use crate::catalog::{Difficulty, SpeciesCatalog};
use crate::clip::{ClipFetcher, ClipInfo};
use crate::error::QuizError;
use crate::species::{normalize_answer, Species};

/// One play-through of the quiz.
///
/// Calls are expected in this order: [`configure`](Self::configure),
/// [`apply_filters`](Self::apply_filters), then per turn
/// [`has_more`](Self::has_more), [`advance`](Self::advance), optional
/// play/stop, [`submit_answer`](Self::submit_answer), and finally
/// [`score`](Self::score). Out-of-order calls fail with
/// [`QuizError::InvalidState`].
pub struct QuizSession {
    catalog: SpeciesCatalog,
    fetcher: Box<dyn ClipFetcher>,
    output: Box<dyn AudioOutput>,
    rng: StdRng,
    options: QuizOptions,
    valid: ValidOptions,
    state: SessionState,
    cursor: usize,
    current: Option<usize>,
    awaiting_answer: bool,
    correct: usize,
    answers: Vec<AnswerRecord>,
}

impl QuizSession {
    /// Create a session over `catalog` with default options.
    pub fn new(
        catalog: SpeciesCatalog,
        fetcher: Box<dyn ClipFetcher>,
        output: Box<dyn AudioOutput>,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            output,
            rng: StdRng::from_entropy(),
            options: QuizOptions::default(),
            valid: ValidOptions {
                difficulty: Difficulty::Common,
                length: DEFAULT_LENGTH,
                pattern: None,
            },
            state: SessionState::Configuring,
            cursor: 0,
            current: None,
            awaiting_answer: false,
            correct: 0,
            answers: Vec::new(),
        }
    }

    /// Use a fixed seed so filtering and clip choice are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &QuizOptions {
        &self.options
    }

    pub fn catalog(&self) -> &SpeciesCatalog {
        &self.catalog
    }

    /// Validate and store all options at once.
    pub fn configure(&mut self, options: QuizOptions) -> Result<(), QuizError> {
        self.require(&[SessionState::Configuring], "configure")?;
        self.valid = options.validate()?;
        self.options = options;
        Ok(())
    }

    /// Narrow the catalog to the play sequence: difficulty, then name
    /// pattern, then length. Returns the number of species in the quiz.
    pub fn apply_filters(&mut self) -> Result<usize, QuizError> {
        self.require(&[SessionState::Configuring], "apply filters")?;

        self.catalog.reset();
        self.catalog
            .apply_difficulty_filter(self.valid.difficulty, &mut self.rng);
        self.catalog
            .apply_name_pattern_filter(self.valid.pattern.as_ref());
        self.catalog
            .apply_length_filter(self.valid.length, &mut self.rng);

        self.state = if self.catalog.is_empty() {
            SessionState::Completed
        } else {
            SessionState::Filtered
        };

        info!(
            "quiz ready: {} species (difficulty {}, length {}, pattern {:?})",
            self.catalog.len(),
            self.options.difficulty,
            self.options.length,
            self.options.pattern
        );
        Ok(self.catalog.len())
    }

    /// Number of species in the play sequence.
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Zero-based position of the next species to visit.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn has_more(&self) -> bool {
        self.cursor < self.catalog.len()
    }

    pub fn remaining(&self) -> usize {
        self.catalog.len() - self.cursor
    }

    /// Whether the current turn still waits for `submit_answer`.
    pub fn awaiting_answer(&self) -> bool {
        self.awaiting_answer
    }

    /// Move to the next species and pick a playable clip for it.
    ///
    /// The cursor moves even when no clip can be selected; the error is
    /// returned and that species is skipped.
    pub fn advance(&mut self) -> Result<ClipInfo, QuizError> {
        match self.state {
            SessionState::Filtered | SessionState::InProgress => {}
            SessionState::Completed => {
                return Err(QuizError::SessionExhausted {
                    visited: self.cursor,
                })
            }
            SessionState::Configuring => {
                return Err(QuizError::InvalidState {
                    operation: "advance",
                    state: self.state,
                })
            }
        }
        if self.awaiting_answer {
            return Err(QuizError::InvalidState {
                operation: "advance past an unanswered turn",
                state: self.state,
            });
        }
        if !self.has_more() {
            return Err(QuizError::SessionExhausted {
                visited: self.cursor,
            });
        }

        self.stop_current();
        let total = self.catalog.len();
        let position = self.cursor;
        self.cursor += 1;
        self.current = Some(position);
        self.state = SessionState::InProgress;

        let species = self
            .catalog
            .get_mut(position)
            .ok_or(QuizError::SessionExhausted { visited: position })?;
        debug!(
            "turn {}/{}: {}",
            position + 1,
            total,
            species.primary_name()
        );

        let selected = species
            .select_playable_clip(self.fetcher.as_ref(), &mut self.rng)
            .map(ClipInfo::clone);
        match selected {
            Ok(info) => {
                self.awaiting_answer = true;
                Ok(info)
            }
            Err(err) => {
                self.current = None;
                if !self.has_more() {
                    self.state = SessionState::Completed;
                }
                Err(err)
            }
        }
    }

    /// Species of the active turn.
    pub fn current_species(&self) -> Option<&Species> {
        self.current.and_then(|position| self.catalog.get(position))
    }

    pub fn current_clip(&self) -> Option<&ClipInfo> {
        self.current_species().and_then(Species::current_info)
    }

    /// Play the current species' clip, reselecting once on playback failure.
    pub fn play_current(&mut self) -> Result<(), QuizError> {
        let position = self.current.ok_or(QuizError::InvalidState {
            operation: "play without a current species",
            state: self.state,
        })?;
        let species = self
            .catalog
            .get_mut(position)
            .ok_or(QuizError::SessionExhausted { visited: position })?;

        species.play_current(self.fetcher.as_ref(), self.output.as_mut(), &mut self.rng)
    }

    pub fn stop_current(&mut self) {
        if let Some(species) = self.current.and_then(|position| self.catalog.get_mut(position)) {
            species.stop_current();
        }
    }

    /// Stop every clip in the catalog, e.g. when a turn is abandoned.
    pub fn stop_all(&mut self) {
        self.catalog.stop_all();
    }

    pub fn is_playing(&self) -> bool {
        self.current_species()
            .map(Species::is_playing)
            .unwrap_or(false)
    }

    /// Grade `text` against the current species and record the answer.
    ///
    /// Playback of the current clip is stopped before grading.
    pub fn submit_answer(&mut self, text: &str) -> Result<Verdict, QuizError> {
        if self.state != SessionState::InProgress || !self.awaiting_answer {
            return Err(QuizError::InvalidState {
                operation: "submit an answer",
                state: self.state,
            });
        }
        let position = self.current.ok_or(QuizError::InvalidState {
            operation: "submit an answer",
            state: self.state,
        })?;
        let species = self
            .catalog
            .get_mut(position)
            .ok_or(QuizError::SessionExhausted { visited: position })?;

        species.stop_current();
        let submitted = normalize_answer(text);
        let correct = species.matches(&submitted);
        let verdict = Verdict {
            correct,
            answer: species.primary_name().to_string(),
        };
        self.answers.push(AnswerRecord {
            submitted,
            canonical_answers: species.names().to_vec(),
            correct,
        });

        if correct {
            self.correct += 1;
        }
        self.awaiting_answer = false;
        if !self.has_more() {
            self.state = SessionState::Completed;
        }

        debug!(
            "answer for {}: {}",
            verdict.answer,
            if correct { "correct" } else { "wrong" }
        );
        Ok(verdict)
    }

    /// Every graded answer, oldest first.
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Right, wrong and percentage over every visited species.
    ///
    /// A species that was skipped or left unanswered counts as wrong.
    /// Returns `None` before the first `advance`.
    pub fn score(&self) -> Option<Score> {
        Score::from_counts(self.correct, self.cursor)
    }

    fn require(&self, allowed: &[SessionState], operation: &'static str) -> Result<(), QuizError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(QuizError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}
