use std::time::Duration;

use birdquiz_lib::quiz::AnswerRecord;
use birdquiz_lib::{ClipInfo, Score, Verdict};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What the user asked for with the last key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Submit,
    TogglePlayback,
    Quit,
}

/// Feedback shown after a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Verdict(Verdict),
    Notice(String),
}

/// Everything the quiz screen renders besides the session itself.
#[derive(Debug, Default)]
pub struct QuizView {
    pub input: String,
    pub clip: Option<ClipInfo>,
    pub feedback: Option<Feedback>,
    pub playing: bool,
    pub turn: usize,
    pub total: usize,
    pub score: Option<Score>,
    pub finished: bool,
}

impl QuizView {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }
}

/// Poll for a key press and translate it. Text keys edit `input` in place.
pub fn handle_key_event(input: &mut String) -> Action {
    if event::poll(Duration::from_millis(100)).unwrap_or(false) {
        if let Ok(Event::Key(key)) = event::read() {
            return action_for_key(key, input);
        }
    }

    Action::None
}

pub fn action_for_key(key: KeyEvent, input: &mut String) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Tab => Action::TogglePlayback,
        KeyCode::Enter => Action::Submit,
        KeyCode::Backspace => {
            input.pop();
            Action::None
        }
        KeyCode::Char(c) => {
            input.push(c);
            Action::None
        }
        _ => Action::None,
    }
}

/// Attribution lines for the recording being played.
pub fn recording_info_text(clip: &ClipInfo) -> String {
    [
        format!("xeno-canto {}", clip.id),
        clip.recordist.clone(),
        clip.location.clone(),
        clip.country.clone(),
        clip.license.clone().unwrap_or_else(|| "license unknown".to_string()),
    ]
    .join("\n")
}

pub fn feedback_text(feedback: &Feedback) -> String {
    match feedback {
        Feedback::Verdict(verdict) if verdict.correct => "Yay! Correct answer!".to_string(),
        Feedback::Verdict(verdict) => format!("Oops! The right answer is: {}", verdict.answer),
        Feedback::Notice(text) => text.clone(),
    }
}

pub fn result_text(score: &Score) -> String {
    format!(
        "Score: {}%\nCorrect: {}\nWrong: {}",
        score.percent, score.correct, score.incorrect
    )
}

/// One `(mark, primary name)` pair per answered turn.
pub fn history_lines(answers: &[AnswerRecord]) -> Vec<(&'static str, String)> {
    answers
        .iter()
        .map(|answer| {
            let mark = if answer.correct { "✅" } else { "❌" };
            let name = answer
                .canonical_answers
                .first()
                .cloned()
                .unwrap_or_default();
            (mark, name)
        })
        .collect()
}
