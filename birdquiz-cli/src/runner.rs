use std::error::Error;
use std::io::{self, Stdout};
use std::path::Path;

use birdquiz_lib::audio::RodioOutput;
use birdquiz_lib::{load_catalog, HttpFetcher, QuizError, QuizSession, Score};
use clap::ArgMatches;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::cli::args::quiz_options;
use crate::controls::{self, Action, Feedback, QuizView};
use crate::logging::{self, LogBuffer};
use crate::{plain, ui};

pub fn run(args: &ArgMatches, log_buffer: LogBuffer) -> Result<i32, Box<dyn Error>> {
    info!("Starting bird quiz");

    let options = quiz_options(args);
    // Reject bad options before touching the catalog.
    options.validate()?;

    let catalog_path = args
        .get_one::<String>("CATALOG")
        .ok_or_else(|| QuizError::InvalidConfiguration("missing catalog path".to_string()))?;
    let catalog = load_catalog(Path::new(catalog_path))?;

    let volume = args.get_one::<f32>("volume").copied().unwrap_or(80.0);
    let output = RodioOutput::with_volume(volume / 100.0);
    let mut session = QuizSession::new(catalog, Box::new(HttpFetcher::new()), Box::new(output));
    if let Some(seed) = args.get_one::<u64>("seed") {
        session = session.with_seed(*seed);
    }

    session.configure(options)?;
    let count = session.apply_filters()?;
    if count == 0 {
        println!("No species left after filtering.");
        return Ok(0);
    }

    let score = if args.get_flag("quiet") {
        let stdin = io::stdin();
        plain::run_plain(&mut session, stdin.lock(), io::stdout())?
    } else {
        run_tui(&mut session, &log_buffer)?
    };

    session.stop_all();
    match score {
        Some(score) => println!("{}", controls::result_text(&score)),
        None => println!("No questions were answered."),
    }

    Ok(0)
}

fn run_tui(session: &mut QuizSession, log_buffer: &LogBuffer) -> io::Result<Option<Score>> {
    let _raw_mode = RawModeGuard::enable()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
    let _screen = ScreenGuard;
    let _stderr = logging::capture_stderr(log_buffer.clone());
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut view = QuizView::new(session.len());
    next_turn(session, &mut view);

    loop {
        view.playing = session.is_playing();
        draw(&mut terminal, session, &view, log_buffer);

        match controls::handle_key_event(&mut view.input) {
            Action::Quit => break,
            Action::TogglePlayback if view.finished => {}
            Action::TogglePlayback => toggle_playback(session),
            Action::Submit if view.finished => break,
            Action::Submit => submit(session, &mut view),
            Action::None => {}
        }
    }

    session.stop_all();
    let _ = terminal.show_cursor();
    Ok(session.score())
}

fn draw(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &QuizSession,
    view: &QuizView,
    log_buffer: &LogBuffer,
) {
    let log_lines = logging::snapshot(log_buffer);
    let history = controls::history_lines(session.answers());
    ui::draw_quiz(terminal, view, &history, &log_lines);
}

fn toggle_playback(session: &mut QuizSession) {
    if session.is_playing() {
        session.stop_current();
        return;
    }
    if let Err(err) = session.play_current() {
        error!("{}", err);
    }
}

fn submit(session: &mut QuizSession, view: &mut QuizView) {
    if !session.awaiting_answer() {
        return;
    }
    match session.submit_answer(&view.input) {
        Ok(verdict) => {
            view.feedback = Some(Feedback::Verdict(verdict));
            view.input.clear();
            next_turn(session, view);
        }
        Err(err) => error!("{}", err),
    }
}

/// Advance to the next playable species and start its clip.
///
/// Species without any playable clip are skipped with a warning.
fn next_turn(session: &mut QuizSession, view: &mut QuizView) {
    while session.has_more() {
        view.turn = session.cursor() + 1;
        match session.advance() {
            Ok(clip) => {
                view.clip = Some(clip);
                if let Err(err) = session.play_current() {
                    error!("{}", err);
                }
                return;
            }
            Err(err @ QuizError::NoPlayableClip { .. }) => {
                warn!("skipping species: {}", err);
                view.feedback = Some(Feedback::Notice(format!("Skipped: {}", err)));
            }
            Err(err) => {
                error!("{}", err);
                break;
            }
        }
    }

    view.clip = None;
    view.finished = true;
    view.score = session.score();
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Leaves the alternate screen on drop, including on early returns.
struct ScreenGuard;

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
    }
}
