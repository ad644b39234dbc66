//! Line-oriented quiz for `--quiet`: no terminal UI and no playback.

use std::io::{self, BufRead, Write};

use birdquiz_lib::{QuizError, QuizSession, Score};
use log::warn;

use crate::controls::{feedback_text, recording_info_text, Feedback};

/// Ask every species in `session`, reading one answer per line from `input`.
///
/// End of input quits early; the score covers every species visited so far.
pub fn run_plain<R: BufRead, W: Write>(
    session: &mut QuizSession,
    mut input: R,
    mut output: W,
) -> io::Result<Option<Score>> {
    let total = session.len();

    while session.has_more() {
        let turn = session.cursor() + 1;
        let clip = match session.advance() {
            Ok(clip) => clip,
            Err(err @ QuizError::NoPlayableClip { .. }) => {
                warn!("{}", err);
                writeln!(output, "[{}/{}] skipped: {}", turn, total, err)?;
                continue;
            }
            Err(err) => return Err(io::Error::new(io::ErrorKind::Other, err.to_string())),
        };

        writeln!(output, "[{}/{}]", turn, total)?;
        writeln!(output, "{}", recording_info_text(&clip))?;
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        let verdict = session
            .submit_answer(&line)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
        writeln!(output, "{}", feedback_text(&Feedback::Verdict(verdict)))?;
    }

    Ok(session.score())
}

#[cfg(test)]
mod tests {
    use super::*;
    use birdquiz_lib::test_support::{species, FakeFetcher, FakeOutput};
    use birdquiz_lib::{QuizOptions, Species, SpeciesCatalog};
    use std::io::Cursor;

    fn session(species: Vec<Species>) -> QuizSession {
        let fetcher = FakeFetcher::serving_seconds(0.1).failing("broken");
        let mut session = QuizSession::new(
            SpeciesCatalog::new(species),
            Box::new(fetcher),
            Box::new(FakeOutput::default()),
        )
        .with_seed(3);
        session
            .configure(QuizOptions {
                difficulty: 3,
                length: 10,
                pattern: None,
            })
            .expect("configure");
        session.apply_filters().expect("filters");
        session
    }

    #[test]
    fn answers_are_graded_line_by_line() {
        let mut session = session(vec![species("korppi", "corvus corax", 1, &["ok"])]);
        let mut output = Vec::new();
        let score = run_plain(&mut session, Cursor::new("  Corvus Corax \n"), &mut output)
            .expect("run");

        assert_eq!(score.map(|s| s.correct), Some(1));
        let text = String::from_utf8(output).expect("utf8");
        assert!(text.contains("xeno-canto XC0"));
        assert!(text.contains("Correct answer!"));
    }

    #[test]
    fn unplayable_species_are_skipped_and_scored_wrong() {
        let mut session = session(vec![
            species("korppi", "corvus corax", 2, &["broken"]),
            species("varis", "corvus cornix", 1, &["broken"]),
        ]);
        let mut output = Vec::new();
        let score = run_plain(&mut session, Cursor::new(""), &mut output).expect("run");

        let score = score.expect("visited species are scored");
        assert_eq!((score.correct, score.incorrect, score.percent), (0, 2, 0));
        let text = String::from_utf8(output).expect("utf8");
        assert_eq!(text.matches("skipped").count(), 2);
    }

    #[test]
    fn end_of_input_stops_the_quiz() {
        let mut session = session(vec![
            species("korppi", "corvus corax", 2, &["ok"]),
            species("varis", "corvus cornix", 1, &["ok"]),
        ]);
        let mut output = Vec::new();
        let score = run_plain(&mut session, Cursor::new("harakka\n"), &mut output).expect("run");

        let score = score.expect("one answer");
        assert_eq!((score.correct, score.incorrect), (0, 2));
        assert_eq!(session.answers().len(), 1);
    }
}
