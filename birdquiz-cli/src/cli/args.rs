//! CLI argument definitions for `birdquiz`.

use birdquiz_lib::quiz::{QuizOptions, DEFAULT_DIFFICULTY, DEFAULT_LENGTH};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

/// Build the CLI argument parser.
pub fn build_cli() -> Command {
    Command::new("Bird Quiz")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Identify birds by their sounds")
        .arg(
            Arg::new("difficulty")
                .long("difficulty")
                .short('d')
                .value_name("LEVEL")
                .default_value("1")
                .value_parser(value_parser!(u8))
                .help("1 = 50 most common species, 2 = 150 most common, 3 = all"),
        )
        .arg(
            Arg::new("length")
                .long("length")
                .short('l')
                .value_name("COUNT")
                .default_value("10")
                .value_parser(value_parser!(usize))
                .help("Number of species in the quiz"),
        )
        .arg(
            Arg::new("pattern")
                .long("pattern")
                .short('p')
                .value_name("PATTERN")
                .help("Only ask about species whose Finnish name matches, * = any text"),
        )
        .arg(
            Arg::new("volume")
                .long("volume")
                .short('g')
                .value_name("VOLUME")
                .default_value("80")
                .value_parser(value_parser!(f32))
                .help("Playback volume (0-100)"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .value_parser(value_parser!(u64))
                .help("Seed species and clip selection for a repeatable quiz"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("No TUI or audio; read answers line by line from stdin"),
        )
        .arg(
            Arg::new("CATALOG")
                .help("Path to the prepared species catalog (JSON)")
                .required(true)
                .index(1),
        )
}

/// Collect the quiz options from parsed arguments.
pub fn quiz_options(args: &ArgMatches) -> QuizOptions {
    QuizOptions {
        difficulty: args
            .get_one::<u8>("difficulty")
            .copied()
            .unwrap_or(DEFAULT_DIFFICULTY),
        length: args
            .get_one::<usize>("length")
            .copied()
            .unwrap_or(DEFAULT_LENGTH),
        pattern: args.get_one::<String>("pattern").cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_quiz_defaults() {
        let args = build_cli()
            .try_get_matches_from(["birdquiz", "catalog.json"])
            .expect("parse");
        assert_eq!(quiz_options(&args), QuizOptions::default());
        assert!(!args.get_flag("quiet"));
    }

    #[test]
    fn parses_all_quiz_options() {
        let args = build_cli()
            .try_get_matches_from([
                "birdquiz", "-d", "3", "-l", "25", "-p", "*tiainen", "--seed", "9", "catalog.json",
            ])
            .expect("parse");
        let options = quiz_options(&args);
        assert_eq!(options.difficulty, 3);
        assert_eq!(options.length, 25);
        assert_eq!(options.pattern.as_deref(), Some("*tiainen"));
        assert_eq!(args.get_one::<u64>("seed"), Some(&9));
    }

    #[test]
    fn catalog_is_required() {
        assert!(build_cli().try_get_matches_from(["birdquiz"]).is_err());
    }
}
