use crate::catalog::{Difficulty, NamePattern};
use crate::error::QuizError;

pub const DEFAULT_DIFFICULTY: u8 = 1;
pub const DEFAULT_LENGTH: usize = 10;

/// Quiz settings chosen before a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOptions {
    /// 1 = common species only, 2 = intermediate, 3 = all.
    pub difficulty: u8,
    /// Number of species to ask about.
    pub length: usize,
    /// Wildcard on primary common names, `*` for any substring.
    pub pattern: Option<String>,
}

impl Default for QuizOptions {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            length: DEFAULT_LENGTH,
            pattern: None,
        }
    }
}

impl QuizOptions {
    pub fn validate(&self) -> Result<ValidOptions, QuizError> {
        let difficulty = Difficulty::try_from(self.difficulty)?;
        if self.length == 0 {
            return Err(QuizError::InvalidConfiguration(
                "quiz length must be positive".to_string(),
            ));
        }
        let pattern = match self.pattern.as_deref() {
            Some(pattern) => NamePattern::parse(pattern)?,
            None => None,
        };

        Ok(ValidOptions {
            difficulty,
            length: self.length,
            pattern,
        })
    }
}

/// Options that passed validation, with the pattern compiled.
#[derive(Debug, Clone)]
pub struct ValidOptions {
    pub difficulty: Difficulty,
    pub length: usize,
    pub pattern: Option<NamePattern>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let options = QuizOptions::default().validate().expect("defaults");
        assert_eq!(options.difficulty, Difficulty::Common);
        assert_eq!(options.length, 10);
        assert!(options.pattern.is_none());
    }

    #[test]
    fn rejects_unknown_difficulty_and_zero_length() {
        let options = QuizOptions {
            difficulty: 4,
            ..QuizOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(QuizError::InvalidConfiguration(_))
        ));

        let options = QuizOptions {
            length: 0,
            ..QuizOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(QuizError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn blank_pattern_means_no_filter() {
        let options = QuizOptions {
            pattern: Some("  ".to_string()),
            ..QuizOptions::default()
        };
        assert!(options.validate().unwrap().pattern.is_none());
    }
}
