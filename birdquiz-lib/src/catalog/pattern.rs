use regex::Regex;

use crate::error::QuizError;

/// Wildcard filter on primary common names, `*` standing for any substring.
///
/// Everything except `*` is matched literally and the pattern must cover the
/// whole name. Patterns are normalized like answers, so matching is
/// case-insensitive against the stored lowercase names.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    /// Compile a wildcard pattern. Returns `Ok(None)` for a blank pattern.
    pub fn parse(pattern: &str) -> Result<Option<Self>, QuizError> {
        let source = pattern.trim().to_lowercase();
        if source.is_empty() {
            return Ok(None);
        }

        let body = source
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^{}$", body)).map_err(|err| {
            QuizError::InvalidConfiguration(format!("pattern {:?}: {}", pattern, err))
        })?;

        Ok(Some(Self { source, regex }))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(text: &str) -> NamePattern {
        NamePattern::parse(text).unwrap().unwrap()
    }

    #[test]
    fn star_matches_any_substring() {
        let p = pattern("*tiainen");
        assert!(p.is_match("talitiainen"));
        assert!(p.is_match("tiainen"));
        assert!(!p.is_match("tiaiset"));
    }

    #[test]
    fn match_is_anchored_to_whole_name() {
        let p = pattern("varis");
        assert!(p.is_match("varis"));
        assert!(!p.is_match("varis ja korppi"));
        assert!(!p.is_match("mustavaris"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let p = pattern("a.c*");
        assert!(p.is_match("a.cd"));
        assert!(!p.is_match("abcd"));
        assert!(NamePattern::parse("(*").unwrap().unwrap().is_match("(x"));
    }

    #[test]
    fn pattern_is_case_and_trim_insensitive() {
        let p = pattern("  *Pöllö ");
        assert!(p.is_match("huuhkaja-pöllö"));
        assert_eq!(p.as_str(), "*pöllö");
    }

    #[test]
    fn blank_pattern_is_none() {
        assert!(NamePattern::parse("").unwrap().is_none());
        assert!(NamePattern::parse("   ").unwrap().is_none());
    }
}
