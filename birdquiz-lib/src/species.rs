//! Quiz subjects and their candidate recordings.

use log::{info, warn};
use rand::Rng;

use crate::audio::AudioOutput;
use crate::clip::{ClipFetcher, ClipInfo, SoundClip};
use crate::error::QuizError;

/// Lowercase and trim an answer for comparison.
pub fn normalize_answer(text: &str) -> String {
    text.trim().to_lowercase()
}

/// The three accepted answers for a species, stored normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalNames {
    /// Common name in the quiz's primary language.
    pub primary: String,
    /// Common name in the alternate language.
    pub alternate: String,
    pub scientific: String,
}

impl CanonicalNames {
    pub fn new(primary: &str, alternate: &str, scientific: &str) -> Self {
        Self {
            primary: normalize_answer(primary),
            alternate: normalize_answer(alternate),
            scientific: normalize_answer(scientific),
        }
    }

    pub fn as_array(&self) -> [&str; 3] {
        [&self.primary, &self.alternate, &self.scientific]
    }

    pub fn to_vec(&self) -> Vec<String> {
        vec![
            self.primary.clone(),
            self.alternate.clone(),
            self.scientific.clone(),
        ]
    }
}

/// A bird to identify, with the recordings it can be presented by.
#[derive(Debug)]
pub struct Species {
    names: CanonicalNames,
    popularity: u32,
    clips: Vec<SoundClip>,
    current: Option<usize>,
}

impl Species {
    /// Build a species. The candidate pool must not be empty.
    pub fn new(
        primary: &str,
        alternate: &str,
        scientific: &str,
        popularity: u32,
        clips: Vec<SoundClip>,
    ) -> Result<Self, QuizError> {
        let names = CanonicalNames::new(primary, alternate, scientific);
        if clips.is_empty() {
            return Err(QuizError::EmptyCandidatePool(names.primary));
        }

        Ok(Self {
            names,
            popularity,
            clips,
            current: None,
        })
    }

    pub fn names(&self) -> &CanonicalNames {
        &self.names
    }

    pub fn primary_name(&self) -> &str {
        &self.names.primary
    }

    pub fn popularity(&self) -> u32 {
        self.popularity
    }

    /// Remaining candidate clips, in catalog order.
    pub fn clips(&self) -> &[SoundClip] {
        &self.clips
    }

    pub fn current_clip(&self) -> Option<&SoundClip> {
        self.current.and_then(|index| self.clips.get(index))
    }

    pub fn current_info(&self) -> Option<&ClipInfo> {
        self.current_clip().map(SoundClip::info)
    }

    /// Pick a random candidate that downloads successfully and make it current.
    ///
    /// Candidates that fail to download are removed from the pool for good.
    /// Fails with [`QuizError::NoPlayableClip`] once the pool is empty.
    pub fn select_playable_clip<R: Rng + ?Sized>(
        &mut self,
        fetcher: &dyn ClipFetcher,
        rng: &mut R,
    ) -> Result<&ClipInfo, QuizError> {
        self.stop_current();
        self.current = None;

        let mut attempted = 0;
        while !self.clips.is_empty() {
            let index = rng.gen_range(0..self.clips.len());
            attempted += 1;

            match self.clips[index].fetch(fetcher) {
                Ok(()) => {
                    self.current = Some(index);
                    let clip = &self.clips[index];
                    info!("{}: selected {}", self.names.primary, clip.info().id);
                    return Ok(clip.info());
                }
                Err(err) => {
                    warn!(
                        "{}: dropping {} from candidates: {}",
                        self.names.primary,
                        self.clips[index].info().id,
                        err
                    );
                    self.clips.remove(index);
                }
            }
        }

        Err(QuizError::NoPlayableClip {
            species: self.names.primary.clone(),
            attempted,
        })
    }

    /// Play the current clip, selecting one first if none is current.
    ///
    /// A playback failure is retried once with a freshly selected clip; a
    /// second failure is returned to the caller.
    pub fn play_current<R: Rng + ?Sized>(
        &mut self,
        fetcher: &dyn ClipFetcher,
        output: &mut dyn AudioOutput,
        rng: &mut R,
    ) -> Result<(), QuizError> {
        if self.current.is_none() {
            self.select_playable_clip(fetcher, rng)?;
        }

        match self.play_selected(output) {
            Err(QuizError::Playback(reason)) => {
                warn!(
                    "{}: playback failed ({}), selecting another clip",
                    self.names.primary, reason
                );
                self.select_playable_clip(fetcher, rng)?;
                self.play_selected(output)
            }
            other => other,
        }
    }

    fn play_selected(&mut self, output: &mut dyn AudioOutput) -> Result<(), QuizError> {
        let clip = self
            .current
            .and_then(|index| self.clips.get_mut(index))
            .ok_or_else(|| QuizError::Playback("no clip selected".to_string()))?;
        clip.play(output)
    }

    pub fn stop_current(&mut self) {
        if let Some(clip) = self.current.and_then(|index| self.clips.get_mut(index)) {
            clip.stop();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.current_clip()
            .map(SoundClip::is_playing)
            .unwrap_or(false)
    }

    /// Whether `answer` equals any canonical name after normalization.
    pub fn matches(&self, answer: &str) -> bool {
        let answer = normalize_answer(answer);
        self.names.as_array().contains(&answer.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{clip_info, species, FakeFetcher, FakeOutput};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn names_are_normalized() {
        let sp = species("  Korppi ", "Corvus corax", 10, &["https://example.org/a"]);
        assert_eq!(sp.primary_name(), "korppi");
        assert_eq!(sp.names().scientific, "corvus corax");
    }

    #[test]
    fn empty_pool_is_rejected() {
        let result = Species::new("korppi", "raven", "corvus corax", 1, Vec::new());
        assert!(matches!(result, Err(QuizError::EmptyCandidatePool(_))));
    }

    #[test]
    fn matches_any_canonical_form_ignoring_case_and_whitespace() {
        let clips = vec![SoundClip::new(clip_info("1", "https://example.org/a"))];
        let sp = Species::new("Korppi", "Common Raven", "Corvus corax", 1, clips).unwrap();
        assert!(sp.matches("  Corvus Corax "));
        assert!(sp.matches("corvus corax"));
        assert!(sp.matches("KORPPI"));
        assert!(sp.matches("common raven"));
        assert!(!sp.matches("varis"));
        assert!(!sp.matches(""));
    }

    #[test]
    fn failing_clip_is_evicted_after_one_selection() {
        let fetcher = FakeFetcher::serving_seconds(1.0).failing("https://example.org/bad");
        let mut rng = StdRng::seed_from_u64(7);
        let mut sp = species(
            "korppi",
            "corvus corax",
            1,
            &["https://example.org/bad", "https://example.org/good"],
        );

        let info = sp.select_playable_clip(&fetcher, &mut rng).expect("select");
        assert_eq!(info.download_url, "https://example.org/good");
        assert_eq!(sp.clips().len(), 1);
        assert!(sp
            .clips()
            .iter()
            .all(|clip| clip.info().download_url != "https://example.org/bad"));
    }

    #[test]
    fn all_failing_pool_raises_no_playable_clip() {
        let fetcher = FakeFetcher::serving_seconds(1.0)
            .failing("https://example.org/a")
            .failing("https://example.org/b");
        let mut rng = StdRng::seed_from_u64(3);
        let mut sp = species(
            "korppi",
            "corvus corax",
            1,
            &["https://example.org/a", "https://example.org/b"],
        );

        match sp.select_playable_clip(&fetcher, &mut rng) {
            Err(QuizError::NoPlayableClip { species, attempted }) => {
                assert_eq!(species, "korppi");
                assert_eq!(attempted, 2);
            }
            other => panic!("unexpected result: {:?}", other.map(|info| info.id.clone())),
        }
        assert!(sp.clips().is_empty());
        assert!(sp.current_clip().is_none());

        // The empty pool keeps failing on later attempts.
        assert!(matches!(
            sp.select_playable_clip(&fetcher, &mut rng),
            Err(QuizError::NoPlayableClip { attempted: 0, .. })
        ));

        // Evicted clips are never downloaded again.
        let mut requested = fetcher.requested();
        requested.sort();
        assert_eq!(requested, vec!["https://example.org/a", "https://example.org/b"]);
    }

    #[test]
    fn repeated_selection_skips_evicted_clip() {
        let fetcher = FakeFetcher::serving_seconds(1.0).failing("https://example.org/bad");
        let mut rng = StdRng::seed_from_u64(21);
        let mut sp = species(
            "korppi",
            "corvus corax",
            1,
            &["https://example.org/bad", "https://example.org/good"],
        );

        for _ in 0..5 {
            let info = sp.select_playable_clip(&fetcher, &mut rng).expect("select");
            assert_eq!(info.download_url, "https://example.org/good");
        }

        let requested = fetcher.requested();
        assert!(requested.iter().filter(|url| url.ends_with("/bad")).count() <= 1);
        assert_eq!(
            requested.iter().filter(|url| url.ends_with("/good")).count(),
            1
        );
    }

    #[test]
    fn play_current_selects_when_nothing_is_current() {
        let fetcher = FakeFetcher::serving_seconds(1.0);
        let mut output = FakeOutput::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut sp = species("korppi", "corvus corax", 1, &["https://example.org/a"]);

        sp.play_current(&fetcher, &mut output, &mut rng).expect("play");
        assert!(sp.is_playing());
        sp.stop_current();
        assert!(!sp.is_playing());
        assert_eq!(output.active(), 0);
    }

    #[test]
    fn playback_failure_is_retried_once() {
        let fetcher = FakeFetcher::serving_seconds(1.0);
        let mut output = FakeOutput::failing_starts(1);
        let mut rng = StdRng::seed_from_u64(1);
        let mut sp = species("korppi", "corvus corax", 1, &["https://example.org/a"]);
        sp.select_playable_clip(&fetcher, &mut rng).expect("select");

        sp.play_current(&fetcher, &mut output, &mut rng)
            .expect("second attempt plays");
        assert!(sp.is_playing());
        assert_eq!(output.started(), 1);
    }

    #[test]
    fn second_playback_failure_propagates() {
        let fetcher = FakeFetcher::serving_seconds(1.0);
        let mut output = FakeOutput::failing_starts(2);
        let mut rng = StdRng::seed_from_u64(1);
        let mut sp = species("korppi", "corvus corax", 1, &["https://example.org/a"]);
        sp.select_playable_clip(&fetcher, &mut rng).expect("select");

        assert!(matches!(
            sp.play_current(&fetcher, &mut output, &mut rng),
            Err(QuizError::Playback(_))
        ));
        assert!(!sp.is_playing());
    }
}
