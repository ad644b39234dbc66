//! Species catalog and the filters that narrow it into a quiz.

mod pattern;
pub mod source;

use std::cmp::Reverse;

use log::{debug, info};
use rand::seq::{index, SliceRandom};
use rand::Rng;

use crate::error::QuizError;
use crate::species::Species;

pub use pattern::NamePattern;
pub use source::{license_label, load_catalog, parse_catalog};

/// How far down the popularity ranking a quiz may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    /// The 50 most common species.
    Common = 1,
    /// The 150 most common species.
    Intermediate = 2,
    /// Every species in the catalog.
    All = 3,
}

impl Difficulty {
    /// Maximum number of species at this level, `None` for no limit.
    pub fn species_limit(self) -> Option<usize> {
        match self {
            Self::Common => Some(50),
            Self::Intermediate => Some(150),
            Self::All => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = QuizError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Self::Common),
            2 => Ok(Self::Intermediate),
            3 => Ok(Self::All),
            _ => Err(QuizError::InvalidConfiguration(format!(
                "difficulty must be 1, 2 or 3 (got {})",
                level
            ))),
        }
    }
}

/// A fixed master list of species plus a replaceable working view over it.
///
/// The working view holds positions into the master list, so filtering never
/// reorders or drops master entries.
#[derive(Debug)]
pub struct SpeciesCatalog {
    species: Vec<Species>,
    working: Vec<usize>,
}

impl SpeciesCatalog {
    pub fn new(species: Vec<Species>) -> Self {
        let working = (0..species.len()).collect();
        Self { species, working }
    }

    /// Size of the working population.
    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    pub fn master_len(&self) -> usize {
        self.species.len()
    }

    /// All species, in master order.
    pub fn master(&self) -> &[Species] {
        &self.species
    }

    /// Species at `position` in the working population.
    pub fn get(&self, position: usize) -> Option<&Species> {
        self.working
            .get(position)
            .and_then(|&index| self.species.get(index))
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut Species> {
        let index = *self.working.get(position)?;
        self.species.get_mut(index)
    }

    /// Working population in order.
    pub fn iter(&self) -> impl Iterator<Item = &Species> + '_ {
        self.working.iter().map(move |&index| &self.species[index])
    }

    /// Stop playback of every species, current or not.
    pub fn stop_all(&mut self) {
        for species in &mut self.species {
            species.stop_current();
        }
    }

    /// Restore the working population to the full master list.
    pub fn reset(&mut self) {
        self.working = (0..self.species.len()).collect();
    }

    /// Keep only the most popular species for `difficulty`, in random order.
    pub fn apply_difficulty_filter<R: Rng + ?Sized>(&mut self, difficulty: Difficulty, rng: &mut R) {
        let species = &self.species;
        self.working
            .sort_by_key(|&index| Reverse(species[index].popularity()));
        if let Some(limit) = difficulty.species_limit() {
            self.working.truncate(limit);
        }
        // Without the shuffle early turns would favour the most common birds.
        self.working.shuffle(rng);

        debug!(
            "difficulty {} kept {} of {} species",
            difficulty.level(),
            self.working.len(),
            self.species.len()
        );
    }

    /// Keep the species whose primary name matches `pattern`.
    ///
    /// A pattern that matches nothing leaves the population unchanged.
    pub fn apply_name_pattern_filter(&mut self, pattern: Option<&NamePattern>) {
        let Some(pattern) = pattern else {
            return;
        };

        let species = &self.species;
        let matched: Vec<usize> = self
            .working
            .iter()
            .copied()
            .filter(|&index| pattern.is_match(species[index].primary_name()))
            .collect();

        if matched.is_empty() {
            info!(
                "pattern {:?} matched no species, keeping all {}",
                pattern.as_str(),
                self.working.len()
            );
            return;
        }

        debug!(
            "pattern {:?} kept {} of {} species",
            pattern.as_str(),
            matched.len(),
            self.working.len()
        );
        self.working = matched;
    }

    /// Replace the population with a random sample of at most `target` species.
    pub fn apply_length_filter<R: Rng + ?Sized>(&mut self, target: usize, rng: &mut R) {
        let amount = target.min(self.working.len());
        let sampled: Vec<usize> = index::sample(rng, self.working.len(), amount)
            .into_iter()
            .map(|position| self.working[position])
            .collect();

        debug!("length {} sampled {} species", target, sampled.len());
        self.working = sampled;
    }
}
