use std::collections::VecDeque;

use rand::{Rng, SeedableRng as _, seq::SliceRandom};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::PieceKind;

/// How the next piece family is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Randomizer {
    /// Independent uniform draws over the 7 families. Long repeats and
    /// droughts are possible.
    #[default]
    Uniform,
    /// Shuffled bags containing each family once.
    SevenBag,
    /// A fixed list of families, cycled in order. An empty list falls back to
    /// uniform draws.
    Sequence(Vec<PieceKind>),
}

/// Supplies piece families according to a [`Randomizer`].
///
/// Draws come from a [`Pcg32`] seeded with a `u64`, so the same seed and
/// randomizer always produce the same sequence.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceGenerator, PieceKind, Randomizer};
///
/// let mut a = PieceGenerator::new(Randomizer::Uniform, 42);
/// let mut b = PieceGenerator::new(Randomizer::Uniform, 42);
/// for _ in 0..20 {
///     assert_eq!(a.next_kind(), b.next_kind());
/// }
///
/// let mut fixed = PieceGenerator::new(Randomizer::Sequence(vec![PieceKind::I, PieceKind::O]), 0);
/// assert_eq!(fixed.next_kind(), PieceKind::I);
/// assert_eq!(fixed.next_kind(), PieceKind::O);
/// assert_eq!(fixed.next_kind(), PieceKind::I);
/// ```
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
    randomizer: Randomizer,
    bag: VecDeque<PieceKind>,
    cursor: usize,
}

impl PieceGenerator {
    #[must_use]
    pub fn new(randomizer: Randomizer, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            randomizer,
            bag: VecDeque::with_capacity(PieceKind::LEN),
            cursor: 0,
        }
    }

    /// Like [`Self::new`], with a seed drawn from the thread-local RNG.
    #[must_use]
    pub fn from_entropy(randomizer: Randomizer) -> Self {
        Self::new(randomizer, rand::rng().random())
    }

    #[must_use]
    pub fn randomizer(&self) -> &Randomizer {
        &self.randomizer
    }

    /// Draws the next piece family.
    pub fn next_kind(&mut self) -> PieceKind {
        match &self.randomizer {
            Randomizer::Uniform => self.rng.random(),
            Randomizer::SevenBag => {
                if self.bag.is_empty() {
                    let mut new_bag = PieceKind::ALL;
                    new_bag.shuffle(&mut self.rng);
                    self.bag.extend(new_bag);
                }
                self.bag.pop_front().unwrap_or_else(|| self.rng.random())
            }
            Randomizer::Sequence(kinds) => {
                let Some(&kind) = kinds.get(self.cursor % kinds.len().max(1)) else {
                    return self.rng.random();
                };
                self.cursor = (self.cursor + 1) % kinds.len();
                kind
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        for randomizer in [Randomizer::Uniform, Randomizer::SevenBag] {
            let mut a = PieceGenerator::new(randomizer.clone(), 0x1234_5678);
            let mut b = PieceGenerator::new(randomizer, 0x1234_5678);
            for _ in 0..50 {
                assert_eq!(a.next_kind(), b.next_kind());
            }
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = PieceGenerator::new(Randomizer::Uniform, 1);
        let mut b = PieceGenerator::new(Randomizer::Uniform, 2);
        let a: Vec<_> = (0..32).map(|_| a.next_kind()).collect();
        let b: Vec<_> = (0..32).map(|_| b.next_kind()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_seven_bag_contains_each_family_once() {
        let mut generator = PieceGenerator::new(Randomizer::SevenBag, 99);
        for _ in 0..5 {
            let mut bag: Vec<_> = (0..PieceKind::LEN).map(|_| generator.next_kind()).collect();
            bag.sort_by_key(|kind| kind.id());
            assert_eq!(bag, PieceKind::ALL);
        }
    }

    #[test]
    fn test_uniform_covers_all_families() {
        let mut generator = PieceGenerator::new(Randomizer::Uniform, 5);
        let mut counts = [0usize; PieceKind::LEN];
        for _ in 0..7000 {
            counts[usize::from(generator.next_kind().id()) - 1] += 1;
        }
        // Expected 1000 each; the bounds are loose enough to never flake for
        // a fixed seed.
        assert!(counts.iter().all(|&n| (800..1200).contains(&n)), "{counts:?}");
    }

    #[test]
    fn test_sequence_cycles() {
        let kinds = vec![PieceKind::T, PieceKind::S, PieceKind::Z];
        let mut generator = PieceGenerator::new(Randomizer::Sequence(kinds.clone()), 0);
        let drawn: Vec<_> = (0..7).map(|_| generator.next_kind()).collect();
        assert_eq!(
            drawn,
            [kinds.clone(), kinds, vec![PieceKind::T]].concat()
        );
    }

    #[test]
    fn test_empty_sequence_falls_back_to_uniform() {
        let mut generator = PieceGenerator::new(Randomizer::Sequence(vec![]), 3);
        let mut reference = PieceGenerator::new(Randomizer::Uniform, 3);
        for _ in 0..10 {
            assert_eq!(generator.next_kind(), reference.next_kind());
        }
    }

    #[test]
    fn test_randomizer_serialization() {
        assert_eq!(
            serde_json::to_string(&Randomizer::SevenBag).unwrap(),
            "\"seven-bag\""
        );
        let parsed: Randomizer = serde_json::from_str(r#"{"sequence":["I","O"]}"#).unwrap();
        assert_eq!(
            parsed,
            Randomizer::Sequence(vec![PieceKind::I, PieceKind::O])
        );
        let parsed: Randomizer = serde_json::from_str("\"uniform\"").unwrap();
        assert_eq!(parsed, Randomizer::Uniform);
    }
}
