//! RNG module - piece generation for the lookahead slot
//!
//! Two strategies are available:
//! - **Uniform**: every draw picks one of the seven kinds independently.
//! - **SevenBag**: each bag holds one of every kind, shuffled, and is drawn
//!   until empty before a new bag is made.
//!
//! Both run on a seeded LCG so that the same seed replays the same game.

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // High bits of an LCG are far better distributed than the low ones.
        ((self.next_u32() >> 16) * max) >> 16
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Current generator state
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// How new pieces are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Randomizer {
    #[default]
    Uniform,
    SevenBag,
}

impl Randomizer {
    /// Parse from a config value (`uniform`, `bag`/`7bag`).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "uniform" | "random" => Some(Randomizer::Uniform),
            "bag" | "7bag" | "seven-bag" => Some(Randomizer::SevenBag),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Randomizer::Uniform => "uniform",
            Randomizer::SevenBag => "bag",
        }
    }
}

/// Seeded piece source.
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    randomizer: Randomizer,
    rng: SimpleRng,
    /// Current bag (SevenBag only)
    bag: [PieceKind; 7],
    /// Index into current bag; 7 means empty
    bag_index: usize,
}

impl PieceGenerator {
    /// Create a new generator with the given seed
    pub fn new(seed: u32, randomizer: Randomizer) -> Self {
        Self {
            randomizer,
            rng: SimpleRng::new(seed),
            bag: PieceKind::ALL,
            bag_index: PieceKind::ALL.len(),
        }
    }

    /// Generate a new shuffled bag
    fn refill_bag(&mut self) {
        self.bag = PieceKind::ALL;
        self.rng.shuffle(&mut self.bag);
        self.bag_index = 0;
    }

    /// Draw the next piece
    pub fn draw(&mut self) -> PieceKind {
        match self.randomizer {
            Randomizer::Uniform => {
                let idx = self.rng.next_range(PieceKind::ALL.len() as u32) as usize;
                PieceKind::ALL[idx]
            }
            Randomizer::SevenBag => {
                if self.bag_index >= self.bag.len() {
                    self.refill_bag();
                }
                let piece = self.bag[self.bag_index];
                self.bag_index += 1;
                piece
            }
        }
    }

    /// Seed for a follow-up session: the live generator state, so a restart
    /// gets a fresh but reproducible sequence
    pub fn next_seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::new(1, Randomizer::Uniform)
    }
}
