//! RNG module - deterministic pile dealing
//!
//! Every pile is 2-4 chips drawn uniformly from the colors unlocked so far.
//! A small LCG keeps games reproducible from a seed.

use arrayvec::ArrayVec;

use crate::types::{Color, PILE_MAX_CHIPS, PILE_MIN_CHIPS};

/// A freshly dealt pile, bottom chip first
pub type Pile = ArrayVec<Color, PILE_MAX_CHIPS>;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // A zero state would stay zero forever
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Value in `[0, max)`; a zero `max` is treated as one
    pub fn next_range(&mut self, max: u32) -> u32 {
        // High bits of an LCG are far better distributed than the low ones
        (self.next_u32() >> 8) % max.max(1)
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Deals the piles that refill the player's hand
#[derive(Debug, Clone)]
pub struct PileDealer {
    rng: SimpleRng,
    seed: u32,
}

impl PileDealer {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            seed,
        }
    }

    /// Deal one pile using the first `active_colors` playable colors.
    ///
    /// `active_colors` is clamped to `1..=Color::PLAYABLE.len()`.
    pub fn deal(&mut self, active_colors: u8) -> Pile {
        let palette_len = (active_colors as usize).clamp(1, Color::PLAYABLE.len());
        let palette = &Color::PLAYABLE[..palette_len];

        let span = (PILE_MAX_CHIPS - PILE_MIN_CHIPS + 1) as u32;
        let size = PILE_MIN_CHIPS + self.rng.next_range(span) as usize;

        let mut pile = Pile::new();
        for _ in 0..size {
            let pick = self.rng.next_range(palette.len() as u32) as usize;
            pile.push(palette[pick]);
        }
        pile
    }

    /// Seed the dealer was created with (for restarting the same sequence)
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for PileDealer {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_pile_sizes_and_palette() {
        let mut dealer = PileDealer::new(7);
        for _ in 0..500 {
            let pile = dealer.deal(3);
            assert!((PILE_MIN_CHIPS..=PILE_MAX_CHIPS).contains(&pile.len()));
            for color in &pile {
                assert!(Color::PLAYABLE[..3].contains(color), "{:?} not unlocked", color);
            }
        }
    }

    #[test]
    fn test_every_size_shows_up() {
        let mut dealer = PileDealer::new(99);
        let mut seen = [false; PILE_MAX_CHIPS + 1];
        for _ in 0..200 {
            seen[dealer.deal(6).len()] = true;
        }
        assert!(seen[PILE_MIN_CHIPS..].iter().all(|&s| s));
    }

    #[test]
    fn test_same_seed_same_piles() {
        let mut a = PileDealer::new(42);
        let mut b = PileDealer::new(42);
        for _ in 0..20 {
            assert_eq!(a.deal(4), b.deal(4));
        }
        assert_eq!(a.seed(), 42);
    }
}
