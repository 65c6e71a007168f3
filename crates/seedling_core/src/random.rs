//! Injectable randomness.
//!
//! Flavor text, reflection lights and heart gifts are all picked through
//! [`RandomSource`]. Production uses the thread RNG; tests pin outcomes with
//! [`SeededRandom`] or [`FixedRandom`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. `len` is never zero.
    fn pick_index(&self, len: usize) -> usize;

    /// Uniform sample in `[0, 1)`.
    fn roll(&self) -> f64;
}

/// Pick one element uniformly; `None` only for an empty slice.
pub fn choose<'a, T>(random: &dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(random.pick_index(items.len()).min(items.len() - 1))
}

/// `true` with probability `p`.
pub fn chance(random: &dyn RandomSource, p: f64) -> bool {
    random.roll() < p
}

/// Unseeded generator backed by `rand::thread_rng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn roll(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible generator for demos and tests.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..len)
    }

    fn roll(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen::<f64>()
    }
}

/// Always returns the same index (clamped to the pool) and the same roll.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom {
    pub index: usize,
    pub roll: f64,
}

impl FixedRandom {
    /// First element of every pool, and chance events never fire.
    pub fn quiet() -> Self {
        Self { index: 0, roll: 1.0 }
    }

    /// First element of every pool, and chance events always fire.
    pub fn lucky() -> Self {
        Self { index: 0, roll: 0.0 }
    }
}

impl RandomSource for FixedRandom {
    fn pick_index(&self, len: usize) -> usize {
        self.index.min(len.saturating_sub(1))
    }

    fn roll(&self) -> f64 {
        self.roll
    }
}
