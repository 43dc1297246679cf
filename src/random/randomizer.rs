//! The 48-bit linear congruential generator.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::{LazyLock, Mutex};

const MULTIPLIER: i64 = 0x5_DEEC_E66D;
const ADDEND: i64 = 0xB;
const MASK: i64 = (1 << 48) - 1;
const DOUBLE_UNIT: f64 = 1.0 / (1u64 << 53) as f64;
const FLOAT_UNIT: f32 = 1.0 / (1u32 << 24) as f32;

/// Process-wide source for unseeded generators. Created on first use.
static SEEDS: LazyLock<Mutex<StdRng>> = LazyLock::new(|| Mutex::new(StdRng::from_os_rng()));

/// Reproducible pseudo-random number generator.
///
/// The state transition is `seed = (seed * 0x5DEECE66D + 0xB) mod 2^48`,
/// computed with wrapping 64-bit arithmetic. Two generators created with
/// the same seed produce identical sequences for every method, on every
/// platform.
///
/// The generator is not synchronized; each run owns its own instance.
/// It implements [`RngCore`], so the helpers of [`rand::Rng`] are available
/// as well.
///
/// # Examples
///
/// ```
/// use u_paco::random::Randomizer;
///
/// let mut a = Randomizer::new(42);
/// let mut b = Randomizer::new(42);
/// assert_eq!(a.next_int(100), b.next_int(100));
/// assert_eq!(a.next_double(), b.next_double());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Randomizer {
    seed: i64,
    next_next_gaussian: f64,
    have_next_next_gaussian: bool,
}

impl Randomizer {
    /// Creates a generator from an explicit seed.
    pub fn new(seed: i64) -> Self {
        Self {
            seed: initial_scramble(seed),
            next_next_gaussian: 0.0,
            have_next_next_gaussian: false,
        }
    }

    /// Creates a generator whose seed is drawn from a shared,
    /// unreproducible source.
    pub fn from_entropy() -> Self {
        let raw: i64 = {
            let mut seeds = SEEDS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            seeds.random()
        };
        Self {
            seed: raw & MASK,
            next_next_gaussian: 0.0,
            have_next_next_gaussian: false,
        }
    }

    /// Re-seeds the generator and discards any cached Gaussian value.
    pub fn set_seed(&mut self, seed: i64) {
        self.seed = initial_scramble(seed);
        self.have_next_next_gaussian = false;
    }

    /// Advances the state and returns its top `bits` bits.
    #[inline]
    fn next(&mut self, bits: u32) -> i32 {
        self.seed = self.seed.wrapping_mul(MULTIPLIER).wrapping_add(ADDEND) & MASK;
        (self.seed >> (48 - bits)) as i32
    }

    /// Returns a uniformly distributed value in `[0, bound)`.
    ///
    /// Powers of two take the high bits directly. Other bounds use
    /// rejection sampling, so the result carries no modulo bias.
    ///
    /// # Panics
    /// Panics if `bound` is zero or exceeds `i32::MAX`.
    pub fn next_int(&mut self, bound: usize) -> usize {
        assert!(
            bound > 0 && bound <= i32::MAX as usize,
            "bound must be in [1, {}], got {bound}",
            i32::MAX
        );
        let n = bound as i32;

        if n & n.wrapping_neg() == n {
            return ((i64::from(n) * i64::from(self.next(31))) >> 31) as usize;
        }

        loop {
            let bits = self.next(31);
            let val = bits % n;
            if bits.wrapping_sub(val).wrapping_add(n - 1) >= 0 {
                return val as usize;
            }
        }
    }

    /// Returns a uniformly distributed 32-bit signed integer.
    pub fn next_i32(&mut self) -> i32 {
        self.next(32)
    }

    /// Returns a uniformly distributed 64-bit signed integer.
    pub fn next_i64(&mut self) -> i64 {
        let high = i64::from(self.next(32)) << 32;
        high.wrapping_add(i64::from(self.next(32)))
    }

    /// Returns a fair coin flip.
    pub fn next_bool(&mut self) -> bool {
        self.next(1) != 0
    }

    /// Returns a uniformly distributed `f32` in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.next(24) as f32 * FLOAT_UNIT
    }

    /// Returns a uniformly distributed `f64` in `[0, 1)` with 53 random bits.
    pub fn next_double(&mut self) -> f64 {
        let high = i64::from(self.next(26)) << 27;
        (high + i64::from(self.next(27))) as f64 * DOUBLE_UNIT
    }

    /// Returns a standard normal deviate (polar Box-Muller method).
    ///
    /// Each accepted pair of uniforms yields two deviates; the second one
    /// is cached and returned by the following call.
    pub fn next_gaussian(&mut self) -> f64 {
        if self.have_next_next_gaussian {
            self.have_next_next_gaussian = false;
            return self.next_next_gaussian;
        }

        let (v1, v2, s) = loop {
            let v1 = 2.0 * self.next_double() - 1.0;
            let v2 = 2.0 * self.next_double() - 1.0;
            let s = v1 * v1 + v2 * v2;
            if s < 1.0 && s > 0.0 {
                break (v1, v2, s);
            }
        };

        let multiplier = (-2.0 * s.ln() / s).sqrt();
        self.next_next_gaussian = v2 * multiplier;
        self.have_next_next_gaussian = true;
        v1 * multiplier
    }

    /// Shuffles `count` elements of `array` beginning at `start`.
    ///
    /// Positions are taken modulo `array.len()`, so the range may wrap
    /// around the end of the slice. Every position is swapped with one drawn
    /// from the not yet shuffled part of the range (Fisher-Yates), which
    /// makes all orderings of the range equally likely.
    ///
    /// # Panics
    /// Panics if `count` exceeds `array.len()`.
    pub fn shuffle<T>(&mut self, array: &mut [T], start: usize, count: usize) {
        let n = array.len();
        assert!(count <= n, "cannot shuffle {count} elements of a slice of length {n}");
        if count == 0 {
            return;
        }

        let mut i = count;
        while i > 1 {
            let j = (start + self.next_int(i)) % n;
            i -= 1;
            let k = (start + i) % n;
            array.swap(j, k);
        }
    }

    /// Shuffles the whole slice.
    pub fn shuffle_all<T>(&mut self, array: &mut [T]) {
        let n = array.len();
        self.shuffle(array, 0, n);
    }
}

fn initial_scramble(seed: i64) -> i64 {
    (seed ^ MULTIPLIER) & MASK
}

impl RngCore for Randomizer {
    fn next_u32(&mut self) -> u32 {
        self.next(32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_i64() as u64
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
