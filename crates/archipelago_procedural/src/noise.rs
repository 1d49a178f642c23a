//! # Noise Engine
//!
//! Seeded gradient noise and the random stream that drives island placement.
//!
//! ## Determinism Guarantee
//!
//! Given the same seed, the engine produces **exactly** the same permutation
//! table, the same sequence of random draws and the same noise values on any
//! platform. The random stream is consumed in a fixed order:
//!
//! 1. 255 draws for the Fisher-Yates shuffle of the permutation table
//! 2. Island placement draws (see [`crate::island`])
//!
//! Noise sampling itself never touches the stream, so sampling is `&self`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seed used when a numeric seed is not a finite number.
pub const DEFAULT_SEED: u32 = 12345;

/// FNV-1a 32-bit offset basis.
const FNV_OFFSET: u32 = 0x811C_9DC5;
/// FNV-1a 32-bit prime.
const FNV_PRIME: u32 = 0x0100_0193;

/// Canonical world seed.
///
/// All procedural generation derives from this value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u32);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Hashes a text seed with FNV-1a over its UTF-8 bytes.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let hash = text.bytes().fold(FNV_OFFSET, |hash, byte| {
            (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
        });
        Self(hash)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(DEFAULT_SEED)
    }
}

/// A seed as supplied by a caller or a config file: a number or a string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedValue {
    /// Numeric seed. Floored and wrapped into `u32`.
    Number(f64),
    /// Text seed. Hashed into `u32`.
    Text(String),
}

impl SeedValue {
    /// Reduces this seed to its canonical `u32` form.
    ///
    /// Non-finite numbers fall back to [`DEFAULT_SEED`]. Finite numbers are
    /// floored and taken modulo 2^32, so `-1` becomes `0xFFFF_FFFF`.
    #[must_use]
    pub fn canonicalize(&self) -> WorldSeed {
        match self {
            Self::Number(value) if value.is_finite() => {
                let wrapped = value.floor().rem_euclid(4_294_967_296.0);
                WorldSeed::new(wrapped as u32)
            }
            Self::Number(_) => WorldSeed::default(),
            Self::Text(text) => WorldSeed::from_text(text),
        }
    }
}

impl Default for SeedValue {
    fn default() -> Self {
        Self::Number(f64::from(DEFAULT_SEED))
    }
}

impl From<u32> for SeedValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for SeedValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<f64> for SeedValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for SeedValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SeedValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<WorldSeed> for SeedValue {
    fn from(seed: WorldSeed) -> Self {
        Self::from(seed.value())
    }
}

/// Pre-computed permutation table for noise.
///
/// Rebuilt from the random stream on every reseed.
#[derive(Clone)]
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
}

impl PermutationTable {
    /// 8 gradient directions for 2D gradient noise.
    const GRADIENTS: [[i8; 2]; 8] = [
        [1, 1], [-1, 1], [1, -1], [-1, -1],
        [1, 0], [-1, 0], [0, 1], [0, -1],
    ];

    /// Doubles a shuffled 256-entry permutation.
    fn from_shuffled(values: &[u8; 256]) -> Self {
        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(values);
        perm[256..].copy_from_slice(values);
        Self { perm }
    }

    /// Gets a permutation value (with automatic wrapping).
    #[inline]
    fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }

    /// Dot product of the offset with the gradient picked by `hash & 7`.
    #[inline]
    fn gradient(hash: usize, x: f64, y: f64) -> f64 {
        let grad = Self::GRADIENTS[hash & 7];
        x * f64::from(grad[0]) + y * f64::from(grad[1])
    }
}

/// Seeded noise and randomness primitives.
///
/// # Example
///
/// ```rust
/// use archipelago_procedural::NoiseEngine;
///
/// let mut engine = NoiseEngine::new(42u32);
///
/// let value = engine.noise2d(10.5, 20.25);
/// assert!((-1.5..=1.5).contains(&value));
///
/// let roll = engine.random();
/// assert!((0.0..1.0).contains(&roll));
/// ```
#[derive(Clone)]
pub struct NoiseEngine {
    /// Canonical seed the stream was built from.
    seed: WorldSeed,
    /// Random stream shared by the shuffle and island placement.
    rng: ChaCha8Rng,
    /// Gradient lookup table.
    perm_table: PermutationTable,
}

impl NoiseEngine {
    /// Creates an engine from any seed form.
    #[must_use]
    pub fn new(seed: impl Into<SeedValue>) -> Self {
        let seed = seed.into().canonicalize();
        let mut engine = Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(u64::from(seed.value())),
            perm_table: PermutationTable::from_shuffled(&[0; 256]),
        };
        engine.reset();
        engine
    }

    /// Switches to a new seed and rebuilds the stream and permutation table.
    pub fn reseed(&mut self, seed: impl Into<SeedValue>) {
        self.seed = seed.into().canonicalize();
        tracing::debug!(seed = self.seed.value(), "noise engine reseeded");
        self.reset();
    }

    /// Rewinds the stream to the start of the current seed.
    ///
    /// Re-runs the permutation shuffle, so the stream is left exactly where a
    /// freshly constructed engine leaves it.
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(u64::from(self.seed.value()));

        let mut values = [0u8; 256];
        for (value, index) in values.iter_mut().zip(0u8..=255) {
            *value = index;
        }

        // Fisher-Yates shuffle driven by the shared stream
        for i in (1..256usize).rev() {
            let j = self.random_index(i);
            values.swap(i, j);
        }

        self.perm_table = PermutationTable::from_shuffled(&values);
    }

    /// Returns the canonical seed.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Next draw from the stream, in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform draw in `[min, max)`.
    #[inline]
    pub fn random_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.random() * (max - min)
    }

    /// Uniform integer draw in `[min, max]` (inclusive).
    ///
    /// Returns `min` when the range is empty.
    pub fn random_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = i64::from(max) - i64::from(min) + 1;
        let offset = (self.random() * span as f64).floor() as i64;
        // offset < span, so the sum stays within [min, max]
        (i64::from(min) + offset.min(span - 1)) as i32
    }

    /// Uniform index draw in `[0, max]`, the `usize` form of [`Self::random_int`].
    pub fn random_index(&mut self, max: usize) -> usize {
        let offset = (self.random() * (max + 1) as f64).floor() as usize;
        offset.min(max)
    }

    /// Samples 2D gradient noise at the given coordinates.
    ///
    /// Returns a value roughly in `[-1, 1]`; exactly `0.0` on integer lattice points.
    #[must_use]
    pub fn noise2d(&self, x: f64, y: f64) -> f64 {
        let x_floor = x.floor();
        let y_floor = y.floor();

        // Lattice cell, wrapped into the table
        let xi = (x_floor as i64 & 255) as usize;
        let yi = (y_floor as i64 & 255) as usize;

        let fx = x - x_floor;
        let fy = y - y_floor;

        let u = fade(fx);
        let v = fade(fy);

        let a = self.perm_table.get(xi) + yi;
        let b = self.perm_table.get(xi + 1) + yi;

        let aa = self.perm_table.get(a);
        let ab = self.perm_table.get(a + 1);
        let ba = self.perm_table.get(b);
        let bb = self.perm_table.get(b + 1);

        let bottom = lerp(
            u,
            PermutationTable::gradient(aa, fx, fy),
            PermutationTable::gradient(ba, fx - 1.0, fy),
        );
        let top = lerp(
            u,
            PermutationTable::gradient(ab, fx, fy - 1.0),
            PermutationTable::gradient(bb, fx - 1.0, fy - 1.0),
        );

        lerp(v, bottom, top)
    }

    /// Generates fractal Brownian motion.
    ///
    /// Combines multiple layers of noise at different frequencies
    /// to create more natural-looking terrain.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Coordinates
    /// * `octaves` - Number of noise layers (typically 4-8)
    /// * `lacunarity` - Frequency increase per octave (typically 2.0)
    /// * `persistence` - Amplitude decay per octave (typically 0.5)
    ///
    /// # Returns
    ///
    /// A value in the same range as [`Self::noise2d`], independent of the
    /// octave count. Zero octaves yield `0.0`.
    #[must_use]
    pub fn fbm(&self, x: f64, y: f64, octaves: u32, lacunarity: f64, persistence: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.noise2d(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }

    /// Generates ridged noise (good for mountain spines).
    ///
    /// Each octave's signal is `(1 - |noise|)^2`, weighted by the previous
    /// octave's signal so ridges sharpen where earlier octaves already peaked.
    /// Output lies in `[0, 1]`.
    #[must_use]
    pub fn ridged_noise(
        &self,
        x: f64,
        y: f64,
        octaves: u32,
        lacunarity: f64,
        persistence: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;
        let mut weight = 1.0;

        for _ in 0..octaves {
            let noise = self.noise2d(x * frequency, y * frequency);
            let ridge = 1.0 - noise.abs();
            let signal = ridge * ridge * weight;
            weight = signal.clamp(0.0, 1.0);

            total += signal * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }
}

impl std::fmt::Debug for NoiseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseEngine")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

/// Smootherstep fade curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}
