//! # Height Field Synthesis
//!
//! Pure functions turning an island set and a noise engine into a height at
//! any `(x, z)`. Nothing here mutates state, so any number of threads may
//! sample the same world at once.
//!
//! ## Island Profile
//!
//! Distance from an island center is normalized against its slope radius
//! (`1.8 × radius`) into `t`, then shaped by three bands:
//!
//! ```text
//!  factor
//!   1.00 |‾‾‾‾‾‾‾‾‾‾\
//!        |           \__            beach: 1 - ((t-0.4)/0.3)^0.7 * 0.85
//!   0.15 |              ‾‾--__      slope: 0.15 * (1 - ((t-0.7)/0.3)^0.5)
//!   0.00 +---------+------+-----‾‾-
//!        0        0.4    0.7     1.0   t
//! ```
//!
//! Only the island with the largest blend `1 - t` shapes a point; heights
//! are never summed across islands.

use crate::config::WorldConfig;
use crate::island::{Island, IslandType};
use crate::noise::NoiseEngine;

/// End of the flat interior band.
pub const INTERIOR_BAND_END: f64 = 0.4;
/// End of the beach band; the underwater slope follows.
pub const BEACH_BAND_END: f64 = 0.7;
/// Islands whose factor falls below this contribute nothing.
pub const MIN_ELEVATION_FACTOR: f64 = 0.01;
/// Below this blend the open-seabed texture is layered on.
pub const SEABED_BLEND_CUTOFF: f64 = 0.5;

/// Height lost across the beach band.
const BEACH_DROP: f64 = 0.85;
const BEACH_EXPONENT: f64 = 0.7;
/// Factor at the top of the underwater slope.
const SLOPE_SHELF: f64 = 0.15;
const SLOPE_EXPONENT: f64 = 0.5;

/// Micro-detail noise on the shoreline, `0.25 < t < 0.7`.
const DETAIL_BAND_START: f64 = 0.25;
const DETAIL_FREQUENCY: f64 = 4.0;
const DETAIL_AMPLITUDE: f64 = 1.0;

const SEABED_FREQUENCY: f64 = 0.02;
const SEABED_OCTAVES: u32 = 3;
const SEABED_AMPLITUDE: f64 = 3.0;

/// Result of sampling the height field at one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainSample {
    /// Final terrain height.
    pub height: f64,
    /// Index of the nearest island center, regardless of reach.
    pub closest_island: Option<usize>,
    /// Type of the nearest island.
    pub closest_type: Option<IslandType>,
    /// Index of the island shaping the height, `None` in open ocean.
    pub dominant_island: Option<usize>,
    /// Blend factor of the dominant island, `0.0` in open ocean.
    pub highest_blend: f64,
}

/// Piecewise island elevation profile over normalized distance `t`.
///
/// Continuous everywhere: `1.0` up to `t = 0.4`, `0.15` at `t = 0.7`,
/// `0.0` at `t = 1.0`.
#[must_use]
pub fn elevation_factor(t: f64) -> f64 {
    if t < INTERIOR_BAND_END {
        1.0
    } else if t < BEACH_BAND_END {
        let progress = (t - INTERIOR_BAND_END) / (BEACH_BAND_END - INTERIOR_BAND_END);
        1.0 - libm::pow(progress, BEACH_EXPONENT) * BEACH_DROP
    } else {
        let progress = ((t - BEACH_BAND_END) / (1.0 - BEACH_BAND_END)).min(1.0);
        SLOPE_SHELF * (1.0 - libm::pow(progress, SLOPE_EXPONENT))
    }
}

/// Cubic Hermite smoothstep `b²(3 - 2b)`.
#[inline]
#[must_use]
pub fn smoothstep(b: f64) -> f64 {
    b * b * (3.0 - 2.0 * b)
}

/// Height an island would give a point at normalized distance `t`,
/// before blending with the ocean floor.
#[must_use]
pub fn island_height(
    noise: &NoiseEngine,
    island: &Island,
    config: &WorldConfig,
    x: f64,
    z: f64,
    t: f64,
) -> f64 {
    let factor = elevation_factor(t);

    let nx = (x + island.noise_offset_x) / island.radius * config.noise_frequency;
    let nz = (z + island.noise_offset_z) / island.radius * config.noise_frequency;

    let terrain = noise.fbm(
        nx,
        nz,
        config.noise_octaves,
        config.noise_lacunarity,
        config.noise_persistence,
    );
    let raw = (terrain + 1.0) * 0.5;

    let detail = if t > DETAIL_BAND_START && t < BEACH_BAND_END {
        noise.noise2d(nx * DETAIL_FREQUENCY, nz * DETAIL_FREQUENCY) * DETAIL_AMPLITUDE
    } else {
        0.0
    };

    (raw * config.max_terrain_height * island.height_multiplier + detail) * factor
}

/// Samples the height field at `(x, z)`.
///
/// Coordinates are not clamped; points outside the world simply fall into
/// open ocean.
#[must_use]
pub fn sample_terrain(
    noise: &NoiseEngine,
    islands: &[Island],
    config: &WorldConfig,
    x: f64,
    z: f64,
) -> TerrainSample {
    let mut height = config.ocean_depth;
    let mut highest_blend = 0.0;
    let mut dominant = None;
    let mut closest: Option<(usize, f64)> = None;

    for (index, island) in islands.iter().enumerate() {
        let distance = island.distance_to(x, z);
        if closest.map_or(true, |(_, best)| distance < best) {
            closest = Some((index, distance));
        }

        let slope_radius = island.slope_radius();
        if distance > slope_radius {
            continue;
        }

        let t = distance / slope_radius;
        if elevation_factor(t) < MIN_ELEVATION_FACTOR {
            continue;
        }

        // Closest-island-dominant: first island wins ties
        let blend = (1.0 - t).max(0.0);
        if blend <= highest_blend {
            continue;
        }
        highest_blend = blend;
        dominant = Some(index);

        let raised = island_height(noise, island, config, x, z, t);
        height = config.ocean_depth + (raised - config.ocean_depth) * smoothstep(blend);
    }

    if highest_blend < SEABED_BLEND_CUTOFF {
        let seabed = noise.fbm(
            x * SEABED_FREQUENCY,
            z * SEABED_FREQUENCY,
            SEABED_OCTAVES,
            2.0,
            0.5,
        );
        height += seabed * SEABED_AMPLITUDE * (1.0 - highest_blend);
    }

    let closest_island = closest.map(|(index, _)| index);
    TerrainSample {
        height,
        closest_island,
        closest_type: closest_island.map(|index| islands[index].island_type),
        dominant_island: dominant,
        highest_blend,
    }
}
