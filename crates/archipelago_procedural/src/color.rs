//! # Elevation Color Bands
//!
//! Stateless mapping from a terrain height to a vertex color.
//!
//! Bands, in evaluation order:
//!
//! | Band | Range |
//! |------|-------|
//! | Deep floor | below 60% of the way from sea level to `ocean_depth`, flat at the floor itself |
//! | Underwater slope | up to `water_height - 1.5`, blue to sand |
//! | Wet sand | up to `water_height + 0.5`, drying toward the beach |
//! | Beach to vegetation | up to `water_height + 3.0` |
//! | Island type bands | keyed on normalized height |

use bytemuck::{Pod, Zeroable};

use crate::island::IslandType;

/// Linear RGB color, components in `[0, 1]`.
///
/// `#[repr(C)]` and `Pod`, so a `&[Rgb]` can be uploaded as a vertex color
/// buffer with `bytemuck::cast_slice`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Rgb {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
}

impl Rgb {
    /// Creates a color from components.
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation towards `other`, `t` clamped to `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0) as f32;
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// Components as an array.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Quantized 8-bit components.
    #[must_use]
    pub fn to_rgb8(self) -> [u8; 3] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }
}

// Sea floor
const DEEP_FLOOR: Rgb = Rgb::new(0.10, 0.16, 0.26);
const SLOPE_BLUE: Rgb = Rgb::new(0.16, 0.32, 0.45);
const SUBMERGED_SAND: Rgb = Rgb::new(0.58, 0.53, 0.38);
const WET_SAND: Rgb = Rgb::new(0.72, 0.64, 0.46);
const DRY_SAND: Rgb = Rgb::new(0.90, 0.83, 0.62);

// Tropical
const JUNGLE_GREEN: Rgb = Rgb::new(0.24, 0.62, 0.22);
const DARK_GREEN: Rgb = Rgb::new(0.10, 0.38, 0.12);
const ROCK_GRAY: Rgb = Rgb::new(0.45, 0.43, 0.40);
const LIGHT_GRAY: Rgb = Rgb::new(0.68, 0.67, 0.65);
const SNOW: Rgb = Rgb::new(0.96, 0.97, 0.98);

// Rocky
const MOSS: Rgb = Rgb::new(0.36, 0.45, 0.25);
const STONE_GRAY: Rgb = Rgb::new(0.46, 0.46, 0.46);
const LIGHT_ROCK: Rgb = Rgb::new(0.70, 0.68, 0.64);

// Sandy
const DUNE_SAND: Rgb = Rgb::new(0.86, 0.76, 0.52);
const DARK_SAND: Rgb = Rgb::new(0.70, 0.58, 0.38);
const SANDSTONE: Rgb = Rgb::new(0.55, 0.47, 0.38);

/// Share of the sea-level-to-floor depth below which the deep floor band starts.
const DEEP_FLOOR_SHARE: f64 = 0.6;
const SLOPE_TOP_BELOW_WATER: f64 = 1.5;
const WET_SAND_ABOVE_WATER: f64 = 0.5;
const BEACH_TOP_ABOVE_WATER: f64 = 3.0;

/// Normalized height used by the island-type bands: `max(0, h) / max_terrain_height`.
#[inline]
#[must_use]
pub fn normalized_height(height: f64, max_terrain_height: f64) -> f64 {
    if max_terrain_height > 0.0 {
        height.max(0.0) / max_terrain_height
    } else {
        0.0
    }
}

/// Maps a terrain height to its color.
///
/// # Arguments
///
/// * `height` - Terrain height
/// * `normalized_height` - See [`normalized_height`]
/// * `island_type` - Type of the nearest island
/// * `water_height` - Sea level
/// * `ocean_depth` - Open-ocean floor height
#[must_use]
pub fn color_at(
    height: f64,
    normalized_height: f64,
    island_type: IslandType,
    water_height: f64,
    ocean_depth: f64,
) -> Rgb {
    let deep_limit = water_height + (ocean_depth - water_height) * DEEP_FLOOR_SHARE;
    let slope_top = water_height - SLOPE_TOP_BELOW_WATER;
    let wet_top = water_height + WET_SAND_ABOVE_WATER;
    let beach_top = water_height + BEACH_TOP_ABOVE_WATER;

    if height < deep_limit {
        DEEP_FLOOR.lerp(SLOPE_BLUE, inverse_lerp(ocean_depth, deep_limit, height))
    } else if height < slope_top {
        SLOPE_BLUE.lerp(SUBMERGED_SAND, inverse_lerp(deep_limit, slope_top, height))
    } else if height < water_height {
        SUBMERGED_SAND.lerp(WET_SAND, inverse_lerp(slope_top, water_height, height))
    } else if height < wet_top {
        // Wet sand dries out toward the beach
        WET_SAND.lerp(DRY_SAND, inverse_lerp(water_height, wet_top, height))
    } else if height < beach_top {
        let vegetation = elevation_band(island_type, normalized_height);
        DRY_SAND.lerp(vegetation, inverse_lerp(wet_top, beach_top, height))
    } else {
        elevation_band(island_type, normalized_height)
    }
}

/// Per-type color above the beach.
fn elevation_band(island_type: IslandType, n: f64) -> Rgb {
    match island_type {
        IslandType::Tropical => {
            if n < 0.35 {
                JUNGLE_GREEN.lerp(DARK_GREEN, n / 0.35)
            } else if n < 0.6 {
                DARK_GREEN.lerp(ROCK_GRAY, (n - 0.35) / 0.25)
            } else if n < 0.8 {
                ROCK_GRAY.lerp(LIGHT_GRAY, (n - 0.6) / 0.2)
            } else {
                LIGHT_GRAY.lerp(SNOW, (n - 0.8) / 0.2)
            }
        }
        IslandType::Rocky => {
            if n < 0.4 {
                MOSS.lerp(STONE_GRAY, n / 0.4)
            } else {
                STONE_GRAY.lerp(LIGHT_ROCK, (n - 0.4) / 0.6)
            }
        }
        IslandType::Sandy => {
            if n < 0.45 {
                DUNE_SAND.lerp(DARK_SAND, n / 0.45)
            } else {
                DARK_SAND.lerp(SANDSTONE, (n - 0.45) / 0.55)
            }
        }
    }
}

#[inline]
fn inverse_lerp(from: f64, to: f64, value: f64) -> f64 {
    let span = to - from;
    if span.abs() < f64::EPSILON {
        1.0
    } else {
        ((value - from) / span).clamp(0.0, 1.0)
    }
}
