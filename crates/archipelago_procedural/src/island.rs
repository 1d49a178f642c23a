//! # Island Placement
//!
//! Places island centers with grid-accelerated Poisson-disk sampling
//! (Bridson's algorithm), then rolls each island's parameters.
//!
//! ## Draw Order
//!
//! Placement consumes the [`NoiseEngine`] stream in a fixed order. Changing
//! the order changes every world generated from an existing seed:
//!
//! 1. Seed point: x, then z
//! 2. Per iteration: active index, then `angle, distance` per attempt
//! 3. Per island: radius, height multiplier, offset x, offset z, type

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::noise::NoiseEngine;

/// Candidates tried around an active point before it is retired.
pub const POISSON_ATTEMPTS: u32 = 30;

/// Island spacing as a multiple of the average island radius.
pub const SPACING_FACTOR: f64 = 2.5;

/// Fraction of the half-extent kept clear along the world border.
pub const BORDER_MARGIN: f64 = 0.1;

/// Fraction of the half-extent the first Poisson point is drawn from.
const SEED_POINT_EXTENT: f64 = 0.8;

/// Fraction of the half-extent at which edge falloff reaches zero.
const FALLOFF_EXTENT: f64 = 0.85;

/// Height multiplier of a lone, centered island.
const SINGLE_ISLAND_HEIGHT_MULTIPLIER: f64 = 1.5;

/// Biome flavour of an island. Drives its elevation color bands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum IslandType {
    /// Lush green slopes up to snowy peaks (50% of rolls).
    #[default]
    Tropical = 0,
    /// Mossy stone (30% of rolls).
    Rocky = 1,
    /// Dunes over a rock core (20% of rolls).
    Sandy = 2,
}

impl IslandType {
    /// Maps a uniform roll in `[0, 1)` onto the 50/30/20 type weights.
    #[must_use]
    pub fn from_roll(roll: f64) -> Self {
        if roll < 0.5 {
            Self::Tropical
        } else if roll < 0.8 {
            Self::Rocky
        } else {
            Self::Sandy
        }
    }

    /// Lowercase display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tropical => "tropical",
            Self::Rocky => "rocky",
            Self::Sandy => "sandy",
        }
    }
}

/// A placed island. Immutable once generated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Island {
    /// Center X in world units.
    pub x: f64,
    /// Center Z in world units.
    pub z: f64,
    /// Island radius. Terrain influence extends to `1.8 ×` this.
    pub radius: f64,
    /// Peak height scale relative to `max_terrain_height`.
    pub height_multiplier: f64,
    /// Terrain noise offset on X, decorrelating islands from each other.
    pub noise_offset_x: f64,
    /// Terrain noise offset on Z.
    pub noise_offset_z: f64,
    /// `1.0` at the world center, falling to `0.0` toward the border.
    pub edge_falloff: f64,
    /// Biome flavour.
    pub island_type: IslandType,
}

impl Island {
    /// Radius at which the underwater slope meets the open seabed.
    pub const SLOPE_RADIUS_FACTOR: f64 = 1.8;

    /// Radius of this island's full influence, including the underwater slope.
    #[inline]
    #[must_use]
    pub fn slope_radius(&self) -> f64 {
        self.radius * Self::SLOPE_RADIUS_FACTOR
    }

    /// Planar distance from the island center to `(x, z)`.
    #[inline]
    #[must_use]
    pub fn distance_to(&self, x: f64, z: f64) -> f64 {
        let dx = x - self.x;
        let dz = z - self.z;
        libm::sqrt(dx * dx + dz * dz)
    }
}

/// Places islands for one world configuration.
///
/// Holds no random state of its own: every draw goes through the
/// [`NoiseEngine`] passed in, so placement and terrain share one stream.
pub struct IslandPlacer<'a> {
    config: &'a WorldConfig,
}

impl<'a> IslandPlacer<'a> {
    /// Creates a placer for the given configuration.
    #[must_use]
    pub const fn new(config: &'a WorldConfig) -> Self {
        Self { config }
    }

    /// Minimum distance between two island centers.
    #[must_use]
    pub fn spacing(&self) -> f64 {
        self.config.average_island_size() * SPACING_FACTOR
    }

    /// Places the configured islands.
    ///
    /// - `island_count <= 0`: no islands.
    /// - `island_count == 1`: one rocky island at the world center.
    /// - otherwise: up to `island_count` Poisson-disk centers. A world that
    ///   saturates early simply gets fewer islands.
    pub fn place_islands(&self, noise: &mut NoiseEngine) -> Vec<Island> {
        let requested = self.config.island_count;
        if requested <= 0 {
            tracing::debug!(requested, "ocean-only world, no islands placed");
            return Vec::new();
        }
        if requested == 1 {
            return vec![self.centered_island(noise)];
        }

        let spacing = self.spacing();
        let centers = self.poisson_disk(noise, spacing, POISSON_ATTEMPTS);
        let wanted = usize::try_from(requested).unwrap_or(usize::MAX);

        if centers.len() < wanted {
            tracing::debug!(
                requested,
                available = centers.len(),
                spacing,
                "poisson placement saturated below requested island count"
            );
        }

        let mut islands = Vec::with_capacity(wanted.min(centers.len()));
        for &(x, z) in centers.iter().take(wanted) {
            islands.push(self.roll_island(noise, x, z));
        }
        islands
    }

    /// A single island pinned to the origin.
    fn centered_island(&self, noise: &mut NoiseEngine) -> Island {
        let radius = noise.random_range(self.config.min_island_size, self.config.max_island_size);
        Island {
            x: 0.0,
            z: 0.0,
            radius,
            height_multiplier: SINGLE_ISLAND_HEIGHT_MULTIPLIER,
            noise_offset_x: 0.0,
            noise_offset_z: 0.0,
            edge_falloff: 1.0,
            island_type: IslandType::Rocky,
        }
    }

    /// Rolls the per-island parameters for a placed center.
    fn roll_island(&self, noise: &mut NoiseEngine, x: f64, z: f64) -> Island {
        let radius = noise.random_range(self.config.min_island_size, self.config.max_island_size);
        let height_multiplier = noise.random_range(0.7, 1.4);
        let noise_offset_x = noise.random_range(-100.0, 100.0);
        let noise_offset_z = noise.random_range(-100.0, 100.0);
        let island_type = Self::determine_island_type(noise);

        let distance_from_center = libm::sqrt(x * x + z * z);
        let edge_falloff =
            (1.0 - distance_from_center / (self.config.half_size() * FALLOFF_EXTENT)).max(0.0);

        Island {
            x,
            z,
            radius,
            height_multiplier,
            noise_offset_x,
            noise_offset_z,
            edge_falloff,
            island_type,
        }
    }

    /// Weighted island type draw: 50% tropical, 30% rocky, 20% sandy.
    pub fn determine_island_type(noise: &mut NoiseEngine) -> IslandType {
        IslandType::from_roll(noise.random())
    }

    /// Bridson Poisson-disk sampling over the world square minus its border.
    ///
    /// Returns centers in acceptance order. Every pair is at least `spacing`
    /// apart. The grid and active list live only for this call.
    pub fn poisson_disk(
        &self,
        noise: &mut NoiseEngine,
        spacing: f64,
        attempts: u32,
    ) -> Vec<(f64, f64)> {
        let half = self.config.half_size();
        if !(spacing.is_finite() && spacing > 0.0 && half.is_finite() && half > 0.0) {
            return Vec::new();
        }

        let limit = half * (1.0 - BORDER_MARGIN);
        let mut grid = PoissonGrid::new(half, spacing);
        let mut points: Vec<(f64, f64)> = Vec::new();
        let mut active: Vec<usize> = Vec::new();

        let seed_extent = half * SEED_POINT_EXTENT;
        let first = (
            noise.random_range(-seed_extent, seed_extent),
            noise.random_range(-seed_extent, seed_extent),
        );
        grid.insert(first, 0);
        points.push(first);
        active.push(0);

        while !active.is_empty() {
            let pick = noise.random_index(active.len() - 1);
            let (px, pz) = points[active[pick]];
            let mut accepted = false;

            for _ in 0..attempts {
                let angle = noise.random() * TAU;
                let distance = spacing * (1.0 + noise.random());
                let candidate = (
                    px + libm::cos(angle) * distance,
                    pz + libm::sin(angle) * distance,
                );

                if candidate.0.abs() > limit || candidate.1.abs() > limit {
                    continue;
                }
                if grid.has_neighbor_within(candidate, spacing, &points) {
                    continue;
                }

                let index = points.len();
                grid.insert(candidate, index);
                points.push(candidate);
                active.push(index);
                accepted = true;
                break;
            }

            if !accepted {
                active.remove(pick);
            }
        }

        tracing::debug!(points = points.len(), spacing, "poisson disk sampling finished");
        points
    }
}

/// Scratch acceleration grid for Poisson-disk sampling.
///
/// Cell size is `spacing / sqrt(2)`, so a cell holds at most one point.
struct PoissonGrid {
    /// World coordinate of the grid's low corner on both axes.
    origin: f64,
    /// Cell edge length.
    cell_size: f64,
    /// Cells per axis.
    cols: usize,
    /// Point index per cell, row-major.
    cells: Vec<Option<usize>>,
}

impl PoissonGrid {
    /// Neighbourhood radius in cells (5x5 block).
    const REACH: usize = 2;

    fn new(half: f64, spacing: f64) -> Self {
        let cell_size = spacing / std::f64::consts::SQRT_2;
        let cols = ((half * 2.0) / cell_size).ceil().max(1.0) as usize;
        Self {
            origin: -half,
            cell_size,
            cols,
            cells: vec![None; cols * cols],
        }
    }

    /// Cell coordinate of a world position, clamped into the grid.
    #[inline]
    fn cell_of(&self, value: f64) -> usize {
        let cell = ((value - self.origin) / self.cell_size).floor().max(0.0) as usize;
        cell.min(self.cols - 1)
    }

    fn insert(&mut self, point: (f64, f64), index: usize) {
        let col = self.cell_of(point.0);
        let row = self.cell_of(point.1);
        self.cells[row * self.cols + col] = Some(index);
    }

    /// Whether any stored point lies closer than `spacing` to `point`.
    fn has_neighbor_within(&self, point: (f64, f64), spacing: f64, points: &[(f64, f64)]) -> bool {
        let col = self.cell_of(point.0);
        let row = self.cell_of(point.1);
        let min_sq = spacing * spacing;

        let row_range = row.saturating_sub(Self::REACH)..=(row + Self::REACH).min(self.cols - 1);
        for r in row_range {
            let col_range = col.saturating_sub(Self::REACH)..=(col + Self::REACH).min(self.cols - 1);
            for c in col_range {
                if let Some(index) = self.cells[r * self.cols + c] {
                    let (ox, oz) = points[index];
                    let dx = ox - point.0;
                    let dz = oz - point.1;
                    if dx * dx + dz * dz < min_sq {
                        return true;
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(count: i32) -> WorldConfig {
        WorldConfig::default().with_island_count(count)
    }

    #[test]
    fn test_island_type_weights() {
        assert_eq!(IslandType::from_roll(0.0), IslandType::Tropical);
        assert_eq!(IslandType::from_roll(0.4999), IslandType::Tropical);
        assert_eq!(IslandType::from_roll(0.5), IslandType::Rocky);
        assert_eq!(IslandType::from_roll(0.7999), IslandType::Rocky);
        assert_eq!(IslandType::from_roll(0.8), IslandType::Sandy);
        assert_eq!(IslandType::from_roll(0.9999), IslandType::Sandy);
    }

    #[test]
    fn test_island_type_distribution() {
        let mut noise = NoiseEngine::new(2024u32);
        let mut counts = [0u32; 3];
        let rolls: u32 = 20_000;
        for _ in 0..rolls {
            counts[IslandPlacer::determine_island_type(&mut noise) as usize] += 1;
        }

        let share = |n: u32| f64::from(n) / f64::from(rolls);
        assert!((share(counts[0]) - 0.5).abs() < 0.03, "tropical share {}", share(counts[0]));
        assert!((share(counts[1]) - 0.3).abs() < 0.03, "rocky share {}", share(counts[1]));
        assert!((share(counts[2]) - 0.2).abs() < 0.03, "sandy share {}", share(counts[2]));
    }

    #[test]
    fn test_poisson_minimum_spacing() {
        let config = WorldConfig::default().with_world_size(1000.0);
        let placer = IslandPlacer::new(&config);
        let mut noise = NoiseEngine::new(9u32);
        let spacing = 60.0;

        let points = placer.poisson_disk(&mut noise, spacing, POISSON_ATTEMPTS);
        assert!(points.len() > 50, "Expected a dense fill, got {}", points.len());

        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                let d = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
                assert!(d >= spacing - 1e-9, "Points {a:?} and {b:?} only {d} apart");
            }
        }
    }

    #[test]
    fn test_poisson_respects_border() {
        let config = WorldConfig::default();
        let placer = IslandPlacer::new(&config);
        let mut noise = NoiseEngine::new(31u32);
        let limit = config.half_size() * (1.0 - BORDER_MARGIN);

        let points = placer.poisson_disk(&mut noise, 40.0, POISSON_ATTEMPTS);
        for (x, z) in points {
            assert!(x.abs() <= limit && z.abs() <= limit, "({x}, {z}) outside border");
        }
    }

    #[test]
    fn test_poisson_invalid_spacing_is_empty() {
        let config = WorldConfig::default();
        let placer = IslandPlacer::new(&config);
        let mut noise = NoiseEngine::new(1u32);
        assert!(placer.poisson_disk(&mut noise, 0.0, POISSON_ATTEMPTS).is_empty());
        assert!(placer.poisson_disk(&mut noise, f64::NAN, POISSON_ATTEMPTS).is_empty());
    }

    #[test]
    fn test_no_islands_for_non_positive_count() {
        for count in [0, -1, -50] {
            let config = config_with(count);
            let mut noise = NoiseEngine::new(12345u32);
            assert!(IslandPlacer::new(&config).place_islands(&mut noise).is_empty());
        }
    }

    #[test]
    fn test_single_island_is_centered() {
        for seed in 0..20u32 {
            let config = config_with(1);
            let mut noise = NoiseEngine::new(seed);
            let islands = IslandPlacer::new(&config).place_islands(&mut noise);

            assert_eq!(islands.len(), 1);
            let island = islands[0];
            assert_eq!((island.x, island.z), (0.0, 0.0));
            assert_eq!(island.island_type, IslandType::Rocky);
            assert_eq!(island.height_multiplier, 1.5);
            assert_eq!(island.edge_falloff, 1.0);
            assert!((25.0..=70.0).contains(&island.radius));
        }
    }

    #[test]
    fn test_island_parameters_in_range() {
        let config = config_with(8);
        let placer = IslandPlacer::new(&config);
        let mut noise = NoiseEngine::new(12345u32);
        let islands = placer.place_islands(&mut noise);

        assert!(!islands.is_empty() && islands.len() <= 8);
        for island in &islands {
            assert!((25.0..=70.0).contains(&island.radius), "radius {}", island.radius);
            assert!((0.7..=1.4).contains(&island.height_multiplier));
            assert!((-100.0..=100.0).contains(&island.noise_offset_x));
            assert!((-100.0..=100.0).contains(&island.noise_offset_z));
            assert!((0.0..=1.0).contains(&island.edge_falloff));

            let expected = (1.0 - island.distance_to(0.0, 0.0) / (200.0 * 0.85)).max(0.0);
            assert!((island.edge_falloff - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_placement_caps_at_requested_count() {
        let config = WorldConfig::default().with_world_size(2000.0).with_island_count(5);
        let mut noise = NoiseEngine::new(3u32);
        let islands = IslandPlacer::new(&config).place_islands(&mut noise);
        assert_eq!(islands.len(), 5, "A large world should satisfy the full request");
    }

    #[test]
    fn test_saturation_yields_fewer_islands() {
        let config = WorldConfig::default().with_island_count(500);
        let mut noise = NoiseEngine::new(3u32);
        let islands = IslandPlacer::new(&config).place_islands(&mut noise);
        assert!(!islands.is_empty());
        assert!(islands.len() < 500, "400-unit world cannot hold 500 islands");
    }

    #[test]
    fn test_placement_deterministic() {
        let config = config_with(8);
        let mut a = NoiseEngine::new("lagoon");
        let mut b = NoiseEngine::new("lagoon");
        let first = IslandPlacer::new(&config).place_islands(&mut a);
        let second = IslandPlacer::new(&config).place_islands(&mut b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_slope_radius_and_distance() {
        let island = Island {
            x: 3.0,
            z: 4.0,
            radius: 10.0,
            height_multiplier: 1.0,
            noise_offset_x: 0.0,
            noise_offset_z: 0.0,
            edge_falloff: 1.0,
            island_type: IslandType::Sandy,
        };
        assert_eq!(island.slope_radius(), 18.0);
        assert_eq!(island.distance_to(0.0, 0.0), 5.0);
        assert_eq!(island.island_type.name(), "sandy");
    }
}
