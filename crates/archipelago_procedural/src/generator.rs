//! # World Generator
//!
//! Ties the noise stream, island placement and height synthesis together.
//!
//! ## Lifecycle
//!
//! ```text
//! new(config) ──► generate() ──► height_at / color_at / islands / ... (any number, any thread)
//!                    ▲    │
//!                    └────┘ reseed(seed) then generate() again
//! ```
//!
//! `generate` and `reseed` take `&mut self`; every read takes `&self`. The
//! borrow checker therefore enforces the single-writer, many-reader contract.

use serde::{Deserialize, Serialize};

use crate::color::{self, Rgb};
use crate::config::WorldConfig;
use crate::island::{Island, IslandPlacer, IslandType};
use crate::noise::{NoiseEngine, SeedValue};
use crate::terrain::{self, TerrainSample};

/// Spawn height above terrain.
const SPAWN_CLEARANCE: f64 = 2.0;
/// Minimum spawn height above sea level.
const SPAWN_MIN_ABOVE_WATER: f64 = 10.0;
/// Spawn height in an island-less world.
const OPEN_OCEAN_SPAWN_HEIGHT: f64 = 50.0;

/// Player or ship spawn point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPosition {
    /// World X.
    pub x: f64,
    /// Height.
    pub y: f64,
    /// World Z.
    pub z: f64,
}

/// Island counts for a generated world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldStats {
    /// Total islands placed.
    pub island_count: usize,
    /// Tropical islands.
    pub tropical: usize,
    /// Rocky islands.
    pub rocky: usize,
    /// Sandy islands.
    pub sandy: usize,
}

/// A `resolution × resolution` lattice of heights and colors over the world.
///
/// Row-major with Z as the outer axis: sample `(ix, iz)` lives at
/// `iz * resolution + ix` and sits at world position
/// `(-half + ix * step, -half + iz * step)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    /// Samples per axis.
    pub resolution: usize,
    /// Edge length covered by the lattice.
    pub world_size: f64,
    /// Terrain heights.
    pub heights: Vec<f32>,
    /// Vertex colors, parallel to `heights`.
    pub colors: Vec<Rgb>,
    /// Lowest sampled height.
    pub min_height: f32,
    /// Highest sampled height.
    pub max_height: f32,
}

impl Heightfield {
    /// World distance between neighbouring samples.
    #[must_use]
    pub fn step(&self) -> f64 {
        if self.resolution > 1 {
            self.world_size / (self.resolution - 1) as f64
        } else {
            0.0
        }
    }

    /// Flat index of `(ix, iz)`, or `None` outside the lattice.
    #[inline]
    #[must_use]
    pub fn index(&self, ix: usize, iz: usize) -> Option<usize> {
        (ix < self.resolution && iz < self.resolution).then(|| iz * self.resolution + ix)
    }

    /// Height at lattice coordinates.
    #[must_use]
    pub fn height(&self, ix: usize, iz: usize) -> Option<f32> {
        self.index(ix, iz).map(|i| self.heights[i])
    }

    /// World position of lattice coordinates.
    #[must_use]
    pub fn world_position(&self, ix: usize, iz: usize) -> (f64, f64) {
        let half = self.world_size * 0.5;
        let step = self.step();
        (-half + ix as f64 * step, -half + iz as f64 * step)
    }
}

/// Deterministic archipelago generator.
///
/// # Example
///
/// ```rust
/// use archipelago_procedural::{WorldConfig, WorldGenerator};
///
/// let mut world = WorldGenerator::new(WorldConfig::default());
/// world.generate();
///
/// let islands = world.islands();
/// assert!(!islands.is_empty());
///
/// let peak = world.height_at(islands[0].x, islands[0].z);
/// assert!(peak > world.config().ocean_depth);
/// ```
#[derive(Clone, Debug)]
pub struct WorldGenerator {
    config: WorldConfig,
    noise: NoiseEngine,
    islands: Vec<Island>,
    generated: bool,
}

impl WorldGenerator {
    /// Creates a generator. No islands exist until [`Self::generate`].
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        let noise = NoiseEngine::new(config.seed.clone());
        Self {
            config,
            noise,
            islands: Vec::new(),
            generated: false,
        }
    }

    /// Builds the island set from the current config and seed.
    ///
    /// The stream is rewound first, so calling this twice yields the same world.
    pub fn generate(&mut self) -> &mut Self {
        self.noise.reset();
        self.islands = IslandPlacer::new(&self.config).place_islands(&mut self.noise);
        self.generated = true;

        tracing::info!(
            seed = self.noise.seed().value(),
            islands = self.islands.len(),
            requested = self.config.island_count,
            "archipelago generated"
        );
        self
    }

    /// Switches to a new seed. Existing islands are dropped; call
    /// [`Self::generate`] to build the new world.
    pub fn reseed(&mut self, seed: impl Into<SeedValue>) {
        let seed = seed.into();
        self.noise.reseed(seed.clone());
        self.config.seed = seed;
        self.islands.clear();
        self.generated = false;
    }

    /// Rewinds the random stream and drops the island set.
    pub fn reset(&mut self) {
        self.noise.reset();
        self.islands.clear();
        self.generated = false;
    }

    /// Terrain height at `(x, z)`. Coordinates are not clamped.
    #[must_use]
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        self.sample(x, z).height
    }

    /// Alias of [`Self::height_at`].
    #[inline]
    #[must_use]
    pub fn sample_height(&self, x: f64, z: f64) -> f64 {
        self.height_at(x, z)
    }

    /// Height plus the nearest island data at `(x, z)`.
    #[must_use]
    pub fn sample(&self, x: f64, z: f64) -> TerrainSample {
        terrain::sample_terrain(&self.noise, &self.islands, &self.config, x, z)
    }

    /// Vertex color at `(x, z)`, using the nearest island's type.
    #[must_use]
    pub fn color_at(&self, x: f64, z: f64) -> Rgb {
        let sample = self.sample(x, z);
        self.color_for(&sample)
    }

    fn color_for(&self, sample: &TerrainSample) -> Rgb {
        color::color_at(
            sample.height,
            color::normalized_height(sample.height, self.config.max_terrain_height),
            sample.closest_type.unwrap_or_default(),
            self.config.water_height,
            self.config.ocean_depth,
        )
    }

    /// Snapshot of the placed islands.
    #[must_use]
    pub fn islands(&self) -> Vec<Island> {
        self.islands.clone()
    }

    /// Island whose center is nearest to `(x, z)`.
    #[must_use]
    pub fn nearest_island(&self, x: f64, z: f64) -> Option<&Island> {
        self.islands
            .iter()
            .min_by(|a, b| a.distance_to(x, z).total_cmp(&b.distance_to(x, z)))
    }

    /// Spawn point above the first island, or high over the origin in an
    /// ocean-only world.
    #[must_use]
    pub fn spawn_position(&self) -> SpawnPosition {
        match self.islands.first() {
            Some(island) => {
                let ground = self.height_at(island.x, island.z);
                SpawnPosition {
                    x: island.x,
                    y: (ground + SPAWN_CLEARANCE)
                        .max(self.config.water_height + SPAWN_MIN_ABOVE_WATER),
                    z: island.z,
                }
            }
            None => SpawnPosition {
                x: 0.0,
                y: OPEN_OCEAN_SPAWN_HEIGHT,
                z: 0.0,
            },
        }
    }

    /// Samples the configured `resolution × resolution` lattice.
    #[must_use]
    pub fn sample_grid(&self) -> Heightfield {
        let resolution = self.config.resolution.max(2) as usize;
        let half = self.config.half_size();
        let step = self.config.world_size / (resolution - 1) as f64;

        let mut heights = Vec::with_capacity(resolution * resolution);
        let mut colors = Vec::with_capacity(resolution * resolution);
        let mut min_height = f32::INFINITY;
        let mut max_height = f32::NEG_INFINITY;

        for iz in 0..resolution {
            let z = -half + iz as f64 * step;
            for ix in 0..resolution {
                let x = -half + ix as f64 * step;
                let sample = self.sample(x, z);
                let height = sample.height as f32;

                min_height = min_height.min(height);
                max_height = max_height.max(height);
                heights.push(height);
                colors.push(self.color_for(&sample));
            }
        }

        tracing::debug!(resolution, min_height, max_height, "heightfield sampled");

        Heightfield {
            resolution,
            world_size: self.config.world_size,
            heights,
            colors,
            min_height,
            max_height,
        }
    }

    /// Island counts by type.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats {
            island_count: self.islands.len(),
            ..WorldStats::default()
        };
        for island in &self.islands {
            match island.island_type {
                IslandType::Tropical => stats.tropical += 1,
                IslandType::Rocky => stats.rocky += 1,
                IslandType::Sandy => stats.sandy += 1,
            }
        }
        stats
    }

    /// Whether [`Self::generate`] has run since construction or the last reseed.
    #[inline]
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.generated
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The noise engine terrain is sampled from.
    #[inline]
    #[must_use]
    pub const fn noise(&self) -> &NoiseEngine {
        &self.noise
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(config: WorldConfig) -> WorldGenerator {
        let mut world = WorldGenerator::new(config);
        world.generate();
        world
    }

    #[test]
    fn test_new_has_no_islands() {
        let world = WorldGenerator::new(WorldConfig::default());
        assert!(!world.is_generated());
        assert!(world.islands().is_empty());
    }

    #[test]
    fn test_generate_is_repeatable() {
        let mut world = WorldGenerator::new(WorldConfig::default());
        let first = world.generate().islands();
        let second = world.generate().islands();
        assert_eq!(first, second, "Regenerating must not advance the stream");
        assert!(world.is_generated());
    }

    #[test]
    fn test_reseed_clears_islands() {
        let mut world = generated(WorldConfig::default());
        world.reseed("lagoon");

        assert!(!world.is_generated());
        assert!(world.islands().is_empty());
        assert_eq!(world.config().seed, SeedValue::Text("lagoon".to_owned()));
        assert_eq!(world.noise().seed(), world.config().world_seed());
    }

    #[test]
    fn test_reset_drops_islands() {
        let mut world = generated(WorldConfig::default());
        world.reset();
        assert!(!world.is_generated());
        assert!(world.islands().is_empty());
    }

    #[test]
    fn test_sample_height_alias() {
        let world = generated(WorldConfig::default());
        for i in 0..50 {
            let x = f64::from(i) * 7.3 - 180.0;
            let z = f64::from(i) * -5.1 + 90.0;
            assert_eq!(world.sample_height(x, z), world.height_at(x, z));
        }
    }

    #[test]
    fn test_islands_is_a_snapshot() {
        let world = generated(WorldConfig::default());
        let mut copy = world.islands();
        copy.clear();
        assert!(!world.islands().is_empty());
    }

    #[test]
    fn test_spawn_over_first_island() {
        let world = generated(WorldConfig::default());
        let first = world.islands()[0];
        let spawn = world.spawn_position();

        assert_eq!((spawn.x, spawn.z), (first.x, first.z));
        assert!(spawn.y >= world.config().water_height + SPAWN_MIN_ABOVE_WATER);
        assert!(spawn.y >= world.height_at(first.x, first.z) + SPAWN_CLEARANCE - 1e-9);
    }

    #[test]
    fn test_spawn_in_open_ocean() {
        let world = generated(WorldConfig::default().with_island_count(0));
        assert_eq!(
            world.spawn_position(),
            SpawnPosition {
                x: 0.0,
                y: 50.0,
                z: 0.0
            }
        );
    }

    #[test]
    fn test_nearest_island() {
        let world = generated(WorldConfig::default());
        let islands = world.islands();

        for island in &islands {
            let nearest = world
                .nearest_island(island.x + 0.5, island.z - 0.5)
                .expect("world has islands");
            assert_eq!(nearest, island);
        }

        let ocean = generated(WorldConfig::default().with_island_count(0));
        assert!(ocean.nearest_island(0.0, 0.0).is_none());
    }

    #[test]
    fn test_stats_count_types() {
        let world = generated(WorldConfig::default().with_island_count(20));
        let stats = world.stats();

        assert_eq!(stats.island_count, world.islands().len());
        assert_eq!(stats.tropical + stats.rocky + stats.sandy, stats.island_count);

        let single = generated(WorldConfig::default().with_island_count(1)).stats();
        assert_eq!(
            single,
            WorldStats {
                island_count: 1,
                tropical: 0,
                rocky: 1,
                sandy: 0
            }
        );
    }

    #[test]
    fn test_sample_grid_layout() {
        let config = WorldConfig {
            resolution: 33,
            ..WorldConfig::default()
        };
        let world = generated(config);
        let grid = world.sample_grid();

        assert_eq!(grid.heights.len(), 33 * 33);
        assert_eq!(grid.colors.len(), grid.heights.len());
        assert_eq!(grid.world_position(0, 0), (-200.0, -200.0));
        assert!((grid.world_position(32, 32).0 - 200.0).abs() < 1e-9);
        assert!(grid.index(33, 0).is_none());

        for (iz, ix) in [(0, 0), (5, 17), (32, 9)] {
            let (x, z) = grid.world_position(ix, iz);
            let expected = world.height_at(x, z) as f32;
            assert_eq!(grid.height(ix, iz), Some(expected));
            assert_eq!(grid.colors[iz * 33 + ix], world.color_at(x, z));
        }

        let min = grid.heights.iter().copied().fold(f32::INFINITY, f32::min);
        let max = grid.heights.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(grid.min_height, min);
        assert_eq!(grid.max_height, max);
    }

    #[test]
    fn test_generator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WorldGenerator>();
    }

    #[test]
    fn test_concurrent_readers_agree() {
        let world = generated(WorldConfig::default());
        let points: Vec<(f64, f64)> = (0..200)
            .map(|i| (f64::from(i) * 1.9 - 190.0, f64::from(i) * -1.3 + 130.0))
            .collect();
        let expected: Vec<f64> = points.iter().map(|&(x, z)| world.height_at(x, z)).collect();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let heights: Vec<f64> =
                        points.iter().map(|&(x, z)| world.height_at(x, z)).collect();
                    assert_eq!(heights, expected);
                });
            }
        });
    }
}
