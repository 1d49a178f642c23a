//! # World Configuration
//!
//! Every knob the generator reads, plus the pass-through values external
//! renderers (water, fog) pick up from the same file.
//!
//! Configs are loaded once at startup from TOML. Missing keys fall back to
//! the documented defaults, so a file may set only what it cares about:
//!
//! ```toml
//! seed = "harbor"
//! island_count = 12
//! max_island_size = 90.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{WorldGenError, WorldGenResult};
use crate::noise::{SeedValue, WorldSeed};

/// Configuration for one generated world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Reproducibility key. Number or string.
    pub seed: SeedValue,
    /// Edge length of the square world, centered on the origin.
    pub world_size: f64,
    /// Samples per axis used by grid consumers (mesh builders, map bakers).
    pub resolution: u32,
    /// Requested island count. `<= 0` is an all-ocean world.
    pub island_count: i32,
    /// Smallest island radius.
    pub min_island_size: f64,
    /// Largest island radius.
    pub max_island_size: f64,
    /// Terrain noise frequency in island-radius units.
    pub noise_frequency: f64,
    /// Terrain fbm octave count.
    pub noise_octaves: u32,
    /// Terrain fbm frequency multiplier per octave.
    pub noise_lacunarity: f64,
    /// Terrain fbm amplitude multiplier per octave.
    pub noise_persistence: f64,
    /// Sea level. Used internally as a color threshold and spawn floor.
    pub water_height: f64,
    /// Wave amplitude for the external water renderer.
    pub wave_height: f64,
    /// Wave speed for the external water renderer.
    pub wave_speed: f64,
    /// Height of a full-strength island peak before its multiplier.
    pub max_terrain_height: f64,
    /// Open-ocean floor height (negative).
    pub ocean_depth: f64,
    /// Fog density for the external renderer.
    pub fog_density: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: SeedValue::default(),
            world_size: 400.0,
            resolution: 256,
            island_count: 8,
            min_island_size: 25.0,
            max_island_size: 70.0,
            noise_frequency: 0.8,
            noise_octaves: 5,
            noise_lacunarity: 2.0,
            noise_persistence: 0.5,
            water_height: 0.0,
            wave_height: 0.6,
            wave_speed: 1.0,
            max_terrain_height: 40.0,
            ocean_depth: -15.0,
            fog_density: 0.0025,
        }
    }
}

impl WorldConfig {
    /// Parses a TOML document, merging it over the defaults, and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldGenError::ConfigParse`] for malformed TOML and
    /// [`WorldGenError::InvalidConfig`] for unusable values.
    pub fn from_toml_str(text: &str) -> WorldGenResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`WorldGenError::Io`] when the file cannot be read, otherwise
    /// the same errors as [`Self::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> WorldGenResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| WorldGenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded world config");
        Ok(config)
    }

    /// Serializes this config as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`WorldGenError::ConfigSerialize`] if serialization fails.
    pub fn to_toml_string(&self) -> WorldGenResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Checks the values generation relies on.
    ///
    /// `island_count <= 0` is valid (ocean-only world).
    ///
    /// # Errors
    ///
    /// Returns [`WorldGenError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> WorldGenResult<()> {
        if !(self.world_size.is_finite() && self.world_size > 0.0) {
            return Err(invalid(format!(
                "world_size must be positive, got {}",
                self.world_size
            )));
        }
        if !(self.min_island_size.is_finite() && self.min_island_size > 0.0) {
            return Err(invalid(format!(
                "min_island_size must be positive, got {}",
                self.min_island_size
            )));
        }
        if !self.max_island_size.is_finite() || self.max_island_size < self.min_island_size {
            return Err(invalid(format!(
                "max_island_size ({}) must be >= min_island_size ({})",
                self.max_island_size, self.min_island_size
            )));
        }
        if self.resolution < 2 {
            return Err(invalid(format!(
                "resolution must be at least 2, got {}",
                self.resolution
            )));
        }
        if self.noise_octaves == 0 {
            return Err(invalid("noise_octaves must be at least 1".to_owned()));
        }
        if !(self.max_terrain_height.is_finite() && self.max_terrain_height > 0.0) {
            return Err(invalid(format!(
                "max_terrain_height must be positive, got {}",
                self.max_terrain_height
            )));
        }
        Ok(())
    }

    /// Half the world edge length. The world spans `[-half, half]` on both axes.
    #[inline]
    #[must_use]
    pub fn half_size(&self) -> f64 {
        self.world_size * 0.5
    }

    /// Mean of the island radius range.
    #[inline]
    #[must_use]
    pub fn average_island_size(&self) -> f64 {
        (self.min_island_size + self.max_island_size) * 0.5
    }

    /// The canonical seed this config resolves to.
    #[must_use]
    pub fn world_seed(&self) -> WorldSeed {
        self.seed.canonicalize()
    }

    /// Returns this config with a different seed.
    #[must_use]
    pub fn with_seed(mut self, seed: impl Into<SeedValue>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Returns this config with a different requested island count.
    #[must_use]
    pub fn with_island_count(mut self, count: i32) -> Self {
        self.island_count = count;
        self
    }

    /// Returns this config with a different world size.
    #[must_use]
    pub fn with_world_size(mut self, size: f64) -> Self {
        self.world_size = size;
        self
    }
}

fn invalid(message: String) -> WorldGenError {
    WorldGenError::InvalidConfig(message)
}
