//! # ARCHIPELAGO Procedural Generation
//!
//! Deterministic island worlds from a seed and a configuration.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and config always produce the same archipelago
//! 2. **One-shot**: Islands are built once by `generate()`
//! 3. **Read-only sampling**: Heights and colors are pure reads, safe from any thread
//! 4. **Continuous**: Island-to-ocean transitions are smooth-curve blended
//!
//! ## Core Components
//!
//! - `NoiseEngine`: Seeded random stream, gradient noise, fbm, ridged noise
//! - `IslandPlacer`: Poisson-disk island centers and per-island parameters
//! - `terrain`: Height synthesis over the island set
//! - `color`: Elevation color bands
//! - `WorldGenerator`: The public sampling API
//!
//! ## Example
//!
//! ```rust
//! use archipelago_procedural::{WorldConfig, WorldGenerator};
//!
//! let config = WorldConfig::default().with_seed("tortuga");
//! let mut world = WorldGenerator::new(config);
//! world.generate();
//!
//! let spawn = world.spawn_position();
//! assert!(spawn.y >= world.config().water_height + 10.0);
//!
//! let ground = world.height_at(spawn.x, spawn.z);
//! let paint = world.color_at(spawn.x, spawn.z);
//! assert!(ground.is_finite() && paint.r >= 0.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod color;
pub mod config;
pub mod error;
pub mod generator;
pub mod island;
pub mod noise;
pub mod terrain;

pub use color::{color_at, Rgb};
pub use config::WorldConfig;
pub use error::{WorldGenError, WorldGenResult};
pub use generator::{Heightfield, SpawnPosition, WorldGenerator, WorldStats};
pub use island::{Island, IslandPlacer, IslandType};
pub use noise::{NoiseEngine, SeedValue, WorldSeed, DEFAULT_SEED};
pub use terrain::TerrainSample;
