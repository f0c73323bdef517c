//! # Perlin Noise Terrain Generator
//!
//! The production-style generation backend: 3D Perlin noise sampled at scaled
//! world coordinates, with a configurable band of noise values treated as
//! air. The result resembles natural terrain with caves and overhangs.

use cgmath::Point3;
use noise::{NoiseFn, Perlin};
use serde::Deserialize;

use crate::coords::{chunk_to_base_voxel, voxel_to_world, ChunkCoordinate};
use crate::voxels::block::{Block, BlockType};
use crate::voxels::chunk::{ChunkBuffer, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};

use super::{ChunkGenerator, GenerationConfigError};

/// Configuration for [`PerlinGenerator`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerlinConfig {
    /// Seed of the underlying noise function. The seed is the only source of
    /// variation between deployments; a fixed seed makes output reproducible.
    pub seed: u32,

    /// Scaling factor applied to world coordinates before sampling.
    /// Must be positive and finite.
    pub scale: f64,

    /// Noise values in `[negative_threshold, positive_threshold]` become
    /// air; everything outside the band becomes terrain.
    pub negative_threshold: f64,

    /// Upper edge of the air band. Must not be below `negative_threshold`.
    pub positive_threshold: f64,

    /// The solid block type emitted for terrain cells.
    pub terrain_block: BlockType,
}

impl Default for PerlinConfig {
    fn default() -> Self {
        PerlinConfig {
            seed: 0,
            scale: 0.02,
            negative_threshold: -0.2,
            positive_threshold: 0.2,
            terrain_block: BlockType::Stone,
        }
    }
}

/// A seeded 3D Perlin noise terrain backend.
///
/// Deterministic: the noise function is fully determined by the seed, so
/// regenerating a coordinate always reproduces the same voxels.
pub struct PerlinGenerator {
    perlin: Perlin,
    scale: f64,
    negative_threshold: f64,
    positive_threshold: f64,
    terrain_block: BlockType,
}

impl PerlinGenerator {
    /// Constructs a generator from a validated configuration.
    ///
    /// # Errors
    /// Returns a [`GenerationConfigError`] if the scale is not positive and
    /// finite, the thresholds are non-finite or inverted, or the terrain
    /// block is air.
    pub fn new(config: PerlinConfig) -> Result<Self, GenerationConfigError> {
        if !config.scale.is_finite() || config.scale <= 0.0 {
            return Err(GenerationConfigError::InvalidNoiseScale(config.scale));
        }
        for (name, value) in [
            ("negative_threshold", config.negative_threshold),
            ("positive_threshold", config.positive_threshold),
        ] {
            if !value.is_finite() {
                return Err(GenerationConfigError::NonFiniteParameter { name, value });
            }
        }
        if config.negative_threshold > config.positive_threshold {
            return Err(GenerationConfigError::InvertedThresholds {
                negative: config.negative_threshold,
                positive: config.positive_threshold,
            });
        }
        if config.terrain_block == BlockType::Air {
            return Err(GenerationConfigError::AirTerrainBlock);
        }
        Ok(PerlinGenerator {
            perlin: Perlin::new(config.seed),
            scale: config.scale,
            negative_threshold: config.negative_threshold,
            positive_threshold: config.positive_threshold,
            terrain_block: config.terrain_block,
        })
    }

    /// Constructs a generator from a JSON configuration document.
    ///
    /// # Errors
    /// Returns a [`GenerationConfigError`] if the document does not parse or
    /// fails validation.
    pub fn from_json(json: &str) -> Result<Self, GenerationConfigError> {
        Self::new(serde_json::from_str(json)?)
    }

    fn sample_point(&self, world: Point3<f64>) -> [f64; 3] {
        [
            world.x * self.scale,
            world.y * self.scale,
            world.z * self.scale,
        ]
    }
}

impl ChunkGenerator for PerlinGenerator {
    fn generate(&self, coordinate: ChunkCoordinate, voxels: &mut [Block]) {
        let base = chunk_to_base_voxel(coordinate);
        let terrain = Block::new(self.terrain_block);

        for y in 0..CHUNK_SIZE_Y {
            for z in 0..CHUNK_SIZE_Z {
                for x in 0..CHUNK_SIZE_X {
                    let world = voxel_to_world(Point3::new(
                        base.x + x as i32,
                        base.y + y as i32,
                        base.z + z as i32,
                    ));
                    let sample = self.perlin.get(self.sample_point(world));
                    let in_air_band =
                        (self.negative_threshold..=self.positive_threshold).contains(&sample);
                    voxels[ChunkBuffer::index(x, y, z)] =
                        if in_air_band { Block::AIR } else { terrain };
                }
            }
        }
    }
}
