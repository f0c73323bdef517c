//! # Sine-Wave Terrain Generator
//!
//! The reference generation backend: terrain height at each (x,z) column is
//! driven by two sine waves over world-space x and z. It is cheap, fully
//! deterministic, and its closed-form height function makes it the backend of
//! choice for exercising the streaming pipeline in tests.

use std::f64::consts::TAU;

use cgmath::Point3;
use serde::Deserialize;

use crate::coords::{
    chunk_to_base_voxel, max_chunk_line, voxel_to_world, ChunkCoordinate,
    MAX_VISIBLE_CHUNKS_VERTICAL,
};
use crate::voxels::block::{Block, BlockType};
use crate::voxels::chunk::{ChunkBuffer, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};

use super::{ChunkGenerator, GenerationConfigError};

/// Configuration for [`SineWaveGenerator`].
///
/// Loadable from JSON; every field has a default, so `{}` is a valid
/// document. Validation happens once, at generator construction.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SineWaveConfig {
    /// World-space period of both sine waves. Must be positive and finite.
    pub wavelength: f64,

    /// Height contribution of each wave at its peak. Must be finite.
    pub amplitude: f64,

    /// World-space height the waves oscillate around. Must be finite.
    pub vertical_offset: f64,

    /// The solid block type emitted below the terrain surface.
    pub terrain_block: BlockType,
}

impl Default for SineWaveConfig {
    fn default() -> Self {
        // The default surface sits halfway up the vertical visible range so
        // terrain stays on screen for any chunk line the deployment can show.
        let visible_line = max_chunk_line(MAX_VISIBLE_CHUNKS_VERTICAL);
        SineWaveConfig {
            wavelength: 64.0,
            amplitude: CHUNK_SIZE_Y as f64 / 4.0,
            vertical_offset: (visible_line as usize * CHUNK_SIZE_Y) as f64 / 2.0,
            terrain_block: BlockType::Grass,
        }
    }
}

/// A deterministic procedural terrain backend built from two sine waves.
///
/// For every (x,z) column the generator computes two phases from world-space
/// x and z scaled by the wavelength, combines them into a column height, and
/// fills the column with the terrain block below that height and air above
/// it. Regenerating a coordinate always reproduces the same voxels.
pub struct SineWaveGenerator {
    wavelength: f64,
    amplitude: f64,
    vertical_offset: f64,
    terrain_block: BlockType,
}

impl SineWaveGenerator {
    /// Constructs a generator from a validated configuration.
    ///
    /// # Errors
    /// Returns a [`GenerationConfigError`] if the wavelength is not positive
    /// and finite, if the amplitude or vertical offset is not finite, or if
    /// the terrain block is air. Construction is the only failure point:
    /// generation itself is infallible.
    pub fn new(config: SineWaveConfig) -> Result<Self, GenerationConfigError> {
        if !config.wavelength.is_finite() || config.wavelength <= 0.0 {
            return Err(GenerationConfigError::InvalidWavelength(config.wavelength));
        }
        if !config.amplitude.is_finite() {
            return Err(GenerationConfigError::NonFiniteParameter {
                name: "amplitude",
                value: config.amplitude,
            });
        }
        if !config.vertical_offset.is_finite() {
            return Err(GenerationConfigError::NonFiniteParameter {
                name: "vertical_offset",
                value: config.vertical_offset,
            });
        }
        if config.terrain_block == BlockType::Air {
            return Err(GenerationConfigError::AirTerrainBlock);
        }
        Ok(SineWaveGenerator {
            wavelength: config.wavelength,
            amplitude: config.amplitude,
            vertical_offset: config.vertical_offset,
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

    /// The terrain height above the column at world-space (x,z).
    ///
    /// Exposed so consumers can cross-check generated contents against the
    /// closed-form surface.
    pub fn column_height(&self, world_x: f64, world_z: f64) -> f64 {
        let phase_x = world_x * TAU / self.wavelength;
        let phase_z = world_z * TAU / self.wavelength;
        self.vertical_offset + self.amplitude * (phase_x.sin() + phase_z.sin())
    }
}

impl ChunkGenerator for SineWaveGenerator {
    fn generate(&self, coordinate: ChunkCoordinate, voxels: &mut [Block]) {
        let base = chunk_to_base_voxel(coordinate);
        let terrain = Block::new(self.terrain_block);

        for z in 0..CHUNK_SIZE_Z {
            for x in 0..CHUNK_SIZE_X {
                let column = voxel_to_world(Point3::new(
                    base.x + x as i32,
                    base.y,
                    base.z + z as i32,
                ));
                let height = self.column_height(column.x, column.z);

                for y in 0..CHUNK_SIZE_Y {
                    let world_y =
                        voxel_to_world(Point3::new(base.x, base.y + y as i32, base.z)).y;
                    voxels[ChunkBuffer::index(x, y, z)] = if world_y < height {
                        terrain
                    } else {
                        Block::AIR
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_wavelength() {
        let config = SineWaveConfig {
            wavelength: 0.0,
            ..SineWaveConfig::default()
        };
        assert!(matches!(
            SineWaveGenerator::new(config),
            Err(GenerationConfigError::InvalidWavelength(_))
        ));
    }

    #[test]
    fn rejects_nan_amplitude() {
        let config = SineWaveConfig {
            amplitude: f64::NAN,
            ..SineWaveConfig::default()
        };
        assert!(matches!(
            SineWaveGenerator::new(config),
            Err(GenerationConfigError::NonFiniteParameter { name: "amplitude", .. })
        ));
    }

    #[test]
    fn rejects_air_terrain_block() {
        let config = SineWaveConfig {
            terrain_block: BlockType::Air,
            ..SineWaveConfig::default()
        };
        assert!(matches!(
            SineWaveGenerator::new(config),
            Err(GenerationConfigError::AirTerrainBlock)
        ));
    }

    #[test]
    fn loads_from_json_with_defaults() {
        let generator = SineWaveGenerator::from_json("{}").unwrap();
        assert_eq!(generator.wavelength, SineWaveConfig::default().wavelength);

        let generator =
            SineWaveGenerator::from_json(r#"{ "wavelength": 32.0, "terrain_block": "Stone" }"#)
                .unwrap();
        assert_eq!(generator.wavelength, 32.0);
        assert_eq!(generator.terrain_block, BlockType::Stone);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            SineWaveGenerator::from_json(r#"{ "wavelength": "wide" }"#),
            Err(GenerationConfigError::Malformed(_))
        ));
    }

    #[test]
    fn regenerating_a_coordinate_reproduces_the_same_voxels() {
        let generator = SineWaveGenerator::new(SineWaveConfig::default()).unwrap();
        let coordinate = Point3::new(3, 1, -2);

        let mut first = ChunkBuffer::new(coordinate);
        let mut second = ChunkBuffer::new(coordinate);
        generator.generate(coordinate, first.voxels_mut());
        generator.generate(coordinate, second.voxels_mut());

        assert_eq!(first.voxels(), second.voxels());
    }

    #[test]
    fn columns_are_solid_below_the_height_function_and_air_above() {
        // Chunk (0,0,0) with wavelength 64: column (8,8) has both phases at
        // TAU/8, so the surface sits at offset + 2 * amplitude * sin(TAU/8).
        let generator = SineWaveGenerator::new(SineWaveConfig {
            wavelength: 64.0,
            amplitude: 4.0,
            vertical_offset: 8.0,
            terrain_block: BlockType::Grass,
        })
        .unwrap();
        let coordinate = Point3::new(0, 0, 0);
        let mut buffer = ChunkBuffer::new(coordinate);
        generator.generate(coordinate, buffer.voxels_mut());

        let height = generator.column_height(8.0, 8.0);
        let expected = 8.0 + 4.0 * 2.0 * (TAU / 8.0).sin();
        assert!((height - expected).abs() < 1e-9);

        for y in 0..CHUNK_SIZE_Y {
            let solid = buffer.block_at(8, y, 8).is_solid();
            assert_eq!(
                solid,
                (y as f64) < height,
                "column (8,8) disagrees with the height function at y={y}"
            );
        }
    }
}
