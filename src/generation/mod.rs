//! # Generation Backends
//!
//! This module defines the pluggable chunk generation strategy and the
//! backends shipped with the crate:
//!
//! * [`SineWaveGenerator`] - the deterministic test backend, terrain height
//!   driven by two sine waves over world-space x and z
//! * [`PerlinGenerator`] - the production-style backend, solid where 3D
//!   Perlin noise falls outside a configured band
//!
//! ## Backend Contract
//!
//! A backend fills every voxel of a chunk buffer as a pure function of the
//! chunk coordinate and its own construction-time parameters. No hidden
//! mutable state may influence the output: regenerating the same coordinate
//! must always reproduce the same voxels. Partial population is a contract
//! violation, because buffer pooling relies on every cell being overwritten
//! before new flags are published.
//!
//! ## Error Handling
//!
//! Per-chunk generation is infallible. The one failure mode a backend has is
//! malformed configuration, reported once at construction as a
//! [`GenerationConfigError`] - never per chunk.

use thiserror::Error;

use crate::coords::ChunkCoordinate;
use crate::voxels::block::Block;

mod perlin;
mod sine;
pub mod task;

pub use perlin::{PerlinConfig, PerlinGenerator};
pub use sine::{SineWaveConfig, SineWaveGenerator};
pub use task::{schedule_generation, schedule_generation_after, GenerationTask};

/// A pluggable chunk generation strategy.
///
/// Implementations must be deterministic (see the module docs) and must
/// populate every cell of `voxels`, which is always exactly
/// [`CHUNK_VOLUME`](crate::voxels::chunk::CHUNK_VOLUME) cells in the fixed
/// linearization order.
pub trait ChunkGenerator: Send + Sync {
    /// Fills `voxels` with the chunk contents for `coordinate`.
    fn generate(&self, coordinate: ChunkCoordinate, voxels: &mut [Block]);
}

/// An error in a generation backend's configuration.
///
/// Raised once at backend construction; a successfully constructed backend
/// never fails for any coordinate.
#[derive(Debug, Error)]
pub enum GenerationConfigError {
    /// The terrain wavelength was zero, negative, or not finite.
    #[error("wavelength must be positive and finite, got {0}")]
    InvalidWavelength(f64),

    /// The noise sampling scale was zero, negative, or not finite.
    #[error("noise scale must be positive and finite, got {0}")]
    InvalidNoiseScale(f64),

    /// A floating-point parameter was NaN or infinite.
    #[error("{name} must be finite, got {value}")]
    NonFiniteParameter {
        /// The configuration field that failed validation.
        name: &'static str,
        /// The offending value.
        value: f64,
    },

    /// The noise thresholds do not form a valid band.
    #[error("noise thresholds are inverted: negative {negative} > positive {positive}")]
    InvertedThresholds {
        /// The lower edge of the configured band.
        negative: f64,
        /// The upper edge of the configured band.
        positive: f64,
    },

    /// The configured terrain block type was air.
    #[error("the terrain block type must be solid, got air")]
    AirTerrainBlock,

    /// The configuration document could not be parsed.
    #[error("malformed generator configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}
