#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streaming
//!
//! A streaming core for effectively infinite voxel worlds: chunks are
//! generated on demand on a worker-thread pool, classified, and published to
//! consumers through completion handles and a lock-free per-chunk flags
//! channel.
//!
//! ## Key Modules
//!
//! * `coords` - conversions between chunk, voxel, and world coordinates
//! * `voxels` - the chunk buffer, block types, flags, and the classifier
//! * `generation` - pluggable generation backends (sine-wave and Perlin)
//! * `scheduler` - the worker pool that runs generation jobs
//! * `streaming` - the facade tying the pieces together
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use cgmath::Point3;
//! use voxel_streaming::{ChunkStreamer, SineWaveGenerator};
//! use voxel_streaming::generation::SineWaveConfig;
//!
//! let generator = Arc::new(SineWaveGenerator::new(SineWaveConfig::default()).unwrap());
//! let mut streamer = ChunkStreamer::new(generator, 4);
//!
//! let handle = streamer.request_chunk(Point3::new(0, 0, 0), true);
//! handle.wait();
//! streamer.update();
//!
//! let flags = streamer.flags(Point3::new(0, 0, 0)).unwrap();
//! println!("chunk classified as {flags:?}");
//! ```
//!
//! ## Concurrency Model
//!
//! Each chunk buffer has exactly one writer at a time - the in-flight
//! generation task - and zero readers until that task's completion handle is
//! observed complete. Within one task, generation happens-before
//! classification happens-before flag publication happens-before the handle
//! signal. Across chunks no ordering is guaranteed; chunks complete
//! independently and in any order.

pub mod coords;
pub mod generation;
pub mod scheduler;
pub mod shared;
pub mod streaming;
pub mod voxels;

pub use coords::{ChunkCoordinate, VoxelPosition, WorldPosition};
pub use generation::{ChunkGenerator, GenerationConfigError, PerlinGenerator, SineWaveGenerator};
pub use scheduler::handle::CompletionHandle;
pub use shared::Shared;
pub use streaming::{ChunkState, ChunkStreamer};
pub use voxels::block::{Block, BlockType};
pub use voxels::chunk::ChunkBuffer;
pub use voxels::classify::classify;
pub use voxels::flags::ChunkFlags;
