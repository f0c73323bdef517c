//! # Chunk Buffer Module
//!
//! This module provides the `ChunkBuffer` struct: the dense voxel storage for
//! exactly one chunk plus the flags publication side-channel.
//!
//! ## Storage Layout
//!
//! Voxels are stored in a dense array of `CHUNK_VOLUME` byte-sized blocks,
//! linearized in a fixed index order:
//!
//! ```text
//! index = x + z * CHUNK_SIZE_X + y * CHUNK_SIZE_X * CHUNK_SIZE_Z
//! ```
//!
//! i.e. row-major within a horizontal slab, slabs stacked along Y. This order
//! is an invariant of the whole crate: every reader and writer addresses
//! cells through [`ChunkBuffer::index`], never through its own arithmetic.
//!
//! ## Flags Publication
//!
//! The buffer carries a single `AtomicU8` flags slot next to the voxel array.
//! The generation task that just filled the buffer writes the slot exactly
//! once per pass (`Release`); everyone else only ever reads it (`Acquire`).
//! This gives the streaming facade a lock-free way to observe classification
//! results without copying the buffer or contending on its lock - the voxel
//! array itself is only guaranteed synchronized once the task's completion
//! handle has been observed complete.
//!
//! ## Pooling
//!
//! Buffers are reused across chunk coordinates to avoid per-chunk allocation.
//! [`ChunkBuffer::reset_for`] rebinds a buffer to a new occupant: it clears
//! the flags slot back to `NONE` so no stale classification can leak, and the
//! generator contract (full population of every cell) guarantees the old
//! voxel contents are overwritten before any other flag is published.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::coords::ChunkCoordinate;

use super::block::{Block, BlockType};
use super::flags::ChunkFlags;

/// The extent of a chunk along the X axis, in voxels.
pub const CHUNK_SIZE_X: usize = 16;
/// The extent of a chunk along the Y axis, in voxels.
pub const CHUNK_SIZE_Y: usize = 16;
/// The extent of a chunk along the Z axis, in voxels.
pub const CHUNK_SIZE_Z: usize = 16;
/// The number of voxels in a single horizontal (XZ) slab of a chunk.
pub const CHUNK_PLANE_SIZE: usize = CHUNK_SIZE_X * CHUNK_SIZE_Z;
/// The total number of voxels in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_PLANE_SIZE * CHUNK_SIZE_Y;

/// Owns the dense voxel array for exactly one chunk plus the flags slot.
///
/// A buffer has exactly one writer at a time (the in-flight generation task,
/// which holds the write guard of the owning [`Shared`](crate::shared::Shared)
/// wrapper) and zero readers until that task's completion handle is observed
/// complete. The flags slot is the one exception: it is an atomic publication
/// channel readable at any time, with `NONE` meaning "not classified yet".
pub struct ChunkBuffer {
    /// The chunk coordinate this buffer currently holds data for.
    coordinate: ChunkCoordinate,

    /// The dense voxel array, `CHUNK_VOLUME` cells in the fixed
    /// linearization order.
    voxels: Box<[Block]>,

    /// The classification flags publication slot. Written exactly once per
    /// generation pass by the task that filled `voxels`.
    flags: AtomicU8,
}

impl ChunkBuffer {
    /// Allocates a fresh, all-air, unclassified buffer for `coordinate`.
    pub fn new(coordinate: ChunkCoordinate) -> Self {
        ChunkBuffer {
            coordinate,
            voxels: bytemuck::zeroed_slice_box(CHUNK_VOLUME),
            flags: AtomicU8::new(ChunkFlags::NONE.bits()),
        }
    }

    /// Rebinds a pooled buffer to a new occupant coordinate.
    ///
    /// Clears the flags slot back to `NONE` so the previous occupant's
    /// classification is invalidated before any read can observe it. The old
    /// voxel contents are left in place: the generation backend contract
    /// requires every cell to be overwritten before new flags are published.
    pub fn reset_for(&mut self, coordinate: ChunkCoordinate) {
        self.coordinate = coordinate;
        self.flags
            .store(ChunkFlags::NONE.bits(), Ordering::Release);
    }

    /// The chunk coordinate this buffer currently holds data for.
    pub fn coordinate(&self) -> ChunkCoordinate {
        self.coordinate
    }

    /// Computes the linear index of the cell at chunk-relative (x,y,z).
    ///
    /// This is the only place the linearization formula lives.
    ///
    /// # Panics
    /// Panics in debug builds if any coordinate is out of bounds.
    #[inline]
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < CHUNK_SIZE_X && y < CHUNK_SIZE_Y && z < CHUNK_SIZE_Z);
        x + z * CHUNK_SIZE_X + y * CHUNK_PLANE_SIZE
    }

    /// Gets the block at chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn block_at(&self, x: usize, y: usize, z: usize) -> Block {
        self.voxels[Self::index(x, y, z)]
    }

    /// Sets the block at chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        self.voxels[Self::index(x, y, z)] = Block::new(block_type);
    }

    /// Read-only view of the dense voxel array in linearization order.
    pub fn voxels(&self) -> &[Block] {
        &self.voxels
    }

    /// Mutable view of the dense voxel array, for generation backends.
    pub fn voxels_mut(&mut self) -> &mut [Block] {
        &mut self.voxels
    }

    /// Publishes classification flags through the side-channel.
    ///
    /// Called exactly once per generation pass, after the voxel array is
    /// fully populated. The `Release` store pairs with the `Acquire` load in
    /// [`flags`](Self::flags) so a reader that sees the new flags also sees
    /// the classification they were derived from.
    pub fn publish_flags(&self, flags: ChunkFlags) {
        self.flags.store(flags.bits(), Ordering::Release);
    }

    /// Reads the most recently published classification flags.
    ///
    /// `ChunkFlags::NONE` means the current occupant has not been classified;
    /// callers must not optimize based on flags in that case.
    pub fn flags(&self) -> ChunkFlags {
        ChunkFlags::from_bits(self.flags.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;
    use std::collections::HashSet;

    #[test]
    fn linearization_is_injective_over_the_full_volume() {
        let mut seen = HashSet::new();
        for y in 0..CHUNK_SIZE_Y {
            for z in 0..CHUNK_SIZE_Z {
                for x in 0..CHUNK_SIZE_X {
                    let index = ChunkBuffer::index(x, y, z);
                    assert!(index < CHUNK_VOLUME);
                    assert!(seen.insert(index), "index {index} aliased");
                }
            }
        }
        assert_eq!(seen.len(), CHUNK_VOLUME);
    }

    #[test]
    fn fresh_buffer_is_all_air_and_unclassified() {
        let buffer = ChunkBuffer::new(Point3::new(0, 0, 0));
        assert_eq!(buffer.flags(), ChunkFlags::NONE);
        assert!(buffer.voxels().iter().all(|block| !block.is_solid()));
    }

    #[test]
    fn block_round_trip_through_index_formula() {
        let mut buffer = ChunkBuffer::new(Point3::new(0, 0, 0));
        buffer.set_block(3, 7, 11, BlockType::Stone);
        assert_eq!(buffer.block_at(3, 7, 11).block_type(), BlockType::Stone);
        assert_eq!(
            buffer.voxels()[3 + 11 * CHUNK_SIZE_X + 7 * CHUNK_PLANE_SIZE].block_type(),
            BlockType::Stone
        );
    }

    #[test]
    fn reset_clears_flags_and_rebinds_coordinate() {
        let mut buffer = ChunkBuffer::new(Point3::new(0, 0, 0));
        buffer.publish_flags(ChunkFlags::SOLID | ChunkFlags::AIR);
        buffer.reset_for(Point3::new(5, -2, 1));
        assert_eq!(buffer.flags(), ChunkFlags::NONE);
        assert_eq!(buffer.coordinate(), Point3::new(5, -2, 1));
    }

    #[test]
    fn published_flags_read_back() {
        let buffer = ChunkBuffer::new(Point3::new(1, 2, 3));
        buffer.publish_flags(ChunkFlags::SOLID | ChunkFlags::SOLID_XZ_PLANE);
        assert_eq!(
            buffer.flags(),
            ChunkFlags::SOLID | ChunkFlags::SOLID_XZ_PLANE
        );
    }
}
