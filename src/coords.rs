//! # Coordinate System
//!
//! This module provides the pure conversions between the three coordinate
//! spaces the streaming core works in:
//!
//! * **Chunk coordinates** - discrete grid positions identifying one chunk
//! * **Voxel coordinates** - positions in the unbounded voxel grid
//! * **World coordinates** - floating-point positions used for generation math
//!
//! All functions here are stateless and deterministic: the same input always
//! produces the same output, which is what makes chunk generation
//! reproducible.

use cgmath::Point3;

use crate::voxels::chunk::{CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};

/// A discrete 3D grid coordinate identifying one chunk.
///
/// Equality and hashing are structural (`Point3<i32>` derives both), so no
/// two distinct coordinate values can alias the same chunk.
pub type ChunkCoordinate = Point3<i32>;

/// A position in the unbounded voxel-space grid.
pub type VoxelPosition = Point3<i32>;

/// A floating-point position in world space, used only as generator input.
pub type WorldPosition = Point3<f64>;

/// The world-space edge length of a single voxel.
pub const VOXEL_EDGE_LENGTH: f64 = 1.0;

/// The maximum vertical visible range, in chunks, either side of the origin.
///
/// This is a deployment constant: it sizes generator parameters (e.g. the
/// default vertical offset of the sine-wave terrain) rather than any runtime
/// data structure.
pub const MAX_VISIBLE_CHUNKS_VERTICAL: u32 = 4;

/// Converts a chunk coordinate to the voxel position of its minimum corner.
///
/// This is an exact affine scale by the chunk extents; composing it with a
/// flooring division by the same extents recovers the chunk coordinate.
///
/// # Arguments
/// * `chunk` - The chunk coordinate to convert
///
/// # Returns
/// The voxel position of the chunk's (0,0,0) cell.
pub fn chunk_to_base_voxel(chunk: ChunkCoordinate) -> VoxelPosition {
    Point3::new(
        chunk.x * CHUNK_SIZE_X as i32,
        chunk.y * CHUNK_SIZE_Y as i32,
        chunk.z * CHUNK_SIZE_Z as i32,
    )
}

/// Converts a voxel position to the chunk coordinate that contains it.
///
/// This is the lossy inverse of [`chunk_to_base_voxel`]: it floors toward
/// negative infinity so that voxels with negative coordinates land in the
/// correct chunk.
pub fn voxel_to_chunk(voxel: VoxelPosition) -> ChunkCoordinate {
    Point3::new(
        voxel.x.div_euclid(CHUNK_SIZE_X as i32),
        voxel.y.div_euclid(CHUNK_SIZE_Y as i32),
        voxel.z.div_euclid(CHUNK_SIZE_Z as i32),
    )
}

/// Converts a voxel position to its world-space position.
///
/// Used only for generation math (noise and height-function inputs). The
/// mapping is deterministic: the same voxel position always yields the same
/// world position.
pub fn voxel_to_world(voxel: VoxelPosition) -> WorldPosition {
    Point3::new(
        voxel.x as f64 * VOXEL_EDGE_LENGTH,
        voxel.y as f64 * VOXEL_EDGE_LENGTH,
        voxel.z as f64 * VOXEL_EDGE_LENGTH,
    )
}

/// Returns the maximum number of chunks spanning the visible range along one
/// axis: the center chunk plus `visible_range_in_chunks` on each side.
///
/// Pure arithmetic with no error cases; used to size generation parameters
/// such as the vertical offset of a terrain generator.
pub fn max_chunk_line(visible_range_in_chunks: u32) -> u32 {
    2 * visible_range_in_chunks + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_voxel_scales_by_chunk_extents() {
        let base = chunk_to_base_voxel(Point3::new(2, -1, 3));
        assert_eq!(base.x, 2 * CHUNK_SIZE_X as i32);
        assert_eq!(base.y, -(CHUNK_SIZE_Y as i32));
        assert_eq!(base.z, 3 * CHUNK_SIZE_Z as i32);
    }

    #[test]
    fn voxel_to_chunk_inverts_base_voxel() {
        for chunk in [
            Point3::new(0, 0, 0),
            Point3::new(5, -3, 7),
            Point3::new(-1, -1, -1),
        ] {
            assert_eq!(voxel_to_chunk(chunk_to_base_voxel(chunk)), chunk);
        }
    }

    #[test]
    fn voxel_to_chunk_floors_negative_coordinates() {
        // Voxel -1 belongs to chunk -1, not chunk 0.
        let chunk = voxel_to_chunk(Point3::new(-1, -1, -1));
        assert_eq!(chunk, Point3::new(-1, -1, -1));
    }

    #[test]
    fn voxel_to_world_is_deterministic() {
        let voxel = Point3::new(17, -4, 99);
        assert_eq!(voxel_to_world(voxel), voxel_to_world(voxel));
    }

    #[test]
    fn max_chunk_line_counts_both_sides_and_center() {
        assert_eq!(max_chunk_line(0), 1);
        assert_eq!(max_chunk_line(4), 9);
        assert_eq!(max_chunk_line(16), 33);
    }
}
