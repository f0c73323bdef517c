//! # Chunk Classifier
//!
//! Derives [`ChunkFlags`] from a fully populated voxel array. Classification
//! is a pure function: it reads the array once, accumulates flags, and never
//! touches the buffer's publication slot itself - the generation task owns
//! that write.

use bitvec::prelude::BitVec;

use super::block::Block;
use super::chunk::CHUNK_PLANE_SIZE;
use super::flags::ChunkFlags;

/// Classifies a fully populated voxel array.
///
/// * `SOLID` is set if any cell is non-air.
/// * `AIR` is set if any cell is air.
/// * `SOLID_XZ_PLANE` is set iff every (x,z) column through the full Y extent
///   contains at least one solid voxel, i.e. no column is a complete vertical
///   air shaft. An all-air chunk therefore never sets it.
///
/// When `check_solid_plane` is false the column bookkeeping is skipped
/// entirely; `SOLID` and `AIR` are always computed.
///
/// The linearization order (`x + z*SIZE_X + y*SIZE_X*SIZE_Z`) means a cell's
/// within-slab offset - and hence its (x,z) column - is just its index modulo
/// the plane size, so one linear scan covers both the solidity flags and the
/// column occupancy bits.
pub fn classify(voxels: &[Block], check_solid_plane: bool) -> ChunkFlags {
    let mut flags = ChunkFlags::NONE;
    let mut occupied_columns: BitVec = if check_solid_plane {
        BitVec::repeat(false, CHUNK_PLANE_SIZE)
    } else {
        BitVec::new()
    };

    for (index, block) in voxels.iter().enumerate() {
        if block.is_solid() {
            flags |= ChunkFlags::SOLID;
            if check_solid_plane {
                occupied_columns.set(index % CHUNK_PLANE_SIZE, true);
            }
        } else {
            flags |= ChunkFlags::AIR;
        }
    }

    if check_solid_plane && occupied_columns.all() {
        flags |= ChunkFlags::SOLID_XZ_PLANE;
    }

    flags
}
