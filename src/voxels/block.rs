//! # Block Module
//!
//! This module defines the per-voxel block types and their compact storage
//! representation. Every chunk stores one byte per voxel, so block types must
//! stay byte-sized.

use num_derive::FromPrimitive;
use serde::Deserialize;

/// The underlying integer type used to represent block types in memory.
///
/// Chunks store one of these per voxel in a dense array, so the type is kept
/// byte-sized.
pub type BlockTypeSize = u8;

/// Enumerates all possible block types in the voxel world.
///
/// `Air` must stay the zero variant: freshly allocated chunk buffers are
/// zeroed, which makes an unwritten cell read back as air rather than as some
/// arbitrary solid type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, Deserialize)]
pub enum BlockType {
    /// A non-solid, transparent cell.
    Air,

    /// A basic solid terrain block.
    Dirt,

    /// A solid surface block.
    Grass,

    /// A solid underground block.
    Stone,
}

impl BlockType {
    /// Converts a stored byte back to a `BlockType`.
    ///
    /// # Panics
    /// Panics if the byte does not correspond to a valid `BlockType`. Stored
    /// bytes only ever come from `BlockType` values, so an invalid byte means
    /// the voxel array was corrupted.
    pub fn from_byte(btype: BlockTypeSize) -> Self {
        let btype_option = num::FromPrimitive::from_u8(btype);
        btype_option.unwrap()
    }

    /// Returns `true` for every variant other than `Air`.
    pub fn is_solid(self) -> bool {
        self != BlockType::Air
    }
}

/// Represents a single voxel cell in a chunk's dense array.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute plus the `bytemuck` derives guarantee that a
/// slice of blocks is a plain byte array: chunk buffers are allocated with
/// `bytemuck::zeroed_slice_box`, which yields an all-air chunk.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize`.
    pub block_type: BlockTypeSize,
}

impl Block {
    /// Creates a new block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    /// The all-air block value.
    pub const AIR: Block = Block { block_type: 0 };

    /// Decodes the stored byte into its `BlockType`.
    pub fn block_type(self) -> BlockType {
        BlockType::from_byte(self.block_type)
    }

    /// Returns `true` if this cell holds anything other than air.
    pub fn is_solid(self) -> bool {
        self.block_type != BlockType::Air as BlockTypeSize
    }
}
