//! Classification flags describing cached, derived properties of a chunk's
//! contents. Flags are recomputed from scratch on every generation pass and
//! published once through the chunk buffer's atomic slot; they are never
//! partially updated.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A bitset of derived chunk properties.
///
/// `ChunkFlags::NONE` means "not yet classified": consumers must not apply
/// any flag-based optimization to such a chunk.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChunkFlags(u8);

impl ChunkFlags {
    /// No flags set; the chunk has not been classified.
    pub const NONE: ChunkFlags = ChunkFlags(0);

    /// At least one non-air voxel exists in the chunk.
    pub const SOLID: ChunkFlags = ChunkFlags(1 << 0);

    /// At least one air voxel exists in the chunk.
    pub const AIR: ChunkFlags = ChunkFlags(1 << 1);

    /// Every (x,z) column through the full Y extent contains at least one
    /// solid voxel, so nothing passes straight through the chunk vertically.
    pub const SOLID_XZ_PLANE: ChunkFlags = ChunkFlags(1 << 2);

    /// Returns `true` if every flag in `other` is also set in `self`.
    pub fn contains(self, other: ChunkFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// The raw bit representation, as stored in the buffer's atomic slot.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Reconstructs flags from their raw bit representation.
    ///
    /// Unknown bits are discarded so a stale or corrupted slot can never
    /// produce flags that compare unequal to any constructible value.
    pub fn from_bits(bits: u8) -> Self {
        ChunkFlags(bits & (Self::SOLID.0 | Self::AIR.0 | Self::SOLID_XZ_PLANE.0))
    }
}

impl BitOr for ChunkFlags {
    type Output = ChunkFlags;

    fn bitor(self, rhs: ChunkFlags) -> ChunkFlags {
        ChunkFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ChunkFlags {
    fn bitor_assign(&mut self, rhs: ChunkFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ChunkFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == ChunkFlags::NONE {
            return write!(f, "ChunkFlags(NONE)");
        }
        let mut names = Vec::new();
        if self.contains(ChunkFlags::SOLID) {
            names.push("SOLID");
        }
        if self.contains(ChunkFlags::AIR) {
            names.push("AIR");
        }
        if self.contains(ChunkFlags::SOLID_XZ_PLANE) {
            names.push("SOLID_XZ_PLANE");
        }
        write!(f, "ChunkFlags({})", names.join(" | "))
    }
}
