//! # Voxel Data Model
//!
//! This module contains the chunk-local data model of the streaming core:
//!
//! * **Block**: byte-sized per-voxel values and their compact storage form
//! * **Chunk**: the dense per-chunk buffer plus the flags publication slot
//! * **Flags**: the cached classification bitset derived per generation pass
//! * **Classify**: the pure function that derives flags from voxel contents
//!
//! ## Thread Safety
//!
//! A chunk buffer has exactly one writer at a time (the in-flight generation
//! task) and zero readers until that task's completion handle is observed
//! complete. The flags slot is the single lock-free exception: an atomic
//! publication channel written once per pass and readable at any time.

pub mod block;
pub mod chunk;
pub mod classify;
pub mod flags;
