//! # Shared Resource Container
//!
//! [`Shared<T>`] is the crate's ownership primitive for data that crosses
//! thread boundaries: a reference-counted read-write lock around the
//! contained value. Chunk buffers move between the control thread and the
//! generation workers as `Shared<ChunkBuffer>` handles, so the voxel arrays
//! themselves are never copied.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `Shared` provides synchronized access to a value of type `T` that can be
/// handed across thread boundaries without copying the contained value. It is
/// how chunk buffers travel to generation workers: the worker clones the
/// handle, takes the single write guard for the duration of the generation
/// pass, and the control thread only reads after the completion handle has
/// been observed complete.
///
/// # Examples
///
/// ```
/// use voxel_streaming::shared::Shared;
///
/// let counter = Shared::new(0);
/// *counter.write() += 1;
/// assert_eq!(*counter.read(), 1);
/// ```
///
/// # Performance Considerations
/// - Read guards (`read()`) can be held concurrently
/// - Write guards (`write()`) are exclusive and block all other access
/// - A poisoned lock panics: a worker that died mid-write has violated the
///   single-writer contract and there is no degraded mode to fall back to
pub struct Shared<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> Shared<T> {
    /// Creates a new `Shared` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard for the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap()
    }

    /// Returns an exclusive guard for modifying the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap()
    }
}

impl<T: Send + Sync> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
