//! # Chunk Generation Task
//!
//! The unit of scheduled work that takes a chunk buffer from reset to Ready:
//! run the generation backend, classify the result, publish the flags, and
//! signal the completion handle - in that order, as one atomic unit.

use crate::coords::ChunkCoordinate;
use crate::scheduler::handle::CompletionHandle;
use crate::scheduler::{GenerationScheduler, Task, TaskCompletion};
use crate::shared::Shared;
use crate::voxels::chunk::ChunkBuffer;
use crate::voxels::classify::classify;

use std::sync::Arc;

use super::ChunkGenerator;

/// Schedules one generation pass for `buffer` and returns its handle.
///
/// Enqueues a single unit of work that generates the chunk at `coordinate`
/// into `buffer`, classifies it, publishes the flags through the buffer's
/// side-channel, and signals the returned handle, in that order. Never
/// blocks the caller.
///
/// # Preconditions
/// `buffer` must be reset for `coordinate` and must have no other
/// not-yet-complete generation outstanding against it; two concurrent
/// writers to one buffer corrupt state. The streaming facade upholds this by
/// construction - callers driving the scheduler directly must do the same.
pub fn schedule_generation(
    scheduler: &mut GenerationScheduler,
    generator: Arc<dyn ChunkGenerator>,
    buffer: Shared<ChunkBuffer>,
    coordinate: ChunkCoordinate,
    check_solid_plane: bool,
) -> CompletionHandle {
    let handle = CompletionHandle::new();
    let task = GenerationTask::new(
        generator,
        buffer,
        coordinate,
        check_solid_plane,
        handle.clone(),
    );
    scheduler.publish_task(Box::new(task));
    handle
}

/// Schedules one generation pass to start only after `dependency` completes.
///
/// Same contract as [`schedule_generation`], except the work is held back by
/// the scheduler - never by blocking a worker - until the dependency handle
/// is observed complete during a
/// [`process_queued_tasks`](GenerationScheduler::process_queued_tasks) pass.
pub fn schedule_generation_after(
    scheduler: &mut GenerationScheduler,
    dependency: CompletionHandle,
    generator: Arc<dyn ChunkGenerator>,
    buffer: Shared<ChunkBuffer>,
    coordinate: ChunkCoordinate,
    check_solid_plane: bool,
) -> CompletionHandle {
    let handle = CompletionHandle::new();
    let task = GenerationTask::new(
        generator,
        buffer,
        coordinate,
        check_solid_plane,
        handle.clone(),
    );
    scheduler.publish_after(dependency, Box::new(task));
    handle
}

/// A task that generates one chunk asynchronously.
///
/// The task owns a clone of the buffer handle for the duration of the pass;
/// the streaming facade guarantees it is the buffer's only writer. The voxel
/// array never gets copied across the thread boundary - only the buffer
/// handle moves.
pub struct GenerationTask {
    generator: Arc<dyn ChunkGenerator>,
    buffer: Shared<ChunkBuffer>,
    coordinate: ChunkCoordinate,
    check_solid_plane: bool,
    handle: CompletionHandle,
}

impl GenerationTask {
    /// Creates a generation task for `coordinate`.
    ///
    /// The buffer must already be reset for `coordinate` and must have no
    /// other not-yet-complete generation outstanding against it.
    pub(crate) fn new(
        generator: Arc<dyn ChunkGenerator>,
        buffer: Shared<ChunkBuffer>,
        coordinate: ChunkCoordinate,
        check_solid_plane: bool,
        handle: CompletionHandle,
    ) -> Self {
        GenerationTask {
            generator,
            buffer,
            coordinate,
            check_solid_plane,
            handle,
        }
    }
}

impl Task for GenerationTask {
    fn coordinate(&self) -> ChunkCoordinate {
        self.coordinate
    }

    fn run(self: Box<Self>) -> TaskCompletion {
        let flags = {
            let mut buffer = self.buffer.write();
            assert_eq!(
                buffer.coordinate(),
                self.coordinate,
                "generation task dispatched against a buffer bound to another chunk"
            );
            self.generator
                .generate(self.coordinate, buffer.voxels_mut());
            let flags = classify(buffer.voxels(), self.check_solid_plane);
            buffer.publish_flags(flags);
            flags
        };

        // The write guard is released before the signal, so a waiter that
        // wakes here can take a read guard immediately.
        self.handle.signal();

        TaskCompletion {
            coordinate: self.coordinate,
            flags,
        }
    }
}
