//! # Streaming Facade
//!
//! This module provides [`ChunkStreamer`], the public face of the crate: it
//! tracks the lifecycle of every requested chunk, owns the buffer pool, and
//! drives the generation scheduler.
//!
//! ## Chunk Lifecycle
//!
//! ```text
//! Unloaded -> Scheduled -> Generating -> Ready -> (evicted) Unloaded
//! ```
//!
//! A coordinate absent from the streamer is Unloaded. `request_chunk` moves
//! it to Scheduled (queued) or straight to Generating (dispatched to a
//! worker); `update` moves it to Ready once the worker's completion record
//! has been drained. Exactly one generation task is ever in flight per
//! coordinate: repeated requests return the original handle.
//!
//! ## Buffer Pooling
//!
//! Evicted buffers go to a free list and are reset before reuse, so steady
//! state streaming does not allocate per chunk. A buffer is only ever
//! recycled after its occupant reached Ready, which rules out a stale
//! in-flight write landing in a reassigned buffer.
//!
//! ## Contract Violations
//!
//! Evicting a chunk that is still Scheduled or Generating, and shutting the
//! streamer down with outstanding work, are programming errors and panic:
//! chunk generation has no meaningful degraded mode.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};

use crate::coords::ChunkCoordinate;
use crate::generation::task::GenerationTask;
use crate::generation::ChunkGenerator;
use crate::scheduler::handle::CompletionHandle;
use crate::scheduler::GenerationScheduler;
use crate::shared::Shared;
use crate::voxels::chunk::ChunkBuffer;
use crate::voxels::flags::ChunkFlags;

/// The lifecycle state of a requested chunk.
///
/// Coordinates the streamer has never seen (or has evicted) have no state;
/// they are implicitly Unloaded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Generation is queued but not yet dispatched to a worker.
    Scheduled,
    /// Generation is running on a worker thread.
    Generating,
    /// Flags are valid and the voxel data is stable.
    Ready,
}

struct ChunkEntry {
    state: ChunkState,
    buffer: Shared<ChunkBuffer>,
    handle: CompletionHandle,
}

/// Streams chunks of an unbounded voxel world through a worker pool.
///
/// The streamer is the single owner of per-coordinate state; all methods
/// take `&mut self` and are meant to be called from one control thread. The
/// heavy lifting happens on the workers.
pub struct ChunkStreamer {
    scheduler: GenerationScheduler,
    generator: Arc<dyn ChunkGenerator>,
    chunks: HashMap<ChunkCoordinate, ChunkEntry>,
    buffer_pool: Vec<Shared<ChunkBuffer>>,
}

impl ChunkStreamer {
    /// Creates a streamer backed by `num_workers` generation workers.
    pub fn new(generator: Arc<dyn ChunkGenerator>, num_workers: usize) -> Self {
        info!("Starting chunk streamer with {num_workers} generation workers");
        ChunkStreamer {
            scheduler: GenerationScheduler::new(num_workers),
            generator,
            chunks: HashMap::new(),
            buffer_pool: Vec::new(),
        }
    }

    /// Requests generation of the chunk at `coordinate`.
    ///
    /// Never blocks. Schedules one unit of work that generates the chunk,
    /// classifies it, publishes the flags, and signals the returned handle,
    /// in that order. When `check_solid_plane` is false the plane portion of
    /// classification is skipped; `SOLID`/`AIR` are always computed.
    ///
    /// Requesting a coordinate that is already Scheduled, Generating, or
    /// Ready returns the existing handle and never starts a second task for
    /// the same buffer.
    pub fn request_chunk(
        &mut self,
        coordinate: ChunkCoordinate,
        check_solid_plane: bool,
    ) -> CompletionHandle {
        if let Some(entry) = self.chunks.get(&coordinate) {
            return entry.handle.clone();
        }

        let buffer = self.acquire_buffer(coordinate);
        let handle = CompletionHandle::new();
        let task = GenerationTask::new(
            self.generator.clone(),
            buffer.clone(),
            coordinate,
            check_solid_plane,
            handle.clone(),
        );

        let state = if self.scheduler.publish_task(Box::new(task)) {
            ChunkState::Generating
        } else {
            ChunkState::Scheduled
        };
        debug!("Chunk {coordinate:?} requested, state {state:?}");

        self.chunks.insert(
            coordinate,
            ChunkEntry {
                state,
                buffer,
                handle: handle.clone(),
            },
        );
        handle
    }

    /// Pumps the scheduler: records finished chunks as Ready and dispatches
    /// queued work to free workers.
    ///
    /// Call this periodically from the control thread. Completion handles
    /// are signalled by the workers themselves, so a blocked
    /// [`CompletionHandle::wait`] does not depend on this method; only the
    /// state map and buffer recycling do.
    pub fn update(&mut self) {
        for completion in self.scheduler.process_completed_tasks() {
            if let Some(entry) = self.chunks.get_mut(&completion.coordinate) {
                entry.state = ChunkState::Ready;
            }
        }
        for coordinate in self.scheduler.process_queued_tasks() {
            if let Some(entry) = self.chunks.get_mut(&coordinate) {
                if entry.state == ChunkState::Scheduled {
                    entry.state = ChunkState::Generating;
                }
            }
        }
    }

    /// The lifecycle state of `coordinate`, or `None` if it is Unloaded.
    pub fn state(&self, coordinate: ChunkCoordinate) -> Option<ChunkState> {
        self.chunks.get(&coordinate).map(|entry| entry.state)
    }

    /// The buffer for a Ready chunk.
    ///
    /// Returns `None` while the chunk is Unloaded, Scheduled, or Generating:
    /// no consumer may read a buffer before its generation task has been
    /// observed complete.
    pub fn chunk(&self, coordinate: ChunkCoordinate) -> Option<Shared<ChunkBuffer>> {
        self.chunks
            .get(&coordinate)
            .filter(|entry| entry.state == ChunkState::Ready)
            .map(|entry| entry.buffer.clone())
    }

    /// The published classification flags of a Ready chunk.
    ///
    /// Returns `None` for chunks that are not Ready. A Ready chunk's flags
    /// are never `NONE`: every generation pass classifies before publishing.
    pub fn flags(&self, coordinate: ChunkCoordinate) -> Option<ChunkFlags> {
        self.chunks
            .get(&coordinate)
            .filter(|entry| entry.state == ChunkState::Ready)
            .map(|entry| entry.buffer.read().flags())
    }

    /// Unloads a Ready chunk and returns its buffer to the pool.
    ///
    /// Unknown coordinates are ignored.
    ///
    /// # Panics
    /// Panics if the chunk is still Scheduled or Generating: recycling a
    /// buffer with a not-yet-complete generation task against it would let a
    /// stale write land in a reassigned buffer, so eviction of an in-flight
    /// chunk is a contract violation.
    pub fn evict(&mut self, coordinate: ChunkCoordinate) {
        // The state check happens before the entry is removed, so a failed
        // eviction leaves the chunk tracked and its buffer out of the pool.
        let Some(entry) = self.chunks.get(&coordinate) else {
            return;
        };
        assert_eq!(
            entry.state,
            ChunkState::Ready,
            "cannot evict chunk {coordinate:?} while its generation is outstanding"
        );
        if let Some(entry) = self.chunks.remove(&coordinate) {
            debug!("Chunk {coordinate:?} evicted, buffer pooled");
            self.buffer_pool.push(entry.buffer);
        }
    }

    /// Releases the worker pool.
    ///
    /// A worker signals a task's completion handle before its completion
    /// record reaches the control thread, so a chunk whose handle was waited
    /// out may still have a record in transit. Shutdown drains those records
    /// itself; callers only need to wait on every handle, not to keep
    /// calling [`update`](Self::update) until the state map settles.
    ///
    /// # Panics
    /// Panics if any generation work is outstanding, i.e. a requested chunk
    /// whose completion handle has not been signalled. There is no
    /// cancellation path, so callers must wait on every handle before
    /// disposal.
    pub fn shutdown(mut self) {
        self.update();
        for (coordinate, entry) in &self.chunks {
            if entry.state != ChunkState::Ready {
                assert!(
                    entry.handle.is_complete(),
                    "chunk streamer shut down while chunk {coordinate:?} generation is outstanding"
                );
            }
        }
        self.scheduler.drain_in_flight_tasks();
        let outstanding = self.scheduler.num_tasks_outstanding();
        assert_eq!(
            outstanding, 0,
            "chunk streamer shut down with {outstanding} generation tasks outstanding"
        );
        info!("Chunk streamer shut down");
    }

    fn acquire_buffer(&mut self, coordinate: ChunkCoordinate) -> Shared<ChunkBuffer> {
        match self.buffer_pool.pop() {
            Some(buffer) => {
                buffer.write().reset_for(coordinate);
                buffer
            }
            None => Shared::new(ChunkBuffer::new(coordinate)),
        }
    }
}
