//! # Generation Job Scheduler
//!
//! This module provides the worker-pool scheduler that executes chunk
//! generation jobs off the control thread.
//!
//! ## Architecture Overview
//!
//! The scheduler consists of a few key components:
//! - `GenerationScheduler`: central coordinator for job distribution
//! - `Task`: one unit of generation work, owning everything it needs
//! - `TaskCompletion`: the per-job record sent back to the control thread
//! - `WorkerChannel`: the communication pair between the control thread and
//!   one worker thread
//!
//! ## Job Lifecycle
//! 1. Jobs are published via [`GenerationScheduler::publish_task`] (or
//!    deferred behind a dependency via
//!    [`GenerationScheduler::publish_after`])
//! 2. The scheduler hands jobs to workers round-robin, one in flight per
//!    worker; overflow waits in a FIFO queue
//! 3. A worker runs the job to completion - generate, classify, publish
//!    flags, signal the job's completion handle, in that order
//! 4. The control thread drains completion records in
//!    [`GenerationScheduler::process_completed_tasks`] and dispatches any
//!    queued or newly unblocked deferred jobs in
//!    [`GenerationScheduler::process_queued_tasks`]
//!
//! ## Scheduling Guarantees
//! - `publish_task` never blocks the caller; it either dispatches
//!   immediately or queues
//! - Workers never block on other workers: a deferred job waits in the
//!   scheduler, not on a worker thread, until its dependency completes
//! - Within one job, generation happens-before classification
//!   happens-before flag publication happens-before the handle signal
//! - Across jobs, no ordering is guaranteed: chunks complete independently
//!   and may finish in any order relative to request order
//! - There is no cancellation: generation is short, bounded, CPU-only work
//!   and always runs to completion once dispatched

pub mod handle;

use log::{debug, info};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::coords::ChunkCoordinate;
use crate::voxels::flags::ChunkFlags;

use handle::CompletionHandle;

/// A unit of generation work executed on a worker thread.
///
/// Tasks own all of their data (generator handle, buffer handle, coordinate)
/// so nothing is borrowed across the thread boundary.
pub trait Task: Send {
    /// The chunk coordinate this task generates, used for dispatch
    /// bookkeeping and logging.
    fn coordinate(&self) -> ChunkCoordinate;

    /// Runs the task to completion on a worker thread and reports the
    /// published flags.
    fn run(self: Box<Self>) -> TaskCompletion;
}

/// The record a worker sends back to the control thread when a task finishes.
#[derive(Debug, Clone, Copy)]
pub struct TaskCompletion {
    /// The chunk coordinate the task generated.
    pub coordinate: ChunkCoordinate,
    /// The classification flags the task published.
    pub flags: ChunkFlags,
}

/// The communication pair between the control thread and one worker thread.
///
/// Each channel is backed by an OS thread that loops on its task receiver;
/// dropping the sender (when the scheduler is dropped) ends the loop and lets
/// the worker exit.
struct WorkerChannel {
    task_sender: Sender<Box<dyn Task>>,
    completion_receiver: Receiver<TaskCompletion>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Maximum number of tasks in flight per worker channel.
///
/// Kept at 1 so a long column of queued work stays in the scheduler, where
/// dependency-deferred jobs can overtake it, instead of piling up behind one
/// worker.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

/// Manages a pool of worker threads and coordinates generation job execution.
pub struct GenerationScheduler {
    channels: Vec<WorkerChannel>,
    queued_tasks: VecDeque<Box<dyn Task>>,
    deferred_tasks: Vec<(CompletionHandle, Box<dyn Task>)>,
    current_channel: usize,
}

impl GenerationScheduler {
    /// Creates a scheduler with `num_workers` worker threads.
    ///
    /// # Panics
    /// Panics if thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        info!(
            "Starting generation scheduler with {} workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        let mut channels = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task>>();
            let (completion_tx, completion_rx) = channel::<TaskCompletion>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let completion = task.run();
                    if completion_tx.send(completion).is_err() {
                        break;
                    }
                }
            });

            channels.push(WorkerChannel {
                task_sender: task_tx,
                completion_receiver: completion_rx,
                num_tasks_in_flight: 0,
                _worker: worker,
            });
        }

        GenerationScheduler {
            channels,
            queued_tasks: VecDeque::new(),
            deferred_tasks: Vec::new(),
            current_channel: 0,
        }
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// Returns the task on failure (worker disconnected) so the caller can
    /// requeue it.
    fn try_send_task(
        &mut self,
        task: Box<dyn Task>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds an available worker channel using round-robin selection,
    /// skipping channels that are at `MAX_TASKS_IN_FLIGHT`.
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        if self
            .channels
            .iter()
            .all(|channel| channel.num_tasks_in_flight >= MAX_TASKS_IN_FLIGHT)
        {
            return None;
        }

        let start_channel = self.current_channel;
        let mut current = start_channel;
        loop {
            if self.channels[current].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Publishes a task for execution.
    ///
    /// Never blocks. Returns `true` if the task was dispatched to a worker
    /// immediately, `false` if it was queued because all workers are busy.
    pub fn publish_task(&mut self, task: Box<dyn Task>) -> bool {
        debug!("Publishing generation task for chunk {:?}", task.coordinate());

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Defers a task until `dependency` completes.
    ///
    /// The dependency is checked in [`process_queued_tasks`]; a deferred task
    /// waits in the scheduler, never on a worker thread, so workers are never
    /// blocked on each other.
    ///
    /// [`process_queued_tasks`]: Self::process_queued_tasks
    pub fn publish_after(&mut self, dependency: CompletionHandle, task: Box<dyn Task>) {
        debug!(
            "Deferring generation task for chunk {:?} behind a dependency",
            task.coordinate()
        );
        self.deferred_tasks.push((dependency, task));
    }

    /// Dispatches queued and newly unblocked deferred tasks to available
    /// workers.
    ///
    /// Call this periodically from the control thread. Deferred tasks whose
    /// dependency has completed join the back of the FIFO queue; the queue is
    /// then drained front-first until the workers are saturated.
    ///
    /// # Returns
    /// The coordinates of every task dispatched to a worker by this call.
    pub fn process_queued_tasks(&mut self) -> Vec<ChunkCoordinate> {
        let mut index = 0;
        while index < self.deferred_tasks.len() {
            if self.deferred_tasks[index].0.is_complete() {
                let (_, task) = self.deferred_tasks.swap_remove(index);
                self.queued_tasks.push_back(task);
            } else {
                index += 1;
            }
        }

        let mut dispatched = Vec::new();
        if self.queued_tasks.is_empty() {
            return dispatched;
        }

        match self.find_available_channel() {
            None => {}
            Some(mut channel_idx) => {
                while let Some(task) = self.queued_tasks.pop_front() {
                    let coordinate = task.coordinate();
                    match self.try_send_task(task, channel_idx) {
                        Ok(_) => {
                            dispatched.push(coordinate);
                            match self.find_available_channel() {
                                Some(next_idx) => channel_idx = next_idx,
                                None => break,
                            }
                        }
                        Err(task) => {
                            // Channel disconnected; put the task back and stop.
                            self.queued_tasks.push_front(task);
                            break;
                        }
                    }
                }
            }
        }
        dispatched
    }

    /// Drains all completion records from the worker channels.
    ///
    /// Must be called from the control thread; it is what moves the
    /// per-chunk bookkeeping forward and frees workers for queued jobs.
    pub fn process_completed_tasks(&mut self) -> Vec<TaskCompletion> {
        let mut completions = Vec::new();
        for channel in &mut self.channels {
            while let Ok(completion) = channel.completion_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                debug!(
                    "Chunk {:?} generation complete, flags {:?}",
                    completion.coordinate, completion.flags
                );
                completions.push(completion);
            }
        }
        completions
    }

    /// Blocks until every task currently in flight on a worker has sent its
    /// completion record, and drains those records.
    ///
    /// A worker signals a task's completion handle before it sends the
    /// record, so there is a window where `wait()` has returned but the
    /// record is still in transit. Draining closes that window; it is what
    /// lets disposal distinguish work that merely has not been pumped yet
    /// from work that is genuinely outstanding. In-flight tasks always run
    /// to completion, so each `recv` here is bounded by one generation pass.
    pub fn drain_in_flight_tasks(&mut self) -> Vec<TaskCompletion> {
        let mut completions = Vec::new();
        for channel in &mut self.channels {
            while channel.num_tasks_in_flight > 0 {
                match channel.completion_receiver.recv() {
                    Ok(completion) => {
                        channel.num_tasks_in_flight -= 1;
                        completions.push(completion);
                    }
                    // Worker disconnected; no further records will arrive.
                    Err(_) => break,
                }
            }
        }
        completions
    }

    /// The number of tasks not yet observed complete: in flight on workers,
    /// waiting in the queue, or deferred behind a dependency.
    pub fn num_tasks_outstanding(&self) -> usize {
        let in_flight: usize = self
            .channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum();
        in_flight + self.queued_tasks.len() + self.deferred_tasks.len()
    }
}
