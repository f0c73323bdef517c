//! The completion handle: an opaque, cloneable token representing the
//! eventual finish of one scheduled unit of generation work.

use std::sync::{Arc, Condvar, Mutex};

/// A join point for one scheduled unit of generation work.
///
/// The worker signals the handle after flag publication, so an observer that
/// sees the handle complete is guaranteed to see a fully populated voxel
/// array and valid flags. Handles carry no cancellation: once scheduled,
/// generation runs to completion.
///
/// Cloning is cheap; all clones observe the same completion.
pub struct CompletionHandle {
    inner: Arc<HandleState>,
}

struct HandleState {
    complete: Mutex<bool>,
    condvar: Condvar,
}

impl CompletionHandle {
    /// Creates a handle in the not-yet-complete state.
    pub(crate) fn new() -> Self {
        CompletionHandle {
            inner: Arc::new(HandleState {
                complete: Mutex::new(false),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Marks the work complete and wakes every waiter.
    ///
    /// Called exactly once, by the worker, after flags are published.
    pub(crate) fn signal(&self) {
        let mut complete = self.inner.complete.lock().unwrap();
        *complete = true;
        self.inner.condvar.notify_all();
    }

    /// Returns `true` once the work has finished. Never blocks.
    pub fn is_complete(&self) -> bool {
        *self.inner.complete.lock().unwrap()
    }

    /// Blocks the calling thread until the work has finished.
    ///
    /// This is the only blocking operation in the crate; the scheduler itself
    /// never blocks a worker on another worker.
    pub fn wait(&self) {
        let mut complete = self.inner.complete.lock().unwrap();
        while !*complete {
            complete = self.inner.condvar.wait(complete).unwrap();
        }
    }
}

impl Clone for CompletionHandle {
    fn clone(&self) -> Self {
        CompletionHandle {
            inner: self.inner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn starts_incomplete_and_completes_on_signal() {
        let handle = CompletionHandle::new();
        assert!(!handle.is_complete());
        handle.signal();
        assert!(handle.is_complete());
    }

    #[test]
    fn wait_unblocks_when_another_thread_signals() {
        let handle = CompletionHandle::new();
        let signaller = handle.clone();

        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            signaller.signal();
        });

        handle.wait();
        assert!(handle.is_complete());
        worker.join().unwrap();
    }
}
