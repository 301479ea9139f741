//! Module-scope bookkeeping of spawned workers.
//!
//! The trigger returns before its worker finishes, so handles are parked
//! here and joined once their threads have exited.

use parking_lot::Mutex;
use std::thread::ThreadId;

use crate::trigger::WorkerHandle;
use crate::worker::WorkerReport;

/// Live worker handles.
#[derive(Default)]
pub struct WorkerRegistry {
    workers: Mutex<Vec<WorkerHandle>>,
}

impl WorkerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a handle until its worker exits.
    pub fn track(&self, handle: WorkerHandle) {
        self.workers.lock().push(handle);
    }

    /// Join every worker that has already exited and return their reports.
    /// Running workers are left in place.
    pub fn reap(&self) -> Vec<WorkerReport> {
        let finished: Vec<WorkerHandle> = {
            let mut workers = self.workers.lock();
            let (done, running): (Vec<_>, Vec<_>) =
                workers.drain(..).partition(|h| h.is_finished());
            *workers = running;
            done
        };

        finished
            .into_iter()
            .filter_map(|handle| match handle.join() {
                Ok(report) => Some(report),
                Err(e) => {
                    log::error!("{}", e);
                    None
                }
            })
            .collect()
    }

    /// Thread ids of workers not yet reaped.
    pub fn thread_ids(&self) -> Vec<ThreadId> {
        self.workers.lock().iter().map(|h| h.thread_id()).collect()
    }

    /// Number of workers not yet reaped.
    pub fn len(&self) -> usize {
        self.workers.lock().len()
    }

    /// Whether no workers are tracked.
    pub fn is_empty(&self) -> bool {
        self.workers.lock().is_empty()
    }
}
