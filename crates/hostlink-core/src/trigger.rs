//! Trigger entry point: spawn a worker, hold it, then release it.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use hostlink_sdk::{BridgeError, BridgeResult, HostRuntime};

use crate::config::BridgeConfig;
use crate::defaults::WORKER_THREAD_PREFIX;
use crate::handle_cache::HandleCache;
use crate::readiness::ReadinessSignal;
use crate::trace::{TraceEvent, TraceSink};
use crate::worker::{AttachmentWorker, WorkerReport};

/// A spawned worker thread and the signal it waits on.
pub struct WorkerHandle {
    thread_id: ThreadId,
    name: String,
    signal: Arc<ReadinessSignal>,
    join: JoinHandle<WorkerReport>,
}

impl WorkerHandle {
    /// OS thread id of the worker.
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The worker's readiness signal.
    pub fn signal(&self) -> &Arc<ReadinessSignal> {
        &self.signal
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the worker to exit and take its report.
    pub fn join(self) -> BridgeResult<WorkerReport> {
        self.join.join().map_err(|payload| {
            BridgeError::Host(format!(
                "worker {} panicked: {}",
                self.name,
                panic_message(payload.as_ref())
            ))
        })
    }
}

/// Text of a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Cancels a signal when dropped. No-op once the signal is raised.
struct CancelOnDrop<'a>(&'a ReadinessSignal);

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Spawns attachment workers and releases them.
pub struct Trigger {
    config: BridgeConfig,
    sink: Arc<dyn TraceSink>,
    spawned: AtomicU64,
}

impl Trigger {
    /// Create a trigger whose workers use `config` and report to `sink`.
    pub fn new(config: BridgeConfig, sink: Arc<dyn TraceSink>) -> Self {
        Self {
            config,
            sink,
            spawned: AtomicU64::new(0),
        }
    }

    /// Configuration handed to every worker.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Number of workers spawned so far.
    pub fn spawned(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }

    /// Spawn a worker with a fresh pending signal; do not release it.
    pub fn spawn_worker<R>(&self, runtime: Arc<R>) -> BridgeResult<WorkerHandle>
    where
        R: HostRuntime + 'static,
    {
        let seq = self.spawned.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-{}", WORKER_THREAD_PREFIX, seq);
        let signal = Arc::new(ReadinessSignal::new());

        let worker = AttachmentWorker::new(
            runtime,
            &self.config,
            Arc::clone(&signal),
            Arc::clone(&self.sink),
        );
        let mut builder = thread::Builder::new().name(name.clone());
        if let Some(bytes) = self.config.worker_stack_size {
            builder = builder.stack_size(bytes);
        }
        let join = builder.spawn(move || worker.run()).map_err(|e| {
            log::error!("could not spawn {}: {}", name, e);
            BridgeError::Spawn(e)
        })?;

        log::debug!("spawned {}", name);
        Ok(WorkerHandle {
            thread_id: join.thread().id(),
            name,
            signal,
            join,
        })
    }

    /// Spawn a worker, block for `delay`, then raise its signal.
    ///
    /// The RUNNABLE trace is emitted before the raise, so it always precedes
    /// anything the worker prints after waking. If the sink panics the worker
    /// is cancelled instead of left waiting.
    ///
    /// Returns once the signal is raised; the worker keeps running and its
    /// outcome is only visible through the returned handle.
    pub fn fire<R>(&self, runtime: Arc<R>, delay: Duration) -> BridgeResult<WorkerHandle>
    where
        R: HostRuntime + 'static,
    {
        let handle = self.spawn_worker(runtime)?;
        thread::sleep(delay);
        {
            let _cancel = CancelOnDrop(&handle.signal);
            self.sink.emit(TraceEvent::Runnable);
            handle.signal.raise();
        }
        log::info!("released {} after {:?}", handle.name, delay);
        Ok(handle)
    }

    /// [`fire`](Self::fire) with the runtime taken from `cache`.
    pub fn fire_from_cache<R>(
        &self,
        cache: &HandleCache<R>,
        delay: Duration,
    ) -> BridgeResult<WorkerHandle>
    where
        R: HostRuntime + 'static,
    {
        let runtime = cache.require()?;
        self.fire(runtime, delay)
    }
}
