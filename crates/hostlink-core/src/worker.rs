//! Attachment worker: attach, resolve, instantiate, wait, invoke.
//!
//! ```text
//! Spawned -> Attached -> Resolved -> Instantiated -> Waiting -> Invoking -> Detached
//! ```
//!
//! Every failure short-circuits to `Detached`. The attach guard is held for
//! the whole run and dropped before the final transition, so the thread is
//! attached exactly once and detached on every path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use hostlink_sdk::{BridgeError, HostRuntime, ThreadEnv, CONSTRUCTOR_NAME};

use crate::config::{BridgeConfig, TargetSpec};
use crate::readiness::{ReadinessSignal, SignalState};
use crate::trace::{TraceEvent, TraceSink};

/// Lifecycle position of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Thread started, not attached
    Spawned,
    /// Attached; resolving the class
    Attached,
    /// Class resolved; resolving methods
    Resolved,
    /// Methods resolved; constructing the instance
    Instantiated,
    /// Waiting for readiness
    Waiting,
    /// Calling the target method
    Invoking,
    /// Detached (terminal)
    Detached,
}

/// Which method lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStage {
    /// `<init>`
    Constructor,
    /// The target instance method
    Method,
}

/// How a worker run ended.
#[derive(Debug)]
pub enum WorkerOutcome {
    /// Target method ran to completion
    Invoked {
        /// INITIALIZED traces emitted while waiting
        polls: u32,
    },
    /// Thread could not be attached
    AttachFailed(BridgeError),
    /// Target class missing
    ClassNotFound(BridgeError),
    /// Constructor or target method missing
    MethodNotFound {
        /// Which lookup failed
        stage: ResolveStage,
        /// Host error
        error: BridgeError,
    },
    /// Constructor failed
    InstantiationFailed(BridgeError),
    /// Readiness bound elapsed before the signal was raised
    TimedOut {
        /// INITIALIZED traces emitted while waiting
        polls: u32,
    },
    /// Signal was cancelled
    Cancelled {
        /// INITIALIZED traces emitted while waiting
        polls: u32,
    },
    /// Target method raised a managed throwable
    Threw(BridgeError),
}

impl WorkerOutcome {
    /// Whether the target method was called (successfully or not).
    pub fn invoked(&self) -> bool {
        matches!(self, WorkerOutcome::Invoked { .. } | WorkerOutcome::Threw(_))
    }
}

/// Result of a worker run: outcome plus every state the worker passed through.
#[derive(Debug)]
pub struct WorkerReport {
    /// How the run ended
    pub outcome: WorkerOutcome,
    /// States in visiting order, starting at `Spawned`, ending at `Detached`
    pub path: Vec<WorkerState>,
}

enum Readiness {
    Ready(u32),
    TimedOut(u32),
    Cancelled(u32),
}

/// One attach/resolve/wait/invoke cycle against a host runtime.
pub struct AttachmentWorker<R: HostRuntime> {
    runtime: Arc<R>,
    target: TargetSpec,
    signal: Arc<ReadinessSignal>,
    poll_interval: Duration,
    readiness_timeout: Option<Duration>,
    sink: Arc<dyn TraceSink>,
    path: Vec<WorkerState>,
}

impl<R: HostRuntime> AttachmentWorker<R> {
    /// Create a worker that waits on `signal` before invoking.
    pub fn new(
        runtime: Arc<R>,
        config: &BridgeConfig,
        signal: Arc<ReadinessSignal>,
        sink: Arc<dyn TraceSink>,
    ) -> Self {
        Self {
            runtime,
            target: config.target.clone(),
            signal,
            poll_interval: config.poll_interval,
            readiness_timeout: config.readiness_timeout,
            sink,
            path: vec![WorkerState::Spawned],
        }
    }

    /// Run on the current thread until the cycle finishes.
    pub fn run(mut self) -> WorkerReport {
        let runtime = Arc::clone(&self.runtime);
        let outcome = match runtime.attach_current_thread() {
            Ok(mut env) => {
                self.transition(WorkerState::Attached);
                let outcome = self.drive(&mut env);
                drop(env);
                outcome
            }
            Err(e) => {
                log::error!("worker could not attach: {}", e);
                WorkerOutcome::AttachFailed(e)
            }
        };
        self.transition(WorkerState::Detached);
        log::debug!("worker finished: {:?}", outcome);

        WorkerReport {
            outcome,
            path: self.path,
        }
    }

    fn transition(&mut self, to: WorkerState) {
        log::debug!("worker {:?} -> {:?}", self.path.last(), to);
        self.path.push(to);
    }

    fn drive<E: ThreadEnv>(&mut self, env: &mut E) -> WorkerOutcome {
        let class = match env.find_class(self.target.class()) {
            Ok(class) => class,
            Err(e) => {
                self.sink.emit(TraceEvent::ClassMissing);
                log::warn!("{}", e);
                return WorkerOutcome::ClassNotFound(e);
            }
        };
        self.transition(WorkerState::Resolved);

        let ctor_descriptor = self.target.ctor_descriptor();
        let ctor = match env.get_method_id(&class, CONSTRUCTOR_NAME, ctor_descriptor) {
            Ok(id) => id,
            Err(error) => {
                self.sink.emit(TraceEvent::ConstructorMissing);
                log::warn!("{}", error);
                return WorkerOutcome::MethodNotFound {
                    stage: ResolveStage::Constructor,
                    error,
                };
            }
        };
        let method = match env.get_method_id(
            &class,
            self.target.method_name(),
            self.target.method_descriptor(),
        ) {
            Ok(id) => id,
            Err(error) => {
                self.sink
                    .emit(TraceEvent::MethodMissing(self.target.method_name().to_string()));
                log::warn!("{}", error);
                return WorkerOutcome::MethodNotFound {
                    stage: ResolveStage::Method,
                    error,
                };
            }
        };
        self.transition(WorkerState::Instantiated);

        let instance = match env.new_object(&class, ctor) {
            Ok(obj) => obj,
            Err(e) => {
                log::error!("{}", e);
                return WorkerOutcome::InstantiationFailed(e);
            }
        };
        self.transition(WorkerState::Waiting);

        let polls = match self.await_ready() {
            Readiness::Ready(polls) => polls,
            Readiness::TimedOut(polls) => {
                log::warn!(
                    "readiness not raised within {:?}; {} not invoked",
                    self.readiness_timeout,
                    self.target.method_name()
                );
                return WorkerOutcome::TimedOut { polls };
            }
            Readiness::Cancelled(polls) => {
                log::info!("readiness cancelled; {} not invoked", self.target.method_name());
                return WorkerOutcome::Cancelled { polls };
            }
        };
        self.transition(WorkerState::Invoking);

        match env.call_void_method(&instance, method) {
            Ok(()) => WorkerOutcome::Invoked { polls },
            Err(e) => {
                log::warn!("{}.{} threw: {}", self.target.class(), self.target.method_name(), e);
                WorkerOutcome::Threw(e)
            }
        }
    }

    fn await_ready(&self) -> Readiness {
        let started = Instant::now();
        let mut polls = 0;
        loop {
            let slice = match self.readiness_timeout {
                Some(limit) => {
                    let elapsed = started.elapsed();
                    if elapsed >= limit {
                        return Readiness::TimedOut(polls);
                    }
                    self.poll_interval.min(limit - elapsed)
                }
                None => self.poll_interval,
            };
            match self.signal.wait_timeout(slice) {
                SignalState::Ready => return Readiness::Ready(polls),
                SignalState::Cancelled => return Readiness::Cancelled(polls),
                SignalState::Pending => {
                    polls += 1;
                    self.sink.emit(TraceEvent::Initialized);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimClass, SimEvent, SimRuntime};
    use crate::trace::RecordingSink;
    use std::thread;

    fn fast_config() -> BridgeConfig {
        BridgeConfig::new()
            .with_trigger_delay(Duration::from_millis(50))
            .with_poll_interval(Duration::from_millis(5))
    }

    fn run_worker(
        runtime: &Arc<SimRuntime>,
        config: &BridgeConfig,
        signal: Arc<ReadinessSignal>,
        sink: Arc<dyn TraceSink>,
    ) -> WorkerReport {
        AttachmentWorker::new(Arc::clone(runtime), config, signal, sink).run()
    }

    fn runtime_with_test_class() -> Arc<SimRuntime> {
        let runtime = SimRuntime::new();
        runtime.define(
            SimClass::new("com.firelord.Test")
                .unwrap()
                .with_default_constructor()
                .with_void_method("run", || Ok(())),
        );
        Arc::new(runtime)
    }

    #[test]
    fn test_ready_signal_invokes_immediately() {
        let runtime = runtime_with_test_class();
        let signal = Arc::new(ReadinessSignal::new());
        signal.raise();
        let sink = Arc::new(RecordingSink::new());

        let report = run_worker(&runtime, &fast_config(), signal, sink.clone());

        assert!(matches!(report.outcome, WorkerOutcome::Invoked { polls: 0 }));
        assert_eq!(
            report.path,
            vec![
                WorkerState::Spawned,
                WorkerState::Attached,
                WorkerState::Resolved,
                WorkerState::Instantiated,
                WorkerState::Waiting,
                WorkerState::Invoking,
                WorkerState::Detached,
            ]
        );
        assert_eq!(runtime.invocations("run"), 1);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_missing_class_stops_after_attach() {
        let runtime = Arc::new(SimRuntime::new());
        let sink = Arc::new(RecordingSink::new());
        let signal = Arc::new(ReadinessSignal::new());

        let report = run_worker(&runtime, &fast_config(), signal, sink.clone());

        assert!(matches!(report.outcome, WorkerOutcome::ClassNotFound(_)));
        assert_eq!(
            report.path,
            vec![WorkerState::Spawned, WorkerState::Attached, WorkerState::Detached]
        );
        assert_eq!(sink.lines(), vec!["[jclass]error...".to_string()]);
        assert_eq!(runtime.count(|e| matches!(e, SimEvent::Detach)), 1);
    }

    #[test]
    fn test_attach_refused() {
        let runtime = runtime_with_test_class();
        runtime.refuse_attach(true);
        let signal = Arc::new(ReadinessSignal::new());

        let report = run_worker(&runtime, &fast_config(), signal, Arc::new(RecordingSink::new()));

        assert!(matches!(report.outcome, WorkerOutcome::AttachFailed(_)));
        assert_eq!(report.path, vec![WorkerState::Spawned, WorkerState::Detached]);
        assert_eq!(runtime.count(|e| matches!(e, SimEvent::Detach)), 0);
    }

    #[test]
    fn test_readiness_timeout_skips_invoke() {
        let runtime = runtime_with_test_class();
        let signal = Arc::new(ReadinessSignal::new());
        let config = fast_config().with_readiness_timeout(Some(Duration::from_millis(30)));
        let sink = Arc::new(RecordingSink::new());

        let report = run_worker(&runtime, &config, signal, sink.clone());

        match report.outcome {
            WorkerOutcome::TimedOut { polls } => assert!(polls >= 1),
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(runtime.invocations("run"), 0);
        assert_eq!(report.path.last(), Some(&WorkerState::Detached));
    }

    #[test]
    fn test_cancel_while_waiting() {
        let runtime = runtime_with_test_class();
        let signal = Arc::new(ReadinessSignal::new());
        let worker = AttachmentWorker::new(
            Arc::clone(&runtime),
            &fast_config(),
            Arc::clone(&signal),
            Arc::new(RecordingSink::new()),
        );

        let handle = thread::spawn(move || worker.run());
        thread::sleep(Duration::from_millis(20));
        signal.cancel();

        let report = handle.join().unwrap();
        assert!(matches!(report.outcome, WorkerOutcome::Cancelled { .. }));
        assert_eq!(runtime.invocations("run"), 0);
    }

    #[test]
    fn test_throwable_is_reported() {
        let runtime = SimRuntime::new();
        runtime.define(
            SimClass::new("com.firelord.Test")
                .unwrap()
                .with_default_constructor()
                .with_void_method("run", || {
                    Err("java.lang.IllegalStateException: nope".to_string())
                }),
        );
        let runtime = Arc::new(runtime);
        let signal = Arc::new(ReadinessSignal::new());
        signal.raise();

        let report = run_worker(&runtime, &fast_config(), signal, Arc::new(RecordingSink::new()));

        match &report.outcome {
            WorkerOutcome::Threw(BridgeError::Throwable(msg)) => {
                assert!(msg.contains("IllegalStateException"))
            }
            other => panic!("expected throwable, got {:?}", other),
        }
        assert!(report.outcome.invoked());
    }
}
