//! End-to-end trigger/worker handshake against the simulated runtime

use hostlink_core::sim::{SimClass, SimEvent, SimRuntime};
use hostlink_core::{
    load, BridgeConfig, HandleCache, RecordingSink, ResolveStage, TraceEvent, Trigger,
    WorkerOutcome, WorkerState,
};
use hostlink_sdk::InterfaceVersion;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const POLL: Duration = Duration::from_millis(10);

fn test_class(runs: Arc<AtomicUsize>) -> SimClass {
    SimClass::new("com.firelord.Test")
        .unwrap()
        .with_default_constructor()
        .with_void_method("run", move || {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
}

fn trigger(sink: &Arc<RecordingSink>) -> Trigger {
    let config = BridgeConfig::new().with_poll_interval(POLL);
    Trigger::new(config, sink.clone())
}

#[test]
fn test_happy_path() {
    let runs = Arc::new(AtomicUsize::new(0));
    let runtime = Arc::new(SimRuntime::new());
    runtime.define(test_class(Arc::clone(&runs)));
    let sink = Arc::new(RecordingSink::new());

    let handle = trigger(&sink)
        .fire(Arc::clone(&runtime), Duration::from_millis(100))
        .unwrap();
    let worker_thread = handle.thread_id();
    let raised_at = handle.signal().raised_at().expect("signal raised before fire returns");
    let report = handle.join().unwrap();

    assert!(matches!(report.outcome, WorkerOutcome::Invoked { polls } if polls >= 4));
    assert_eq!(report.path.last(), Some(&WorkerState::Detached));
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    assert!(sink.count(&TraceEvent::Initialized) >= 4);
    assert_eq!(sink.count(&TraceEvent::Runnable), 1);
    assert!(sink
        .events_from(worker_thread)
        .iter()
        .all(|e| *e == TraceEvent::Initialized));

    // Invocation strictly follows the raise
    let invoked_at = runtime
        .journal()
        .into_iter()
        .find(|e| matches!(e.event, SimEvent::Invoke(_)))
        .map(|e| e.at)
        .unwrap();
    assert!(invoked_at >= raised_at);
}

#[test]
fn test_single_attach_scope() {
    let runtime = Arc::new(SimRuntime::new());
    runtime.define(test_class(Arc::new(AtomicUsize::new(0))));
    let sink = Arc::new(RecordingSink::new());

    let handle = trigger(&sink).fire(Arc::clone(&runtime), Duration::from_millis(20)).unwrap();
    let worker_thread = handle.thread_id();
    handle.join().unwrap();

    let events = runtime.events_on(worker_thread);
    assert_eq!(events.first(), Some(&SimEvent::Attach));
    assert_eq!(events.last(), Some(&SimEvent::Detach));
    assert_eq!(events.iter().filter(|e| **e == SimEvent::Attach).count(), 1);
    assert_eq!(events.iter().filter(|e| **e == SimEvent::Detach).count(), 1);
    assert!(!runtime.is_attached(worker_thread));

    // Nothing touched the runtime from any other thread
    assert_eq!(runtime.journal().len(), events.len());
}

#[test]
fn test_missing_class() {
    let runtime = Arc::new(SimRuntime::new());
    runtime.define(
        SimClass::new("com.firelord.Renamed")
            .unwrap()
            .with_default_constructor()
            .with_void_method("run", || Ok(())),
    );
    let sink = Arc::new(RecordingSink::new());

    let handle = trigger(&sink).fire(Arc::clone(&runtime), Duration::from_millis(20)).unwrap();
    let report = handle.join().unwrap();

    assert!(matches!(report.outcome, WorkerOutcome::ClassNotFound(_)));
    assert_eq!(runtime.invocations("run"), 0);
    assert!(sink.lines().contains(&"[jclass]error...".to_string()));
    // The trigger still completes normally
    assert_eq!(sink.count(&TraceEvent::Runnable), 1);
}

#[test]
fn test_missing_method() {
    let runtime = Arc::new(SimRuntime::new());
    runtime.define(
        SimClass::new("com.firelord.Test")
            .unwrap()
            .with_default_constructor(),
    );
    let sink = Arc::new(RecordingSink::new());

    let handle = trigger(&sink).fire(Arc::clone(&runtime), Duration::from_millis(20)).unwrap();
    let report = handle.join().unwrap();

    assert!(matches!(
        report.outcome,
        WorkerOutcome::MethodNotFound { stage: ResolveStage::Method, .. }
    ));
    assert!(sink.lines().contains(&"[run]error...".to_string()));
    assert_eq!(runtime.count(|e| matches!(e, SimEvent::NewObject(_))), 0);
}

#[test]
fn test_missing_constructor() {
    let runtime = Arc::new(SimRuntime::new());
    runtime.define(
        SimClass::new("com.firelord.Test")
            .unwrap()
            .with_void_method("run", || Ok(())),
    );
    let sink = Arc::new(RecordingSink::new());

    let report = trigger(&sink)
        .fire(Arc::clone(&runtime), Duration::ZERO)
        .unwrap()
        .join()
        .unwrap();

    assert!(matches!(
        report.outcome,
        WorkerOutcome::MethodNotFound { stage: ResolveStage::Constructor, .. }
    ));
    assert!(sink.lines().contains(&"[init]error...".to_string()));
}

#[test]
fn test_longer_delay_means_more_polls() {
    let runtime = Arc::new(SimRuntime::new());
    runtime.define(test_class(Arc::new(AtomicUsize::new(0))));

    let short_sink = Arc::new(RecordingSink::new());
    trigger(&short_sink)
        .fire(Arc::clone(&runtime), Duration::from_millis(40))
        .unwrap()
        .join()
        .unwrap();

    let long_sink = Arc::new(RecordingSink::new());
    let report = trigger(&long_sink)
        .fire(Arc::clone(&runtime), Duration::from_millis(200))
        .unwrap()
        .join()
        .unwrap();

    assert!(report.outcome.invoked());
    let short = short_sink.count(&TraceEvent::Initialized);
    let long = long_sink.count(&TraceEvent::Initialized);
    assert!(long >= 10, "only {} polls in 200ms", long);
    assert!(long > short);
    assert_eq!(runtime.invocations("run"), 2);
}

#[test]
fn test_concurrent_triggers() {
    let runs = Arc::new(AtomicUsize::new(0));
    let runtime = Arc::new(SimRuntime::new());
    runtime.define(test_class(Arc::clone(&runs)));
    let sink = Arc::new(RecordingSink::new());
    let trigger = Arc::new(trigger(&sink));

    let callers: Vec<_> = (0..2)
        .map(|_| {
            let trigger = Arc::clone(&trigger);
            let runtime = Arc::clone(&runtime);
            thread::spawn(move || {
                trigger
                    .fire(runtime, Duration::from_millis(50))
                    .unwrap()
                    .join()
                    .unwrap()
            })
        })
        .collect();

    let reports: Vec<_> = callers.into_iter().map(|c| c.join().unwrap()).collect();
    assert!(reports.iter().all(|r| r.outcome.invoked()));
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(runtime.count(|e| *e == SimEvent::Attach), 2);
    assert_eq!(runtime.count(|e| *e == SimEvent::Detach), 2);
    assert_eq!(sink.count(&TraceEvent::Runnable), 2);
    assert_eq!(trigger.spawned(), 2);
}

#[test]
fn test_no_readiness_no_invoke() {
    let runtime = Arc::new(SimRuntime::new());
    runtime.define(test_class(Arc::new(AtomicUsize::new(0))));
    let sink = Arc::new(RecordingSink::new());

    let handle = trigger(&sink).spawn_worker(Arc::clone(&runtime)).unwrap();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(runtime.invocations("run"), 0);
    assert!(!handle.is_finished());
    assert!(runtime.is_attached(handle.thread_id()));

    handle.signal().cancel();
    let report = handle.join().unwrap();
    assert!(matches!(report.outcome, WorkerOutcome::Cancelled { .. }));
    assert_eq!(runtime.invocations("run"), 0);
    assert_eq!(sink.count(&TraceEvent::Runnable), 0);
}

#[test]
fn test_load_then_fire_from_cache() {
    let cache = HandleCache::new();
    let runtime = SimRuntime::new();
    runtime.define(test_class(Arc::new(AtomicUsize::new(0))));

    let version = load::on_load(&cache, runtime).unwrap();
    assert!(version >= InterfaceVersion::REQUIRED);

    let sink = Arc::new(RecordingSink::new());
    let report = trigger(&sink)
        .fire_from_cache(&cache, Duration::from_millis(10))
        .unwrap()
        .join()
        .unwrap();
    assert!(report.outcome.invoked());
    assert_eq!(cache.get().unwrap().invocations("run"), 1);
}
