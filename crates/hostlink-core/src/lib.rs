//! hostlink-core: native thread attachment and deferred invocation
//!
//! A native module loaded into a managed runtime spawns an OS thread that
//! attaches itself to the runtime, resolves a managed class and its methods,
//! constructs an instance, waits until the thread that spawned it raises a
//! readiness signal, and then calls the instance method.
//!
//! - [`load::on_load`] publishes the runtime handle into a [`HandleCache`]
//! - [`Trigger`] spawns an [`AttachmentWorker`] and releases it after a delay
//! - [`ReadinessSignal`] is the one-shot handshake between the two
//! - [`sim::SimRuntime`] drives the whole cycle in-process
//! - [`tunables`] holds the platform flag tables

#![warn(missing_docs)]

pub mod config;
pub mod defaults;
pub mod handle_cache;
pub mod load;
pub mod readiness;
pub mod registry;
pub mod sim;
pub mod trace;
pub mod trigger;
pub mod tunables;
pub mod worker;

pub use config::{BridgeConfig, ConfigError, TargetSpec};
pub use handle_cache::HandleCache;
pub use readiness::{ReadinessSignal, SignalState};
pub use registry::WorkerRegistry;
pub use trace::{RecordingSink, StdoutSink, TraceEvent, TraceSink};
pub use trigger::{panic_message, Trigger, WorkerHandle};
pub use worker::{AttachmentWorker, ResolveStage, WorkerOutcome, WorkerReport, WorkerState};

pub use hostlink_sdk as sdk;
