//! Default constants for bridge configuration.

use hostlink_sdk::ClassName;

/// Managed class that provides the trigger method and receives the callback.
pub const DEFAULT_TARGET_CLASS: ClassName = ClassName::from_static("com/firelord/Test");

/// Instance method invoked once the worker is released.
pub const DEFAULT_TARGET_METHOD: &str = "run";

/// Descriptor of a no-argument, void-returning method.
pub const VOID_NO_ARGS: &str = "()V";

/// How long the trigger holds the worker in its initializing phase.
pub const DEFAULT_TRIGGER_DELAY_MS: u64 = 5_000;

/// Pacing of the worker's "still initializing" trace while it waits.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Prefix for worker thread names; a sequence number is appended.
pub const WORKER_THREAD_PREFIX: &str = "hostlink-worker";
