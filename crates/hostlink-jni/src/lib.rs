//! hostlink-jni: JVM native library
//!
//! Loaded by `System.loadLibrary` from `com.firelord.Test`. The JVM calls
//! [`JNI_OnLoad`] once, which caches the VM handle; every call of the Java
//! native method `start0()` lands in [`Java_com_firelord_Test_start0`], which
//! spawns an attachment worker and releases it after the configured delay.

#![warn(missing_docs)]

mod runtime;

pub use runtime::{JniClass, JniRuntime, JniThreadEnv};

use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use hostlink_core::sdk::{BridgeError, BridgeResult};
use hostlink_core::tunables::TunablesRegistry;
use hostlink_core::{
    load, panic_message, BridgeConfig, HandleCache, StdoutSink, Trigger, WorkerRegistry,
};
use jni::objects::JObject;
use jni::sys::{jint, JNI_ERR};
use jni::JNIEnv;
use once_cell::sync::Lazy;

/// VM handle published by [`JNI_OnLoad`].
static RUNTIME: HandleCache<JniRuntime> = HandleCache::new();

static TRIGGER: Lazy<Trigger> =
    Lazy::new(|| Trigger::new(BridgeConfig::default(), Arc::new(StdoutSink)));

static WORKERS: Lazy<WorkerRegistry> = Lazy::new(WorkerRegistry::new);

fn init_logging() {
    // The host may already have installed a logger
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

fn start() -> BridgeResult<()> {
    for report in WORKERS.reap() {
        log::debug!("reaped worker: {:?}", report.outcome);
    }
    let handle = TRIGGER.fire_from_cache(&RUNTIME, TRIGGER.config().trigger_delay)?;
    WORKERS.track(handle);
    Ok(())
}

/// Library load hook.
///
/// Returns `JNI_VERSION_1_8`, or `JNI_ERR` when the VM pointer is null or a
/// VM handle was already published.
///
/// # Safety
/// `vm` must be null or the `JavaVM*` the JVM passes to a loaded library.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn JNI_OnLoad(
    vm: *mut jni::sys::JavaVM,
    _reserved: *mut c_void,
) -> jint {
    init_logging();

    let runtime = match JniRuntime::from_raw(vm) {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("JNI_OnLoad: {}", e);
            return JNI_ERR;
        }
    };
    if let Err(e) = TRIGGER.config().validate() {
        log::warn!("default configuration rejected: {}", e);
    }
    match load::on_load(&RUNTIME, runtime) {
        Ok(version) => {
            let tunables = TunablesRegistry::solaris();
            log::debug!("{} {} tunables registered", tunables.len(), tunables.platform());
            version.raw()
        }
        Err(e) => {
            log::error!("JNI_OnLoad: {}", e);
            JNI_ERR
        }
    }
}

/// `private native void start0()` on `com.firelord.Test`.
///
/// Blocks the calling Java thread for the trigger delay. Failures surface as
/// a thrown `java.lang.RuntimeException`.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_firelord_Test_start0<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    let result = panic::catch_unwind(AssertUnwindSafe(start))
        .unwrap_or_else(|payload| Err(BridgeError::Host(panic_message(payload.as_ref()))));

    if let Err(e) = result {
        log::error!("start0 failed: {}", e);
        if env.throw_new("java/lang/RuntimeException", e.to_string()).is_err() {
            log::error!("could not raise RuntimeException");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_before_load_is_not_loaded() {
        assert!(!RUNTIME.is_loaded());
        assert!(matches!(start(), Err(BridgeError::NotLoaded)));
        assert!(WORKERS.is_empty());
    }
}
