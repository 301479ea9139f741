//! Bridge configuration: target method and handshake timing.

use std::time::Duration;

use hostlink_sdk::{BridgeError, ClassName, MethodDescriptor, CONSTRUCTOR_NAME};

use crate::defaults::{
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_TARGET_CLASS, DEFAULT_TARGET_METHOD,
    DEFAULT_TRIGGER_DELAY_MS, VOID_NO_ARGS,
};

/// Errors from building or validating a [`BridgeConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Class name or descriptor failed to parse
    #[error("Invalid target: {0}")]
    Target(#[from] BridgeError),

    /// Only no-argument, void-returning methods can be driven by a worker
    #[error("Method {method}{descriptor} must take no arguments and return void")]
    UnsupportedSignature {
        /// Method name
        method: String,
        /// Offending descriptor
        descriptor: String,
    },

    /// Method name is empty or names the constructor
    #[error("Invalid method name '{0}'")]
    InvalidMethodName(String),

    /// Poll interval must be non-zero
    #[error("Poll interval must be greater than zero")]
    ZeroPollInterval,

    /// A readiness bound, when given, must be non-zero
    #[error("Readiness timeout must be greater than zero")]
    ZeroReadinessTimeout,
}

/// The managed class and method a worker resolves and invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    class: ClassName,
    method_name: String,
    ctor_descriptor: MethodDescriptor,
    method_descriptor: MethodDescriptor,
}

impl TargetSpec {
    /// Target a no-argument void method on `class`.
    pub fn new(class: &str, method_name: &str) -> Result<Self, ConfigError> {
        Self::with_descriptors(class, method_name, VOID_NO_ARGS, VOID_NO_ARGS)
    }

    /// Target with explicit descriptors; both must be `()V`-shaped.
    pub fn with_descriptors(
        class: &str,
        method_name: &str,
        ctor_descriptor: &str,
        method_descriptor: &str,
    ) -> Result<Self, ConfigError> {
        if method_name.is_empty() || method_name == CONSTRUCTOR_NAME {
            return Err(ConfigError::InvalidMethodName(method_name.to_string()));
        }
        let class = ClassName::new(class)?;
        let ctor_descriptor = MethodDescriptor::parse(ctor_descriptor)?;
        let method_descriptor = MethodDescriptor::parse(method_descriptor)?;
        for (name, desc) in [
            (CONSTRUCTOR_NAME, &ctor_descriptor),
            (method_name, &method_descriptor),
        ] {
            if !desc.is_void() || desc.arg_count() != 0 {
                return Err(ConfigError::UnsupportedSignature {
                    method: name.to_string(),
                    descriptor: desc.to_string(),
                });
            }
        }
        Ok(Self {
            class,
            method_name: method_name.to_string(),
            ctor_descriptor,
            method_descriptor,
        })
    }

    /// Class to resolve.
    pub fn class(&self) -> &ClassName {
        &self.class
    }

    /// Instance method to invoke.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Constructor descriptor.
    pub fn ctor_descriptor(&self) -> &MethodDescriptor {
        &self.ctor_descriptor
    }

    /// Instance method descriptor.
    pub fn method_descriptor(&self) -> &MethodDescriptor {
        &self.method_descriptor
    }
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self {
            class: DEFAULT_TARGET_CLASS,
            method_name: DEFAULT_TARGET_METHOD.to_string(),
            ctor_descriptor: MethodDescriptor::void_no_args(),
            method_descriptor: MethodDescriptor::void_no_args(),
        }
    }
}

/// Configuration shared by the trigger and the workers it spawns.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// What the worker resolves and invokes
    pub target: TargetSpec,
    /// How long the trigger waits before raising readiness
    pub trigger_delay: Duration,
    /// Pacing of the worker's INITIALIZED trace while waiting
    pub poll_interval: Duration,
    /// Upper bound on the worker's wait; `None` waits forever
    pub readiness_timeout: Option<Duration>,
    /// Worker thread stack size; `None` uses the platform default
    pub worker_stack_size: Option<usize>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            target: TargetSpec::default(),
            trigger_delay: Duration::from_millis(DEFAULT_TRIGGER_DELAY_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            readiness_timeout: None,
            worker_stack_size: None,
        }
    }
}

impl BridgeConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the target.
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.target = target;
        self
    }

    /// Set the trigger delay.
    pub fn with_trigger_delay(mut self, delay: Duration) -> Self {
        self.trigger_delay = delay;
        self
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bound the worker's wait for readiness.
    pub fn with_readiness_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.readiness_timeout = timeout;
        self
    }

    /// Set the worker thread's stack size in bytes.
    pub fn with_worker_stack_size(mut self, bytes: usize) -> Self {
        self.worker_stack_size = Some(bytes);
        self
    }

    /// Check the timing parameters.
    ///
    /// A poll interval at or above the trigger delay is allowed but produces
    /// no INITIALIZED traces, so it is only warned about.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.readiness_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroReadinessTimeout);
        }
        if self.poll_interval >= self.trigger_delay {
            log::warn!(
                "poll interval {:?} is not shorter than trigger delay {:?}",
                self.poll_interval,
                self.trigger_delay
            );
        }
        Ok(())
    }
}
