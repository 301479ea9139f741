//! HostRuntime / ThreadEnv traits — abstract foreign invocation interface
//!
//! Defines the operations a native module needs from the managed runtime that
//! loaded it. The JVM binding lives in `hostlink-jni`; `hostlink-core` also
//! ships an in-process implementation for exercising workers without a JVM.

use crate::class_name::ClassName;
use crate::descriptor::MethodDescriptor;
use crate::error::BridgeResult;

/// Handle to the managed runtime that loaded the native module.
///
/// Valid for the lifetime of the process once published. Shared across
/// threads; per-thread access goes through [`HostRuntime::attach_current_thread`].
pub trait HostRuntime: Send + Sync {
    /// Per-thread environment. Dropping it detaches the thread.
    type Env<'a>: ThreadEnv
    where
        Self: 'a;

    /// Attach the calling OS thread and return its environment.
    ///
    /// The returned guard is the only way to call into the runtime from this
    /// thread; detach happens when it is dropped, on every exit path.
    fn attach_current_thread(&self) -> BridgeResult<Self::Env<'_>>;
}

/// Per-thread accessor to the managed runtime.
///
/// References produced here (`Class`, `Method`, `Instance`) are only valid
/// inside the attach scope that produced them.
pub trait ThreadEnv {
    /// Resolved class reference
    type Class;
    /// Resolved method id
    type Method: Copy;
    /// Constructed instance reference
    type Instance;

    /// Resolve a class by fully-qualified name.
    fn find_class(&mut self, name: &ClassName) -> BridgeResult<Self::Class>;

    /// Resolve an instance method (or constructor, named `<init>`).
    fn get_method_id(
        &mut self,
        class: &Self::Class,
        name: &str,
        descriptor: &MethodDescriptor,
    ) -> BridgeResult<Self::Method>;

    /// Construct an instance with a no-argument constructor.
    fn new_object(
        &mut self,
        class: &Self::Class,
        ctor: Self::Method,
    ) -> BridgeResult<Self::Instance>;

    /// Invoke a no-argument, void-returning instance method.
    ///
    /// A throwable raised by managed code is cleared from the thread and
    /// returned as [`BridgeError::Throwable`](crate::BridgeError::Throwable).
    fn call_void_method(
        &mut self,
        instance: &Self::Instance,
        method: Self::Method,
    ) -> BridgeResult<()>;
}
