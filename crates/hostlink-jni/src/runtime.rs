//! JVM binding of the host interface traits

use hostlink_sdk::{BridgeError, BridgeResult, ClassName, HostRuntime, MethodDescriptor, ThreadEnv};
use jni::errors::Error as JniError;
use jni::objects::{JClass, JMethodID, JObject, JString};
use jni::signature::{Primitive, ReturnType};
use jni::{AttachGuard, JavaVM};

/// Process-wide JVM handle.
pub struct JniRuntime {
    vm: JavaVM,
}

impl JniRuntime {
    /// Wrap the raw `JavaVM*` handed to the load hook.
    ///
    /// # Safety
    /// `ptr` must be the VM pointer the JVM passed to this library.
    pub unsafe fn from_raw(ptr: *mut jni::sys::JavaVM) -> BridgeResult<Self> {
        JavaVM::from_raw(ptr)
            .map(|vm| Self { vm })
            .map_err(|e| BridgeError::Host(format!("invalid JavaVM pointer: {}", e)))
    }

    /// Wrap an existing VM handle.
    pub fn from_vm(vm: JavaVM) -> Self {
        Self { vm }
    }
}

impl HostRuntime for JniRuntime {
    type Env<'a> = JniThreadEnv<'a>;

    fn attach_current_thread(&self) -> BridgeResult<JniThreadEnv<'_>> {
        let guard = self
            .vm
            .attach_current_thread()
            .map_err(|e| BridgeError::AttachFailed(e.to_string()))?;
        Ok(JniThreadEnv { guard })
    }
}

/// Resolved class together with the name it was found under.
pub struct JniClass<'a> {
    class: JClass<'a>,
    name: String,
}

/// Attached JVM thread. Detaches when dropped.
pub struct JniThreadEnv<'a> {
    guard: AttachGuard<'a>,
}

impl JniThreadEnv<'_> {
    /// Clear any pending exception and render it with `toString()`.
    fn take_throwable(&mut self) -> Option<String> {
        let env = &mut *self.guard;
        if !env.exception_check().unwrap_or(false) {
            return None;
        }
        let throwable = match env.exception_occurred() {
            Ok(t) => t,
            Err(e) => {
                let _ = env.exception_clear();
                return Some(format!("<unavailable: {}>", e));
            }
        };
        let _ = env.exception_clear();

        let rendered = env
            .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])
            .and_then(|v| v.l());
        let text = match rendered {
            Ok(obj) => {
                let s = JString::from(obj);
                let text = env.get_string(&s).map(String::from);
                text.unwrap_or_else(|e| format!("<unavailable: {}>", e))
            }
            Err(e) => format!("<unavailable: {}>", e),
        };
        // toString itself may have thrown
        let _ = env.exception_clear();
        Some(text)
    }

    /// Map a failed call, pulling the pending exception when there is one.
    ///
    /// Any pending exception is cleared whatever `err` is, so the env stays
    /// usable for the next call.
    fn fail(&mut self, err: JniError, or_else: impl FnOnce(String) -> BridgeError) -> BridgeError {
        match self.take_throwable() {
            Some(text) => or_else(text),
            None => or_else(err.to_string()),
        }
    }
}

impl<'a> ThreadEnv for JniThreadEnv<'a> {
    type Class = JniClass<'a>;
    type Method = JMethodID;
    type Instance = JObject<'a>;

    fn find_class(&mut self, name: &ClassName) -> BridgeResult<JniClass<'a>> {
        match self.guard.find_class(name.internal()) {
            Ok(class) => Ok(JniClass {
                class,
                name: name.internal().to_string(),
            }),
            Err(e) => {
                let internal = name.internal().to_string();
                Err(self.fail(e, |why| {
                    log::debug!("find_class({}) failed: {}", internal, why);
                    BridgeError::ClassNotFound(internal)
                }))
            }
        }
    }

    fn get_method_id(
        &mut self,
        class: &JniClass<'a>,
        name: &str,
        descriptor: &MethodDescriptor,
    ) -> BridgeResult<JMethodID> {
        let sig = descriptor.to_string();
        match self.guard.get_method_id(&class.class, name, &sig) {
            Ok(id) => Ok(id),
            Err(e) => Err(self.fail(e, |why| {
                log::debug!("get_method_id({}{}) failed: {}", name, sig, why);
                BridgeError::MethodNotFound {
                    class: class.name.clone(),
                    name: name.to_string(),
                    descriptor: sig.clone(),
                }
            })),
        }
    }

    fn new_object(&mut self, class: &JniClass<'a>, ctor: JMethodID) -> BridgeResult<JObject<'a>> {
        // SAFETY: `ctor` was resolved against `class` with a `()V` descriptor
        // and no arguments are passed.
        let result = unsafe { self.guard.new_object_unchecked(&class.class, ctor, &[]) };
        result.map_err(|e| {
            self.fail(e, |reason| BridgeError::InstantiationFailed {
                class: class.name.clone(),
                reason,
            })
        })
    }

    fn call_void_method(&mut self, instance: &JObject<'a>, method: JMethodID) -> BridgeResult<()> {
        // SAFETY: `method` was resolved on the instance's class with a `()V`
        // descriptor, matching the void return type and empty argument list.
        let result = unsafe {
            self.guard.call_method_unchecked(
                instance,
                method,
                ReturnType::Primitive(Primitive::Void),
                &[],
            )
        };
        match result {
            Ok(_) => Ok(()),
            Err(e) => match self.take_throwable() {
                Some(text) => Err(BridgeError::Throwable(text)),
                None => Err(BridgeError::Host(e.to_string())),
            },
        }
    }
}
