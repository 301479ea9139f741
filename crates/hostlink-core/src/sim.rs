//! In-process simulated host runtime
//!
//! `SimRuntime` implements the host interface without a managed runtime:
//! classes are registered up front with closures as method bodies, and every
//! interface call is journaled with the OS thread that made it. Workers and
//! triggers can be driven end to end against it.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Instant;

use hostlink_sdk::{
    BridgeError, BridgeResult, ClassName, HostRuntime, MethodDescriptor, ThreadEnv,
    CONSTRUCTOR_NAME,
};
use parking_lot::{Mutex, RwLock};

/// Body of a simulated method. `Err` models a managed throwable.
pub type MethodBody = Arc<dyn Fn() -> Result<(), String> + Send + Sync>;

struct SimMethod {
    name: String,
    descriptor: MethodDescriptor,
    body: MethodBody,
}

/// A class known to a [`SimRuntime`].
pub struct SimClass {
    name: ClassName,
    methods: Vec<SimMethod>,
}

impl SimClass {
    /// Declare a class with no methods.
    pub fn new(name: &str) -> BridgeResult<Self> {
        Ok(Self {
            name: ClassName::new(name)?,
            methods: Vec::new(),
        })
    }

    /// Add a method with an explicit descriptor.
    pub fn with_method(
        mut self,
        name: &str,
        descriptor: MethodDescriptor,
        body: impl Fn() -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.methods.push(SimMethod {
            name: name.to_string(),
            descriptor,
            body: Arc::new(body),
        });
        self
    }

    /// Add a `()V` method.
    pub fn with_void_method(
        self,
        name: &str,
        body: impl Fn() -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.with_method(name, MethodDescriptor::void_no_args(), body)
    }

    /// Add a `()V` constructor that always succeeds.
    pub fn with_default_constructor(self) -> Self {
        self.with_void_method(CONSTRUCTOR_NAME, || Ok(()))
    }

    /// Class name.
    pub fn name(&self) -> &ClassName {
        &self.name
    }
}

/// One interface call observed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// Thread attached
    Attach,
    /// Thread detached
    Detach,
    /// Class lookup (internal name), successful or not
    FindClass(String),
    /// Method lookup, successful or not
    GetMethod(String),
    /// Object constructed (class internal name)
    NewObject(String),
    /// Method invoked
    Invoke(String),
    /// Method body raised
    Threw(String),
}

/// A journaled event with its thread and time.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    /// Thread that made the call
    pub thread: ThreadId,
    /// When the call was made
    pub at: Instant,
    /// What happened
    pub event: SimEvent,
}

/// Simulated runtime handle.
#[derive(Default)]
pub struct SimRuntime {
    classes: RwLock<HashMap<String, Arc<SimClass>>>,
    journal: Mutex<Vec<JournalEntry>>,
    attached: Mutex<HashSet<ThreadId>>,
    refuse_attach: AtomicBool,
    next_object: AtomicU64,
}

impl SimRuntime {
    /// Create a runtime with no classes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a class.
    pub fn define(&self, class: SimClass) {
        self.classes
            .write()
            .insert(class.name.internal().to_string(), Arc::new(class));
    }

    /// Make subsequent attach calls fail.
    pub fn refuse_attach(&self, refuse: bool) {
        self.refuse_attach.store(refuse, Ordering::Release);
    }

    /// Snapshot of the journal.
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.journal.lock().clone()
    }

    /// Events made from one thread, in order.
    pub fn events_on(&self, thread: ThreadId) -> Vec<SimEvent> {
        self.journal
            .lock()
            .iter()
            .filter(|e| e.thread == thread)
            .map(|e| e.event.clone())
            .collect()
    }

    /// Number of journaled events matching `pred`.
    pub fn count(&self, pred: impl Fn(&SimEvent) -> bool) -> usize {
        self.journal.lock().iter().filter(|e| pred(&e.event)).count()
    }

    /// Number of times `method` was invoked on any instance.
    pub fn invocations(&self, method: &str) -> usize {
        self.count(|e| matches!(e, SimEvent::Invoke(m) if m == method))
    }

    /// Whether `thread` is currently attached.
    pub fn is_attached(&self, thread: ThreadId) -> bool {
        self.attached.lock().contains(&thread)
    }

    fn record(&self, event: SimEvent) {
        self.journal.lock().push(JournalEntry {
            thread: thread::current().id(),
            at: Instant::now(),
            event,
        });
    }
}

/// Per-thread environment of a [`SimRuntime`]. Not `Send`.
pub struct SimEnv<'a> {
    runtime: &'a SimRuntime,
    thread: ThreadId,
    _not_send: PhantomData<*const ()>,
}

/// Method id: index into the owning class's method table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimMethodId(usize);

/// A constructed instance.
pub struct SimObject {
    class: Arc<SimClass>,
    id: u64,
}

impl SimObject {
    /// Instance id, unique per runtime.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl HostRuntime for SimRuntime {
    type Env<'a> = SimEnv<'a>;

    fn attach_current_thread(&self) -> BridgeResult<SimEnv<'_>> {
        if self.refuse_attach.load(Ordering::Acquire) {
            return Err(BridgeError::AttachFailed("attach refused".to_string()));
        }
        let thread = thread::current().id();
        if !self.attached.lock().insert(thread) {
            return Err(BridgeError::AttachFailed(format!(
                "{:?} is already attached",
                thread
            )));
        }
        self.record(SimEvent::Attach);
        Ok(SimEnv {
            runtime: self,
            thread,
            _not_send: PhantomData,
        })
    }
}

impl SimEnv<'_> {
    fn check_thread(&self) -> BridgeResult<()> {
        if thread::current().id() != self.thread {
            return Err(BridgeError::Host(format!(
                "environment of {:?} used from {:?}",
                self.thread,
                thread::current().id()
            )));
        }
        Ok(())
    }
}

impl ThreadEnv for SimEnv<'_> {
    type Class = Arc<SimClass>;
    type Method = SimMethodId;
    type Instance = SimObject;

    fn find_class(&mut self, name: &ClassName) -> BridgeResult<Arc<SimClass>> {
        self.check_thread()?;
        self.runtime
            .record(SimEvent::FindClass(name.internal().to_string()));
        self.runtime
            .classes
            .read()
            .get(name.internal())
            .cloned()
            .ok_or_else(|| BridgeError::ClassNotFound(name.internal().to_string()))
    }

    fn get_method_id(
        &mut self,
        class: &Arc<SimClass>,
        name: &str,
        descriptor: &MethodDescriptor,
    ) -> BridgeResult<SimMethodId> {
        self.check_thread()?;
        self.runtime.record(SimEvent::GetMethod(name.to_string()));
        class
            .methods
            .iter()
            .position(|m| m.name == name && &m.descriptor == descriptor)
            .map(SimMethodId)
            .ok_or_else(|| BridgeError::MethodNotFound {
                class: class.name.internal().to_string(),
                name: name.to_string(),
                descriptor: descriptor.to_string(),
            })
    }

    fn new_object(&mut self, class: &Arc<SimClass>, ctor: SimMethodId) -> BridgeResult<SimObject> {
        self.check_thread()?;
        let method = class.methods.get(ctor.0).ok_or_else(|| {
            BridgeError::Host(format!("stale constructor id {:?}", ctor))
        })?;
        (method.body)().map_err(|reason| BridgeError::InstantiationFailed {
            class: class.name.internal().to_string(),
            reason,
        })?;
        self.runtime
            .record(SimEvent::NewObject(class.name.internal().to_string()));
        Ok(SimObject {
            class: Arc::clone(class),
            id: self.runtime.next_object.fetch_add(1, Ordering::Relaxed),
        })
    }

    fn call_void_method(&mut self, instance: &SimObject, method: SimMethodId) -> BridgeResult<()> {
        self.check_thread()?;
        let m = instance.class.methods.get(method.0).ok_or_else(|| {
            BridgeError::Host(format!("stale method id {:?}", method))
        })?;
        self.runtime.record(SimEvent::Invoke(m.name.clone()));
        (m.body)().map_err(|msg| {
            self.runtime.record(SimEvent::Threw(msg.clone()));
            BridgeError::Throwable(msg)
        })
    }
}

impl Drop for SimEnv<'_> {
    fn drop(&mut self) {
        self.runtime.attached.lock().remove(&self.thread);
        self.runtime.record(SimEvent::Detach);
    }
}
