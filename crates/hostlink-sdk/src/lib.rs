//! Hostlink SDK - host-runtime foreign interface for native modules
//!
//! This crate provides the minimal types and traits a native module needs to
//! call back into the managed runtime that loaded it, without depending on a
//! particular binding.
//!
//! # Example
//!
//! ```ignore
//! use hostlink_sdk::{ClassName, HostRuntime, MethodDescriptor, ThreadEnv};
//!
//! fn call_run<R: HostRuntime>(runtime: &R) -> hostlink_sdk::BridgeResult<()> {
//!     let mut env = runtime.attach_current_thread()?;
//!     let class = env.find_class(&ClassName::new("com.firelord.Test")?)?;
//!     let void = MethodDescriptor::void_no_args();
//!     let ctor = env.get_method_id(&class, "<init>", &void)?;
//!     let run = env.get_method_id(&class, "run", &void)?;
//!     let obj = env.new_object(&class, ctor)?;
//!     env.call_void_method(&obj, run)
//! }
//! ```

#![warn(missing_docs)]

pub mod class_name;
pub mod descriptor;
pub mod env;
pub mod error;
pub mod version;

pub use class_name::ClassName;
pub use descriptor::{FieldType, MethodDescriptor};
pub use env::{HostRuntime, ThreadEnv};
pub use error::{BridgeError, BridgeResult};
pub use version::InterfaceVersion;

/// Name under which the host resolves constructors.
pub const CONSTRUCTOR_NAME: &str = "<init>";
