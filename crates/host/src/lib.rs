//! Host collaborators for the option registry.
//!
//! The option core never touches storage or dispatch directly. It binds
//! callbacks to named extension points through [`Hook`] and reads or writes
//! values through the [`OptionBackend`] and [`NetworkBackend`] contracts.
//!
//! # Modules
//!
//! - [`hooks`] - Filter/action dispatch ordered by priority
//! - [`backend`] - Storage contracts consumed by the option core
//! - [`memory`] - In-process host that follows the CMS extension-point sequence
//!
//! # Preconditions
//!
//! Dispatch is synchronous and runs on the caller's thread. A request is
//! expected to be served by one thread of control at a time; callbacks may
//! re-enter the host (read an option from inside a filter) but the host does
//! not serialize concurrent requests.

pub mod backend;
pub mod error;
pub mod hooks;
pub mod memory;

pub use backend::{NetworkBackend, OptionBackend, RegisteredSetting};
pub use error::{BoxError, HostError};
pub use hooks::{Action, Filter, Hook, HookId, Hooks};
pub use memory::MemoryHost;
pub use serde_json::Value;
