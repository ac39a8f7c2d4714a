//! Typed options over a hook-driven key-value store.
//!
//! Declare options with a type, default and constraints, add them to a
//! [`Registry`] and register it against a host. Afterwards every read of a
//! registered key is cast to its declared type and every write is wrapped
//! and validated, whoever performs it.
//!
//! ```
//! use std::sync::Arc;
//!
//! use optkit_host::{MemoryHost, OptionBackend};
//! use optkit_options::{Registry, SiteOption, Strictness, ValueType};
//! use serde_json::json;
//!
//! let host = Arc::new(MemoryHost::new());
//! let mut registry = Registry::new(Strictness::Coerce, host.clone());
//! registry.hook(host.hooks());
//! registry.add_option(SiteOption::new("count", ValueType::Integer)?.with_default(json!(1)));
//! registry.register(None)?;
//!
//! assert_eq!(host.get_option("count", None)?, json!(1));
//! host.update_option("count", json!("2"))?;
//! assert_eq!(host.get_option("count", None)?, json!(2));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! - [`cast`] - Per-type coercion under a [`Strictness`]
//! - [`sanitizer`] - Sentinel wrapping of values the store cannot keep
//! - [`resolver`] - Read-side unwrap and cast
//! - [`validator`] - Write-side constraints and type checks
//! - [`option`] - Option declarations
//! - [`registry`] - Binding declarations into the host

pub mod cast;
pub mod config;
pub mod constraint;
pub mod error;
pub mod option;
pub mod registry;
pub mod resolver;
pub mod sanitizer;
pub mod strict;
pub mod validator;
pub mod value;

pub use config::RegistryConfig;
pub use constraint::{Constraint, ConstraintChecker, Matches, NotBlank, OneOf, Range};
pub use error::{OptionError, TypeError};
pub use option::{AnyOption, ApiConfig, Network, NetworkOption, OptionDef, Scope, SettingArgs, Site, SiteOption};
pub use registry::{
	AddState, NetworkOptionRegistry, OptionRegistry, Registrable, Registry, RegistrySnapshot,
};
pub use resolver::OutputResolver;
pub use sanitizer::InputSanitizer;
pub use strict::Strictness;
pub use validator::InputValidator;
pub use value::{ValueType, runtime_type};
