//! Binding option declarations into the host.
//!
//! A [`Registry`] owns a list of declarations. [`Registry::register`] creates
//! one sub-registry per declaration ([`OptionRegistry`] for site options,
//! [`NetworkOptionRegistry`] for network options), and each sub-registry binds
//! the sanitizer, validator and resolver to the host's extension points for
//! its storage key. From then on every read and write of that key, by anyone,
//! goes through the pipeline.

mod network;
mod site;

use std::sync::Arc;

use indexmap::IndexMap;
use optkit_host::{BoxError, Hook, Hooks, NetworkBackend, OptionBackend};
use serde::Serialize;
use serde_json::Value;

pub use self::network::{AddState, NetworkOptionRegistry};
pub use self::site::OptionRegistry;
use crate::config::RegistryConfig;
use crate::error::OptionError;
use crate::option::AnyOption;
use crate::strict::Strictness;

/// Something that can bind itself into the host and later unbind.
pub trait Registrable {
	/// Storage key, prefix included.
	fn name(&self) -> &str;

	fn register(&mut self) -> Result<(), OptionError>;

	/// Removes every binding made by [`Registrable::register`] and deletes
	/// the stored value.
	fn deregister(&mut self) -> Result<(), OptionError>;
}

/// Live values of every registered option, keyed by storage name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistrySnapshot {
	#[serde(skip_serializing_if = "IndexMap::is_empty")]
	pub options: IndexMap<String, Value>,
	#[serde(skip_serializing_if = "IndexMap::is_empty")]
	pub network_options: IndexMap<String, Value>,
}

/// Aggregates option declarations sharing one strictness level and prefix.
pub struct Registry {
	strict: Strictness,
	prefix: String,
	hooks: Option<Arc<Hooks>>,
	site: Arc<dyn OptionBackend>,
	network: Arc<dyn NetworkBackend>,
	options: Vec<AnyOption>,
	site_registries: IndexMap<String, OptionRegistry>,
	network_registries: IndexMap<String, NetworkOptionRegistry>,
}

impl Registry {
	pub fn new<B>(strict: Strictness, backend: Arc<B>) -> Self
	where
		B: OptionBackend + NetworkBackend + 'static,
	{
		Self {
			strict,
			prefix: String::new(),
			hooks: None,
			site: backend.clone(),
			network: backend,
			options: Vec::new(),
			site_registries: IndexMap::new(),
			network_registries: IndexMap::new(),
		}
	}

	pub fn from_config<B>(config: &RegistryConfig, backend: Arc<B>) -> Self
	where
		B: OptionBackend + NetworkBackend + 'static,
	{
		let mut registry = Self::new(config.strict, backend);
		registry.set_prefix(&config.prefix);
		registry
	}

	pub fn strictness(&self) -> Strictness {
		self.strict
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	/// Sets the prefix prepended to every storage key. Applies to options
	/// registered afterwards.
	pub fn set_prefix(&mut self, prefix: &str) {
		self.prefix = prefix.trim().to_string();
	}

	/// Attaches the dispatcher sub-registries bind into.
	pub fn hook(&mut self, hooks: Arc<Hooks>) {
		self.hooks = Some(hooks);
	}

	pub fn add_option(&mut self, option: impl Into<AnyOption>) {
		self.options.push(option.into());
	}

	pub fn add_options<I>(&mut self, options: I)
	where
		I: IntoIterator,
		I::Item: Into<AnyOption>,
	{
		self.options.extend(options.into_iter().map(Into::into));
	}

	pub fn options(&self) -> &[AnyOption] {
		&self.options
	}

	/// Storage names of the live sub-registries, site options first.
	pub fn registered_names(&self) -> Vec<&str> {
		self.site_registries
			.values()
			.map(Registrable::name)
			.chain(self.network_registries.values().map(Registrable::name))
			.collect()
	}

	/// Registers every declaration. Site options are also declared on the
	/// host's settings surface under `setting_group`, when given.
	pub fn register(&mut self, setting_group: Option<&str>) -> Result<(), OptionError> {
		let hooks = self
			.hooks
			.clone()
			.ok_or_else(|| OptionError::MissingHook(self.prefix.clone()))?;

		for option in &self.options {
			match option {
				AnyOption::Site(option) => {
					if self.site_registries.contains_key(option.name()) {
						tracing::warn!(domain = "options", name = option.name(), "already registered");
						continue;
					}
					let mut registry = OptionRegistry::new(option.clone(), self.strict, self.site.clone())
						.with_prefix(&self.prefix)
						.with_setting_group(setting_group);
					registry.hook(Hook::new(hooks.clone()));
					registry.register()?;
					self.site_registries.insert(option.name().to_string(), registry);
				}
				AnyOption::Network(option) => {
					if self.network_registries.contains_key(option.name()) {
						tracing::warn!(domain = "options", name = option.name(), "already registered");
						continue;
					}
					let mut registry =
						NetworkOptionRegistry::new(option.clone(), self.strict, self.network.clone())
							.with_prefix(&self.prefix);
					registry.hook(Hook::new(hooks.clone()));
					registry.register()?;
					self.network_registries.insert(option.name().to_string(), registry);
				}
			}
		}
		Ok(())
	}

	/// Tears down every live sub-registry and deletes the stored values.
	pub fn deregister(&mut self, setting_group: Option<&str>) -> Result<(), OptionError> {
		for option in &self.options {
			match option {
				AnyOption::Site(option) => {
					let Some(mut registry) = self.site_registries.shift_remove(option.name()) else {
						tracing::warn!(domain = "options", name = option.name(), "not registered");
						continue;
					};
					// Without an explicit group, the one used at registration applies.
					if setting_group.is_some() {
						registry.set_setting_group(setting_group);
					}
					registry.deregister()?;
					self.site
						.delete_option(registry.name())
						.map_err(OptionError::from_host)?;
				}
				AnyOption::Network(option) => {
					let Some(mut registry) = self.network_registries.shift_remove(option.name()) else {
						tracing::warn!(domain = "options", name = option.name(), "not registered");
						continue;
					};
					registry.deregister()?;
				}
			}
		}
		Ok(())
	}

	/// Reads the current value of every registered option through the host.
	pub fn snapshot(&self) -> Result<RegistrySnapshot, OptionError> {
		let mut snapshot = RegistrySnapshot::default();
		for registry in self.site_registries.values() {
			let value = self
				.site
				.get_option(registry.name(), None)
				.map_err(OptionError::from_host)?;
			snapshot.options.insert(registry.name().to_string(), value);
		}
		for registry in self.network_registries.values() {
			let value = self
				.network
				.get_site_option(registry.name(), None)
				.map_err(OptionError::from_host)?;
			snapshot.network_options.insert(registry.name().to_string(), value);
		}
		Ok(snapshot)
	}
}

/// Storage key for `name` under `prefix`.
fn prefixed(prefix: &str, name: &str) -> String {
	format!("{}{name}", prefix.trim())
}

/// First callback argument, `null` when absent.
fn first(args: &[Value]) -> Value {
	args.first().cloned().unwrap_or_default()
}

fn boxed(err: impl Into<OptionError>) -> BoxError {
	Box::new(err.into())
}
