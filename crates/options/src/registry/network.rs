use std::sync::Arc;

use optkit_host::{BoxError, Hook, NetworkBackend};
use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;
use serde_json::Value;

use super::{Registrable, boxed, first, prefixed};
use crate::error::OptionError;
use crate::option::NetworkOption;
use crate::resolver::OutputResolver;
use crate::sanitizer::InputSanitizer;
use crate::strict::Strictness;
use crate::validator::InputValidator;

/// Progress of an add operation on one storage key.
///
/// The host runs `default_site_option_<key>` both for a read of an absent
/// key and for the existence probe inside an add. While a key is
/// [`AddState::Adding`] the default callback hands the probe's own default
/// back untouched. The key returns to [`AddState::Idle`] as soon as the probe
/// is answered, whether or not the add goes ahead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddState {
	#[default]
	Idle,
	Adding,
}

type States = Arc<Mutex<HashMap<String, AddState>>>;

/// Binds one network option into a multisite host.
pub struct NetworkOptionRegistry {
	option: NetworkOption,
	name: String,
	strict: Strictness,
	backend: Arc<dyn NetworkBackend>,
	hook: Option<Hook>,
	states: States,
}

impl NetworkOptionRegistry {
	pub fn new(option: NetworkOption, strict: Strictness, backend: Arc<dyn NetworkBackend>) -> Self {
		let name = option.name().to_string();
		Self {
			option,
			name,
			strict,
			backend,
			hook: None,
			states: States::default(),
		}
	}

	pub fn with_prefix(mut self, prefix: &str) -> Self {
		self.name = prefixed(prefix, self.option.name());
		self
	}

	pub fn hook(&mut self, hook: Hook) {
		self.hook = Some(hook);
	}

	pub fn option(&self) -> &NetworkOption {
		&self.option
	}

	pub fn add_state(&self) -> AddState {
		self.states.lock().get(&self.name).copied().unwrap_or_default()
	}
}

impl Registrable for NetworkOptionRegistry {
	fn name(&self) -> &str {
		&self.name
	}

	fn register(&mut self) -> Result<(), OptionError> {
		if !self.backend.is_multisite() {
			tracing::warn!(domain = "options", name = %self.name, "network option skipped on single-site host");
			return Ok(());
		}
		let hook = self
			.hook
			.as_ref()
			.ok_or_else(|| OptionError::MissingHook(self.name.clone()))?;

		let name = self.name.clone();
		let priority = self.option.priority();
		let resolver = OutputResolver::new(self.option.value_type(), self.strict);
		let validator = Arc::new(InputValidator::new(
			name.clone(),
			self.option.value_type(),
			self.strict,
			self.option.constraints().to_vec(),
		));

		{
			let validator = validator.clone();
			let states = self.states.clone();
			let name = name.clone();
			hook.add_filter(
				&format!("pre_add_site_option_{name}"),
				priority,
				1,
				move |args: &[Value]| -> Result<Value, BoxError> {
					let value = first(args);
					validator.validate(&value).map_err(boxed)?;
					states.lock().insert(name.clone(), AddState::Adding);
					Ok(InputSanitizer.sanitize(value))
				},
			);
		}

		hook.add_filter(
			&format!("pre_update_site_option_{name}"),
			priority,
			1,
			move |args: &[Value]| -> Result<Value, BoxError> {
				let value = first(args);
				validator.validate(&value).map_err(boxed)?;
				Ok(InputSanitizer.sanitize(value))
			},
		);

		{
			let states = self.states.clone();
			let name = name.clone();
			hook.add_action(
				&format!("add_site_option_{name}"),
				priority,
				0,
				move |_: &[Value]| -> Result<(), BoxError> {
					states.lock().remove(&name);
					Ok(())
				},
			);
		}

		{
			let states = self.states.clone();
			let backend = Arc::downgrade(&self.backend);
			let declared = self.option.default_value().clone();
			let name = name.clone();
			hook.add_filter(
				&format!("default_site_option_{name}"),
				priority,
				1,
				move |args: &[Value]| -> Result<Value, BoxError> {
					let default = first(args);
					// This is the add's own existence check; answering it ends the add.
					if states.lock().remove(&name) == Some(AddState::Adding) {
						return Ok(default);
					}
					if !backend.upgrade().is_some_and(|b| b.is_not_option(&name)) {
						return Ok(default);
					}
					// `false` is the host's own "no default given".
					let default = match default {
						Value::Bool(false) => declared.clone(),
						other => other,
					};
					resolver.resolve(default).map_err(boxed)
				},
			);
		}

		{
			let states = self.states.clone();
			let backend = Arc::downgrade(&self.backend);
			let name = name.clone();
			hook.add_filter(
				&format!("site_option_{name}"),
				priority,
				1,
				move |args: &[Value]| -> Result<Value, BoxError> {
					// Every read ends here, including the check an add runs
					// against a key that already exists.
					states.lock().remove(&name);
					let value = first(args);
					if backend.upgrade().is_some_and(|b| b.is_not_option(&name)) {
						return Ok(value);
					}
					resolver.resolve(value).map_err(boxed)
				},
			);
		}

		tracing::debug!(
			domain = "options",
			name = %name,
			priority,
			strict = self.strict.is_strict(),
			network = self.backend.network_id(),
			"network option registered"
		);
		Ok(())
	}

	fn deregister(&mut self) -> Result<(), OptionError> {
		if !self.backend.is_multisite() {
			tracing::warn!(domain = "options", name = %self.name, "network option skipped on single-site host");
			return Ok(());
		}
		let hook = self
			.hook
			.as_ref()
			.ok_or_else(|| OptionError::MissingHook(self.name.clone()))?;

		let removed = hook.deregister();
		self.states.lock().remove(&self.name);
		self.backend
			.delete_site_option(&self.name)
			.map_err(OptionError::from_host)?;

		tracing::debug!(domain = "options", name = %self.name, removed, "network option deregistered");
		Ok(())
	}
}
