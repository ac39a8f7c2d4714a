use std::sync::Arc;

use optkit_host::{BoxError, Filter, Hook, OptionBackend};
use serde_json::Value;

use super::{Registrable, boxed, first, prefixed};
use crate::error::OptionError;
use crate::option::{ApiConfig, SiteOption};
use crate::resolver::OutputResolver;
use crate::sanitizer::InputSanitizer;
use crate::strict::Strictness;
use crate::validator::InputValidator;

/// Priority the settings declaration runs at on `init` and `rest_api_init`.
const SETTINGS_PRIORITY: i32 = 10;

/// Binds one site option into the host.
///
/// | extension point              | binding                                   |
/// |------------------------------|-------------------------------------------|
/// | `default_option_<key>`       | resolve the caller's or declared default  |
/// | `option_<key>`               | resolve the stored value                  |
/// | `sanitize_option_<key>`      | wrap sentinels                            |
/// | `add_option`/`update_option` | validate writes to `<key>`                |
pub struct OptionRegistry {
	option: SiteOption,
	name: String,
	strict: Strictness,
	setting_group: Option<String>,
	backend: Arc<dyn OptionBackend>,
	hook: Option<Hook>,
}

impl OptionRegistry {
	pub fn new(option: SiteOption, strict: Strictness, backend: Arc<dyn OptionBackend>) -> Self {
		let name = option.name().to_string();
		Self {
			option,
			name,
			strict,
			setting_group: None,
			backend,
			hook: None,
		}
	}

	/// Prepends `prefix` to the storage key. The prefix is applied once, to
	/// the declared name.
	pub fn with_prefix(mut self, prefix: &str) -> Self {
		self.name = prefixed(prefix, self.option.name());
		self
	}

	pub fn with_setting_group(mut self, group: Option<&str>) -> Self {
		self.set_setting_group(group);
		self
	}

	pub fn set_setting_group(&mut self, group: Option<&str>) {
		self.setting_group = group.filter(|g| !g.is_empty()).map(str::to_string);
	}

	pub fn setting_group(&self) -> Option<&str> {
		self.setting_group.as_deref()
	}

	pub fn hook(&mut self, hook: Hook) {
		self.hook = Some(hook);
	}

	pub fn option(&self) -> &SiteOption {
		&self.option
	}

	fn bind_settings(&self, hook: &Hook, group: &str, sanitize: Filter) -> Result<(), OptionError> {
		let args = serde_json::to_value(self.option.setting_args())
			.map_err(|err| OptionError::InvalidArgument(err.to_string()))?;

		let tags: &[&str] = if self.option.api().is_some_and(ApiConfig::is_enabled) {
			&["init", "rest_api_init"]
		} else {
			&["init"]
		};
		for &tag in tags {
			let backend = Arc::downgrade(&self.backend);
			let group = group.to_string();
			let name = self.name.clone();
			let args = args.clone();
			let sanitize = sanitize.clone();
			hook.add_action(tag, SETTINGS_PRIORITY, 0, move |_: &[Value]| -> Result<(), BoxError> {
				let Some(backend) = backend.upgrade() else {
					return Ok(());
				};
				backend
					.register_setting(&group, &name, args.clone(), sanitize.clone())
					.map_err(|err| Box::new(err) as BoxError)
			});
		}
		Ok(())
	}
}

impl Registrable for OptionRegistry {
	fn name(&self) -> &str {
		&self.name
	}

	fn register(&mut self) -> Result<(), OptionError> {
		let hook = self
			.hook
			.as_ref()
			.ok_or_else(|| OptionError::MissingHook(self.name.clone()))?;
		let name = self.name.clone();
		let priority = self.option.priority();
		let resolver = OutputResolver::new(self.option.value_type(), self.strict);

		let declared = self.option.default_value().clone();
		hook.add_filter(
			&format!("default_option_{name}"),
			priority,
			3,
			move |args: &[Value]| -> Result<Value, BoxError> {
				let passed = args.get(2).and_then(Value::as_bool).unwrap_or(false);
				let default = if passed { first(args) } else { declared.clone() };
				resolver.resolve(default).map_err(boxed)
			},
		);

		hook.add_filter(
			&format!("option_{name}"),
			priority,
			1,
			move |args: &[Value]| -> Result<Value, BoxError> { resolver.resolve(first(args)).map_err(boxed) },
		);

		let sanitize: Filter = Arc::new(|args: &[Value]| -> Result<Value, BoxError> {
			Ok(InputSanitizer.sanitize(first(args)))
		});
		// Writes made before the settings surface initializes are sanitized too.
		{
			let sanitize = sanitize.clone();
			hook.add_filter(&format!("sanitize_option_{name}"), priority, 1, move |args: &[Value]| {
				sanitize(args)
			});
		}
		if let Some(group) = self.setting_group.as_deref() {
			self.bind_settings(hook, group, sanitize)?;
		}

		let validator = Arc::new(InputValidator::new(
			name.clone(),
			self.option.value_type(),
			self.strict,
			self.option.constraints().to_vec(),
		));
		// Both actions fire for every option; only writes to this key are checked.
		for (tag, arity, value_at) in [("add_option", 2, 1), ("update_option", 3, 2)] {
			let validator = validator.clone();
			let name = name.clone();
			hook.add_action(tag, priority, arity, move |args: &[Value]| -> Result<(), BoxError> {
				if args.first().and_then(Value::as_str) != Some(name.as_str()) {
					return Ok(());
				}
				validator
					.validate(args.get(value_at).unwrap_or(&Value::Null))
					.map_err(boxed)
			});
		}

		tracing::debug!(
			domain = "options",
			name = %name,
			priority,
			strict = self.strict.is_strict(),
			group = self.setting_group.as_deref(),
			"option registered"
		);
		Ok(())
	}

	fn deregister(&mut self) -> Result<(), OptionError> {
		let hook = self
			.hook
			.as_ref()
			.ok_or_else(|| OptionError::MissingHook(self.name.clone()))?;

		if let Some(group) = &self.setting_group {
			self.backend.unregister_setting(group, &self.name);
		}
		let removed = hook.deregister();
		self.backend
			.delete_option(&self.name)
			.map_err(OptionError::from_host)?;

		tracing::debug!(domain = "options", name = %self.name, removed, "option deregistered");
		Ok(())
	}
}
