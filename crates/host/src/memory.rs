//! In-process host.
//!
//! [`MemoryHost`] keeps option values in memory but walks the same
//! extension-point sequence as the CMS storage layer, including its quirks:
//!
//! - A read of an absent key runs the `default_*` filter instead of the read
//!   filter, with `false` standing in for "no default given".
//! - `null` and `false` are persisted as an empty string.
//! - An update whose value equals the current one (numbers compare by value,
//!   so `0` equals `0.0`) is skipped.
//! - Network reads record misses in a per-network negative cache that short
//!   circuits later reads until the key is added again.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde_json::Value;

use crate::backend::{NetworkBackend, OptionBackend, RegisteredSetting};
use crate::error::HostError;
use crate::hooks::{Filter, Hooks};

/// Priority the settings surface binds its sanitize callbacks at.
const SETTINGS_SANITIZE_PRIORITY: i32 = 10;

pub struct MemoryHost {
	hooks: Arc<Hooks>,
	multisite: bool,
	network_id: u64,
	options: Mutex<IndexMap<String, Value>>,
	site_options: Mutex<IndexMap<String, Value>>,
	not_options: Mutex<HashSet<String>>,
	settings: Mutex<IndexMap<String, RegisteredSetting>>,
}

impl Default for MemoryHost {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryHost {
	/// Single-site host with its own dispatcher.
	pub fn new() -> Self {
		Self::with_hooks(Arc::new(Hooks::new()), false, 1)
	}

	/// Multisite host serving network `network_id`.
	pub fn multisite(network_id: u64) -> Self {
		Self::with_hooks(Arc::new(Hooks::new()), true, network_id)
	}

	pub fn with_hooks(hooks: Arc<Hooks>, multisite: bool, network_id: u64) -> Self {
		Self {
			hooks,
			multisite,
			network_id,
			options: Mutex::new(IndexMap::new()),
			site_options: Mutex::new(IndexMap::new()),
			not_options: Mutex::new(HashSet::default()),
			settings: Mutex::new(IndexMap::new()),
		}
	}

	/// The dispatcher every read and write runs through.
	pub fn hooks(&self) -> Arc<Hooks> {
		self.hooks.clone()
	}

	/// Fires the general initialization action.
	pub fn init(&self) -> Result<(), HostError> {
		self.action("init", &[])
	}

	/// Fires the REST initialization action.
	pub fn rest_api_init(&self) -> Result<(), HostError> {
		self.action("rest_api_init", &[])
	}

	pub fn registered_settings(&self) -> Vec<RegisteredSetting> {
		self.settings.lock().values().cloned().collect()
	}

	pub fn registered_setting(&self, name: &str) -> Option<RegisteredSetting> {
		self.settings.lock().get(name).cloned()
	}

	/// Current values of every setting exposed through the REST surface,
	/// keyed by their REST name.
	pub fn rest_settings(&self) -> Result<IndexMap<String, Value>, HostError> {
		let exposed: Vec<(String, String)> = self
			.settings
			.lock()
			.values()
			.filter(|s| s.shows_in_rest())
			.map(|s| (s.rest_name().to_owned(), s.name.clone()))
			.collect();

		exposed
			.into_iter()
			.map(|(key, name)| Ok((key, self.get_option(&name, None)?)))
			.collect()
	}

	/// Writes settings through the REST surface, keyed by REST name, and
	/// returns the resulting values. Keys that are not exposed are ignored.
	pub fn rest_update_settings(
		&self,
		values: impl IntoIterator<Item = (String, Value)>,
	) -> Result<IndexMap<String, Value>, HostError> {
		let exposed: HashMap<String, String> = self
			.settings
			.lock()
			.values()
			.filter(|s| s.shows_in_rest())
			.map(|s| (s.rest_name().to_owned(), s.name.clone()))
			.collect();

		for (key, value) in values {
			if let Some(name) = exposed.get(&key) {
				self.update_option(name, value)?;
			}
		}
		self.rest_settings()
	}

	/// JSON schema of every setting exposed through the REST surface, keyed
	/// by REST name. A `show_in_rest.schema` object is merged over the
	/// declared type, description and default.
	pub fn rest_schema(&self) -> IndexMap<String, Value> {
		self.settings
			.lock()
			.values()
			.filter(|s| s.shows_in_rest())
			.map(|s| {
				let mut schema = serde_json::Map::new();
				for key in ["type", "description", "default"] {
					if let Some(value) = s.args.get(key) {
						schema.insert(key.to_owned(), value.clone());
					}
				}
				if let Some(Value::Object(extra)) = s.args.get("show_in_rest").and_then(|r| r.get("schema")) {
					schema.extend(extra.clone());
				}
				(s.rest_name().to_owned(), Value::Object(schema))
			})
			.collect()
	}

	/// Raw stored value, bypassing every extension point.
	pub fn raw_option(&self, name: &str) -> Option<Value> {
		self.options.lock().get(name).cloned()
	}

	/// Raw stored network value, bypassing every extension point.
	pub fn raw_site_option(&self, name: &str) -> Option<Value> {
		self.site_options.lock().get(name).cloned()
	}

	fn filter(&self, tag: &str, value: Value, args: &[Value]) -> Result<Value, HostError> {
		self.hooks
			.apply_filters(tag, value, args)
			.map_err(HostError::Hook)
	}

	fn action(&self, tag: &str, args: &[Value]) -> Result<(), HostError> {
		self.hooks.do_action(tag, args).map_err(HostError::Hook)
	}

	fn sanitize(&self, name: &str, value: Value) -> Result<Value, HostError> {
		let original = value.clone();
		self.filter(
			&format!("sanitize_option_{name}"),
			value,
			&[Value::from(name), original],
		)
	}

	fn network_args(&self, name: &str) -> [Value; 2] {
		[Value::from(name), Value::from(self.network_id)]
	}
}

impl OptionBackend for MemoryHost {
	fn get_option(&self, name: &str, default: Option<Value>) -> Result<Value, HostError> {
		let name = checked(name)?;
		let stored = self.options.lock().get(name).cloned();

		match stored {
			Some(value) => self.filter(&format!("option_{name}"), value, &[Value::from(name)]),
			None => {
				let passed = default.is_some();
				let default = default.unwrap_or(Value::Bool(false));
				self.filter(
					&format!("default_option_{name}"),
					default,
					&[Value::from(name), Value::Bool(passed)],
				)
			}
		}
	}

	fn add_option(&self, name: &str, value: Value) -> Result<bool, HostError> {
		let name = checked(name)?;
		let value = self.sanitize(name, value)?;
		if self.options.lock().contains_key(name) {
			return Ok(false);
		}

		self.action("add_option", &[Value::from(name), value.clone()])?;
		self.options.lock().insert(name.to_owned(), persist(value.clone()));
		self.action(&format!("add_option_{name}"), &[Value::from(name), value.clone()])?;
		self.action("added_option", &[Value::from(name), value])?;

		tracing::debug!(domain = "host", name, "option added");
		Ok(true)
	}

	fn update_option(&self, name: &str, value: Value) -> Result<bool, HostError> {
		let name = checked(name)?;
		let value = self.sanitize(name, value)?;
		let old = self.get_option(name, None)?;

		let value = self.filter(
			&format!("pre_update_option_{name}"),
			value,
			&[old.clone(), Value::from(name)],
		)?;
		let value = self.filter("pre_update_option", value, &[Value::from(name), old.clone()])?;

		if unchanged(&value, &old) {
			return Ok(false);
		}
		if !self.options.lock().contains_key(name) {
			return self.add_option(name, value);
		}

		self.action("update_option", &[Value::from(name), old.clone(), value.clone()])?;
		self.options.lock().insert(name.to_owned(), persist(value.clone()));
		self.action(
			&format!("update_option_{name}"),
			&[old.clone(), value.clone(), Value::from(name)],
		)?;
		self.action("updated_option", &[Value::from(name), old, value])?;

		tracing::debug!(domain = "host", name, "option updated");
		Ok(true)
	}

	fn delete_option(&self, name: &str) -> Result<bool, HostError> {
		let name = checked(name)?;
		if !self.options.lock().contains_key(name) {
			return Ok(false);
		}

		self.action("delete_option", &[Value::from(name)])?;
		let removed = self.options.lock().shift_remove(name).is_some();
		if removed {
			self.action(&format!("delete_option_{name}"), &[Value::from(name)])?;
			self.action("deleted_option", &[Value::from(name)])?;
		}
		Ok(removed)
	}

	fn register_setting(
		&self,
		group: &str,
		name: &str,
		args: Value,
		sanitize: Filter,
	) -> Result<(), HostError> {
		let name = checked(name)?;
		let sanitize_hook = self.hooks.add_filter(
			&format!("sanitize_option_{name}"),
			SETTINGS_SANITIZE_PRIORITY,
			1,
			sanitize,
		);
		let setting = RegisteredSetting {
			group: group.to_owned(),
			name: name.to_owned(),
			args,
			sanitize_hook,
		};

		let replaced = self.settings.lock().insert(name.to_owned(), setting);
		if let Some(previous) = replaced {
			self.hooks.remove(previous.sanitize_hook);
		}
		tracing::debug!(domain = "host", group, name, "setting registered");
		Ok(())
	}

	fn unregister_setting(&self, group: &str, name: &str) -> bool {
		let removed = {
			let mut settings = self.settings.lock();
			match settings.get(name) {
				Some(setting) if setting.group == group => settings.shift_remove(name),
				_ => None,
			}
		};

		match removed {
			Some(setting) => {
				self.hooks.remove(setting.sanitize_hook);
				true
			}
			None => false,
		}
	}
}

impl NetworkBackend for MemoryHost {
	fn is_multisite(&self) -> bool {
		self.multisite
	}

	fn network_id(&self) -> u64 {
		self.network_id
	}

	fn get_site_option(&self, name: &str, default: Option<Value>) -> Result<Value, HostError> {
		let name = checked(name)?;
		let default = default.unwrap_or(Value::Bool(false));
		let args = self.network_args(name);
		let default_tag = format!("default_site_option_{name}");

		if self.not_options.lock().contains(name) {
			return self.filter(&default_tag, default, &args);
		}

		let stored = self.site_options.lock().get(name).cloned();
		let value = match stored {
			Some(value) => value,
			None => {
				self.not_options.lock().insert(name.to_owned());
				self.filter(&default_tag, default, &args)?
			}
		};

		self.filter(&format!("site_option_{name}"), value, &args)
	}

	fn add_site_option(&self, name: &str, value: Value) -> Result<bool, HostError> {
		let name = checked(name)?;
		let args = self.network_args(name);
		let value = self.filter(&format!("pre_add_site_option_{name}"), value, &args)?;

		// The probe is the only existence check: a stored value that reads back
		// as `false` is overwritten.
		if !self.not_options.lock().contains(name) {
			let probe = self.get_site_option(name, Some(Value::Bool(false)))?;
			if probe != Value::Bool(false) {
				return Ok(false);
			}
		}

		let value = self.sanitize(name, value)?;
		self.site_options
			.lock()
			.insert(name.to_owned(), persist(value.clone()));
		self.not_options.lock().remove(name);

		let [name_arg, network_arg] = args;
		let action_args = [name_arg, value, network_arg];
		self.action(&format!("add_site_option_{name}"), &action_args)?;
		self.action("add_site_option", &action_args)?;

		tracing::debug!(domain = "host", name, network = self.network_id, "site option added");
		Ok(true)
	}

	fn update_site_option(&self, name: &str, value: Value) -> Result<bool, HostError> {
		let name = checked(name)?;
		let old = self.get_site_option(name, Some(Value::Bool(false)))?;
		let value = self.filter(
			&format!("pre_update_site_option_{name}"),
			value,
			&[old.clone(), Value::from(name), Value::from(self.network_id)],
		)?;

		if unchanged(&value, &old) {
			return Ok(false);
		}
		if old == Value::Bool(false) {
			return self.add_site_option(name, value);
		}

		let value = self.sanitize(name, value)?;
		{
			let mut table = self.site_options.lock();
			if !table.contains_key(name) {
				return Ok(false);
			}
			table.insert(name.to_owned(), persist(value.clone()));
		}
		self.not_options.lock().remove(name);

		let action_args = [Value::from(name), value, old, Value::from(self.network_id)];
		self.action(&format!("update_site_option_{name}"), &action_args)?;
		self.action("update_site_option", &action_args)?;

		tracing::debug!(domain = "host", name, network = self.network_id, "site option updated");
		Ok(true)
	}

	fn delete_site_option(&self, name: &str) -> Result<bool, HostError> {
		let name = checked(name)?;
		let args = self.network_args(name);
		self.action(&format!("pre_delete_site_option_{name}"), &args)?;

		let removed = self.site_options.lock().shift_remove(name).is_some();
		if removed {
			self.action(&format!("delete_site_option_{name}"), &args)?;
			self.action("delete_site_option", &args)?;
		}
		Ok(removed)
	}

	fn is_not_option(&self, name: &str) -> bool {
		self.not_options.lock().contains(name)
	}
}

fn checked(name: &str) -> Result<&str, HostError> {
	let name = name.trim();
	if name.is_empty() {
		return Err(HostError::EmptyName);
	}
	Ok(name)
}

fn persist(value: Value) -> Value {
	match value {
		Value::Null | Value::Bool(false) => Value::String(String::new()),
		other => other,
	}
}

fn unchanged(new: &Value, old: &Value) -> bool {
	if new == old {
		return true;
	}
	match (new, old) {
		(Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
		_ => false,
	}
}
