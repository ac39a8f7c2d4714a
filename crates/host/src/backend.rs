//! Storage contracts consumed by the option core.
//!
//! Both contracts describe a key-value store whose reads and writes pass
//! through named extension points on a [`crate::Hooks`] dispatcher. The
//! store has known quirks the core must work around: `false` doubles as the
//! "not found" marker, `null` and `false` do not survive a write, and
//! numerically equal values are treated as unchanged on update.

use serde_json::Value;

use crate::error::HostError;
use crate::hooks::{Filter, HookId};

/// Single-site option storage.
pub trait OptionBackend: Send + Sync {
	/// Reads `name`. `default` is the caller's own fallback, if any; when it
	/// is `None` the host falls back to `false`.
	fn get_option(&self, name: &str, default: Option<Value>) -> Result<Value, HostError>;

	/// Writes `name` only if it does not exist yet.
	fn add_option(&self, name: &str, value: Value) -> Result<bool, HostError>;

	/// Writes `name`, adding it if absent. Returns `false` when nothing changed.
	fn update_option(&self, name: &str, value: Value) -> Result<bool, HostError>;

	/// Removes `name`. Returns whether a stored value existed.
	fn delete_option(&self, name: &str) -> Result<bool, HostError>;

	/// Declares `name` on the schema-driven settings surface under `group`.
	/// `args` is the serialized schema; `sanitize` runs on every write.
	fn register_setting(
		&self,
		group: &str,
		name: &str,
		args: Value,
		sanitize: Filter,
	) -> Result<(), HostError>;

	/// Removes a declaration made by [`OptionBackend::register_setting`].
	fn unregister_setting(&self, group: &str, name: &str) -> bool;
}

/// Network-wide (multisite) option storage.
pub trait NetworkBackend: Send + Sync {
	/// Whether the host runs more than one site. Network storage is
	/// unavailable otherwise.
	fn is_multisite(&self) -> bool;

	/// Scope identifier of the current network.
	fn network_id(&self) -> u64;

	fn get_site_option(&self, name: &str, default: Option<Value>) -> Result<Value, HostError>;

	fn add_site_option(&self, name: &str, value: Value) -> Result<bool, HostError>;

	fn update_site_option(&self, name: &str, value: Value) -> Result<bool, HostError>;

	fn delete_site_option(&self, name: &str) -> Result<bool, HostError>;

	/// Negative-existence cache lookup: `true` when the host has recorded
	/// `name` as absent for the current network.
	fn is_not_option(&self, name: &str) -> bool;
}

/// A declaration on the settings surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredSetting {
	pub group: String,
	pub name: String,
	pub args: Value,
	pub(crate) sanitize_hook: HookId,
}

impl RegisteredSetting {
	/// Whether the schema exposes the setting through the REST surface.
	pub fn shows_in_rest(&self) -> bool {
		match self.args.get("show_in_rest") {
			Some(Value::Bool(enabled)) => *enabled,
			Some(Value::Object(_)) => true,
			_ => false,
		}
	}

	/// Key the REST surface publishes the setting under.
	pub fn rest_name(&self) -> &str {
		self.args
			.get("show_in_rest")
			.and_then(|rest| rest.get("name"))
			.and_then(Value::as_str)
			.unwrap_or(&self.name)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn setting(args: Value) -> RegisteredSetting {
		RegisteredSetting {
			group: "general".into(),
			name: "site_color".into(),
			args,
			sanitize_hook: HookId::default(),
		}
	}

	#[test]
	fn rest_visibility_follows_schema() {
		assert!(!setting(json!({ "type": "string" })).shows_in_rest());
		assert!(!setting(json!({ "show_in_rest": false })).shows_in_rest());
		assert!(setting(json!({ "show_in_rest": true })).shows_in_rest());
		assert!(setting(json!({ "show_in_rest": { "schema": {} } })).shows_in_rest());
	}

	#[test]
	fn rest_name_prefers_configured_name() {
		assert_eq!(setting(json!({ "show_in_rest": true })).rest_name(), "site_color");
		assert_eq!(
			setting(json!({ "show_in_rest": { "name": "color", "schema": {} } })).rest_name(),
			"color"
		);
	}
}
