//! Option declarations.
//!
//! An [`OptionDef`] is an immutable description of one configuration key.
//! Builder methods take the value and return a changed copy, so a declaration
//! can be shared as a template:
//!
//! ```
//! use optkit_options::{SiteOption, ValueType};
//!
//! let base = SiteOption::new("color", ValueType::String)?.with_default("blue".into());
//! let themed = base.clone().with_description("Accent color");
//! assert_eq!(base.description(), None);
//! assert_eq!(themed.description(), Some("Accent color"));
//! # Ok::<(), optkit_options::OptionError>(())
//! ```

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constraint::Constraint;
use crate::error::OptionError;
use crate::value::ValueType;

/// Hook priority options bind at unless told otherwise.
pub const DEFAULT_PRIORITY: i32 = 99;

mod sealed {
	pub trait Sealed {}
}

/// Storage scope of an option.
pub trait Scope: sealed::Sealed + Clone + Send + Sync + 'static {
	const NETWORK: bool;
}

/// Per-site storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Site;

/// Network-wide storage on multisite hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Network;

impl sealed::Sealed for Site {}
impl sealed::Sealed for Network {}

impl Scope for Site {
	const NETWORK: bool = false;
}

impl Scope for Network {
	const NETWORK: bool = true;
}

pub type SiteOption = OptionDef<Site>;
pub type NetworkOption = OptionDef<Network>;

/// How a setting is exposed through the REST surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiConfig {
	Toggle(bool),
	Config {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		name: Option<String>,
		schema: Value,
	},
}

impl ApiConfig {
	/// Whether the setting is published through the REST surface.
	pub fn is_enabled(&self) -> bool {
		match self {
			ApiConfig::Toggle(enabled) => *enabled,
			ApiConfig::Config { .. } => true,
		}
	}
}

impl From<bool> for ApiConfig {
	fn from(enabled: bool) -> Self {
		ApiConfig::Toggle(enabled)
	}
}

/// Schema handed to the host's settings surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingArgs {
	#[serde(rename = "type")]
	pub ty: ValueType,
	pub default: Value,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub show_in_rest: Option<ApiConfig>,
}

#[derive(Debug, Clone)]
pub struct OptionDef<S: Scope> {
	name: String,
	ty: ValueType,
	default: Value,
	priority: i32,
	constraints: Vec<Constraint>,
	label: Option<String>,
	description: Option<String>,
	api: Option<ApiConfig>,
	_scope: PhantomData<S>,
}

impl<S: Scope> OptionDef<S> {
	/// Declares an option. Fails if `name` is blank.
	pub fn new(name: impl Into<String>, ty: ValueType) -> Result<Self, OptionError> {
		let name = name.into();
		if name.trim().is_empty() {
			return Err(OptionError::BlankName);
		}
		Ok(Self {
			name,
			ty,
			default: Value::Null,
			priority: DEFAULT_PRIORITY,
			constraints: Vec::new(),
			label: None,
			description: None,
			api: None,
			_scope: PhantomData,
		})
	}

	/// Declares an option from its type tag (`"string"`, `"integer"`, ...).
	pub fn from_tag(name: impl Into<String>, tag: &str) -> Result<Self, OptionError> {
		Self::new(name, tag.parse()?)
	}

	pub fn with_default(mut self, value: Value) -> Self {
		self.default = value;
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Replaces the constraint list.
	pub fn with_constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
		self.constraints = constraints.into_iter().collect();
		self
	}

	pub fn with_priority(mut self, priority: i32) -> Self {
		self.priority = priority;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn value_type(&self) -> ValueType {
		self.ty
	}

	pub fn default_value(&self) -> &Value {
		&self.default
	}

	pub fn priority(&self) -> i32 {
		self.priority
	}

	pub fn constraints(&self) -> &[Constraint] {
		&self.constraints
	}

	pub fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	pub fn api(&self) -> Option<&ApiConfig> {
		self.api.as_ref()
	}

	pub fn is_network(&self) -> bool {
		S::NETWORK
	}

	pub fn setting_args(&self) -> SettingArgs {
		SettingArgs {
			ty: self.ty,
			default: self.default.clone(),
			label: self.label.clone(),
			description: self.description.clone(),
			show_in_rest: self.api.clone(),
		}
	}
}

impl OptionDef<Site> {
	/// Exposes the option through the host's REST settings surface. Network
	/// options have no such surface, so this is only available on site
	/// options.
	pub fn api_enabled(mut self, config: impl Into<ApiConfig>) -> Self {
		self.api = Some(config.into());
		self
	}
}

/// A declaration of either scope, as held by a [`crate::Registry`].
#[derive(Debug, Clone)]
pub enum AnyOption {
	Site(SiteOption),
	Network(NetworkOption),
}

impl AnyOption {
	pub fn name(&self) -> &str {
		match self {
			AnyOption::Site(option) => option.name(),
			AnyOption::Network(option) => option.name(),
		}
	}

	pub fn is_network(&self) -> bool {
		matches!(self, AnyOption::Network(_))
	}
}

impl From<SiteOption> for AnyOption {
	fn from(option: SiteOption) -> Self {
		AnyOption::Site(option)
	}
}

impl From<NetworkOption> for AnyOption {
	fn from(option: NetworkOption) -> Self {
		AnyOption::Network(option)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;
	use serde_json::json;

	use super::*;

	#[rstest]
	#[case("")]
	#[case("   ")]
	fn blank_names_are_rejected(#[case] name: &str) {
		assert!(matches!(SiteOption::new(name, ValueType::String), Err(OptionError::BlankName)));
		assert!(matches!(NetworkOption::new(name, ValueType::String), Err(OptionError::BlankName)));
	}

	#[test]
	fn unknown_tags_are_rejected_at_construction() {
		let err = SiteOption::from_tag("x", "float").unwrap_err();
		assert!(matches!(err, OptionError::UnknownType(_)));
		assert_eq!(SiteOption::from_tag("x", "number").unwrap().value_type(), ValueType::Number);
	}

	#[test]
	fn builders_leave_the_original_untouched() {
		let base = SiteOption::new("count", ValueType::Integer).unwrap();
		let tuned = base.clone().with_default(json!(1)).with_priority(5);

		assert_eq!(base.default_value(), &Value::Null);
		assert_eq!(base.priority(), DEFAULT_PRIORITY);
		assert_eq!(tuned.default_value(), &json!(1));
		assert_eq!(tuned.priority(), 5);
	}

	#[test]
	fn setting_args_carry_presentation_metadata() {
		let option = SiteOption::new("color", ValueType::String)
			.unwrap()
			.with_default(json!("blue"))
			.with_label("Color")
			.with_description("Accent color")
			.api_enabled(ApiConfig::Config {
				name: Some("accent".into()),
				schema: json!({ "type": "string" }),
			});

		assert_eq!(
			serde_json::to_value(option.setting_args()).unwrap(),
			json!({
				"type": "string",
				"default": "blue",
				"label": "Color",
				"description": "Accent color",
				"show_in_rest": { "name": "accent", "schema": { "type": "string" } },
			})
		);
	}

	#[test]
	fn minimal_setting_args() {
		let option = NetworkOption::new("list", ValueType::Array).unwrap();
		assert!(option.is_network());
		assert_eq!(
			serde_json::to_value(option.setting_args()).unwrap(),
			json!({ "type": "array", "default": null })
		);
	}

	#[test]
	fn api_toggle_deserializes_from_bool_or_object() {
		assert_eq!(serde_json::from_value::<ApiConfig>(json!(true)).unwrap(), ApiConfig::Toggle(true));
		assert_eq!(
			serde_json::from_value::<ApiConfig>(json!({ "schema": {} })).unwrap(),
			ApiConfig::Config { name: None, schema: json!({}) }
		);
	}

	#[rstest]
	#[case(ApiConfig::Toggle(true), true)]
	#[case(ApiConfig::Toggle(false), false)]
	#[case(ApiConfig::Config { name: None, schema: json!({}) }, true)]
	fn api_exposure(#[case] config: ApiConfig, #[case] enabled: bool) {
		assert_eq!(config.is_enabled(), enabled);
	}
}
