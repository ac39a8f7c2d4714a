//! Declared option types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OptionError;

/// The type an option's values are coerced to and checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
	String,
	Boolean,
	Integer,
	Number,
	Array,
}

impl ValueType {
	pub const ALL: [ValueType; 5] = [
		ValueType::String,
		ValueType::Boolean,
		ValueType::Integer,
		ValueType::Number,
		ValueType::Array,
	];

	pub const fn as_str(self) -> &'static str {
		match self {
			ValueType::String => "string",
			ValueType::Boolean => "boolean",
			ValueType::Integer => "integer",
			ValueType::Number => "number",
			ValueType::Array => "array",
		}
	}

	/// Whether `value` already has this type. Integers count as numbers;
	/// objects count as (associative) arrays.
	pub fn matches(self, value: &Value) -> bool {
		match (self, value) {
			(ValueType::String, Value::String(_)) => true,
			(ValueType::Boolean, Value::Bool(_)) => true,
			(ValueType::Integer, Value::Number(n)) => is_integer(n),
			(ValueType::Number, Value::Number(_)) => true,
			(ValueType::Array, Value::Array(_) | Value::Object(_)) => true,
			_ => false,
		}
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ValueType {
	type Err = OptionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ValueType::ALL
			.into_iter()
			.find(|ty| ty.as_str() == s)
			.ok_or_else(|| OptionError::UnknownType(s.to_string()))
	}
}

/// Lower-cased runtime type name of `value`, as used in type error messages.
pub fn runtime_type(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(n) if is_integer(n) => "integer",
		Value::Number(_) => "number (float)",
		Value::String(_) => "string",
		Value::Array(_) | Value::Object(_) => "array",
	}
}

pub(crate) fn is_integer(n: &serde_json::Number) -> bool {
	n.is_i64() || n.is_u64()
}
