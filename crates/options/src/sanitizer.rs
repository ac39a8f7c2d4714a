//! Write-side sentinel wrapping.
//!
//! The host store treats `null` and `false` as "no such option" and compares
//! numbers loosely on update, so those values are stored inside a one-key
//! wrapper object and unwrapped again before any check or cast.

use serde_json::{Map, Value};

/// Key of the sentinel wrapper object.
pub const WRAPPER_KEY: &str = "__optkit";

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSanitizer;

impl InputSanitizer {
	/// Wraps `null`, `false` and floats; passes everything else through.
	pub fn sanitize(&self, value: Value) -> Value {
		if needs_wrapping(&value) {
			let mut wrapper = Map::with_capacity(1);
			wrapper.insert(WRAPPER_KEY.to_string(), value);
			Value::Object(wrapper)
		} else {
			value
		}
	}
}

fn needs_wrapping(value: &Value) -> bool {
	match value {
		Value::Null | Value::Bool(false) => true,
		Value::Number(n) => !crate::value::is_integer(n),
		_ => false,
	}
}

/// Strips the sentinel wrapper if `value` is one.
pub fn unwrap(value: Value) -> Value {
	match value {
		Value::Object(mut map) if map.len() == 1 && map.contains_key(WRAPPER_KEY) => {
			map.remove(WRAPPER_KEY).unwrap_or(Value::Null)
		}
		other => other,
	}
}

/// Borrowing variant of [`unwrap`].
pub fn unwrapped(value: &Value) -> &Value {
	match value {
		Value::Object(map) if map.len() == 1 => map.get(WRAPPER_KEY).unwrap_or(value),
		other => other,
	}
}
