use serde_json::Value;

use super::require;
use crate::error::TypeError;
use crate::strict::Strictness;
use crate::value::ValueType;

pub fn cast(value: Value, strict: Strictness) -> Result<Value, TypeError> {
	if strict.is_strict() {
		return require(ValueType::String, value);
	}
	Ok(match value {
		Value::String(_) | Value::Null => value,
		Value::Bool(true) => Value::from("1"),
		Value::Bool(false) => Value::from(""),
		Value::Number(n) => match n.as_f64() {
			Some(f) if !crate::value::is_integer(&n) => Value::from(render_float(f)),
			_ => Value::from(n.to_string()),
		},
		Value::Array(_) | Value::Object(_) => Value::Null,
	})
}

/// Shortest round-trip rendering, switching to exponent form outside
/// `[1e-4, 1e15)` the way the host's scalar-to-string conversion does.
pub(crate) fn render_float(f: f64) -> String {
	let magnitude = f.abs();
	if f == 0.0 || (1e-4..1e15).contains(&magnitude) {
		return f.to_string();
	}

	let sci = format!("{f:e}");
	let Some((mantissa, exponent)) = sci.split_once('e') else {
		return sci;
	};
	let mantissa = if mantissa.contains('.') {
		mantissa.to_string()
	} else {
		format!("{mantissa}.0")
	};
	match exponent.strip_prefix('-') {
		Some(digits) => format!("{mantissa}E-{digits}"),
		None => format!("{mantissa}E+{exponent}"),
	}
}
