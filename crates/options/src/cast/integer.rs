use serde_json::Value;

use super::{numeric, require};
use crate::error::TypeError;
use crate::strict::Strictness;
use crate::value::{ValueType, is_integer};

pub fn cast(value: Value, strict: Strictness) -> Result<Value, TypeError> {
	if strict.is_strict() {
		return require(ValueType::Integer, value);
	}
	Ok(match value {
		Value::Null => Value::from(0),
		Value::Bool(b) => Value::from(i64::from(b)),
		Value::Number(n) if is_integer(&n) => Value::Number(n),
		Value::Number(n) => Value::from(truncate(n.as_f64().unwrap_or_default())),
		Value::String(s) => Value::from(match numeric::leading(&s) {
			Some(Value::Number(n)) if is_integer(&n) => n.as_i64().unwrap_or(i64::MAX),
			Some(Value::Number(n)) => truncate(n.as_f64().unwrap_or_default()),
			_ => 0,
		}),
		Value::Array(_) | Value::Object(_) => Value::Null,
	})
}

/// Truncates toward zero, saturating at the `i64` bounds.
fn truncate(f: f64) -> i64 {
	f.trunc() as i64
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;
	use serde_json::json;

	use super::*;

	#[rstest]
	#[case(json!(1), json!(1))]
	#[case(json!(-7), json!(-7))]
	#[case(json!(1.9), json!(1))]
	#[case(json!(-1.9), json!(-1))]
	#[case(json!(true), json!(1))]
	#[case(json!(false), json!(0))]
	#[case(json!("2"), json!(2))]
	#[case(json!("2.7"), json!(2))]
	#[case(json!("12abc"), json!(12))]
	#[case(json!("Hello world!"), json!(0))]
	#[case(json!([1]), json!(null))]
	#[case(json!({ "a": 1 }), json!(null))]
	fn coerces_by_truncation(#[case] input: Value, #[case] expected: Value) {
		assert_eq!(cast(input, Strictness::Coerce).unwrap(), expected);
	}

	#[rstest]
	#[case(json!("1"), "string")]
	#[case(json!(1.0), "number (float)")]
	#[case(json!(true), "boolean")]
	fn strict_rejects_non_integers(#[case] input: Value, #[case] given: &str) {
		let err = cast(input, Strictness::Strict).unwrap_err();
		assert_eq!(err.to_string(), format!("Value must be of type integer, {given} given."));
	}

	#[test]
	fn saturates_out_of_range_floats() {
		assert_eq!(cast(json!(1e300), Strictness::Coerce).unwrap(), json!(i64::MAX));
	}
}
