//! Per-type coercion.
//!
//! Each caster converts a raw value to its declared type. Under
//! [`Strictness::Coerce`] unconvertible values become `null`; under
//! [`Strictness::Strict`] anything but `null` or a value of the declared type
//! is a [`TypeError`].

pub mod array;
pub mod boolean;
pub mod integer;
mod numeric;
pub mod number;
pub mod string;

use serde_json::Value;

use crate::error::TypeError;
use crate::strict::Strictness;
use crate::value::{ValueType, runtime_type};

/// Casts `value` to `ty`.
pub fn cast(ty: ValueType, value: Value, strict: Strictness) -> Result<Value, TypeError> {
	match ty {
		ValueType::String => string::cast(value, strict),
		ValueType::Boolean => boolean::cast(value, strict),
		ValueType::Integer => integer::cast(value, strict),
		ValueType::Number => number::cast(value, strict),
		ValueType::Array => array::cast(value, strict),
	}
}

/// Strict path shared by every caster.
fn require(ty: ValueType, value: Value) -> Result<Value, TypeError> {
	if value.is_null() || ty.matches(&value) {
		Ok(value)
	} else {
		Err(TypeError::new(ty.as_str(), runtime_type(&value)))
	}
}
