use serde_json::Value;

use crate::cast;
use crate::error::TypeError;
use crate::sanitizer;
use crate::strict::Strictness;
use crate::value::ValueType;

/// Read-side pipeline: unwrap the sentinel, then cast to the declared type.
#[derive(Debug, Clone, Copy)]
pub struct OutputResolver {
	ty: ValueType,
	strict: Strictness,
}

impl OutputResolver {
	pub fn new(ty: ValueType, strict: Strictness) -> Self {
		Self { ty, strict }
	}

	/// `null` always resolves to `null`, whatever the declared type.
	pub fn resolve(&self, value: Value) -> Result<Value, TypeError> {
		let value = sanitizer::unwrap(value);
		if value.is_null() {
			return Ok(Value::Null);
		}
		tracing::trace!(domain = "options", ty = %self.ty, "resolve");
		cast::cast(self.ty, value, self.strict)
	}
}
