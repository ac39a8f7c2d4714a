use serde_json::Value;

use crate::constraint::Constraint;
use crate::error::{OptionError, TypeError};
use crate::sanitizer;
use crate::strict::Strictness;
use crate::value::{ValueType, runtime_type};

/// Write-side checks: user constraints always, the declared type only when
/// strict.
#[derive(Debug, Clone)]
pub struct InputValidator {
	name: String,
	ty: ValueType,
	strict: Strictness,
	constraints: Vec<Constraint>,
}

impl InputValidator {
	pub fn new(name: impl Into<String>, ty: ValueType, strict: Strictness, constraints: Vec<Constraint>) -> Self {
		Self {
			name: name.into(),
			ty,
			strict,
			constraints,
		}
	}

	/// `null` (wrapped or not) clears the option and is always accepted.
	pub fn validate(&self, value: &Value) -> Result<(), OptionError> {
		let value = sanitizer::unwrapped(value);
		if value.is_null() {
			return Ok(());
		}

		for constraint in &self.constraints {
			if let Err(message) = constraint.evaluate(value) {
				let message = message.unwrap_or_else(|| {
					format!("Value of \"{}\" does not match the given constraints.", self.name)
				});
				return Err(OptionError::InvalidArgument(message));
			}
		}

		if !self.strict.is_strict() || self.ty.matches(value) {
			return Ok(());
		}
		Err(TypeError::new(self.ty.as_str(), runtime_type(value)).into())
	}
}
