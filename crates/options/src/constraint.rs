//! User-supplied value constraints.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

/// Reports every way a value breaks a rule.
pub trait ConstraintChecker: Send + Sync {
	fn violations(&self, value: &Value) -> Vec<String>;
}

type Predicate = dyn Fn(&Value) -> bool + Send + Sync;
type Check = dyn Fn(&Value) -> Result<(), String> + Send + Sync;

#[derive(Clone)]
enum Kind {
	Predicate(Arc<Predicate>),
	Check(Arc<Check>),
	Checker(Arc<dyn ConstraintChecker>),
}

/// One rule a value must satisfy before it is written.
#[derive(Clone)]
pub struct Constraint(Kind);

impl Constraint {
	/// Rejects the value when `f` returns `false`, with the generic message.
	pub fn predicate(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
		Self(Kind::Predicate(Arc::new(f)))
	}

	/// Rejects the value with the returned message. An empty message falls
	/// back to the generic one.
	pub fn check(f: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static) -> Self {
		Self(Kind::Check(Arc::new(f)))
	}

	pub fn checker(checker: impl ConstraintChecker + 'static) -> Self {
		Self(Kind::Checker(Arc::new(checker)))
	}

	/// `Err(None)` is a failure without a message of its own.
	pub(crate) fn evaluate(&self, value: &Value) -> Result<(), Option<String>> {
		match &self.0 {
			Kind::Predicate(f) if f(value) => Ok(()),
			Kind::Predicate(_) => Err(None),
			Kind::Check(f) => f(value).map_err(|msg| Some(msg).filter(|m| !m.is_empty())),
			Kind::Checker(checker) => match checker.violations(value).into_iter().next() {
				None => Ok(()),
				Some(msg) => Err(Some(msg).filter(|m| !m.is_empty())),
			},
		}
	}
}

impl fmt::Debug for Constraint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let kind = match self.0 {
			Kind::Predicate(_) => "predicate",
			Kind::Check(_) => "check",
			Kind::Checker(_) => "checker",
		};
		f.debug_tuple("Constraint").field(&kind).finish()
	}
}

impl<C: ConstraintChecker + 'static> From<C> for Constraint {
	fn from(checker: C) -> Self {
		Constraint::checker(checker)
	}
}

/// Strings must not be empty or whitespace, arrays must not be empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotBlank;

impl ConstraintChecker for NotBlank {
	fn violations(&self, value: &Value) -> Vec<String> {
		let blank = match value {
			Value::String(s) => s.trim().is_empty(),
			Value::Array(items) => items.is_empty(),
			Value::Object(map) => map.is_empty(),
			Value::Bool(b) => !b,
			Value::Null => true,
			Value::Number(_) => false,
		};
		if blank {
			vec!["This value should not be blank.".to_string()]
		} else {
			Vec::new()
		}
	}
}

/// Numbers must fall within `[min, max]`.
#[derive(Debug, Clone, Copy)]
pub struct Range {
	pub min: f64,
	pub max: f64,
}

impl ConstraintChecker for Range {
	fn violations(&self, value: &Value) -> Vec<String> {
		match value.as_f64() {
			Some(n) if (self.min..=self.max).contains(&n) => Vec::new(),
			Some(_) => vec![format!("This value should be between {} and {}.", self.min, self.max)],
			None => vec!["This value should be a valid number.".to_string()],
		}
	}
}

/// The value must equal one of the listed choices.
#[derive(Debug, Clone)]
pub struct OneOf(pub Vec<Value>);

impl ConstraintChecker for OneOf {
	fn violations(&self, value: &Value) -> Vec<String> {
		if self.0.contains(value) {
			Vec::new()
		} else {
			vec!["The value you selected is not a valid choice.".to_string()]
		}
	}
}

/// Strings must match the pattern.
#[derive(Debug, Clone)]
pub struct Matches(pub Regex);

impl ConstraintChecker for Matches {
	fn violations(&self, value: &Value) -> Vec<String> {
		match value {
			Value::String(s) if self.0.is_match(s) => Vec::new(),
			Value::String(_) => vec!["This value is not valid.".to_string()],
			_ => vec!["This value should be of type string.".to_string()],
		}
	}
}
