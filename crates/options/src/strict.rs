use serde::{Deserialize, Serialize};

/// How a registry treats values whose type differs from the declared one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "StrictnessRepr", into = "u8")]
pub enum Strictness {
	/// Reads are coerced to the declared type; writes are not type-checked.
	#[default]
	Coerce = 0,
	/// Mismatched values raise a [`crate::TypeError`] on read and write.
	Strict = 1,
}

impl Strictness {
	pub fn is_strict(self) -> bool {
		self == Strictness::Strict
	}
}

impl TryFrom<u8> for Strictness {
	type Error = String;

	fn try_from(level: u8) -> Result<Self, Self::Error> {
		match level {
			0 => Ok(Strictness::Coerce),
			1 => Ok(Strictness::Strict),
			other => Err(format!("invalid strictness level {other}, expected 0 or 1")),
		}
	}
}

impl From<Strictness> for u8 {
	fn from(strict: Strictness) -> u8 {
		strict as u8
	}
}

impl From<bool> for Strictness {
	fn from(strict: bool) -> Self {
		if strict { Strictness::Strict } else { Strictness::Coerce }
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrictnessRepr {
	Level(u8),
	Name(String),
}

impl TryFrom<StrictnessRepr> for Strictness {
	type Error = String;

	fn try_from(repr: StrictnessRepr) -> Result<Self, Self::Error> {
		match repr {
			StrictnessRepr::Level(level) => Strictness::try_from(level),
			StrictnessRepr::Name(name) => match name.as_str() {
				"coerce" => Ok(Strictness::Coerce),
				"strict" => Ok(Strictness::Strict),
				_ => Err(format!("invalid strictness {name:?}, expected \"coerce\" or \"strict\"")),
			},
		}
	}
}
