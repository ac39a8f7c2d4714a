use optkit_host::HostError;

/// A value's runtime type disagrees with the declared one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Value must be of type {expected}, {given} given.")]
pub struct TypeError {
	pub expected: &'static str,
	pub given: &'static str,
}

impl TypeError {
	pub fn new(expected: &'static str, given: &'static str) -> Self {
		Self { expected, given }
	}
}

/// Errors raised by option declarations and the read/write pipeline.
#[derive(Debug, thiserror::Error)]
pub enum OptionError {
	#[error("option name must not be blank")]
	BlankName,

	#[error(transparent)]
	Type(#[from] TypeError),

	/// A constraint rejected the value.
	#[error("{0}")]
	InvalidArgument(String),

	#[error("unknown option type: {0}")]
	UnknownType(String),

	/// `register` was called before a dispatcher was attached.
	#[error("no hook dispatcher attached to registry for {0:?}")]
	MissingHook(String),

	#[error(transparent)]
	Host(#[from] HostError),
}

impl OptionError {
	/// Recovers an `OptionError` raised inside a callback and carried back
	/// through the host, or wraps the host error otherwise.
	pub fn from_host(err: HostError) -> Self {
		match err {
			HostError::Hook(boxed) => match boxed.downcast::<OptionError>() {
				Ok(own) => *own,
				Err(other) => OptionError::Host(HostError::Hook(other)),
			},
			other => OptionError::Host(other),
		}
	}
}
