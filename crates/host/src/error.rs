/// Error raised by an extension-point callback.
///
/// Callbacks box their own error type so it reaches the caller unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Host-level failures.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
	/// A filter or action callback failed; the write or read was aborted.
	#[error(transparent)]
	Hook(BoxError),

	/// The option name was empty after trimming.
	#[error("option name must not be empty")]
	EmptyName,
}

impl HostError {
	/// Returns the callback error as `E` if that is what aborted the operation.
	pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
		match self {
			HostError::Hook(err) => err.downcast_ref::<E>(),
			HostError::EmptyName => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, thiserror::Error)]
	#[error("rejected")]
	struct Rejected;

	#[test]
	fn hook_error_is_transparent() {
		let err = HostError::Hook(Box::new(Rejected));
		assert_eq!(err.to_string(), "rejected");
		assert!(err.downcast_ref::<Rejected>().is_some());
	}

	#[test]
	fn empty_name_has_no_source() {
		assert!(HostError::EmptyName.downcast_ref::<Rejected>().is_none());
	}
}
