use serde::{Deserialize, Serialize};

use crate::strict::Strictness;

/// Registry settings as read from a config file.
///
/// ```toml
/// strict = "strict"
/// prefix = "acme_"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	pub strict: Strictness,
	pub prefix: String,
}
